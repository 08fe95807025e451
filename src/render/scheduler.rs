//! Frame coalescing and input debouncing.

use std::time::{Duration, Instant};

/// A pending draw, drained at most once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    pub full_redraw: bool,
}

/// Coalesces render requests onto the next frame.
///
/// Any number of requests between two frames produce one draw pass; a full
/// redraw request is never lost to a later partial one. The draw reads the
/// state current at frame time, so no stale snapshot is ever drawn.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    pending: Option<RenderRequest>,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, full_redraw: bool) {
        let full_redraw = full_redraw || self.pending.is_some_and(|p| p.full_redraw);
        self.pending = Some(RenderRequest { full_redraw });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Called by the frame callback.
    pub fn take(&mut self) -> Option<RenderRequest> {
        self.pending.take()
    }
}

/// Delays an action until `wait` has passed without a newer trigger.
///
/// A later trigger supersedes the pending one; nothing is cancelled
/// explicitly.
#[derive(Debug)]
pub struct Debouncer<T> {
    wait: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    pub fn trigger(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.wait));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the pending value fires.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, deadline)| deadline.saturating_duration_since(now))
    }

    /// Yield the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_coalesce_and_keep_full_redraw() {
        let mut s = RenderScheduler::new();
        s.request(true);
        s.request(false);
        s.request(false);
        assert_eq!(s.take(), Some(RenderRequest { full_redraw: true }));
        assert_eq!(s.take(), None);

        s.request(false);
        assert_eq!(s.take(), Some(RenderRequest { full_redraw: false }));
    }

    #[test]
    fn later_trigger_supersedes() {
        let start = Instant::now();
        let wait = Duration::from_millis(200);
        let mut d = Debouncer::new(wait);

        d.trigger(1, start);
        d.trigger(2, start + Duration::from_millis(150));
        assert_eq!(d.poll(start + Duration::from_millis(250)), None);
        assert_eq!(d.poll(start + Duration::from_millis(350)), Some(2));
        assert!(!d.is_pending());
    }

    #[test]
    fn remaining_counts_down() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(100));
        assert_eq!(d.remaining(start), None);
        d.trigger((), start);
        assert_eq!(d.remaining(start + Duration::from_millis(40)), Some(Duration::from_millis(60)));
        assert_eq!(d.remaining(start + Duration::from_millis(400)), Some(Duration::ZERO));
    }
}
