//! The seam between the chart core and whatever toolkit shows it.

use std::collections::HashSet;

use crate::error::Control;
use crate::model::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A short transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }
}

/// Modifier keys held during a canvas click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickModifiers {
    pub shift: bool,
    /// Ctrl, or Cmd on macOS.
    pub toggle: bool,
}

/// UI capabilities the controller drives.
///
/// The controller checks [`Control::REQUIRED`] against
/// [`ViewBinding::has_control`] once at startup and refuses to run on a
/// partial binding.
pub trait ViewBinding {
    fn has_control(&self, control: Control) -> bool;

    /// Width available to the chart canvas, in pixels.
    fn container_width(&self) -> f32;

    fn set_range_label(&mut self, label: &str);

    /// Highlight the toolbar button of `mode`.
    fn set_active_view(&mut self, mode: ViewMode);

    fn notify(&mut self, notification: Notification);
}

/// A binding with no toolkit behind it. Records what the controller tells it.
#[derive(Debug, Clone)]
pub struct HeadlessBinding {
    pub width: f32,
    pub missing: HashSet<Control>,
    pub range_label: String,
    pub active_view: Option<ViewMode>,
    pub notifications: Vec<Notification>,
}

impl HeadlessBinding {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            missing: HashSet::new(),
            range_label: String::new(),
            active_view: None,
            notifications: Vec::new(),
        }
    }

    pub fn without(mut self, control: Control) -> Self {
        self.missing.insert(control);
        self
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }
}

impl ViewBinding for HeadlessBinding {
    fn has_control(&self, control: Control) -> bool {
        !self.missing.contains(&control)
    }

    fn container_width(&self) -> f32 {
        self.width
    }

    fn set_range_label(&mut self, label: &str) {
        self.range_label = label.to_string();
    }

    fn set_active_view(&mut self, mode: ViewMode) {
        self.active_view = Some(mode);
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
