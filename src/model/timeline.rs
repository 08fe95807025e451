use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use tracing::debug;

use crate::model::date_range::{first_of_month, has_full_windows, DateRange, RangeFormat};

/// Which window the timeline displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Week,
    Month,
}

impl ViewMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "week" => Some(ViewMode::Week),
            "month" => Some(ViewMode::Month),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Week => "week",
            ViewMode::Month => "month",
        }
    }

    /// The window this mode shows around `date`, when it is representable.
    pub fn window_of(self, date: NaiveDate) -> Option<DateRange> {
        match self {
            ViewMode::Week => DateRange::checked_week(date),
            ViewMode::Month => DateRange::checked_month(date),
        }
    }
}

/// Row height and padding, switched by container width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartMetrics {
    pub row_height: f32,
    pub padding: f32,
    pub font_size: f32,
    pub min_col_width: f32,
    pub min_height: f32,
}

impl ChartMetrics {
    pub fn for_width(container_width: f32, settings: &Settings) -> Self {
        let compact = container_width <= settings.narrow_breakpoint;
        Self {
            row_height: if compact {
                settings.compact_row_height
            } else {
                settings.regular_row_height
            },
            padding: if compact {
                settings.compact_padding
            } else {
                settings.regular_padding
            },
            font_size: if compact { 10.0 } else { 12.0 },
            min_col_width: settings.min_col_width,
            min_height: settings.min_canvas_height,
        }
    }
}

impl Default for ChartMetrics {
    fn default() -> Self {
        Self::for_width(f32::INFINITY, &Settings::default())
    }
}

/// Navigation state of the chart.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Anchors the visible window.
    pub current_date: NaiveDate,
    pub view_mode: ViewMode,
    /// Last computed column width in pixels.
    pub col_width: f32,
    pub metrics: ChartMetrics,
    version: u64,
}

impl ViewState {
    pub fn new(current_date: NaiveDate, view_mode: ViewMode, metrics: ChartMetrics) -> Self {
        Self {
            current_date,
            view_mode,
            col_width: metrics.min_col_width,
            metrics,
            version: 1,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn row_height(&self) -> f32 {
        self.metrics.row_height
    }

    pub fn padding(&self) -> f32 {
        self.metrics.padding
    }

    /// The window selected by the view mode around `current_date`.
    pub fn window(&self) -> DateRange {
        match self.view_mode {
            ViewMode::Week => DateRange::week(self.current_date),
            ViewMode::Month => DateRange::month(self.current_date),
        }
    }

    pub fn range_label(&self) -> String {
        let format = match self.view_mode {
            ViewMode::Week => RangeFormat::Full,
            ViewMode::Month => RangeFormat::Month,
        };
        self.window().format(format)
    }

    /// Switch view mode, snapping the anchor to the new window's start.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == self.view_mode {
            return;
        }
        self.current_date = match mode {
            ViewMode::Week => DateRange::week(self.current_date).start,
            ViewMode::Month => first_of_month(self.current_date),
        };
        self.view_mode = mode;
        self.touch();
    }

    /// Move by `delta` weeks or months depending on the mode.
    pub fn navigate(&mut self, delta: i32) {
        let date = self.current_date;
        let moved = match self.view_mode {
            ViewMode::Week => {
                let days = Days::new(u64::from(delta.unsigned_abs()) * 7);
                if delta >= 0 {
                    date.checked_add_days(days)
                } else {
                    date.checked_sub_days(days)
                }
            }
            ViewMode::Month => {
                // Clamps the day to the target month's length.
                let months = Months::new(delta.unsigned_abs());
                if delta >= 0 {
                    date.checked_add_months(months)
                } else {
                    date.checked_sub_months(months)
                }
            }
        };
        match moved.filter(|d| self.view_mode.window_of(*d).is_some()) {
            Some(moved) => {
                self.current_date = moved;
                self.touch();
            }
            None => debug!(date = %date, delta, "navigation past the calendar edge ignored"),
        }
    }

    pub fn jump_to(&mut self, today: NaiveDate) {
        self.current_date = match self.view_mode {
            ViewMode::Week => today,
            ViewMode::Month => today.with_day(1).unwrap_or(today),
        };
        self.touch();
    }

    /// Re-anchor the view. Dates whose week or month cannot be shown are
    /// refused and leave the view as it was.
    pub fn set_current_date(&mut self, date: NaiveDate) -> bool {
        if !has_full_windows(date) {
            return false;
        }
        self.current_date = date;
        self.touch();
        true
    }

    pub fn set_metrics(&mut self, metrics: ChartMetrics) {
        if metrics != self.metrics {
            self.metrics = metrics;
            self.touch();
        }
    }

    pub fn set_col_width(&mut self, col_width: f32) {
        if (col_width - self.col_width).abs() > f32::EPSILON {
            self.col_width = col_width;
            self.touch();
        }
    }

    /// Record a geometry-affecting change.
    pub fn touch(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn switching_modes_snaps_anchor() {
        let mut view = ViewState::new(d(2024, 3, 14), ViewMode::Week, ChartMetrics::default());
        view.set_view_mode(ViewMode::Month);
        assert_eq!(view.current_date, d(2024, 3, 1));

        view.set_current_date(d(2024, 3, 14));
        view.set_view_mode(ViewMode::Week);
        assert_eq!(view.current_date, d(2024, 3, 11));
    }

    #[test]
    fn month_navigation_clamps_day() {
        let mut view = ViewState::new(d(2024, 1, 31), ViewMode::Month, ChartMetrics::default());
        view.navigate(1);
        assert_eq!(view.current_date, d(2024, 2, 29));
        view.navigate(-2);
        assert_eq!(view.current_date, d(2023, 12, 29));
    }

    #[test]
    fn week_navigation_moves_seven_days() {
        let mut view = ViewState::new(d(2024, 3, 14), ViewMode::Week, ChartMetrics::default());
        let v = view.version();
        view.navigate(-1);
        assert_eq!(view.current_date, d(2024, 3, 7));
        assert!(view.version() > v);
    }

    #[test]
    fn navigation_stops_at_the_last_showable_month() {
        let last_month = first_of_month(NaiveDate::MAX);
        let before = last_month.checked_sub_months(Months::new(1)).unwrap();
        let mut view = ViewState::new(before, ViewMode::Month, ChartMetrics::default());
        let v = view.version();
        view.navigate(1);
        assert_eq!(view.current_date, before);
        assert_eq!(view.version(), v);
        assert_eq!(view.window().start, before);
    }

    #[test]
    fn unshowable_anchor_is_refused() {
        let mut view = ViewState::new(d(2024, 3, 13), ViewMode::Week, ChartMetrics::default());
        assert!(!view.set_current_date(NaiveDate::MAX));
        assert_eq!(view.current_date, d(2024, 3, 13));
        assert!(view.set_current_date(d(2024, 5, 2)));
        assert_eq!(view.current_date, d(2024, 5, 2));
    }

    #[test]
    fn today_in_month_mode_is_first_of_month() {
        let mut view = ViewState::new(d(2024, 1, 1), ViewMode::Month, ChartMetrics::default());
        view.jump_to(d(2024, 5, 17));
        assert_eq!(view.current_date, d(2024, 5, 1));
    }

    #[test]
    fn compact_metrics_below_breakpoint() {
        let settings = Settings::default();
        let narrow = ChartMetrics::for_width(600.0, &settings);
        assert_eq!(narrow.row_height, 40.0);
        assert_eq!(narrow.padding, 10.0);
        let wide = ChartMetrics::for_width(1200.0, &settings);
        assert_eq!(wide.row_height, 55.0);
        assert_eq!(wide.padding, 25.0);
    }
}
