use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::model::date_range::{date_from_millis, date_to_millis};

/// A single date-ranged task on the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Completion percentage, 0..=100.
    pub progress: u8,
    pub selected: bool,
}

impl Task {
    /// Create a task with a fresh id and no progress.
    pub fn new(
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4().to_string(), name, start, end)
    }

    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if end < start {
            return Err(ValidationError::InvertedRange);
        }
        Ok(Self {
            id: id.into(),
            name,
            start,
            end,
            progress: 0,
            selected: false,
        })
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    /// Number of calendar days covered, both bounds included.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: Some(self.id.clone()),
            name: Some(self.name.clone()),
            start_date: Some(date_to_millis(self.start)),
            end_date: Some(date_to_millis(self.end)),
            progress: Some(self.progress),
        }
    }
}

/// The persisted shape of a task: epoch-millisecond dates, no selection.
///
/// Every field is optional on the way in so that damaged rows can be
/// skipped instead of failing a whole load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<i64>,
    #[serde(default)]
    pub end_date: Option<i64>,
    #[serde(default)]
    pub progress: Option<u8>,
}

impl TaskRecord {
    /// Rebuild a task, or `None` when a required field is missing or the
    /// dates are unusable.
    pub fn to_task(&self) -> Option<Task> {
        let id = self.id.as_deref().filter(|id| !id.is_empty())?;
        let name = self.name.as_deref().filter(|n| !n.is_empty())?;
        let start = date_from_millis(self.start_date?)?;
        let end = date_from_millis(self.end_date?)?;
        if start > end {
            return None;
        }
        Some(Task {
            id: id.to_string(),
            name: name.to_string(),
            start,
            end,
            progress: self.progress.unwrap_or(0).min(100),
            selected: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn rejects_inverted_range_and_blank_name() {
        assert_eq!(
            Task::new("Design", d(2024, 3, 1), d(2024, 2, 28)),
            Err(ValidationError::InvertedRange)
        );
        assert_eq!(
            Task::new("   ", d(2024, 3, 1), d(2024, 3, 1)),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn record_uses_epoch_millis() {
        let task = Task::with_id("t1", "Build", d(2024, 3, 1), d(2024, 3, 4))
            .unwrap()
            .with_progress(40);
        let json = serde_json::to_value(task.to_record()).unwrap();
        assert_eq!(json["startDate"], 1_709_251_200_000_i64);
        assert_eq!(json["progress"], 40);
        assert_eq!(task.duration_days(), 4);
    }

    #[test]
    fn damaged_records_are_rejected() {
        let record: TaskRecord = serde_json::from_str(r#"{"id":"x","name":"No dates"}"#).unwrap();
        assert!(record.to_task().is_none());

        let record: TaskRecord =
            serde_json::from_str(r#"{"name":"No id","startDate":0,"endDate":0}"#).unwrap();
        assert!(record.to_task().is_none());
    }

    #[test]
    fn blank_names_survive_a_reload() {
        let record: TaskRecord =
            serde_json::from_str(r#"{"id":"x","name":"  ","startDate":0,"endDate":0}"#).unwrap();
        assert_eq!(record.to_task().map(|t| t.name), Some("  ".to_string()));
    }

    #[test]
    fn progress_is_clamped() {
        let task = Task::new("Ship", d(2024, 1, 1), d(2024, 1, 2))
            .unwrap()
            .with_progress(250);
        assert_eq!(task.progress, 100);
    }
}
