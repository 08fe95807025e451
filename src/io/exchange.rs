//! The JSON document used for import and export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{GanttError, Result};
use crate::model::date_range::{date_to_iso, has_full_windows, parse_date_value};
use crate::model::{Task, ViewMode, ViewState};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTask {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub progress: u8,
}

/// What "Export" writes: every task with ISO-8601 dates plus the view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub tasks: Vec<ExportedTask>,
    pub current_date: String,
    pub view_mode: ViewMode,
}

impl ExportDocument {
    pub fn new(tasks: &[Task], view: &ViewState) -> Self {
        Self {
            tasks: tasks
                .iter()
                .map(|t| ExportedTask {
                    name: t.name.clone(),
                    start_date: date_to_iso(t.start),
                    end_date: date_to_iso(t.end),
                    progress: t.progress,
                })
                .collect(),
            current_date: date_to_iso(view.current_date),
            view_mode: view.view_mode,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| GanttError::storage("export", err))
    }
}

/// `gantt-data-2024-03-01.json`
pub fn export_file_name(today: NaiveDate) -> String {
    format!("gantt-data-{}.json", today.format("%Y-%m-%d"))
}

/// A document handed to "Import". Tasks stay raw until validated one by one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDocument {
    pub tasks: Vec<serde_json::Value>,
    #[serde(default)]
    pub current_date: Option<serde_json::Value>,
    #[serde(default)]
    pub view_mode: Option<serde_json::Value>,
}

impl ImportDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| {
            GanttError::parse("import file", err.to_string())
        })
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|err| {
            GanttError::parse("import file", err.to_string())
        })
    }

    /// The saved anchor date, when present, parseable and inside the
    /// calendar range the chart can show.
    pub fn current_date(&self) -> Option<NaiveDate> {
        self.current_date
            .as_ref()
            .and_then(|v| parse_date_value(v).ok())
            .filter(|date| has_full_windows(*date))
    }

    /// The saved view mode, when it is `"week"` or `"month"`.
    pub fn view_mode(&self) -> Option<ViewMode> {
        self.view_mode
            .as_ref()
            .and_then(|v| v.as_str())
            .and_then(ViewMode::parse)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::ChartMetrics;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn export_shape() {
        let task = Task::with_id("t", "Design", d(2024, 3, 1), d(2024, 3, 5))
            .unwrap()
            .with_progress(20);
        let view = ViewState::new(d(2024, 3, 4), ViewMode::Month, ChartMetrics::default());
        let doc = ExportDocument::new(&[task], &view);
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "tasks": [{
                    "name": "Design",
                    "startDate": "2024-03-01T00:00:00.000Z",
                    "endDate": "2024-03-05T00:00:00.000Z",
                    "progress": 20
                }],
                "currentDate": "2024-03-04T00:00:00.000Z",
                "viewMode": "month"
            })
        );
    }

    #[test]
    fn file_name_uses_date() {
        assert_eq!(export_file_name(d(2024, 12, 9)), "gantt-data-2024-12-09.json");
    }

    #[test]
    fn import_view_fields_are_optional() {
        let doc = ImportDocument::from_json(r#"{"tasks": []}"#).unwrap();
        assert_eq!(doc.current_date(), None);
        assert_eq!(doc.view_mode(), None);

        let doc = ImportDocument::from_value(json!({
            "tasks": [],
            "currentDate": "2024-05-17T00:00:00.000Z",
            "viewMode": "year"
        }))
        .unwrap();
        assert_eq!(doc.current_date(), Some(d(2024, 5, 17)));
        assert_eq!(doc.view_mode(), None);
    }

    #[test]
    fn anchor_at_the_calendar_edge_is_dropped() {
        let doc = ImportDocument::from_value(json!({
            "tasks": [],
            "currentDate": crate::model::date_range::date_to_millis(NaiveDate::MAX),
        }))
        .unwrap();
        assert_eq!(doc.current_date(), None);
    }

    #[test]
    fn missing_task_list_is_a_parse_error() {
        let err = ImportDocument::from_json(r#"{"viewMode":"week"}"#).unwrap_err();
        assert!(matches!(err, GanttError::Parse { what: "import file", .. }));
        assert!(ImportDocument::from_json("not json").is_err());
    }
}
