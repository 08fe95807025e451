//! Validation and merging of imported task batches.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, ValidationError};
use crate::io::exchange::ImportDocument;
use crate::model::date_range::parse_date_value;
use crate::model::{Task, TaskList, ViewMode};

/// Larger documents are rejected before any task is looked at.
pub const MAX_IMPORT_TASKS: usize = 1000;
/// Tasks listed in the confirmation prompt.
pub const PREVIEW_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Drop the current list in favour of the batch.
    #[default]
    Replace,
    /// Append batch tasks whose id is not already present.
    Merge,
}

/// A raw task that was left out, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTask {
    pub index: usize,
    pub reason: ValidationError,
}

/// Outcome of validating a document's raw task list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedBatch {
    pub tasks: Vec<Task>,
    pub skipped: Vec<SkippedTask>,
}

/// Validate every raw task independently, keeping input order.
///
/// `now_ms` seeds ids for tasks that do not bring their own.
pub fn validate_tasks(raw: &[Value], now_ms: i64) -> ValidatedBatch {
    let mut batch = ValidatedBatch::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, value) in raw.iter().enumerate() {
        match validate_task(value) {
            Ok((name, start, end, progress)) => {
                let id = unique_id(value, index, now_ms, &seen);
                seen.insert(id.clone());
                // Any string name is kept as is, blank ones included.
                batch.tasks.push(Task {
                    id,
                    name,
                    start,
                    end,
                    progress,
                    selected: false,
                });
            }
            Err(reason) => skip(&mut batch, index, reason),
        }
    }
    debug!(
        accepted = batch.tasks.len(),
        skipped = batch.skipped.len(),
        "validated import batch"
    );
    batch
}

fn skip(batch: &mut ValidatedBatch, index: usize, reason: ValidationError) {
    warn!(index, reason = %reason, "skipping imported task");
    batch.skipped.push(SkippedTask { index, reason });
}

fn validate_task(value: &Value) -> Result<(String, NaiveDate, NaiveDate, u8), ValidationError> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .ok_or(ValidationError::MissingName)?;
    let start = value
        .get("startDate")
        .and_then(|v| parse_date_value(v).ok())
        .ok_or(ValidationError::InvalidStartDate)?;
    let end = value
        .get("endDate")
        .and_then(|v| parse_date_value(v).ok())
        .ok_or(ValidationError::InvalidEndDate)?;
    if start > end {
        return Err(ValidationError::InvertedRange);
    }
    let progress = value
        .get("progress")
        .and_then(Value::as_f64)
        .filter(|p| (0.0..=100.0).contains(p))
        .map(|p| p.round() as u8)
        .unwrap_or(0);
    Ok((name.to_string(), start, end, progress))
}

/// The task's own string id, or a synthesized one, made unique in the batch.
fn unique_id(value: &Value, index: usize, now_ms: i64, seen: &HashSet<String>) -> String {
    let base = value
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("imported-{now_ms}-{index}"));
    if !seen.contains(&base) {
        return base;
    }
    let mut candidate = format!("{base}-dup{index}");
    let mut n = 1;
    while seen.contains(&candidate) {
        candidate = format!("{base}-dup{index}-{n}");
        n += 1;
    }
    candidate
}

/// What the confirmation prompt shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPreview {
    /// Raw entries in the document.
    pub found: usize,
    pub valid: usize,
    pub skipped: usize,
    /// The first few validated tasks.
    pub sample: Vec<Task>,
    /// Validated tasks not in `sample`.
    pub remaining: usize,
}

impl ImportPreview {
    fn new(found: usize, batch: &ValidatedBatch) -> Self {
        let sample: Vec<Task> = batch.tasks.iter().take(PREVIEW_LEN).cloned().collect();
        Self {
            found,
            valid: batch.tasks.len(),
            skipped: batch.skipped.len(),
            remaining: batch.tasks.len() - sample.len(),
            sample,
        }
    }
}

/// Apply a validated batch to the live list. Returns how many tasks were
/// added (for replace: the whole batch).
pub fn merge_into(list: &mut TaskList, batch: Vec<Task>, mode: ImportMode) -> usize {
    match mode {
        ImportMode::Replace => {
            let count = batch.len();
            list.set_all(batch);
            count
        }
        ImportMode::Merge => {
            let existing: HashSet<String> = list.ids().into_iter().map(str::to_string).collect();
            let fresh: Vec<Task> = batch
                .into_iter()
                .filter(|t| !existing.contains(&t.id))
                .collect();
            let count = fresh.len();
            list.extend(fresh);
            count
        }
    }
}

/// A validated import waiting for the user's decision.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImport {
    pub tasks: Vec<Task>,
    pub preview: ImportPreview,
    pub current_date: Option<NaiveDate>,
    pub view_mode: Option<ViewMode>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ImportState {
    #[default]
    Idle,
    AwaitingConfirmation(PendingImport),
    Applying,
    Cancelled,
}

/// Drives one import at a time through validation and confirmation.
#[derive(Debug, Default)]
pub struct ImportMerger {
    state: ImportState,
}

impl ImportMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ImportState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingImport> {
        match &self.state {
            ImportState::AwaitingConfirmation(pending) => Some(pending),
            _ => None,
        }
    }

    /// Validate `doc` and wait for confirmation.
    ///
    /// A document with no valid task fails here and leaves the merger idle.
    /// Starting a new import replaces any one still awaiting confirmation.
    pub fn begin(&mut self, doc: &ImportDocument, now_ms: i64) -> Result<ImportPreview> {
        let batch = validate_tasks(&doc.tasks, now_ms);
        if batch.tasks.is_empty() {
            self.state = ImportState::Idle;
            return Err(ValidationError::NoValidTasks.into());
        }
        let preview = ImportPreview::new(doc.tasks.len(), &batch);
        info!(
            found = preview.found,
            valid = preview.valid,
            skipped = preview.skipped,
            "import awaiting confirmation"
        );
        self.state = ImportState::AwaitingConfirmation(PendingImport {
            tasks: batch.tasks,
            preview: preview.clone(),
            current_date: doc.current_date(),
            view_mode: doc.view_mode(),
        });
        Ok(preview)
    }

    /// Accept the pending import. The caller applies it and then calls
    /// [`ImportMerger::finish`].
    pub fn confirm(&mut self) -> Result<PendingImport> {
        match std::mem::replace(&mut self.state, ImportState::Applying) {
            ImportState::AwaitingConfirmation(pending) => Ok(pending),
            other => {
                self.state = other;
                Err(ValidationError::NoPendingImport.into())
            }
        }
    }

    /// Drop the pending import. Returns false if nothing was pending.
    pub fn cancel(&mut self) -> bool {
        if matches!(self.state, ImportState::AwaitingConfirmation(_)) {
            self.state = ImportState::Cancelled;
            info!("import cancelled");
            true
        } else {
            false
        }
    }

    pub fn finish(&mut self) {
        self.state = ImportState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn inverted_range_is_skipped() {
        let raw = vec![json!({"name": "Design", "startDate": "2024-03-01", "endDate": "2024-02-28"})];
        let batch = validate_tasks(&raw, 0);
        assert!(batch.tasks.is_empty());
        assert_eq!(
            batch.skipped,
            [SkippedTask {
                index: 0,
                reason: ValidationError::InvertedRange
            }]
        );
    }

    #[test]
    fn bad_entries_do_not_abort_the_batch() {
        let raw = vec![
            json!({"startDate": "2024-03-01", "endDate": "2024-03-02"}),
            json!({"name": 7, "startDate": "2024-03-01", "endDate": "2024-03-02"}),
            json!({"name": "Bad start", "startDate": "soon", "endDate": "2024-03-02"}),
            json!({"name": "Bad end", "startDate": "2024-03-01"}),
            json!({"name": "Good", "startDate": "2024年3月1日", "endDate": 1709424000000_i64, "progress": 55}),
        ];
        let batch = validate_tasks(&raw, 0);
        let reasons: Vec<_> = batch.skipped.iter().map(|s| s.reason.clone()).collect();
        assert_eq!(
            reasons,
            [
                ValidationError::MissingName,
                ValidationError::MissingName,
                ValidationError::InvalidStartDate,
                ValidationError::InvalidEndDate,
            ]
        );
        assert_eq!(batch.tasks.len(), 1);
        let good = &batch.tasks[0];
        assert_eq!((good.start, good.end), (d(2024, 3, 1), d(2024, 3, 3)));
        assert_eq!(good.progress, 55);
        assert_eq!(good.duration_days(), 3);
    }

    #[test]
    fn out_of_range_progress_becomes_zero() {
        let raw = vec![
            json!({"name": "a", "startDate": "2024-03-01", "endDate": "2024-03-01", "progress": 140}),
            json!({"name": "b", "startDate": "2024-03-01", "endDate": "2024-03-01", "progress": "50"}),
            json!({"name": "c", "startDate": "2024-03-01", "endDate": "2024-03-01", "progress": -1}),
        ];
        let batch = validate_tasks(&raw, 0);
        assert!(batch.tasks.iter().all(|t| t.progress == 0));
    }

    #[test]
    fn duplicate_ids_are_disambiguated() {
        let raw = vec![
            json!({"id": "A", "name": "one", "startDate": "2024-03-01", "endDate": "2024-03-01"}),
            json!({"id": "A", "name": "two", "startDate": "2024-03-01", "endDate": "2024-03-01"}),
            json!({"name": "three", "startDate": "2024-03-01", "endDate": "2024-03-01"}),
        ];
        let batch = validate_tasks(&raw, 1_700_000_000_000);
        let ids: Vec<_> = batch.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["A", "A-dup1", "imported-1700000000000-2"]);
    }

    #[test]
    fn blank_names_are_still_names() {
        let raw = vec![json!({"name": "   ", "startDate": "2024-03-11", "endDate": "2024-03-12"})];
        let batch = validate_tasks(&raw, 0);
        assert!(batch.skipped.is_empty());
        assert_eq!(batch.tasks.len(), 1);
        assert_eq!(batch.tasks[0].name, "   ");
    }

    #[test]
    fn skipped_tasks_do_not_reserve_ids() {
        let raw = vec![
            json!({"id": "A", "startDate": "2024-03-01", "endDate": "2024-03-01"}),
            json!({"id": "A", "name": "kept", "startDate": "2024-03-01", "endDate": "2024-03-01"}),
        ];
        let batch = validate_tasks(&raw, 0);
        assert_eq!(batch.skipped.len(), 1);
        let ids: Vec<_> = batch.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["A"]);
    }

    #[test]
    fn merge_keeps_existing_tasks() {
        let existing = Task::with_id("A", "Existing", d(2024, 1, 1), d(2024, 1, 2)).unwrap();
        let mut list = TaskList::new(vec![existing.clone()]);
        let batch = vec![
            Task::with_id("A", "Incoming", d(2024, 2, 1), d(2024, 2, 2)).unwrap(),
            Task::with_id("B", "New", d(2024, 2, 1), d(2024, 2, 2)).unwrap(),
        ];
        assert_eq!(merge_into(&mut list, batch.clone(), ImportMode::Merge), 1);
        assert_eq!(list.get("A"), Some(&existing));
        assert!(list.contains("B"));

        assert_eq!(merge_into(&mut list, batch.clone(), ImportMode::Replace), 2);
        assert_eq!(list.tasks(), batch.as_slice());
    }

    #[test]
    fn session_walks_through_states() {
        let tasks: Vec<Value> = (0..8)
            .map(|i| json!({"name": format!("t{i}"), "startDate": "2024-03-01", "endDate": "2024-03-02"}))
            .collect();
        let doc = ImportDocument {
            tasks,
            current_date: Some(json!("2024-03-05")),
            view_mode: Some(json!("month")),
        };
        let mut merger = ImportMerger::new();
        assert!(merger.confirm().is_err());

        let preview = merger.begin(&doc, 0).unwrap();
        assert_eq!(preview.sample.len(), 5);
        assert_eq!(preview.remaining, 3);

        let pending = merger.confirm().unwrap();
        assert_eq!(merger.state(), &ImportState::Applying);
        assert_eq!(pending.tasks.len(), 8);
        assert_eq!(pending.view_mode, Some(ViewMode::Month));
        assert_eq!(pending.current_date, Some(d(2024, 3, 5)));
        merger.finish();

        merger.begin(&doc, 0).unwrap();
        assert!(merger.cancel());
        assert_eq!(merger.state(), &ImportState::Cancelled);
        assert!(!merger.cancel());
    }

    #[test]
    fn empty_batch_fails_begin() {
        let doc = ImportDocument {
            tasks: vec![json!({"name": "Design", "startDate": "2024-03-01", "endDate": "2024-02-28"})],
            ..ImportDocument::default()
        };
        let mut merger = ImportMerger::new();
        let err = merger.begin(&doc, 0).unwrap_err();
        assert_eq!(err.user_message(), "No valid tasks to import");
        assert_eq!(merger.state(), &ImportState::Idle);
    }
}
