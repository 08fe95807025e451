//! Task persistence.
//!
//! A store is a single logical table of task records keyed by id. Every
//! operation is one transaction: it either fully applies or fails with a
//! storage error, and nothing is retried here.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{GanttError, Result};
use crate::model::{Task, TaskRecord};

const TABLE_FILE: &str = "tasks.json";
const MIRROR_FILE: &str = "tasks.cache.json";

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Task>>;

    /// Insert a new task. An empty id is replaced by the next auto key.
    /// Returns the stored id.
    async fn add(&self, task: &Task) -> Result<String>;

    /// Insert or overwrite the task with the same id.
    async fn update(&self, task: &Task) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Clear the table and insert every task, in one transaction.
    async fn save_all(&self, tasks: &[Task]) -> Result<()>;

    /// Short name for logs and notifications.
    fn describe(&self) -> String;
}

/// On-disk table: every record plus the next auto key.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Table {
    next_key: u64,
    /// Kept as raw values so that one damaged record does not fail the load.
    records: Vec<serde_json::Value>,
}

impl Table {
    fn position(&self, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.get("id").and_then(|v| v.as_str()) == Some(id))
    }

    fn tasks(&self) -> Vec<Task> {
        let mut tasks = Vec::with_capacity(self.records.len());
        for (index, raw) in self.records.iter().enumerate() {
            let task = serde_json::from_value::<TaskRecord>(raw.clone())
                .ok()
                .and_then(|record| record.to_task());
            match task {
                Some(task) => tasks.push(task),
                None => warn!(index, "skipping malformed task record"),
            }
        }
        tasks
    }

    fn assign_key(&mut self, task: &Task) -> String {
        if !task.id.is_empty() {
            return task.id.clone();
        }
        self.next_key += 1;
        self.next_key.to_string()
    }
}

fn record_value(task: &Task, id: &str) -> Result<serde_json::Value> {
    let mut record = task.to_record();
    record.id = Some(id.to_string());
    serde_json::to_value(record).map_err(|err| GanttError::storage("save", err))
}

/// Tasks stored as JSON files in one directory.
///
/// `tasks.json` is the table; `tasks.cache.json` mirrors it as a flat record
/// list after every successful transaction.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    /// Serializes transactions.
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (creating if needed) the store in `dir`.
    #[tracing::instrument]
    pub async fn open(dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|err| GanttError::storage("open", err))?;
        let store = Self {
            dir: dir.to_path_buf(),
            lock: Mutex::new(()),
        };
        // Refuse to start on a table we cannot read.
        let table = store.read_table("open").await?;
        info!(dir = %dir.display(), records = table.records.len(), "opened task store");
        Ok(store)
    }

    pub fn table_path(&self) -> PathBuf {
        self.dir.join(TABLE_FILE)
    }

    pub fn mirror_path(&self) -> PathBuf {
        self.dir.join(MIRROR_FILE)
    }

    async fn read_table(&self, operation: &'static str) -> Result<Table> {
        let path = self.table_path();
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|err| GanttError::storage(operation, format!("{}: {err}", path.display()))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Table::default()),
            Err(err) => Err(GanttError::storage(operation, err)),
        }
    }

    async fn commit(&self, operation: &'static str, table: &Table) -> Result<()> {
        let table_json =
            serde_json::to_vec_pretty(table).map_err(|err| GanttError::storage(operation, err))?;
        write_atomic(self.table_path(), table_json)
            .await
            .map_err(|err| GanttError::storage(operation, err))?;

        let mirror: Vec<TaskRecord> = table
            .tasks()
            .iter()
            .map(Task::to_record)
            .collect();
        // The mirror is a cache; losing it only costs a warning.
        let refreshed = match serde_json::to_vec_pretty(&mirror) {
            Ok(json) => write_atomic(self.mirror_path(), json).await,
            Err(err) => Err(err.into()),
        };
        if let Err(err) = refreshed {
            warn!(error = %err, "could not refresh task mirror");
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for JsonFileStore {
    #[tracing::instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<Task>> {
        let _guard = self.lock.lock().await;
        let tasks = self.read_table("load").await?.tasks();
        debug!(count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    #[tracing::instrument(skip(self, task), fields(id = %task.id))]
    async fn add(&self, task: &Task) -> Result<String> {
        let _guard = self.lock.lock().await;
        let mut table = self.read_table("add").await?;
        let id = table.assign_key(task);
        if table.position(&id).is_some() {
            return Err(GanttError::storage("add", format!("duplicate key {id}")));
        }
        table.records.push(record_value(task, &id)?);
        self.commit("add", &table).await?;
        debug!(%id, "added task");
        Ok(id)
    }

    #[tracing::instrument(skip(self, task), fields(id = %task.id))]
    async fn update(&self, task: &Task) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut table = self.read_table("update").await?;
        let value = record_value(task, &task.id)?;
        match table.position(&task.id) {
            Some(idx) => table.records[idx] = value,
            None => table.records.push(value),
        }
        self.commit("update", &table).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut table = self.read_table("delete").await?;
        if let Some(idx) = table.position(id) {
            table.records.remove(idx);
            self.commit("delete", &table).await?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, tasks), fields(count = tasks.len()))]
    async fn save_all(&self, tasks: &[Task]) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut table = self.read_table("save").await?;
        table.records.clear();
        for task in tasks {
            let id = table.assign_key(task);
            if table.position(&id).is_some() {
                return Err(GanttError::storage("save", format!("duplicate key {id}")));
            }
            table.records.push(record_value(task, &id)?);
        }
        self.commit("save", &table).await?;
        info!(count = tasks.len(), "saved all tasks");
        Ok(())
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Write `value` as pretty JSON via a temp file in the same directory.
/// Replace `path` with `bytes` through a temp file in the same directory.
/// The blocking file work runs off the async runtime.
async fn write_atomic(path: PathBuf, bytes: Vec<u8>) -> std::io::Result<()> {
    tokio::task::spawn_blocking(move || {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&bytes)?;
        temp.flush()?;
        temp.persist(&path).map_err(|err| err.error)?;
        Ok(())
    })
    .await
    .map_err(std::io::Error::other)?
}

/// In-memory store. Used by tests and when the file store cannot be opened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<(Vec<Task>, u64)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            state: Mutex::new((tasks, 0)),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<Task>> {
        let state = self.state.lock().await;
        Ok(state.0.iter().cloned().map(unselected).collect())
    }

    async fn add(&self, task: &Task) -> Result<String> {
        let mut state = self.state.lock().await;
        let (tasks, next_key) = &mut *state;
        let id = if task.id.is_empty() {
            *next_key += 1;
            next_key.to_string()
        } else {
            task.id.clone()
        };
        if tasks.iter().any(|t| t.id == id) {
            return Err(GanttError::storage("add", format!("duplicate key {id}")));
        }
        tasks.push(Task {
            id: id.clone(),
            ..unselected(task.clone())
        });
        Ok(id)
    }

    async fn update(&self, task: &Task) -> Result<()> {
        let mut state = self.state.lock().await;
        let stored = unselected(task.clone());
        match state.0.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = stored,
            None => state.0.push(stored),
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.state.lock().await.0.retain(|t| t.id != id);
        Ok(())
    }

    async fn save_all(&self, tasks: &[Task]) -> Result<()> {
        let mut state = self.state.lock().await;
        state.0 = tasks.iter().cloned().map(unselected).collect();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Selection is view state and never persisted.
fn unselected(mut task: Task) -> Task {
    task.selected = false;
    task
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn task(id: &str, name: &str) -> Task {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        Task::with_id(id, name, d, d).unwrap()
    }

    #[tokio::test]
    async fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        assert_eq!(store.add(&task("a", "Design")).await.unwrap(), "a");
        let auto = store.add(&task("", "Build")).await.unwrap();
        assert_eq!(auto, "1");

        let mut edited = task("a", "Design v2").with_progress(30);
        edited.selected = true;
        store.update(&edited).await.unwrap();
        store.delete(&auto).await.unwrap();

        let reopened = JsonFileStore::open(dir.path()).await.unwrap();
        let tasks = reopened.get_all().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Design v2");
        assert_eq!(tasks[0].progress, 30);
        assert!(!tasks[0].selected);
    }

    #[tokio::test]
    async fn duplicate_add_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.add(&task("a", "One")).await.unwrap();
        let err = store.add(&task("a", "Two")).await.unwrap_err();
        assert!(matches!(err, GanttError::Storage { operation: "add", .. }));
    }

    #[tokio::test]
    async fn save_all_replaces_and_mirrors() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.add(&task("old", "Old")).await.unwrap();
        store
            .save_all(&[task("x", "X"), task("y", "Y")])
            .await
            .unwrap();

        let ids: Vec<_> = store.get_all().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["x", "y"]);

        let mirror: Vec<TaskRecord> =
            serde_json::from_str(&std::fs::read_to_string(store.mirror_path()).unwrap()).unwrap();
        assert_eq!(mirror.len(), 2);
        assert_eq!(mirror[1].name.as_deref(), Some("Y"));
    }

    #[tokio::test]
    async fn commits_leave_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        for i in 0..5 {
            store.add(&task(&format!("t{i}"), "Task")).await.unwrap();
        }
        store.delete("t0").await.unwrap();

        let mut names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, [MIRROR_FILE, TABLE_FILE]);
        assert_eq!(store.get_all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn malformed_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(TABLE_FILE),
            r#"{"nextKey":0,"records":[
                {"id":"ok","name":"Fine","startDate":1709251200000,"endDate":1709251200000},
                {"id":"bad","name":"No dates"},
                {"id":"worse","startDate":"yesterday"}
            ]}"#,
        )
        .unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let tasks = store.get_all().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "ok");
    }

    #[tokio::test]
    async fn unreadable_table_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TABLE_FILE), "not json").unwrap();
        let err = JsonFileStore::open(dir.path()).await.unwrap_err();
        assert!(matches!(err, GanttError::Storage { operation: "open", .. }));
    }

    #[tokio::test]
    async fn memory_store_assigns_keys() {
        let store = MemoryStore::new();
        assert_eq!(store.add(&task("", "A")).await.unwrap(), "1");
        assert_eq!(store.add(&task("", "B")).await.unwrap(), "2");
        assert!(store.add(&task("1", "C")).await.is_err());
        store.delete("1").await.unwrap();
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }
}
