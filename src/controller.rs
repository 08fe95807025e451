//! Wires user actions to the task list, the store and the renderer.
//!
//! The controller is toolkit-free: it talks to the UI through a
//! [`ViewBinding`] and draws into a [`LayerCompositor`] that the host
//! presents on its own canvas. Every public operation notifies the user as a
//! side effect and also returns a machine-readable result.
//!
//! State only changes after the store accepted the matching write, so the
//! in-memory list and its persisted checkpoint never drift apart.

use std::path::Path;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::{debug, error, info, warn};

use crate::binding::{ClickModifiers, Notification, ViewBinding};
use crate::config::Settings;
use crate::error::{Control, GanttError, Result, ValidationError};
use crate::io::exchange::{ExportDocument, ImportDocument};
use crate::io::import::{merge_into, ImportMerger, ImportMode, ImportPreview, PendingImport, MAX_IMPORT_TASKS};
use crate::io::store::TaskStore;
use crate::model::date_range::parse_date;
use crate::model::{ChartMetrics, DateInput, Task, TaskList, ViewMode, ViewState};
use crate::render::canvas::{Canvas, Point, TextMeasure};
use crate::render::layers::LayerCompositor;
use crate::render::scheduler::RenderScheduler;
use crate::render::timeline::{TimelineGeometry, TimelineRenderer};

/// Which task the form is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { task_id: String },
}

/// The add/edit task form.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub mode: FormMode,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub progress: u8,
}

impl TaskForm {
    fn create(today: NaiveDate) -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            start: today,
            end: today.checked_add_days(Days::new(7)).unwrap_or(today),
            progress: 0,
        }
    }

    fn edit(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit {
                task_id: task.id.clone(),
            },
            name: task.name.clone(),
            start: task.start,
            end: task.end,
            progress: task.progress,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }
}

/// What a canvas click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Selected alone, form left closed (Shift).
    Selected(String),
    /// Selected alone and opened in the edit form.
    Editing(String),
    /// Added to or removed from the selection (Ctrl/Cmd).
    Toggled(String),
    /// Empty space: selection cleared.
    Cleared,
    /// Empty space with Ctrl/Cmd held.
    Ignored,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub struct GanttController<B: ViewBinding> {
    binding: B,
    store: Box<dyn TaskStore>,
    settings: Settings,
    tasks: TaskList,
    view: ViewState,
    renderer: TimelineRenderer,
    compositor: LayerCompositor,
    scheduler: RenderScheduler,
    importer: ImportMerger,
    form: Option<TaskForm>,
}

impl<B: ViewBinding> GanttController<B> {
    /// Wire the chart to `binding`. Fails without side effects when a
    /// required control is missing.
    pub fn new(
        binding: B,
        store: Box<dyn TaskStore>,
        settings: Settings,
        measure: Arc<dyn TextMeasure>,
        current_date: NaiveDate,
    ) -> Result<Self> {
        let missing: Vec<Control> = Control::REQUIRED
            .iter()
            .copied()
            .filter(|c| !binding.has_control(*c))
            .collect();
        if !missing.is_empty() {
            let err = GanttError::Binding { missing };
            error!(error = %err, "cannot initialize chart");
            return Err(err);
        }

        let width = binding.container_width();
        let view = ViewState::new(
            current_date,
            ViewMode::Week,
            ChartMetrics::for_width(width, &settings),
        );
        let mut controller = Self {
            binding,
            store,
            settings,
            tasks: TaskList::new(Vec::new()),
            view,
            renderer: TimelineRenderer::new(width),
            compositor: LayerCompositor::new(measure),
            scheduler: RenderScheduler::new(),
            importer: ImportMerger::new(),
            form: None,
        };
        controller.relayout();
        controller.sync_toolbar();
        controller.render(true);
        info!(store = %controller.store.describe(), "chart initialized");
        Ok(controller)
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut B {
        &mut self.binding
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn compositor(&self) -> &LayerCompositor {
        &self.compositor
    }

    pub fn geometry(&self) -> Option<&TimelineGeometry> {
        self.renderer.geometry()
    }

    pub fn form(&self) -> Option<&TaskForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        self.form.as_mut()
    }

    pub fn pending_import(&self) -> Option<&PendingImport> {
        self.importer.pending()
    }

    // ── Loading ──────────────────────────────────────────────────────────

    /// Load every stored task. On failure the chart starts empty.
    pub async fn load(&mut self) -> Result<usize> {
        match self.store.get_all().await {
            Ok(tasks) => {
                let count = tasks.len();
                self.tasks.set_all(tasks);
                self.relayout();
                self.render(true);
                info!(count, "loaded tasks");
                Ok(count)
            }
            Err(err) => {
                self.tasks.set_all(Vec::new());
                self.render(true);
                Err(self.fail(err))
            }
        }
    }

    // ── Task operations ──────────────────────────────────────────────────

    pub async fn add_task<'a>(
        &mut self,
        name: &str,
        start: impl Into<DateInput<'a>>,
        end: impl Into<DateInput<'a>>,
    ) -> Result<String> {
        match self.try_add_task(name, start.into(), end.into()).await {
            Ok(id) => {
                self.notify(Notification::success(format!("Task \"{}\" added", name.trim())));
                Ok(id)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    async fn try_add_task(
        &mut self,
        name: &str,
        start: DateInput<'_>,
        end: DateInput<'_>,
    ) -> Result<String> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        let task = Task::new(name.trim(), start, end)?;
        let id = self.store.add(&task).await?;
        debug!(%id, name = %task.name, "task added");
        self.tasks.push(Task {
            id: id.clone(),
            ..task
        });
        self.relayout();
        self.render(true);
        Ok(id)
    }

    /// Overwrite the task with `task.id`. Selection is kept.
    pub async fn edit_task(&mut self, task: Task) -> Result<()> {
        match self.try_edit_task(task).await {
            Ok(()) => {
                self.notify(Notification::success("Task updated"));
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    async fn try_edit_task(&mut self, task: Task) -> Result<()> {
        let selected = self
            .tasks
            .get(&task.id)
            .map(|t| t.selected)
            .ok_or_else(|| ValidationError::UnknownTask(task.id.clone()))?;
        let edited = Task::with_id(task.id, task.name.trim(), task.start, task.end)?
            .with_progress(task.progress);
        let edited = Task { selected, ..edited };
        self.store.update(&edited).await?;
        debug!(id = %edited.id, "task updated");
        self.tasks.replace(edited);
        self.relayout();
        self.render(true);
        Ok(())
    }

    /// Delete every selected task. Returns how many went.
    pub async fn delete_selected(&mut self) -> Result<usize> {
        match self.try_delete_selected().await {
            Ok(count) => {
                self.notify(Notification::success(format!("Deleted {count} task(s)")));
                Ok(count)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    async fn try_delete_selected(&mut self) -> Result<usize> {
        if self.tasks.selected().next().is_none() {
            return Err(ValidationError::NothingSelected.into());
        }
        let remaining: Vec<Task> = self
            .tasks
            .tasks()
            .iter()
            .filter(|t| !t.selected)
            .cloned()
            .collect();
        self.store.save_all(&remaining).await?;
        let count = self.tasks.remove_selected();
        info!(count, "deleted selected tasks");
        self.relayout();
        self.render(true);
        Ok(count)
    }

    pub async fn delete_task(&mut self, id: &str) -> Result<()> {
        match self.try_delete_task(id).await {
            Ok(()) => {
                self.notify(Notification::success("Task deleted"));
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    async fn try_delete_task(&mut self, id: &str) -> Result<()> {
        if !self.tasks.contains(id) {
            return Err(ValidationError::UnknownTask(id.to_string()).into());
        }
        self.store.delete(id).await?;
        self.tasks.remove(id);
        self.relayout();
        self.render(true);
        Ok(())
    }

    /// Select `id` alone (task table row click).
    pub fn select_task(&mut self, id: &str) {
        if self.tasks.contains(id) {
            self.tasks.select_only(id);
            self.render(false);
        }
    }

    // ── Task form ────────────────────────────────────────────────────────

    pub fn open_create_form(&mut self) {
        self.form = Some(TaskForm::create(today()));
    }

    pub fn open_edit_form(&mut self, id: &str) -> Result<()> {
        let task = self
            .tasks
            .get(id)
            .ok_or_else(|| ValidationError::UnknownTask(id.to_string()))?;
        self.form = Some(TaskForm::edit(task));
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Create or update from the open form. The form stays open on failure.
    pub async fn submit_form(&mut self) -> Result<()> {
        let Some(form) = self.form.clone() else {
            return Ok(());
        };
        match form.mode {
            FormMode::Create => {
                self.add_task(&form.name, form.start, form.end).await?;
            }
            FormMode::Edit { task_id } => {
                let task = Task {
                    id: task_id,
                    name: form.name,
                    start: form.start,
                    end: form.end,
                    progress: form.progress,
                    selected: false,
                };
                self.edit_task(task).await?;
            }
        }
        self.form = None;
        Ok(())
    }

    /// Delete the task open in the edit form.
    pub async fn delete_form_task(&mut self) -> Result<()> {
        let Some(TaskForm {
            mode: FormMode::Edit { task_id },
            ..
        }) = self.form.clone()
        else {
            return Ok(());
        };
        self.delete_task(&task_id).await?;
        self.form = None;
        Ok(())
    }

    // ── Import / export ──────────────────────────────────────────────────

    /// Parse and validate an import file, then wait for confirmation.
    pub fn import_json(&mut self, text: &str) -> Result<ImportPreview> {
        match ImportDocument::from_json(text) {
            Ok(doc) => self.begin_import(&doc),
            Err(err) => Err(self.fail_import(err)),
        }
    }

    /// Validate `doc` and wait for confirmation.
    pub fn begin_import(&mut self, doc: &ImportDocument) -> Result<ImportPreview> {
        if doc.tasks.len() > MAX_IMPORT_TASKS {
            self.importer.finish();
            let err = ValidationError::TooManyTasks {
                count: doc.tasks.len(),
                max: MAX_IMPORT_TASKS,
            };
            return Err(self.fail_import(err.into()));
        }
        let now_ms = chrono::Utc::now().timestamp_millis();
        self.importer
            .begin(doc, now_ms)
            .map_err(|err| self.fail_import(err))
    }

    /// Apply the pending import. Nothing is committed unless the store
    /// accepted the whole resulting list.
    pub async fn confirm_import(&mut self, mode: ImportMode) -> Result<bool> {
        let pending = match self.importer.confirm() {
            Ok(pending) => pending,
            Err(err) => return Err(self.fail_import(err)),
        };

        let mut next = self.tasks.clone();
        let added = merge_into(&mut next, pending.tasks, mode);
        if let Err(err) = self.store.save_all(next.tasks()).await {
            self.importer.finish();
            return Err(self.fail_import(err));
        }
        self.tasks = next;

        if let Some(view_mode) = pending.view_mode {
            self.view.set_view_mode(view_mode);
        }
        if let Some(date) = pending.current_date {
            if !self.view.set_current_date(date) {
                warn!(%date, "imported date cannot be shown, keeping the current view");
            }
        }
        self.importer.finish();
        self.sync_toolbar();
        self.relayout();
        self.render(true);

        info!(?mode, added, total = self.tasks.len(), "import applied");
        let message = match mode {
            ImportMode::Replace => format!("Imported {added} task(s)"),
            ImportMode::Merge => format!("Added {added} new task(s)"),
        };
        self.notify(Notification::success(message));
        Ok(true)
    }

    pub fn cancel_import(&mut self) -> bool {
        let cancelled = self.importer.cancel();
        if cancelled {
            self.importer.finish();
            self.notify(Notification::info("Import cancelled"));
        }
        cancelled
    }

    /// Validate and apply `doc` in one go. `None` stands for the user
    /// declining the prompt. Returns whether the import was applied.
    pub async fn import_data(
        &mut self,
        doc: &ImportDocument,
        decision: Option<ImportMode>,
    ) -> Result<bool> {
        self.begin_import(doc)?;
        match decision {
            Some(mode) => self.confirm_import(mode).await,
            None => {
                self.cancel_import();
                Ok(false)
            }
        }
    }

    /// Every task plus the view, as the exchange document.
    pub fn export_data(&self) -> ExportDocument {
        ExportDocument::new(self.tasks.tasks(), &self.view)
    }

    pub async fn export_to(&mut self, path: &Path) -> Result<()> {
        let result = match self.export_data().to_json() {
            Ok(json) => tokio::fs::write(path, json)
                .await
                .map_err(|err| GanttError::storage("export", err)),
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => {
                info!(path = %path.display(), count = self.tasks.len(), "exported tasks");
                self.notify(Notification::success(format!(
                    "Exported {} task(s)",
                    self.tasks.len()
                )));
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    // ── Navigation ───────────────────────────────────────────────────────

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view.set_view_mode(mode);
        debug!(mode = mode.as_str(), date = %self.view.current_date, "view mode");
        self.view_changed();
    }

    /// Move by `delta` weeks or months.
    pub fn navigate(&mut self, delta: i32) {
        self.view.navigate(delta);
        debug!(delta, date = %self.view.current_date, "navigated");
        self.view_changed();
    }

    pub fn jump_to_today(&mut self) {
        self.jump_to(today());
    }

    pub fn jump_to(&mut self, date: NaiveDate) {
        self.view.jump_to(date);
        self.view_changed();
    }

    fn view_changed(&mut self) {
        self.sync_toolbar();
        self.relayout();
        self.render(true);
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// Ask for a draw on the next frame. Requests within one frame coalesce.
    pub fn render(&mut self, full_redraw: bool) {
        self.scheduler.request(full_redraw);
    }

    pub fn render_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Run the pending draw, if any. Called once per frame by the host.
    /// Returns how many layers were composited.
    pub fn draw_frame(&mut self) -> Option<usize> {
        let request = self.scheduler.take()?;
        Some(
            self.renderer
                .draw(&self.view, &self.tasks, &mut self.compositor, request.full_redraw),
        )
    }

    /// Paint the composited chart onto `target`.
    pub fn present(&self, target: &mut dyn Canvas) {
        self.compositor.present(target);
    }

    /// Re-read the container width and lay the chart out again.
    pub fn resize(&mut self) {
        let width = self.binding.container_width();
        self.view
            .set_metrics(ChartMetrics::for_width(width, &self.settings));
        self.renderer.set_container_width(width);
        self.relayout();
        self.render(true);
    }

    /// Select or edit whatever was clicked.
    pub fn click(&mut self, point: Point, modifiers: ClickModifiers) -> ClickOutcome {
        let outcome = match self.renderer.hit_test(&self.view, &self.tasks, point) {
            Some(id) if modifiers.toggle => {
                self.tasks.toggle_selected(&id);
                ClickOutcome::Toggled(id)
            }
            Some(id) => {
                self.tasks.select_only(&id);
                if modifiers.shift {
                    ClickOutcome::Selected(id)
                } else {
                    if let Some(task) = self.tasks.get(&id) {
                        self.form = Some(TaskForm::edit(task));
                    }
                    ClickOutcome::Editing(id)
                }
            }
            None if modifiers.toggle => ClickOutcome::Ignored,
            None => {
                self.tasks.clear_selection();
                ClickOutcome::Cleared
            }
        };
        debug!(?outcome, x = point.x, y = point.y, "canvas click");
        self.render(false);
        outcome
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn relayout(&mut self) {
        let col_width = self.renderer.layout(&self.view, &self.tasks).col_width;
        self.view.set_col_width(col_width);
    }

    fn sync_toolbar(&mut self) {
        let label = self.view.range_label();
        self.binding.set_range_label(&label);
        self.binding.set_active_view(self.view.view_mode);
    }

    fn notify(&mut self, notification: Notification) {
        self.binding.notify(notification);
    }

    fn fail(&mut self, err: GanttError) -> GanttError {
        warn!(error = %err, "operation failed");
        self.binding.notify(Notification::error(err.user_message()));
        err
    }

    fn fail_import(&mut self, err: GanttError) -> GanttError {
        warn!(error = %err, "import failed");
        self.binding.notify(Notification::error(format!(
            "Import failed: {}",
            err.user_message()
        )));
        err
    }
}
