use std::collections::HashSet;

use crate::model::date_range::DateRange;
use crate::model::task::Task;

/// The in-memory task list, owned by the controller.
///
/// Every content mutation bumps `version`; selection changes bump
/// `selection_version` only. Render layers compare these against the stamp
/// they were drawn from.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    version: u64,
    selection_version: u64,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            version: 1,
            selection_version: 1,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selection_version(&self) -> u64 {
        self.selection_version
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> HashSet<&str> {
        self.tasks.iter().map(|t| t.id.as_str()).collect()
    }

    /// Tasks overlapping `window`, in list order.
    pub fn visible_in(&self, window: &DateRange) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| window.overlaps(t.start, t.end))
            .collect()
    }

    pub fn selected(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.selected)
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
        self.mark_changed();
    }

    /// Replace the task with the same id. Returns false when no such task exists.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                self.mark_changed();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        let task = self.tasks.remove(idx);
        self.mark_changed();
        if task.selected {
            self.selection_version += 1;
        }
        Some(task)
    }

    /// Remove every selected task, returning how many went.
    pub fn remove_selected(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.selected);
        let removed = before - self.tasks.len();
        if removed > 0 {
            self.mark_changed();
            self.selection_version += 1;
        }
        removed
    }

    /// Swap in a whole new list (import replace, initial load).
    pub fn set_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.mark_changed();
        self.selection_version += 1;
    }

    /// Append tasks (import merge).
    pub fn extend(&mut self, tasks: impl IntoIterator<Item = Task>) {
        let before = self.tasks.len();
        self.tasks.extend(tasks);
        if self.tasks.len() != before {
            self.mark_changed();
        }
    }

    /// Select exactly `id`, clearing every other selection.
    pub fn select_only(&mut self, id: &str) {
        for task in &mut self.tasks {
            task.selected = task.id == id;
        }
        self.selection_version += 1;
    }

    pub fn toggle_selected(&mut self, id: &str) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.selected = !task.selected;
            self.selection_version += 1;
        }
    }

    pub fn clear_selection(&mut self) {
        let mut changed = false;
        for task in self.tasks.iter_mut().filter(|t| t.selected) {
            task.selected = false;
            changed = true;
        }
        if changed {
            self.selection_version += 1;
        }
    }

    fn mark_changed(&mut self) {
        self.version += 1;
    }
}
