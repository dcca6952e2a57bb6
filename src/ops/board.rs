use chrono::NaiveDate;

use crate::io::store::{EntityStore, StoreError};
use crate::model::config::ArchivePolicy;
use crate::model::label::{Label, LabelColor};
use crate::model::task::{
    ColumnId, NewTask, Subtask, SubtaskDraft, Task, TaskPatch, dedup_labels,
};
use crate::ops::filter::{FilterSpec, filter_refs};
use crate::ops::labels;
use crate::ops::lifecycle::{LifecycleError, Transition};
use crate::ops::order::order_refs;
use crate::ops::selection::Selection;

/// Error type for board operations
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Store(StoreError),
}

impl BoardError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        BoardError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for BoardError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { kind, id } => BoardError::NotFound { kind, id },
            other => BoardError::Store(other),
        }
    }
}

/// Trimmed `value`, or a validation error naming `field` when it is blank
pub fn non_blank(field: &str, value: &str) -> Result<String, BoardError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// One id a bulk operation could not apply
#[derive(Debug)]
pub struct BulkFailure {
    pub id: String,
    pub error: BoardError,
}

/// Result of a bulk operation. Every selected id lands in exactly one list.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub applied: Vec<String>,
    pub failures: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A working session over one store: the latest task and label snapshot plus
/// the current selection.
///
/// Writes go to the store first for creates and deletes. Updates are applied
/// to the snapshot before the store call and reverted if it fails.
pub struct Board<S: EntityStore> {
    store: S,
    tasks: Vec<Task>,
    labels: Vec<Label>,
    selection: Selection,
}

impl<S: EntityStore> Board<S> {
    /// Load the snapshot from `store`. Selected ids that no longer exist are
    /// dropped.
    pub fn load(store: S, selection: Selection) -> Result<Self, BoardError> {
        let mut board = Board {
            store,
            tasks: Vec::new(),
            labels: Vec::new(),
            selection,
        };
        board.refresh()?;
        Ok(board)
    }

    /// Re-read tasks and labels from the store
    pub fn refresh(&mut self) -> Result<(), BoardError> {
        self.tasks = self.store.list_tasks().inspect_err(|e| {
            tracing::warn!(error = %e, "could not list tasks");
        })?;
        self.labels = self.store.list_labels().inspect_err(|e| {
            tracing::warn!(error = %e, "could not list labels");
        })?;
        let tasks = &self.tasks;
        let dropped = self
            .selection
            .retain_known(|id| tasks.iter().any(|t| t.id == id));
        if dropped > 0 {
            tracing::debug!(dropped, "pruned stale ids from selection");
        }
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn index_of(&self, id: &str) -> Result<usize, BoardError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| BoardError::not_found("task", id))
    }

    /// Tasks of one column that pass `spec`, in board order
    pub fn column_view(&self, column: ColumnId, spec: &FilterSpec, today: NaiveDate) -> Vec<&Task> {
        let mut view = filter_refs(self.tasks.iter().filter(|t| t.column == column), spec);
        order_refs(&mut view, today);
        view
    }

    // -----------------------------------------------------------------------
    // Task CRUD
    // -----------------------------------------------------------------------

    pub fn create_task(&mut self, mut new: NewTask) -> Result<Task, BoardError> {
        new.title = non_blank("title", &new.title)?;
        new.description = new.description.filter(|d| !d.trim().is_empty());
        if let Some(column) = new.column
            && !column.is_move_target()
        {
            return Err(BoardError::Validation(
                "new tasks cannot start in the archive".to_string(),
            ));
        }
        for sub in &mut new.subtasks {
            sub.text = non_blank("subtask text", &sub.text)?;
        }

        let task = self.store.create_task(new).inspect_err(|e| {
            tracing::warn!(error = %e, "could not create task");
        })?;
        tracing::debug!(task = %task.id, column = %task.column, "task created");
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Edit a task's fields. Columns change only through [`Board::apply`].
    pub fn update_task(&mut self, id: &str, mut patch: TaskPatch) -> Result<Task, BoardError> {
        if patch.column.is_some() {
            return Err(BoardError::Validation(
                "column changes go through move, archive or restore".to_string(),
            ));
        }
        if let Some(title) = &patch.title {
            patch.title = Some(non_blank("title", title)?);
        }
        if let Some(subtasks) = &mut patch.subtasks {
            for sub in subtasks.iter_mut() {
                sub.text = non_blank("subtask text", &sub.text)?;
            }
        }
        self.write_patch(id, patch)
    }

    /// Apply `patch` locally, then to the store. The local copy is restored
    /// if the store rejects the update.
    fn write_patch(&mut self, id: &str, patch: TaskPatch) -> Result<Task, BoardError> {
        let index = self.index_of(id)?;

        let previous = self.tasks[index].clone();
        apply_patch(&mut self.tasks[index], &patch);

        match self.store.update_task(id, patch) {
            Ok(saved) => {
                self.tasks[index] = saved.clone();
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(task = %id, error = %e, "update failed, reverting");
                self.tasks[index] = previous;
                Err(e.into())
            }
        }
    }

    fn remove_task(&mut self, id: &str) -> Result<(), BoardError> {
        self.store.delete_task(id).inspect_err(|e| {
            tracing::warn!(task = %id, error = %e, "could not delete task");
        })?;
        self.tasks.retain(|t| t.id != id);
        self.selection.forget(id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Check `transition` against the task's current column and apply it.
    /// Returns the updated task, or `None` after a delete.
    pub fn apply(
        &mut self,
        id: &str,
        transition: Transition,
        policy: ArchivePolicy,
    ) -> Result<Option<Task>, BoardError> {
        let from = self
            .task(id)
            .ok_or_else(|| BoardError::not_found("task", id))?
            .column;
        transition.check(from, policy)?;

        let Some(target) = transition.target() else {
            self.remove_task(id)?;
            tracing::debug!(task = %id, "task deleted");
            return Ok(None);
        };

        let task = self.write_patch(id, TaskPatch::column(target))?;
        if transition == Transition::Archive {
            self.selection.forget(id);
        }
        tracing::debug!(task = %id, %from, to = %target, "transition applied");
        Ok(Some(task))
    }

    pub fn move_task(&mut self, id: &str, to: ColumnId) -> Result<Task, BoardError> {
        self.apply_to_task(id, Transition::Move(to), ArchivePolicy::CompleteOnly)
    }

    /// Archive one card. Only completed tasks may be archived this way.
    pub fn archive_task(&mut self, id: &str) -> Result<Task, BoardError> {
        self.apply_to_task(id, Transition::Archive, ArchivePolicy::CompleteOnly)
    }

    pub fn restore_task(&mut self, id: &str) -> Result<Task, BoardError> {
        self.apply_to_task(id, Transition::Restore, ArchivePolicy::CompleteOnly)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<(), BoardError> {
        self.apply(id, Transition::Delete, ArchivePolicy::CompleteOnly)?;
        Ok(())
    }

    fn apply_to_task(
        &mut self,
        id: &str,
        transition: Transition,
        policy: ArchivePolicy,
    ) -> Result<Task, BoardError> {
        self.apply(id, transition, policy)?
            .ok_or_else(|| BoardError::not_found("task", id))
    }

    // -----------------------------------------------------------------------
    // Bulk operations
    // -----------------------------------------------------------------------

    /// Apply `transition` to every selected id in selection order. A failure
    /// on one id does not stop the rest. The selection is cleared afterwards.
    pub fn bulk_apply(&mut self, transition: Transition, policy: ArchivePolicy) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for id in self.selection.ids() {
            match self.apply(&id, transition, policy) {
                Ok(_) => outcome.applied.push(id),
                Err(error) => {
                    tracing::warn!(task = %id, error = %error, "bulk {} failed", transition);
                    outcome.failures.push(BulkFailure { id, error });
                }
            }
        }
        self.selection.clear();
        tracing::debug!(
            applied = outcome.applied.len(),
            failed = outcome.failures.len(),
            "bulk {} finished",
            transition
        );
        outcome
    }

    pub fn bulk_move(&mut self, to: ColumnId) -> BulkOutcome {
        self.bulk_apply(Transition::Move(to), ArchivePolicy::CompleteOnly)
    }

    pub fn bulk_archive(&mut self, policy: ArchivePolicy) -> BulkOutcome {
        self.bulk_apply(Transition::Archive, policy)
    }

    pub fn bulk_delete(&mut self) -> BulkOutcome {
        self.bulk_apply(Transition::Delete, ArchivePolicy::CompleteOnly)
    }

    // -----------------------------------------------------------------------
    // Subtasks (stored as part of the task, replaced wholesale)
    // -----------------------------------------------------------------------

    pub fn add_subtask(&mut self, task_id: &str, text: &str) -> Result<Task, BoardError> {
        let text = non_blank("subtask text", text)?;
        let mut drafts = self.subtask_drafts(task_id)?;
        drafts.push(SubtaskDraft {
            text,
            completed: false,
        });
        self.replace_subtasks(task_id, drafts)
    }

    /// Flip the subtask at `index` (0-based)
    pub fn toggle_subtask(&mut self, task_id: &str, index: usize) -> Result<Task, BoardError> {
        let mut drafts = self.subtask_drafts(task_id)?;
        let sub = drafts
            .get_mut(index)
            .ok_or_else(|| BoardError::not_found("subtask", &(index + 1).to_string()))?;
        sub.completed = !sub.completed;
        self.replace_subtasks(task_id, drafts)
    }

    pub fn remove_subtask(&mut self, task_id: &str, index: usize) -> Result<Task, BoardError> {
        let mut drafts = self.subtask_drafts(task_id)?;
        if index >= drafts.len() {
            return Err(BoardError::not_found("subtask", &(index + 1).to_string()));
        }
        drafts.remove(index);
        self.replace_subtasks(task_id, drafts)
    }

    fn subtask_drafts(&self, task_id: &str) -> Result<Vec<SubtaskDraft>, BoardError> {
        self.task(task_id)
            .map(Task::subtask_drafts)
            .ok_or_else(|| BoardError::not_found("task", task_id))
    }

    fn replace_subtasks(&mut self, task_id: &str, drafts: Vec<SubtaskDraft>) -> Result<Task, BoardError> {
        self.update_task(
            task_id,
            TaskPatch {
                subtasks: Some(drafts),
                ..Default::default()
            },
        )
    }

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    pub fn create_label(&mut self, name: &str, color: LabelColor) -> Result<Label, BoardError> {
        let label = labels::add_label(&mut self.store, name, color)?;
        self.labels.push(label.clone());
        self.labels
            .sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(label)
    }

    /// Remove a label. Tasks keep the id; the selection is untouched.
    pub fn delete_label(&mut self, id: &str) -> Result<(), BoardError> {
        self.store.delete_label(id).inspect_err(|e| {
            tracing::warn!(label = %id, error = %e, "could not delete label");
        })?;
        self.labels.retain(|l| l.id != id);
        Ok(())
    }

    /// Display labels of a task; ids of deleted labels are skipped
    pub fn task_labels(&self, task: &Task) -> Vec<&Label> {
        labels::resolve_labels(&task.labels, &self.labels)
    }
}

/// Optimistic local copy of a store update. Replacement subtasks get
/// placeholder ids until the store answers with real ones.
fn apply_patch(task: &mut Task, patch: &TaskPatch) {
    if let Some(title) = &patch.title {
        task.title = title.clone();
    }
    if let Some(description) = &patch.description {
        task.description = description.clone();
    }
    if let Some(column) = patch.column {
        task.column = column;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(labels) = &patch.labels {
        task.labels = dedup_labels(labels);
    }
    if let Some(due_date) = patch.due_date {
        task.due_date = due_date;
    }
    if let Some(subtasks) = &patch.subtasks {
        task.subtasks = subtasks
            .iter()
            .enumerate()
            .map(|(i, d)| Subtask {
                id: format!("pending-{}", i),
                text: d.text.clone(),
                completed: d.completed,
            })
            .collect();
    }
}
