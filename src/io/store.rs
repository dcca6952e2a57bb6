use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::model::label::{Label, NewLabel};
use crate::model::note::{NOTE_ID, Note};
use crate::model::task::{
    ColumnId, NewTask, Subtask, SubtaskDraft, Task, TaskPatch, dedup_labels,
};
use crate::model::todo::{Todo, TodoPatch};

/// Current layout of the persisted store
pub const SCHEMA_VERSION: u32 = 1;

/// Error type for entity store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} already exists: {id}")]
    Conflict { kind: &'static str, id: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// CRUD contract for the four entity kinds.
///
/// Every call is one request. Lists return owned snapshots; callers never see
/// store internals. `TaskPatch::labels` and `TaskPatch::subtasks` replace the
/// stored collections wholesale, and replaced subtasks get fresh ids.
pub trait EntityStore {
    /// All tasks in creation order, labels as ids, subtasks inlined
    fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;
    fn create_task(&mut self, new: NewTask) -> Result<Task, StoreError>;
    fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task, StoreError>;
    fn delete_task(&mut self, id: &str) -> Result<(), StoreError>;

    fn list_todos(&self) -> Result<Vec<Todo>, StoreError>;
    fn create_todo(&mut self, text: &str) -> Result<Todo, StoreError>;
    fn update_todo(&mut self, id: &str, patch: TodoPatch) -> Result<Todo, StoreError>;
    fn delete_todo(&mut self, id: &str) -> Result<(), StoreError>;

    /// All labels ordered by name
    fn list_labels(&self) -> Result<Vec<Label>, StoreError>;
    fn create_label(&mut self, new: NewLabel) -> Result<Label, StoreError>;
    /// Removes the label only; tasks keep whatever ids they hold
    fn delete_label(&mut self, id: &str) -> Result<(), StoreError>;

    /// Get-or-create the singleton note
    fn get_note(&mut self) -> Result<Note, StoreError>;
    fn save_note(&mut self, content: &str) -> Result<Note, StoreError>;
}

pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

fn build_subtasks(drafts: Vec<SubtaskDraft>) -> Vec<Subtask> {
    drafts
        .into_iter()
        .map(|d| Subtask {
            id: new_id(),
            text: d.text,
            completed: d.completed,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// In-memory tables
// ---------------------------------------------------------------------------

/// Store held entirely in memory. Also the on-disk shape of `store.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    todos: Vec<Todo>,
    #[serde(default)]
    labels: Vec<Label>,
    #[serde(default)]
    note: Option<Note>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore {
            schema_version: SCHEMA_VERSION,
            tasks: Vec::new(),
            todos: Vec::new(),
            labels: Vec::new(),
            note: None,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_note(&self) -> bool {
        self.note.is_some()
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("task", id))
    }

    fn todo_mut(&mut self, id: &str) -> Result<&mut Todo, StoreError> {
        self.todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("todo", id))
    }
}

impl EntityStore for MemoryStore {
    fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut tasks = self.tasks.clone();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tasks)
    }

    fn create_task(&mut self, new: NewTask) -> Result<Task, StoreError> {
        let task = Task {
            id: new_id(),
            title: new.title,
            description: new.description,
            column: new.column.unwrap_or(ColumnId::Todo),
            priority: new.priority.unwrap_or_default(),
            labels: dedup_labels(&new.labels),
            due_date: new.due_date,
            subtasks: build_subtasks(new.subtasks),
            created_at: Utc::now(),
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task, StoreError> {
        let task = self.task_mut(id)?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(column) = patch.column {
            task.column = column;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(labels) = patch.labels {
            task.labels = dedup_labels(&labels);
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(subtasks) = patch.subtasks {
            task.subtasks = build_subtasks(subtasks);
        }
        Ok(task.clone())
    }

    fn delete_task(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Err(StoreError::not_found("task", id));
        }
        Ok(())
    }

    fn list_todos(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.todos.clone())
    }

    fn create_todo(&mut self, text: &str) -> Result<Todo, StoreError> {
        let todo = Todo {
            id: new_id(),
            text: text.to_string(),
            completed: false,
            created_at: Utc::now(),
        };
        self.todos.push(todo.clone());
        Ok(todo)
    }

    fn update_todo(&mut self, id: &str, patch: TodoPatch) -> Result<Todo, StoreError> {
        let todo = self.todo_mut(id)?;
        if let Some(text) = patch.text {
            todo.text = text;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        Ok(todo.clone())
    }

    fn delete_todo(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.todos.len();
        self.todos.retain(|t| t.id != id);
        if self.todos.len() == before {
            return Err(StoreError::not_found("todo", id));
        }
        Ok(())
    }

    fn list_labels(&self) -> Result<Vec<Label>, StoreError> {
        let mut labels = self.labels.clone();
        labels.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(labels)
    }

    fn create_label(&mut self, new: NewLabel) -> Result<Label, StoreError> {
        let id = new.id.unwrap_or_else(new_id);
        if self.labels.iter().any(|l| l.id == id) {
            return Err(StoreError::Conflict { kind: "label", id });
        }
        let label = Label {
            id,
            name: new.name,
            color: new.color,
        };
        self.labels.push(label.clone());
        Ok(label)
    }

    fn delete_label(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.labels.len();
        self.labels.retain(|l| l.id != id);
        if self.labels.len() == before {
            return Err(StoreError::not_found("label", id));
        }
        Ok(())
    }

    fn get_note(&mut self) -> Result<Note, StoreError> {
        let note = self.note.get_or_insert_with(|| Note::empty(Utc::now()));
        Ok(note.clone())
    }

    fn save_note(&mut self, content: &str) -> Result<Note, StoreError> {
        let note = Note {
            id: NOTE_ID.to_string(),
            content: content.to_string(),
            updated_at: Utc::now(),
        };
        self.note = Some(note.clone());
        Ok(note)
    }
}
