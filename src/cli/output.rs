use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::model::label::{Label, LabelColor};
use crate::model::note::Note;
use crate::model::task::{ColumnId, Priority, Task};
use crate::model::todo::Todo;
use crate::ops::board::BulkOutcome;
use crate::ops::labels::resolve_labels;
use crate::ops::order::is_overdue;

/// Characters of an id shown in human-readable output
const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct SubtaskJson {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub column: ColumnId,
    pub priority: Priority,
    /// Label ids as stored, including ones whose label was deleted
    pub labels: Vec<String>,
    /// Names of the labels that still exist
    pub label_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub overdue: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<SubtaskJson>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub column: ColumnId,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct LabelJson {
    pub id: String,
    pub name: String,
    pub color: LabelColor,
}

#[derive(Serialize)]
pub struct TodoJson {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct NoteJson {
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct BulkFailureJson {
    pub id: String,
    pub error: String,
}

#[derive(Serialize)]
pub struct BulkJson {
    pub applied: Vec<String>,
    pub failures: Vec<BulkFailureJson>,
}

#[derive(Serialize)]
pub struct SelectionJson {
    pub selected: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task, labels: &[Label], today: NaiveDate) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        column: task.column,
        priority: task.priority,
        labels: task.labels.clone(),
        label_names: resolve_labels(&task.labels, labels)
            .into_iter()
            .map(|l| l.name.clone())
            .collect(),
        due_date: task.due_date,
        overdue: is_overdue(task, today),
        subtasks: task
            .subtasks
            .iter()
            .map(|s| SubtaskJson {
                id: s.id.clone(),
                text: s.text.clone(),
                completed: s.completed,
            })
            .collect(),
        created_at: task.created_at,
    }
}

pub fn label_to_json(label: &Label) -> LabelJson {
    LabelJson {
        id: label.id.clone(),
        name: label.name.clone(),
        color: label.color,
    }
}

pub fn todo_to_json(todo: &Todo) -> TodoJson {
    TodoJson {
        id: todo.id.clone(),
        text: todo.text.clone(),
        completed: todo.completed,
        created_at: todo.created_at,
    }
}

pub fn note_to_json(note: &Note) -> NoteJson {
    NoteJson {
        content: note.content.clone(),
        updated_at: note.updated_at,
    }
}

pub fn bulk_to_json(outcome: &BulkOutcome) -> BulkJson {
    BulkJson {
        applied: outcome.applied.clone(),
        failures: outcome
            .failures
            .iter()
            .map(|f| BulkFailureJson {
                id: f.id.clone(),
                error: f.error.to_string(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Tail of an id; the head of a v7 uuid is a timestamp shared by ids
/// created close together
pub fn short_id(id: &str) -> &str {
    let start = id.len().saturating_sub(SHORT_ID_LEN);
    id.get(start..).unwrap_or(id)
}

fn label_tags(task: &Task, labels: &[Label]) -> String {
    resolve_labels(&task.labels, labels)
        .iter()
        .map(|l| format!(" #{}", l.name))
        .collect()
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task, labels: &[Label], today: NaiveDate) -> String {
    let mut line = format!(
        "{} [{}] {}",
        short_id(&task.id),
        task.priority.badge(),
        task.title
    );
    if let Some(due) = task.due_date {
        if is_overdue(task, today) {
            line.push_str(&format!("  due {} OVERDUE", due));
        } else {
            line.push_str(&format!("  due {}", due));
        }
    }
    line.push_str(&label_tags(task, labels));
    let (done, total) = task.subtask_progress();
    if total > 0 {
        line.push_str(&format!("  [{}/{}]", done, total));
    }
    line
}

/// Column heading with a task count
pub fn format_column_header(column: ColumnId, count: usize) -> String {
    format!("== {} ({}) ==", column.title(), count)
}

/// Format one column: header then one line per task
pub fn format_column(column: ColumnId, tasks: &[&Task], labels: &[Label], today: NaiveDate) -> Vec<String> {
    let mut lines = vec![format_column_header(column, tasks.len())];
    if tasks.is_empty() {
        lines.push("  (empty)".to_string());
    }
    for task in tasks {
        lines.push(format!("  {}", format_task_line(task, labels, today)));
    }
    lines
}

/// Format detailed task view
pub fn format_task_detail(task: &Task, labels: &[Label], today: NaiveDate) -> Vec<String> {
    let mut lines = vec![
        task.title.clone(),
        format!("id: {}", task.id),
        format!("column: {}", task.column),
        format!("priority: {}", task.priority),
    ];

    if let Some(due) = task.due_date {
        let suffix = if is_overdue(task, today) { " (overdue)" } else { "" };
        lines.push(format!("due: {}{}", due, suffix));
    }

    let names: Vec<String> = resolve_labels(&task.labels, labels)
        .into_iter()
        .map(|l| format!("{} ({})", l.name, l.color))
        .collect();
    if !names.is_empty() {
        lines.push(format!("labels: {}", names.join(", ")));
    }

    lines.push(format!("created: {}", task.created_at.format("%Y-%m-%d %H:%M")));

    if let Some(description) = &task.description {
        lines.push(String::new());
        for line in description.lines() {
            lines.push(format!("  {}", line));
        }
    }

    if !task.subtasks.is_empty() {
        let (done, total) = task.subtask_progress();
        lines.push(String::new());
        lines.push(format!("subtasks ({}/{}):", done, total));
        for (i, sub) in task.subtasks.iter().enumerate() {
            let check = if sub.completed { 'x' } else { ' ' };
            lines.push(format!("  {}. [{}] {}", i + 1, check, sub.text));
        }
    }

    lines
}

pub fn format_label_line(label: &Label) -> String {
    format!("{:<10} {:<8} {}", label.id, label.color, label.name)
}

pub fn format_todo_line(todo: &Todo) -> String {
    let check = if todo.completed { 'x' } else { ' ' };
    format!("[{}] {} {}", check, short_id(&todo.id), todo.text)
}

/// Summary of a bulk run, failures listed one per line
pub fn format_bulk_outcome(verb: &str, outcome: &BulkOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} task{}",
        verb,
        outcome.applied.len(),
        if outcome.applied.len() == 1 { "" } else { "s" }
    )];
    for failure in &outcome.failures {
        lines.push(format!("  failed {}: {}", short_id(&failure.id), failure.error));
    }
    lines
}
