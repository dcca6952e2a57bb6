use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Workflow column a task lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnId {
    Todo,
    InProgress,
    Complete,
    Archive,
}

impl ColumnId {
    /// The three columns shown on the board, left to right
    pub const BOARD: [ColumnId; 3] = [ColumnId::Todo, ColumnId::InProgress, ColumnId::Complete];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnId::Todo => "todo",
            ColumnId::InProgress => "in-progress",
            ColumnId::Complete => "complete",
            ColumnId::Archive => "archive",
        }
    }

    /// Column heading used in human-readable output
    pub fn title(self) -> &'static str {
        match self {
            ColumnId::Todo => "Todo",
            ColumnId::InProgress => "In Progress",
            ColumnId::Complete => "Complete",
            ColumnId::Archive => "Archive",
        }
    }

    /// Whether a `Move` may target this column
    pub fn is_move_target(self) -> bool {
        self != ColumnId::Archive
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(ColumnId::Todo),
            "in-progress" | "inprogress" | "in_progress" | "doing" => Ok(ColumnId::InProgress),
            "complete" | "done" => Ok(ColumnId::Complete),
            "archive" | "archived" => Ok(ColumnId::Archive),
            other => Err(format!(
                "unknown column '{}' (expected: todo, in-progress, complete, archive)",
                other
            )),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort rank: high sorts first
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Short badge text
    pub fn badge(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Med",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!(
                "unknown priority '{}' (expected: low, medium, high)",
                other
            )),
        }
    }
}

/// A checklist item owned by a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Subtask content as sent to the store; ids are assigned on write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskDraft {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl From<&Subtask> for SubtaskDraft {
    fn from(sub: &Subtask) -> Self {
        SubtaskDraft {
            text: sub.text.clone(),
            completed: sub.completed,
        }
    }
}

/// A card on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned, immutable
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub column: ColumnId,
    #[serde(default)]
    pub priority: Priority,
    /// Label ids; may reference labels that no longer exist
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// (completed, total) subtask counts
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        (done, self.subtasks.len())
    }

    /// The subtask list in the shape a full-replace update expects
    pub fn subtask_drafts(&self) -> Vec<SubtaskDraft> {
        self.subtasks.iter().map(SubtaskDraft::from).collect()
    }
}

/// Fields accepted when creating a task
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub column: Option<ColumnId>,
    pub priority: Option<Priority>,
    pub labels: Vec<String>,
    pub due_date: Option<NaiveDate>,
    pub subtasks: Vec<SubtaskDraft>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial update. `None` leaves a field untouched; `labels` and `subtasks`
/// replace the whole collection when present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub column: Option<ColumnId>,
    pub priority: Option<Priority>,
    pub labels: Option<Vec<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub subtasks: Option<Vec<SubtaskDraft>>,
}

impl TaskPatch {
    pub fn column(column: ColumnId) -> Self {
        TaskPatch {
            column: Some(column),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

/// Drop duplicate label ids, keeping first occurrence order
pub fn dedup_labels(labels: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        if !out.contains(label) {
            out.push(label.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_serializes_kebab_case() {
        let json = serde_json::to_string(&ColumnId::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: ColumnId = serde_json::from_str("\"archive\"").unwrap();
        assert_eq!(back, ColumnId::Archive);
    }

    #[test]
    fn column_parse_accepts_aliases() {
        assert_eq!("done".parse::<ColumnId>().unwrap(), ColumnId::Complete);
        assert_eq!("In-Progress".parse::<ColumnId>().unwrap(), ColumnId::InProgress);
        assert!("later".parse::<ColumnId>().is_err());
    }

    #[test]
    fn priority_rank_puts_high_first() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn dedup_labels_keeps_first_occurrence() {
        let labels = vec!["bug".to_string(), "docs".into(), "bug".into()];
        assert_eq!(dedup_labels(&labels), vec!["bug", "docs"]);
    }

    #[test]
    fn task_deserializes_with_defaults() {
        let task: Task = serde_json::from_str(
            r#"{"id":"t1","title":"x","column":"todo","created_at":"2025-05-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.labels.is_empty());
        assert!(task.subtasks.is_empty());
        assert_eq!(task.due_date, None);
    }
}
