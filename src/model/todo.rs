use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quick todo, independent of the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial todo update; `None` leaves the field as is
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
}
