use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of the single notes record
pub const NOTE_ID: &str = "default-note";

/// Freeform notes pad. There is exactly one, created on first access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Note {
            id: NOTE_ID.to_string(),
            content: String::new(),
            updated_at: now,
        }
    }
}
