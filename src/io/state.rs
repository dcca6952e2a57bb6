use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

const STATE_FILE: &str = ".state.json";

/// Session state kept between commands (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UiState {
    /// Selected task ids, in the order they were selected
    #[serde(default)]
    pub selection: Vec<String>,
}

/// Read .state.json from the board directory
pub fn read_ui_state(board_dir: &Path) -> Option<UiState> {
    let content = fs::read_to_string(board_dir.join(STATE_FILE)).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable .state.json");
            None
        }
    }
}

/// Write .state.json to the board directory
pub fn write_ui_state(board_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    crate::io::json_store::atomic_write(&board_dir.join(STATE_FILE), content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let state = UiState {
            selection: vec!["b".into(), "a".into()],
        };
        write_ui_state(dir.path(), &state).unwrap();
        assert_eq!(read_ui_state(dir.path()), Some(state));
    }

    #[test]
    fn read_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn read_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILE), "not json {{{").unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn serde_defaults_on_empty_object() {
        let state: UiState = serde_json::from_str("{}").unwrap();
        assert!(state.selection.is_empty());
    }
}
