use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::BoardConfig;

/// Directory holding a board's files
pub const BOARD_DIR: &str = ".vibe";
pub const CONFIG_FILE: &str = "board.toml";

/// Error type for board discovery and config I/O
#[derive(Debug, thiserror::Error)]
pub enum BoardIoError {
    #[error("not a vibe board: no .vibe/ directory found (run `vb init`)")]
    NotABoard,
    #[error("a board already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse board.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit board.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
}

/// Discover the board by walking up from `start`, looking for
/// `.vibe/board.toml`. Returns the `.vibe` directory.
pub fn discover_board(start: &Path) -> Result<PathBuf, BoardIoError> {
    let mut current = start.to_path_buf();
    loop {
        let board_dir = current.join(BOARD_DIR);
        if board_dir.is_dir() && board_dir.join(CONFIG_FILE).exists() {
            return Ok(board_dir);
        }
        if !current.pop() {
            return Err(BoardIoError::NotABoard);
        }
    }
}

/// Parse `board.toml` in the given board directory
pub fn load_config(board_dir: &Path) -> Result<BoardConfig, BoardIoError> {
    let path = board_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| BoardIoError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

const BOARD_TOML_TEMPLATE: &str = r##"[board]
name = "My Board"

[lifecycle]
# Which columns `vb bulk archive` may archive from: "any" or "complete".
# Archiving a single card always requires it to be complete.
bulk_archive = "any"

[labels]
# Create Bug, Feature, Design, Docs and Urgent when the board has no labels
seed_defaults = true

[log]
# tracing filter; the VIBE_LOG environment variable takes precedence
level = "warn"
"##;

/// The commented starter config with `[board] name` set. The name is
/// written through toml_edit so any text survives quoting.
pub fn render_board_toml(name: &str) -> Result<String, BoardIoError> {
    let mut doc: toml_edit::DocumentMut = BOARD_TOML_TEMPLATE.parse()?;
    doc["board"]["name"] = toml_edit::value(name);
    Ok(doc.to_string())
}

/// Create `.vibe/board.toml` under `root`. Returns the new board directory.
pub fn init_board(root: &Path, name: &str) -> Result<PathBuf, BoardIoError> {
    let board_dir = root.join(BOARD_DIR);
    if board_dir.join(CONFIG_FILE).exists() {
        return Err(BoardIoError::AlreadyExists(board_dir));
    }
    fs::create_dir_all(&board_dir).map_err(|e| BoardIoError::WriteError {
        path: board_dir.clone(),
        source: e,
    })?;
    let path = board_dir.join(CONFIG_FILE);
    fs::write(&path, render_board_toml(name)?)
        .map_err(|e| BoardIoError::WriteError { path, source: e })?;
    Ok(board_dir)
}

/// Infer a board name from a directory name: hyphens become spaces, words
/// are title-cased.
pub fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::ArchivePolicy;
    use tempfile::TempDir;

    #[test]
    fn discover_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        let board_dir = init_board(tmp.path(), "Home").unwrap();
        let sub = tmp.path().join("a/b");
        fs::create_dir_all(&sub).unwrap();

        assert_eq!(discover_board(tmp.path()).unwrap(), board_dir);
        assert_eq!(discover_board(&sub).unwrap(), board_dir);
    }

    #[test]
    fn discover_without_board_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            discover_board(tmp.path()),
            Err(BoardIoError::NotABoard)
        ));
    }

    #[test]
    fn template_parses_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let board_dir = init_board(tmp.path(), "Side \"Project\"").unwrap();
        let config = load_config(&board_dir).unwrap();
        assert_eq!(config.board.name, "Side \"Project\"");
        assert_eq!(config.lifecycle.bulk_archive, ArchivePolicy::AnyColumn);
        assert!(config.labels.seed_defaults);
    }

    #[test]
    fn names_needing_escapes_still_parse() {
        for name in [r"C:\xyz", "tab\there", "line\nbreak"] {
            let tmp = TempDir::new().unwrap();
            let board_dir = init_board(tmp.path(), name).unwrap();
            let config = load_config(&board_dir).unwrap();
            assert_eq!(config.board.name, name);
        }
    }

    #[test]
    fn rendered_template_keeps_comments() {
        let text = render_board_toml("Home").unwrap();
        assert!(text.contains("name = \"Home\""));
        assert!(text.contains("# Which columns `vb bulk archive`"));
    }

    #[test]
    fn init_twice_fails() {
        let tmp = TempDir::new().unwrap();
        init_board(tmp.path(), "x").unwrap();
        assert!(matches!(
            init_board(tmp.path(), "x"),
            Err(BoardIoError::AlreadyExists(_))
        ));
    }

    #[test]
    fn infer_name_title_cases() {
        assert_eq!(infer_name("my-side_project"), "My Side Project");
        assert_eq!(infer_name("vibe"), "Vibe");
    }
}
