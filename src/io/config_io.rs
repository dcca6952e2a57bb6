use std::fs;
use std::path::Path;

use crate::io::board_io::{BoardIoError, CONFIG_FILE};
use crate::model::config::{ArchivePolicy, BoardConfig};

/// Read the board config, returning both the parsed config and the raw
/// toml_edit document for comment-preserving edits.
pub fn read_config(board_dir: &Path) -> Result<(BoardConfig, toml_edit::DocumentMut), BoardIoError> {
    let path = board_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| BoardIoError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: BoardConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(board_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), BoardIoError> {
    let path = board_dir.join(CONFIG_FILE);
    fs::write(&path, doc.to_string()).map_err(|e| BoardIoError::WriteError { path, source: e })
}

/// Set `[lifecycle] bulk_archive`
pub fn set_bulk_archive(doc: &mut toml_edit::DocumentMut, policy: ArchivePolicy) {
    if !doc.contains_key("lifecycle") {
        doc["lifecycle"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["lifecycle"]["bulk_archive"] = toml_edit::value(policy.as_str());
}
