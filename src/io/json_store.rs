use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::io::lock::{BoardLock, LockError};
use crate::io::store::{EntityStore, MemoryStore, SCHEMA_VERSION, StoreError};
use crate::model::label::{Label, NewLabel};
use crate::model::note::Note;
use crate::model::task::{NewTask, Task, TaskPatch};
use crate::model::todo::{Todo, TodoPatch};

pub const STORE_FILE: &str = "store.json";

impl From<LockError> for StoreError {
    fn from(e: LockError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Write to a sibling temp file, then rename over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// `store.json` in a board directory, loaded into a [`MemoryStore`] and
/// written back after every successful mutation.
///
/// The board lock is taken on open and released on drop, so a `JsonStore`
/// should live no longer than one command.
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
    _lock: Option<BoardLock>,
}

impl JsonStore {
    /// Lock the board directory and read its store file. A missing file is an
    /// empty store.
    pub fn open(board_dir: &Path) -> Result<Self, StoreError> {
        let lock = BoardLock::acquire_default(board_dir)?;
        let mut store = Self::open_unlocked(board_dir)?;
        store._lock = Some(lock);
        Ok(store)
    }

    /// Read the store without taking the board lock
    pub fn open_unlocked(board_dir: &Path) -> Result<Self, StoreError> {
        let path = board_dir.join(STORE_FILE);
        let inner = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| {
                StoreError::Unavailable(format!("could not read {}: {}", path.display(), e))
            })?;
            let inner: MemoryStore = serde_json::from_str(&text).map_err(|e| {
                StoreError::Unavailable(format!("could not parse {}: {}", path.display(), e))
            })?;
            if inner.schema_version > SCHEMA_VERSION {
                return Err(StoreError::Unavailable(format!(
                    "{} has schema version {}, this vb understands up to {}",
                    path.display(),
                    inner.schema_version,
                    SCHEMA_VERSION
                )));
            }
            inner
        } else {
            MemoryStore::new()
        };
        tracing::debug!(path = %path.display(), "store loaded");
        Ok(JsonStore {
            path,
            inner,
            _lock: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current tables to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&self.inner)
            .map_err(|e| StoreError::Unavailable(format!("could not serialize store: {}", e)))?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| {
            StoreError::Unavailable(format!("could not write {}: {}", self.path.display(), e))
        })
    }

    /// Apply `op` and persist. On a failed write the in-memory tables are put
    /// back so they keep matching the file.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut MemoryStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let before = self.inner.clone();
        let out = op(&mut self.inner)?;
        if let Err(e) = self.flush() {
            self.inner = before;
            return Err(e);
        }
        Ok(out)
    }
}

impl EntityStore for JsonStore {
    fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.inner.list_tasks()
    }

    fn create_task(&mut self, new: NewTask) -> Result<Task, StoreError> {
        self.mutate(|s| s.create_task(new))
    }

    fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task, StoreError> {
        self.mutate(|s| s.update_task(id, patch))
    }

    fn delete_task(&mut self, id: &str) -> Result<(), StoreError> {
        self.mutate(|s| s.delete_task(id))
    }

    fn list_todos(&self) -> Result<Vec<Todo>, StoreError> {
        self.inner.list_todos()
    }

    fn create_todo(&mut self, text: &str) -> Result<Todo, StoreError> {
        self.mutate(|s| s.create_todo(text))
    }

    fn update_todo(&mut self, id: &str, patch: TodoPatch) -> Result<Todo, StoreError> {
        self.mutate(|s| s.update_todo(id, patch))
    }

    fn delete_todo(&mut self, id: &str) -> Result<(), StoreError> {
        self.mutate(|s| s.delete_todo(id))
    }

    fn list_labels(&self) -> Result<Vec<Label>, StoreError> {
        self.inner.list_labels()
    }

    fn create_label(&mut self, new: NewLabel) -> Result<Label, StoreError> {
        self.mutate(|s| s.create_label(new))
    }

    fn delete_label(&mut self, id: &str) -> Result<(), StoreError> {
        self.mutate(|s| s.delete_label(id))
    }

    fn get_note(&mut self) -> Result<Note, StoreError> {
        if self.inner.has_note() {
            return self.inner.get_note();
        }
        self.mutate(|s| s.get_note())
    }

    fn save_note(&mut self, content: &str) -> Result<Note, StoreError> {
        self.mutate(|s| s.save_note(content))
    }
}
