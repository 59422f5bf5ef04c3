//! Persistence: one tournament record per store, saved as JSON.

use crate::models::Tournament;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to delete {}: {source}", .path.display())]
    Delete { path: PathBuf, source: io::Error },
    #[error("Failed to encode tournament: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Stored tournament is unreadable: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Store unavailable")]
    Unavailable,
}

/// `save` / `load` / `delete` for a single tournament record.
pub trait TournamentStore: Send + Sync {
    fn save(&self, tournament: &Tournament) -> Result<(), PersistenceError>;
    fn load(&self) -> Result<Option<Tournament>, PersistenceError>;
    fn delete(&self) -> Result<(), PersistenceError>;
}

/// Pretty-printed JSON file. Writes go through a temporary file and a rename.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl TournamentStore for JsonFileStore {
    fn save(&self, tournament: &Tournament) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(tournament).map_err(PersistenceError::Encode)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.write_error(e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.write_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.write_error(e))
    }

    fn load(&self) -> Result<Option<Tournament>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(PersistenceError::Decode),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn delete(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Delete {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// In-memory store. Keeps the serialized JSON so records go through the same wire shape as the
/// file store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TournamentStore for MemoryStore {
    fn save(&self, tournament: &Tournament) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(tournament).map_err(PersistenceError::Encode)?;
        *self.json.write().map_err(|_| PersistenceError::Unavailable)? = Some(json);
        Ok(())
    }

    fn load(&self) -> Result<Option<Tournament>, PersistenceError> {
        let guard = self.json.read().map_err(|_| PersistenceError::Unavailable)?;
        guard
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(PersistenceError::Decode)
    }

    fn delete(&self) -> Result<(), PersistenceError> {
        *self.json.write().map_err(|_| PersistenceError::Unavailable)? = None;
        Ok(())
    }
}
