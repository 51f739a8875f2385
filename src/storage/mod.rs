//! Durable storage of editing state.
//!
//! The store persists two JSON records: a map of per-source workflow
//! snapshots and the source list with its selection pointer. Where those
//! records live is the host's business, abstracted behind [`StorageBackend`].

mod records;

pub use records::{SnapshotMap, SourcesRecord, WorkflowSnapshot};

use std::fs;
use std::io;
use std::path::PathBuf;

use ahash::AHashMap;

use crate::error::StorageError;

/// Key of the per-source workflow snapshot map.
pub const WORKFLOWS_KEY: &str = "arazzo-workflows";

/// Key of the source list and selection pointer.
pub const SOURCES_KEY: &str = "arazzo-sources";

/// Key-value storage the store persists into. Implementations stand in for
/// whatever the host offers: browser local storage, a config directory, a
/// test buffer.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Keeps records in a hash map; the default for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: AHashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores each record as `<key>.json` inside a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Opens the backing directory, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| {
            StorageError::Backend(format!("cannot create '{}': {err}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.record_path(key)) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Backend(format!("cannot read '{key}': {err}"))),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.record_path(key), value)
            .map_err(|err| StorageError::Backend(format!("cannot write '{key}': {err}")))
    }
}
