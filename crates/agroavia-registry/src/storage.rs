//! Durable key-value storage
//!
//! Collections are stored as one JSON document per key. Two backends are
//! provided: an in-memory map for tests and embedding, and a directory with
//! one `<key>.json` file per key.

use agroavia_core::StorageError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Minimal string key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read a key; `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a key, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key; absent keys are not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Volatile store backed by a hash map
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Store keeping each key in `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!("File store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_of(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_of(key);
        // Replaced atomically through a sibling temp file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .and_then(|_| std::fs::rename(&tmp, &path))
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_of(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "[]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get("agroaviatech-fields").unwrap(), None);
        store.set("agroaviatech-fields", "[1]").unwrap();
        assert!(dir.path().join("data/agroaviatech-fields.json").exists());
        assert_eq!(
            store.get("agroaviatech-fields").unwrap().as_deref(),
            Some("[1]")
        );

        store.remove("agroaviatech-fields").unwrap();
        assert_eq!(store.get("agroaviatech-fields").unwrap(), None);
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("../escape", "x").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();
        std::fs::remove_dir_all(dir.path().join("data")).unwrap();

        let err = store.set("k", "v").unwrap_err();
        assert_eq!(err.key(), "k");
        assert!(matches!(err, StorageError::Write { .. }));
    }
}
