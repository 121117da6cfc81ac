//! Key-value persistence port used by the recipe store
//!
//! The store only needs two primitives, read and write of a string value by
//! key. [`MemoryStore`] backs tests; [`FileStore`] keeps one JSON file per
//! key in a data directory.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Read/write primitives over string keys
pub trait KeyValueStore {
    /// Value stored under `key`, or `None` if never written
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`. Must be durable when it returns.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store: key `k` lives in `{base_dir}/{k}.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file holding `key`
    pub fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        // Write aside and rename so a crash never leaves a torn file
        let tmp = self.base_dir.join(format!(".{}.json.tmp", key));
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "Wrote storage key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read("a").unwrap(), None);
        store.write("a", "1").unwrap();
        store.write("a", "2").unwrap();
        assert_eq!(store.read("a").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::new(temp_dir.path().join("data")).unwrap();

        assert_eq!(store.read("gr3_recipes").unwrap(), None);
        store.write("gr3_recipes", "[]").unwrap();

        let reopened = FileStore::new(temp_dir.path().join("data")).unwrap();
        assert_eq!(reopened.read("gr3_recipes").unwrap().as_deref(), Some("[]"));
        assert!(temp_dir.path().join("data/gr3_recipes.json").exists());
        assert!(!temp_dir.path().join("data/.gr3_recipes.json.tmp").exists());
    }

    #[test]
    fn test_file_store_overwrite_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::new(temp_dir.path()).unwrap();
        store.write("gr3_recipes", "[1,2,3]").unwrap();
        store.write("gr3_recipes", "[]").unwrap();

        let on_disk = std::fs::read_to_string(temp_dir.path().join("gr3_recipes.json")).unwrap();
        assert_eq!(on_disk, "[]");
        assert!(!temp_dir.path().join(".gr3_recipes.json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::new(temp_dir.path()).unwrap();
        assert!(matches!(
            store.write("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.read(""), Err(StorageError::InvalidKey(_))));
    }
}
