//! Key-value persistence
//!
//! `MemoryStorage` lives for the session; `FileStorage` keeps a JSON object
//! on disk and rewrites it on every change.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("storage data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Synchronous string key-value store
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.data.remove(key);
        Ok(())
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

/// Storage backed by a JSON file
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    data: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open `path`, loading existing items; a missing file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Undo an in-memory change whose write failed
    fn restore(&mut self, key: &str, previous: Option<String>) {
        tracing::warn!("write to {} failed, keeping '{}' unchanged", self.path.display(), key);
        match previous {
            Some(value) => self.data.insert(key.to_string(), value),
            None => self.data.remove(key),
        };
    }

    fn persist(&self) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.data.insert(key.to_string(), value.to_string());
        self.persist().inspect_err(|_| self.restore(key, previous))
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let Some(previous) = self.data.remove(key) else {
            return Ok(());
        };
        self.persist().inspect_err(|_| self.restore(key, Some(previous)))
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

/// Read a serialized list; missing or unreadable data gives an empty list
pub fn load_records<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Vec<T> {
    let Some(raw) = storage.get_item(key) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!("discarding unreadable records under '{}': {}", key, err);
            Vec::new()
        }
    }
}

/// Serialize `records` under `key`
pub fn save_records<T: Serialize>(
    storage: &mut dyn Storage,
    key: &str,
    records: &[T],
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(records)?;
    storage.set_item(key, &raw)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Todo {
        id: u64,
        title: String,
        completed: bool,
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("twig-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_records_in_memory() {
        let mut storage = MemoryStorage::new();
        assert!(load_records::<Todo>(&storage, "todos").is_empty());

        let todos = vec![Todo { id: 1, title: "buy milk".into(), completed: false }];
        save_records(&mut storage, "todos", &todos).unwrap();
        assert_eq!(load_records::<Todo>(&storage, "todos"), todos);
    }

    #[test]
    fn test_corrupt_records_are_empty() {
        let mut storage = MemoryStorage::new();
        storage.set_item("todos", "{not json").unwrap();
        assert!(load_records::<Todo>(&storage, "todos").is_empty());
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        let mut storage = FileStorage::open(&path).unwrap();
        assert!(storage.is_empty());
        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();
        storage.remove_item("a").unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get_item("a"), None);
        assert_eq!(reopened.get_item("b").as_deref(), Some("2"));
        assert_eq!(reopened.len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_failed_write_leaves_items_unchanged() {
        let dir = temp_path("missing-dir");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("store.json");

        // The directory does not exist, so every write fails
        let mut storage = FileStorage::open(&path).unwrap();
        assert!(matches!(storage.set_item("a", "1"), Err(StorageError::Io(_))));
        assert_eq!(storage.get_item("a"), None);
        assert!(storage.is_empty());

        fs::create_dir(&dir).unwrap();
        storage.set_item("a", "1").unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert!(storage.set_item("a", "2").is_err());
        assert_eq!(storage.get_item("a").as_deref(), Some("1"));
        assert!(storage.remove_item("a").is_err());
        assert_eq!(storage.get_item("a").as_deref(), Some("1"));
    }

    #[test]
    fn test_file_storage_rejects_garbage() {
        let path = temp_path("garbage");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(FileStorage::open(&path), Err(StorageError::Json(_))));
        fs::remove_file(&path).unwrap();
    }
}
