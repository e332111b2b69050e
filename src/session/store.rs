//! Persistent key-value storage for small app counters.

use crate::core::error::StoreResult;
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A small string-keyed store of integer values.
pub trait KeyValueStore: Send {
    /// Read `key`, or `None` if it was never written.
    fn get_i64(&self, key: &str) -> StoreResult<Option<i64>>;

    /// Write `key`.
    fn set_i64(&mut self, key: &str, value: i64) -> StoreResult<()>;
}

/// In-memory store; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: IndexMap<String, i64>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_i64(&self, key: &str) -> StoreResult<Option<i64>> {
        Ok(self.values.get(key).copied())
    }

    fn set_i64(&mut self, key: &str, value: i64) -> StoreResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store persisted as a flat JSON object.
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash never leaves a half-written file behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: serde_json::Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => serde_json::Map::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => serde_json::Map::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("Opened store {} with {} keys", path.display(), values.len());
        Ok(Self { path, values })
    }

    /// File backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, serde_json::to_vec_pretty(&self.values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_i64(&self, key: &str) -> StoreResult<Option<i64>> {
        Ok(self.values.get(key).and_then(Value::as_i64))
    }

    fn set_i64(&mut self, key: &str, value: i64) -> StoreResult<()> {
        self.values.insert(key.to_string(), Value::from(value));
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StoreError;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_i64("filterCount").unwrap(), None);
        store.set_i64("filterCount", 3).unwrap();
        assert_eq!(store.get_i64("filterCount").unwrap(), Some(3));
    }

    #[test]
    fn test_json_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set_i64("filterCount", 7).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_i64("filterCount").unwrap(), Some(7));
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
    }

    #[test]
    fn test_json_store_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"theme": "dark", "filterCount": 1}"#).unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set_i64("filterCount", 2).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("dark"));
    }

    #[test]
    fn test_json_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Serialization(_))));
    }
}
