//! Key-value string storage
//!
//! Persisted caches serialize themselves to one string blob per cache name.
//! Any medium offering `get_item`/`set_item` over strings will do.

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// String-keyed storage medium (read-whole-blob / write-whole-blob)
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored string, `None` if nothing was stored under `name`
    fn get_item(&self, name: &str) -> Result<Option<String>>;

    /// Stores `value` under `name`, replacing any previous value
    fn set_item(&self, name: &str, value: &str) -> Result<()>;
}

/// Volatile store, lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, name: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))?;
        Ok(items.get(name).cloned())
    }

    fn set_item(&self, name: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))?;
        items.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file (`{ name: value, ... }`)
///
/// Every write rewrites the whole file atomically (temp file + rename).
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    guard: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Store file inside `data_folder`, creating the folder if missing
    pub fn in_folder(data_folder: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_folder)?;
        Ok(Self::new(data_folder.join("store.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, serde_json::to_string_pretty(items)?)?;
        std::fs::rename(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), entries = items.len(), "Store written");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, name: &str) -> Result<Option<String>> {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| Error::Storage("file store lock poisoned".to_string()))?;
        Ok(self.read_all()?.remove(name))
    }

    fn set_item(&self, name: &str, value: &str) -> Result<()> {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| Error::Storage("file store lock poisoned".to_string()))?;
        let mut items = self.read_all()?;
        items.insert(name.to_string(), value.to_string());
        self.write_all(&items)
    }
}
