use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::DashMap;
use log::{debug, info, warn};

use crate::error::StoreError;

/// Durable key/value backing for subscriber sets
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, StoreError>;
    fn set(&self, key: &str, values: Vec<String>) -> Result<(), StoreError>;
}

/// Process-local store, gone on restart. Used for tests and when no path is configured.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    inner: DashMap<String, Vec<String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.inner.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, values: Vec<String>) -> Result<(), StoreError> {
        self.inner.insert(key.to_string(), values);
        Ok(())
    }
}

/// JSON document on disk, rewritten in full on every `set`
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Vec<String>>>,
}

impl FileKeyValueStore {
    /// Opens the document at `path`, starting empty if it does not exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| StoreError::Read {
                key: path.display().to_string(),
                reason: e.to_string(),
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| StoreError::Corrupt(e.to_string()))?
            }
        } else {
            warn!("Store file {} not found, starting empty", path.display());
            BTreeMap::new()
        };

        info!("Opened subscriber store {} with {} keys", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, Vec<String>>, key: &str) -> Result<(), StoreError> {
        let write_err = |reason: String| StoreError::Write {
            key: key.to_string(),
            reason,
        };

        let content = serde_json::to_string_pretty(entries).map_err(|e| write_err(e.to_string()))?;

        // Write next to the target, flush it to disk, then swap it in
        let tmp = self.path.with_extension("tmp");
        let mut file = File::create(&tmp).map_err(|e| write_err(e.to_string()))?;
        file.write_all(content.as_bytes()).map_err(|e| write_err(e.to_string()))?;
        file.sync_all().map_err(|e| write_err(e.to_string()))?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(|e| write_err(e.to_string()))?;

        debug!("Persisted {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, values: Vec<String>) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;

        let previous = entries.insert(key.to_string(), values);
        if let Err(e) = self.persist(&entries, key) {
            // Keep memory in step with what is on disk
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}
