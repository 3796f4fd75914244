//! Key-value storage backends for the persistence gateway.
//!
//! The gateway only needs string keys to string payloads. Write failures
//! carry enough shape to distinguish an exhausted quota from everything
//! else, because the two get different user-facing treatment.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a storage write was rejected.
#[derive(Error, Debug)]
pub enum StorageWriteError {
    /// The backend is out of space; the user has to free something up.
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// Any other backend failure.
    #[error("{0}")]
    Other(String),
}

/// Durable string key-value storage.
pub trait KeyValueStorage {
    /// Reads the payload under a key, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a payload under a key, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageWriteError>;

    /// Deletes a key. Missing keys are fine.
    fn remove(&mut self, key: &str);
}

// =============================================================================
// MEMORY STORAGE
// =============================================================================

/// In-memory storage for tests and demos, with an optional byte quota so
/// quota-exhaustion paths can be exercised.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    /// Creates unbounded in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage that rejects writes once total payload bytes would
    /// exceed the quota.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageWriteError> {
        if let Some(quota) = self.quota_bytes {
            let others: usize = self
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if others + value.len() > quota {
                return Err(StorageWriteError::QuotaExceeded);
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

// =============================================================================
// DIRECTORY STORAGE
// =============================================================================

/// File-backed storage: one file per key under a directory. Used by the CLI.
#[derive(Debug)]
pub struct DirStorage {
    dir: PathBuf,
}

impl DirStorage {
    /// Creates storage rooted at a directory. The directory is created on
    /// the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStorage for DirStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageWriteError> {
        let map_err = |e: io::Error| match e.kind() {
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => {
                StorageWriteError::QuotaExceeded
            }
            _ => StorageWriteError::Other(e.to_string()),
        };
        fs::create_dir_all(&self.dir).map_err(map_err)?;
        fs::write(self.path_for(key), value).map_err(map_err)
    }

    fn remove(&mut self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.get("k").is_none());
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v"));
        storage.remove("k");
        assert!(storage.get("k").is_none());
    }

    #[test]
    fn test_memory_storage_quota() {
        let mut storage = MemoryStorage::with_quota(10);
        storage.set("a", "12345").unwrap();
        // Replacing a key counts the new payload, not both.
        storage.set("a", "1234567890").unwrap();
        let err = storage.set("b", "x").unwrap_err();
        assert!(matches!(err, StorageWriteError::QuotaExceeded));
    }

    #[test]
    fn test_dir_storage_round_trip() {
        let dir = std::env::temp_dir().join(format!("storyreel-test-{}", std::process::id()));
        let mut storage = DirStorage::new(&dir);
        storage.set("storyreel.test", "payload").unwrap();
        assert_eq!(storage.get("storyreel.test").as_deref(), Some("payload"));
        storage.remove("storyreel.test");
        assert!(storage.get("storyreel.test").is_none());
        let _ = fs::remove_dir_all(dir);
    }
}
