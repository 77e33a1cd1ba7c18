//! Key-value persistence port and its adapters.
//!
//! Everything the application remembers is stored as JSON text under a
//! small set of well-known keys. [`MemoryStorage`] backs tests and
//! ephemeral sessions, [`SledStorage`] an on-disk database.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tracing::{info, warn};

/// Prefix of per-course progress keys.
pub const PROGRESS_KEY_PREFIX: &str = "progress_";

/// Default namespace for collection keys.
pub const DEFAULT_NAMESPACE: &str = "pathfinder";

/// Errors from a persistence adapter.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Stored value under a known key could not be parsed
    #[error("Failed to read '{key}': {reason}")]
    PersistenceReadFailure { key: String, reason: String },

    /// Value could not be serialized
    #[error("Failed to encode '{key}': {reason}")]
    Encode { key: String, reason: String },

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Lock poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Text key-value storage.
///
/// No atomicity across keys is assumed.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// All keys starting with `prefix`, in ascending order.
    fn keys(&self, prefix: &str) -> Result<Vec<String>, PersistenceError>;
}

/// Well-known storage keys, scoped by a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    namespace: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl StorageKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn courses(&self) -> String {
        format!("{}_courses", self.namespace)
    }

    pub fn paths(&self) -> String {
        format!("{}_paths", self.namespace)
    }

    pub fn badges(&self) -> String {
        format!("{}_badges", self.namespace)
    }

    pub fn forum(&self) -> String {
        format!("{}_forum", self.namespace)
    }

    /// Progress record key for one course.
    pub fn progress(&self, course_id: &str) -> String {
        format!("{}{}", PROGRESS_KEY_PREFIX, course_id)
    }
}

/// Read and decode a JSON value.
///
/// Missing keys, adapter errors and undecodable values all come back as
/// `None`; the last two are logged.
pub fn load_json<T: DeserializeOwned>(storage: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key = %key, error = %e, "Persistence read failed");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            let error = PersistenceError::PersistenceReadFailure {
                key: key.to_string(),
                reason: e.to_string(),
            };
            warn!(error = %error, "Discarding malformed persisted data");
            None
        }
    }
}

/// Encode and write a JSON value. Failures are logged, never returned.
pub fn save_json<T: Serialize + ?Sized>(storage: &dyn KeyValueStore, key: &str, value: &T) {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(e) => {
            let error = PersistenceError::Encode {
                key: key.to_string(),
                reason: e.to_string(),
            };
            warn!(error = %error, "Persistence write skipped");
            return;
        }
    };

    if let Err(e) = storage.set(key, &encoded) {
        warn!(key = %key, error = %e, "Persistence write failed");
    }
}

/// In-memory storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let entries = self.entries.read().map_err(|_| PersistenceError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.write().map_err(|_| PersistenceError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        let entries = self.entries.read().map_err(|_| PersistenceError::Poisoned)?;
        let mut keys: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Durable storage backed by a sled database.
pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    /// Open or create the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let db = sled::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "Opened pathfinder storage");
        Ok(Self { db })
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), PersistenceError> {
        self.db.flush()?;
        Ok(())
    }
}

impl KeyValueStore for SledStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match self.db.get(key.as_bytes())? {
            Some(value) => String::from_utf8(value.to_vec())
                .map(Some)
                .map_err(|e| PersistenceError::PersistenceReadFailure {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        let mut keys = Vec::new();
        for item in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            if let Ok(key) = String::from_utf8(key.to_vec()) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}
