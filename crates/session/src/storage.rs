//! Persistence boundary for the session record.
//!
//! Modeled as a plain string key-value store, matching the browser-storage
//! shape of the deployment target. The store writes exactly two keys.

use std::collections::HashMap;

use thiserror::Error;

/// Key holding the JSON-serialized session record.
pub const SESSION_KEY: &str = "korbly_user";

/// Key holding the RFC 3339 timestamp of the last tracked activity.
pub const LAST_ACTIVITY_KEY: &str = "last_activity";

/// Storage backend failure (I/O, quota, etc).
///
/// Note that a *corrupt* stored value is not an error at this layer: the
/// session store discards it silently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Key-value persistence used for the session record.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage for tests and embedding without a persistent backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded storage, for restore tests.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
