//! Persistent store adapter.
//!
//! Three independent keyed blobs: the board collection, the feedback
//! collection and the escalation collection. Every write serializes the whole
//! collection. A missing or malformed blob reads as "nothing stored"; a
//! failed read is an error, so callers never mistake it for an empty store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::db::Database;
use crate::models::{Board, EscalationRecord, FeedbackRecord};

pub const BOARDS_KEY: &str = "taskpilot.boards";
pub const FEEDBACK_KEY: &str = "taskpilot.feedback";
pub const ESCALATIONS_KEY: &str = "taskpilot.escalations";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// A key-value store holding whole serialized blobs.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl BlobStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_blob(key)?)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Ok(self.put_blob(key, value)?)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.delete_blob(key)?;
        Ok(())
    }
}

/// Volatile store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let blobs = self.blobs.lock().expect("memory store lock poisoned");
        Ok(blobs.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut blobs = self.blobs.lock().expect("memory store lock poisoned");
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut blobs = self.blobs.lock().expect("memory store lock poisoned");
        blobs.remove(key);
        Ok(())
    }
}

/// Typed access to the persisted collections. Cheap to clone; clones share
/// the same backend.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn BlobStore>,
}

impl Store {
    pub fn new(backend: impl BlobStore + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// The persisted board collection, `Ok(None)` when the blob is absent or
    /// cannot be parsed.
    pub fn load_boards(&self) -> Result<Option<Vec<Board>>, StoreError> {
        self.load(BOARDS_KEY)
    }

    pub fn save_boards(&self, boards: &[Board]) -> Result<(), StoreError> {
        self.save(BOARDS_KEY, boards)
    }

    pub fn feedback(&self) -> Vec<FeedbackRecord> {
        self.load_or_empty(FEEDBACK_KEY)
    }

    pub fn append_feedback(&self, record: FeedbackRecord) -> Result<(), StoreError> {
        self.append(FEEDBACK_KEY, record)
    }

    pub fn escalations(&self) -> Vec<EscalationRecord> {
        self.load_or_empty(ESCALATIONS_KEY)
    }

    pub fn append_escalation(&self, record: EscalationRecord) -> Result<(), StoreError> {
        self.append(ESCALATIONS_KEY, record)
    }

    /// Raw access, mostly for inspecting what is on disk.
    pub fn raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.backend.get(key)
    }

    pub fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(key)
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>, StoreError> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Ok(Some(items)),
            Err(e) => {
                tracing::warn!("Discarding malformed {} blob: {}", key, e);
                Ok(None)
            }
        }
    }

    fn load_or_empty<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.load(key) {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                Vec::new()
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(items).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.backend.put(key, &raw)
    }

    fn append<T: Serialize + DeserializeOwned>(&self, key: &str, item: T) -> Result<(), StoreError> {
        let mut items: Vec<T> = self.load(key)?.unwrap_or_default();
        items.push(item);
        self.save(key, &items)
    }
}
