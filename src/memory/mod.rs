//! Durable agent memory.
//!
//! The agent keeps a small key-value document: the last fetched payload
//! under [`SNAPSHOT_KEY`] and its health bookkeeping under [`STATUS_KEY`].
//! The store is injected, so tests run against [`InMemoryStore`] and the
//! binary against [`FileMemoryStore`].

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileMemoryStore;

use std::io;
use std::sync::RwLock;

use serde_json::{Map, Value};
use thiserror::Error;

/// Key of the remembered snapshot.
pub const SNAPSHOT_KEY: &str = "last_status";

/// Key of the health status record.
pub const STATUS_KEY: &str = "status";

/// Result of reading one key from memory.
///
/// Read-side problems are modeled as values rather than errors so the
/// agent can degrade to "nothing remembered".
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    /// The key holds a value.
    Loaded(Value),

    /// Nothing is stored under the key.
    NotFound,

    /// The backing storage exists but cannot be interpreted.
    /// It will be overwritten by the next write.
    Corrupted {
        /// Reason for corruption (for logging).
        reason: String,
    },
}

impl LoadResult {
    /// Returns the loaded value, if any.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::NotFound | Self::Corrupted { .. } => None,
        }
    }
}

/// Errors that can occur while writing memory.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Failed to write the memory file.
    #[error("Failed to write memory file: {0}")]
    Write(#[source] io::Error),

    /// Failed to serialize memory to JSON.
    #[error("Failed to serialize memory: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The background write task did not complete.
    #[error("Memory write task failed: {0}")]
    Task(String),
}

/// Key-value memory scoped to one agent identity.
///
/// Callers must not interleave writes to the same store from concurrent
/// runs; the agent reads and writes sequentially within one run.
pub trait MemoryStore: Send + Sync {
    /// Reads the value stored under `key`.
    fn read(&self, key: &str) -> impl std::future::Future<Output = LoadResult> + Send;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn write(
        &self,
        key: &str,
        value: Value,
    ) -> impl std::future::Future<Output = Result<(), MemoryError>> + Send;
}

/// Non-durable [`MemoryStore`] backed by a map.
///
/// Useful for embedding the agent and for deterministic tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<Map<String, Value>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: Value) -> Self {
        let mut entries = Map::new();
        entries.insert(key.into(), value);
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Returns a copy of the value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.load(key).into_value()
    }

    fn load(&self, key: &str) -> LoadResult {
        let Ok(entries) = self.entries.read() else {
            return LoadResult::Corrupted {
                reason: "memory lock poisoned".to_string(),
            };
        };
        entries
            .get(key)
            .cloned()
            .map_or(LoadResult::NotFound, LoadResult::Loaded)
    }
}

impl MemoryStore for InMemoryStore {
    async fn read(&self, key: &str) -> LoadResult {
        self.load(key)
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), MemoryError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| MemoryError::Task(e.to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
