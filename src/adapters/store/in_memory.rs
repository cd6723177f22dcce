//! In-Memory Key-Value Store Adapter
//!
//! Stores values in a process-local map. Useful for testing and
//! development; write failures can be injected to exercise persistence
//! error paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{KeyValueStore, KvError};

/// In-memory implementation of the durable key-value store contract.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryKeyValueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `put` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Inserts a raw value directly, bypassing the port (useful for
    /// seeding corrupt data in tests).
    pub async fn insert_raw(&self, key: impl Into<String>, value: Vec<u8>) {
        self.entries.write().await.insert(key.into(), value);
    }

    /// Number of stored keys.
    pub async fn key_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Clear all stored data (useful for tests).
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), KvError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::unavailable("injected write failure"));
        }
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
