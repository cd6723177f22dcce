//! Key-Value Store Port - Interface to the durable byte store.
//!
//! The external store maps opaque string keys to opaque byte values. The
//! core layers transcript encoding on top of this contract; the store itself
//! (DynamoDB, Redis, a file, an in-memory map) is an adapter concern.

use async_trait::async_trait;
use thiserror::Error;

/// Port for a durable key-value byte store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    /// Writes `value` under `key`, replacing any existing value.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), KvError>;
}

/// Key-value store errors.
#[derive(Debug, Clone, Error)]
pub enum KvError {
    /// The store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the operation.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl KvError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}
