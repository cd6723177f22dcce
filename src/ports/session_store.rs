//! Session Store Port - durable transcript persistence per session.
//!
//! `load` is deliberately infallible: a missing key or a malformed stored
//! value is treated as "no history" rather than propagated, since losing
//! history is recoverable but crashing the conversation is not. `save`
//! failures are surfaced to the caller and never unwind events the client
//! has already seen.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Transcript;

/// Port for loading and saving session transcripts.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the transcript for a session.
    ///
    /// Returns an empty transcript on a missing key, a read failure, or a
    /// corrupt stored value.
    async fn load(&self, session_id: &str) -> Transcript;

    /// Persists the transcript as a unit, replacing any stored value.
    async fn save(&self, session_id: &str, transcript: &Transcript) -> Result<(), StoreError>;
}

/// Session store write errors.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The transcript could not be encoded for storage.
    #[error("transcript serialization failed: {0}")]
    Serialization(String),

    /// The underlying store rejected the write.
    #[error("transcript write failed: {0}")]
    Write(String),
}
