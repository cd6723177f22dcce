//! Session store over any key-value backend.
//!
//! Composes the durable byte store collaborator with a JSON transcript
//! codec and a table-name key prefix. Read faults and corrupt stored
//! values are recovered locally as "no history": losing history is
//! recoverable, crashing the conversation is not.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::domain::Transcript;
use crate::ports::{KeyValueStore, SessionStore, StoreError};

/// [`SessionStore`] backed by any [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct KvSessionStore<K> {
    store: Arc<K>,
    table_name: String,
}

impl<K: KeyValueStore> KvSessionStore<K> {
    /// Creates a session store writing under the given table name.
    pub fn new(store: Arc<K>, table_name: impl Into<String>) -> Self {
        Self {
            store,
            table_name: table_name.into(),
        }
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}/{}", self.table_name, session_id)
    }
}

#[async_trait]
impl<K: KeyValueStore> SessionStore for KvSessionStore<K> {
    async fn load(&self, session_id: &str) -> Transcript {
        let key = self.key(session_id);
        match self.store.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(transcript) => transcript,
                Err(err) => {
                    warn!(session_id, %err, "stored transcript is malformed, starting fresh");
                    Transcript::new()
                }
            },
            Ok(None) => Transcript::new(),
            Err(err) => {
                warn!(session_id, %err, "transcript read failed, starting fresh");
                Transcript::new()
            }
        }
    }

    async fn save(&self, session_id: &str, transcript: &Transcript) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(transcript)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store
            .put(&self.key(session_id), bytes)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))
    }
}
