//! Duplex Relay - frame delivery to connected clients.
//!
//! Wire protocol, in order per cycle: zero or more
//! `{"kind":"token","chunk":<text>}` frames, optionally one
//! `{"kind":"error"}` when the upstream failed mid-stream, and always
//! exactly one closing `{"kind":"end"}`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ports::{ConnectionSink, ConnectionTarget, DeliveryError};

/// One wire frame sent to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Frame {
    /// A fragment of the reply.
    Token {
        /// The text fragment.
        chunk: String,
    },
    /// The deterministic terminal signal; every cycle closes with one.
    End,
    /// The upstream failed; a closing `End` still follows.
    Error,
}

impl Frame {
    /// Creates a token frame.
    pub fn token(chunk: impl Into<String>) -> Self {
        Self::Token {
            chunk: chunk.into(),
        }
    }
}

/// Delivers frames to a connection, best-effort per frame.
///
/// A failed send is reported to the caller but must never stop the caller
/// from draining the rest of the event sequence: a dropped client does not
/// truncate transcript accumulation.
#[derive(Clone)]
pub struct DuplexRelay<C: ConnectionSink> {
    sink: Arc<C>,
}

impl<C: ConnectionSink> DuplexRelay<C> {
    /// Creates a relay over the given connection sink.
    pub fn new(sink: Arc<C>) -> Self {
        Self { sink }
    }

    /// Serializes and posts one frame.
    pub async fn send(&self, target: &ConnectionTarget, frame: &Frame) -> Result<(), DeliveryError> {
        let payload =
            serde_json::to_string(frame).map_err(|e| DeliveryError::send(e.to_string()))?;
        self.sink.post(target, &payload).await
    }
}
