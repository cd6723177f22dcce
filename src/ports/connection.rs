//! Connection Port - Interface to the duplex connection endpoint.
//!
//! A client is addressed by a routable endpoint descriptor plus a stable
//! per-connection identifier. Delivery is best-effort: a failed post means
//! the peer is gone or unreachable for that frame, never that the cycle
//! should stop.

use async_trait::async_trait;
use thiserror::Error;

/// Address of one connected client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// Routable endpoint descriptor (e.g. host + stage).
    pub endpoint: String,
    /// Stable identifier of the connection at that endpoint.
    pub connection_id: String,
}

impl ConnectionTarget {
    /// Creates a connection target.
    pub fn new(endpoint: impl Into<String>, connection_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connection_id: connection_id.into(),
        }
    }
}

/// Port for posting framed payloads to a duplex connection.
#[async_trait]
pub trait ConnectionSink: Send + Sync {
    /// Posts one serialized frame to the connection.
    async fn post(&self, target: &ConnectionTarget, payload: &str) -> Result<(), DeliveryError>;
}

/// Frame delivery errors.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// The peer disconnected; the connection id no longer routes anywhere.
    #[error("peer gone")]
    PeerGone,

    /// The frame could not be sent.
    #[error("send failed: {0}")]
    Send(String),
}

impl DeliveryError {
    /// Creates a send error.
    pub fn send(message: impl Into<String>) -> Self {
        Self::Send(message.into())
    }
}
