//! # Chat Relay
//!
//! Streaming core of a conversational chat service. Each inbound user
//! message on a persistent duplex connection runs one cycle:
//!
//! 1. Load the session transcript from the durable store (missing or
//!    corrupt history reads as empty).
//! 2. Compose a prompt from the prior turns and the new input.
//! 3. Invoke the upstream generative service and normalize its response -
//!    incremental delta events, a batch of complete outputs, or a legacy
//!    completion stream - into one uniform event sequence.
//! 4. Relay `token` frames to the client as they arrive, closing with
//!    exactly one `end` frame per cycle.
//! 5. Persist the updated transcript once, including everything that was
//!    accumulated even when the client went away or the upstream failed
//!    mid-stream.
//!
//! ## Architecture
//!
//! The crate follows hexagonal architecture:
//!
//! - [`domain`] - transcripts, prompt composition, the normalized event
//!   vocabulary. No IO.
//! - [`ports`] - traits for the store, the generation service, and the
//!   connection sink.
//! - [`adapters`] - response normalization, the wire-frame relay, and the
//!   store and generation implementations.
//! - [`application`] - the [`application::SessionEngine`] orchestrating a
//!   full cycle.
//! - [`config`] - environment-driven configuration.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chat_relay::adapters::generation::ScriptedGenerationService;
//! use chat_relay::adapters::relay::DuplexRelay;
//! use chat_relay::adapters::store::{InMemoryKeyValueStore, KvSessionStore};
//! use chat_relay::application::{InboundMessage, SessionEngine};
//! use chat_relay::config::AppConfig;
//! use chat_relay::ports::{ConnectionSink, ConnectionTarget, DeliveryError};
//!
//! struct StdoutSink;
//!
//! #[async_trait::async_trait]
//! impl ConnectionSink for StdoutSink {
//!     async fn post(&self, _: &ConnectionTarget, payload: &str) -> Result<(), DeliveryError> {
//!         println!("{payload}");
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//!
//! let store = Arc::new(KvSessionStore::new(
//!     Arc::new(InMemoryKeyValueStore::new()),
//!     &config.store.table_name,
//! ));
//! let service = Arc::new(ScriptedGenerationService::new().with_delta_text(["Hello"]));
//! let engine = SessionEngine::new(
//!     service,
//!     store,
//!     DuplexRelay::new(Arc::new(StdoutSink)),
//!     config.generation,
//! )?;
//!
//! let result = engine
//!     .handle(InboundMessage::new("session-1", "local", "conn-1", "hi"))
//!     .await;
//! println!("{result:?}");
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
