//! Demo binary: runs a few message cycles against a scripted upstream and
//! an in-memory store, printing the wire frames a connected client would
//! receive.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_relay::adapters::generation::ScriptedGenerationService;
use chat_relay::adapters::relay::DuplexRelay;
use chat_relay::adapters::store::{InMemoryKeyValueStore, KvSessionStore};
use chat_relay::application::{InboundMessage, SessionEngine};
use chat_relay::config::AppConfig;
use chat_relay::ports::{
    ConnectionSink, ConnectionTarget, DeliveryError, GenerationError, SessionStore,
};

/// Connection sink that writes each frame to stdout.
struct StdoutSink;

#[async_trait]
impl ConnectionSink for StdoutSink {
    async fn post(&self, target: &ConnectionTarget, payload: &str) -> Result<(), DeliveryError> {
        println!("-> [{}] {payload}", target.connection_id);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate()?;
    info!(
        model = %config.generation.model,
        variant = ?config.generation.variant,
        table = %config.store.table_name,
        "configuration loaded"
    );

    let kv = Arc::new(InMemoryKeyValueStore::new());
    let store = Arc::new(KvSessionStore::new(
        Arc::clone(&kv),
        &config.store.table_name,
    ));
    let service = Arc::new(
        ScriptedGenerationService::new()
            .with_delta_text(["Hello", "! How can I help", " you today?"])
            .with_delta_text(["You said: hi"])
            .with_invoke_error(GenerationError::transport("upstream unreachable")),
    );
    let engine = SessionEngine::new(
        service,
        Arc::clone(&store),
        DuplexRelay::new(Arc::new(StdoutSink)),
        config.generation,
    )?;

    for input in ["hi", "what did I just say?", "still there?"] {
        let result = engine
            .handle(InboundMessage::new("demo-session", "local", "conn-1", input))
            .await;
        info!(?result, input, "cycle finished");
    }

    let transcript = store.load("demo-session").await;
    info!(turns = transcript.len(), "final transcript");
    for turn in transcript.turns() {
        println!("{:?}: {}", turn.role, turn.content);
    }

    Ok(())
}
