//! Session engine.
//!
//! Orchestrates one inbound message end to end: load history, compose the
//! prompt, invoke upstream generation, relay the normalized event stream to
//! the client while accumulating the reply, and persist the updated
//! transcript exactly once at the end of the cycle.
//!
//! # Concurrency
//!
//! Each inbound message is handled independently; the only shared resource
//! is the external store, keyed by session identifier. Two concurrent
//! messages for the same session both load the same prior transcript and
//! the later save wins — last-writer-wins is the accepted policy here, not
//! a serializable session guarantee.

use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::normalize::{normalize, single_fault};
use crate::adapters::relay::{DuplexRelay, Frame};
use crate::config::GenerationConfig;
use crate::domain::{OutputEvent, PromptComposer, Transcript};
use crate::ports::{
    ConnectionSink, ConnectionTarget, GenerationRequest, GenerationService, SessionStore,
};

/// One inbound user message on a duplex connection.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Session identifier, the durable store key.
    pub session_id: String,
    /// Routable endpoint descriptor of the connection.
    pub endpoint: String,
    /// Stable per-connection identifier.
    pub connection_id: String,
    /// The new human input text.
    pub input: String,
}

impl InboundMessage {
    /// Creates an inbound message.
    pub fn new(
        session_id: impl Into<String>,
        endpoint: impl Into<String>,
        connection_id: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            endpoint: endpoint.into(),
            connection_id: connection_id.into(),
            input: input.into(),
        }
    }
}

/// Phase of one message-handling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    HistoryLoaded,
    Prompted,
    Streaming,
    Finalizing,
    Done,
    Failed,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::HistoryLoaded => "history_loaded",
            Self::Prompted => "prompted",
            Self::Streaming => "streaming",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal status of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// Streaming and persistence both succeeded.
    Done,
    /// The upstream errored mid-cycle or the transcript save failed.
    /// Accumulated output is still persisted where possible.
    Failed,
}

/// Outcome of handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleResult {
    /// Terminal status.
    pub status: CycleStatus,
    /// Frames successfully delivered to the connection.
    pub delivered_event_count: usize,
    /// Whether the updated transcript was persisted.
    pub persisted: bool,
}

/// Orchestrates message-handling cycles.
///
/// All collaborators are injected: the store, the generation service, and
/// the relay's connection sink. One engine, parameterized by
/// [`GenerationConfig`], replaces a handler per upstream model.
pub struct SessionEngine<G, S, C>
where
    G: GenerationService,
    S: SessionStore,
    C: ConnectionSink,
{
    generator: Arc<G>,
    store: Arc<S>,
    relay: DuplexRelay<C>,
    config: GenerationConfig,
    composer: PromptComposer,
}

impl<G, S, C> SessionEngine<G, S, C>
where
    G: GenerationService,
    S: SessionStore,
    C: ConnectionSink,
{
    /// Creates an engine from its collaborators and configuration.
    ///
    /// Fails only when the configured prompt template is invalid.
    pub fn new(
        generator: Arc<G>,
        store: Arc<S>,
        relay: DuplexRelay<C>,
        config: GenerationConfig,
    ) -> Result<Self, crate::config::ValidationError> {
        let composer = config.composer()?;
        Ok(Self {
            generator,
            store,
            relay,
            config,
            composer,
        })
    }

    /// Handles one inbound message through a full cycle.
    ///
    /// Never returns early: delivery failures and upstream errors are
    /// absorbed so the transcript is always accumulated in full and the
    /// final save is always attempted. The client observes exactly one
    /// closing `end` frame per cycle.
    pub async fn handle(&self, message: InboundMessage) -> CycleResult {
        let cycle_id = Uuid::new_v4();
        let mut phase = CyclePhase::Idle;
        let target = ConnectionTarget::new(&message.endpoint, &message.connection_id);

        let mut transcript = self.store.load(&message.session_id).await;
        self.advance(cycle_id, &mut phase, CyclePhase::HistoryLoaded);

        // Compose from prior turns only, then open the reply cycle; the new
        // input reaches the prompt through the template's {input} slot.
        let prompt = self.composer.compose(&transcript, &message.input);
        transcript.begin_reply_cycle(&message.input);
        self.advance(cycle_id, &mut phase, CyclePhase::Prompted);

        let mut events = match self.generator.invoke(self.build_request(prompt)).await {
            Ok(response) => normalize(response, self.config.variant),
            Err(err) => {
                warn!(%cycle_id, session_id = %message.session_id, %err, "upstream invocation failed");
                single_fault(err.into())
            }
        };
        self.advance(cycle_id, &mut phase, CyclePhase::Streaming);

        let mut delivered = 0usize;
        let mut delivery_failures = 0usize;
        let mut failed = false;

        while let Some(event) = events.next().await {
            match event {
                OutputEvent::Token(text) => {
                    // Accumulate before relaying: a dropped client must not
                    // truncate the transcript.
                    transcript.append_to_reply(&text);
                    match self.relay.send(&target, &Frame::token(text)).await {
                        Ok(()) => delivered += 1,
                        Err(err) => {
                            delivery_failures += 1;
                            debug!(%cycle_id, %err, "token frame not delivered");
                        }
                    }
                }
                OutputEvent::Error(fault) => {
                    failed = true;
                    warn!(%cycle_id, session_id = %message.session_id, %fault, "upstream stream failed");
                    match self.relay.send(&target, &Frame::Error).await {
                        Ok(()) => delivered += 1,
                        Err(err) => {
                            delivery_failures += 1;
                            debug!(%cycle_id, %err, "error frame not delivered");
                        }
                    }
                }
                OutputEvent::End => {}
            }
        }
        self.advance(cycle_id, &mut phase, CyclePhase::Finalizing);

        // Exactly one closing end frame per cycle, whatever came before.
        match self.relay.send(&target, &Frame::End).await {
            Ok(()) => delivered += 1,
            Err(err) => {
                delivery_failures += 1;
                debug!(%cycle_id, %err, "end frame not delivered");
            }
        }

        let persisted = match self
            .store
            .save(&message.session_id, &transcript)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                failed = true;
                warn!(%cycle_id, session_id = %message.session_id, %err, "transcript save failed");
                false
            }
        };

        let status = if failed {
            self.advance(cycle_id, &mut phase, CyclePhase::Failed);
            CycleStatus::Failed
        } else {
            self.advance(cycle_id, &mut phase, CyclePhase::Done);
            CycleStatus::Done
        };

        if delivery_failures > 0 {
            info!(
                %cycle_id,
                session_id = %message.session_id,
                delivery_failures,
                "client missed frames during cycle"
            );
        }

        CycleResult {
            status,
            delivered_event_count: delivered,
            persisted,
        }
    }

    fn build_request(&self, prompt: String) -> GenerationRequest {
        GenerationRequest {
            model: self.config.model.clone(),
            prompt,
            system_prompt: self.config.system_prompt.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_k: self.config.top_k,
            top_p: self.config.top_p,
            stop_sequences: self.config.stop_sequences.clone(),
        }
    }

    fn advance(&self, cycle_id: Uuid, phase: &mut CyclePhase, next: CyclePhase) {
        debug!(%cycle_id, from = %phase, to = %next, "cycle phase transition");
        *phase = next;
    }
}
