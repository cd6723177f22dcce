//! Generation Service Port - Interface to the upstream generative text
//! service.
//!
//! The upstream returns its output in one of three shapes, modeled as a
//! tagged [`UpstreamResponse`]: a stream of framed delta events, a single
//! batch of complete outputs, or a legacy stream of completion fragments.
//! The normalizer (`adapters::normalize`) flattens all three into the
//! uniform event sequence the rest of the core consumes.

use async_trait::async_trait;
use futures::Stream;
use serde::Deserialize;
use std::pin::Pin;
use thiserror::Error;

use crate::domain::StreamFault;

/// Stream of framed delta events from an incremental upstream.
pub type DeltaEventStream =
    Pin<Box<dyn Stream<Item = Result<DeltaEvent, GenerationError>> + Send>>;

/// Stream of legacy completion fragments.
pub type CompletionStream =
    Pin<Box<dyn Stream<Item = Result<CompletionChunk, GenerationError>> + Send>>;

/// Port for invoking the upstream generative text service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Invokes generation for a composed prompt.
    ///
    /// May fail before producing any output; the engine surfaces such a
    /// failure as an immediate `Error` event.
    async fn invoke(&self, request: GenerationRequest) -> Result<UpstreamResponse, GenerationError>;
}

/// Request for one generation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Model identifier.
    pub model: String,
    /// The fully composed prompt.
    pub prompt: String,
    /// System instruction, where the upstream supports one.
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Top-k sampling cutoff.
    pub top_k: Option<u32>,
    /// Nucleus sampling cutoff.
    pub top_p: Option<f32>,
    /// Sequences that stop generation.
    pub stop_sequences: Vec<String>,
}

impl GenerationRequest {
    /// Creates a request with the given model and prompt and default sampling.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: 0.1,
            top_k: None,
            top_p: None,
            stop_sequences: Vec::new(),
        }
    }

    /// Sets the system instruction.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the stop sequences.
    pub fn with_stop_sequences(mut self, sequences: Vec<String>) -> Self {
        self.stop_sequences = sequences;
        self
    }
}

/// One of the three response shapes an upstream may return.
pub enum UpstreamResponse {
    /// A sequence of framed incremental events.
    Delta(DeltaEventStream),
    /// A single response holding complete outputs in order.
    Batch(Vec<String>),
    /// A sequence of legacy single-field completion fragments.
    Legacy(CompletionStream),
}

impl UpstreamResponse {
    /// Short name of the shape, for logs and protocol faults.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Delta(_) => "delta",
            Self::Batch(_) => "batch",
            Self::Legacy(_) => "legacy",
        }
    }
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delta(_) => f.write_str("UpstreamResponse::Delta(..)"),
            Self::Batch(outputs) => f.debug_tuple("UpstreamResponse::Batch").field(outputs).finish(),
            Self::Legacy(_) => f.write_str("UpstreamResponse::Legacy(..)"),
        }
    }
}

/// One framed event from an incremental-delta upstream.
///
/// The event vocabulary grows over time; kinds this core does not recognize
/// deserialize to `Other` and are skipped by the normalizer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeltaEvent {
    /// A fragment of generated text.
    ContentBlockDelta {
        /// The delta payload.
        delta: TextDelta,
    },
    /// End of one content block.
    ContentBlockStop,
    /// Any event kind this core does not recognize.
    #[serde(other)]
    Other,
}

impl DeltaEvent {
    /// Creates a content-delta event carrying `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self::ContentBlockDelta {
            delta: TextDelta {
                text: Some(text.into()),
            },
        }
    }
}

/// Text payload of a content-delta event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextDelta {
    /// The text fragment, absent for non-text deltas.
    pub text: Option<String>,
}

/// One fragment from a legacy single-field upstream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionChunk {
    /// The completion fragment.
    pub completion: String,
}

impl CompletionChunk {
    /// Creates a chunk.
    pub fn new(completion: impl Into<String>) -> Self {
        Self {
            completion: completion.into(),
        }
    }
}

/// Upstream generation errors.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The transport to the upstream failed.
    #[error("upstream transport fault: {message}")]
    Transport {
        /// Error details.
        message: String,
    },

    /// The upstream payload did not match any known shape.
    #[error("upstream protocol fault: {message}")]
    Protocol {
        /// Error details.
        message: String,
    },
}

impl GenerationError {
    /// Creates a transport fault.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a protocol fault.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

impl From<GenerationError> for StreamFault {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Transport { message } => StreamFault::transport(message),
            GenerationError::Protocol { message } => StreamFault::protocol(message),
        }
    }
}
