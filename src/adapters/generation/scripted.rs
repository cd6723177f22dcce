//! Scripted Generation Service for testing and development.
//!
//! Provides a configurable implementation of the `GenerationService` port,
//! allowing cycles to run without a real upstream: queued responses for
//! each of the three response shapes, invoke-time error injection, and
//! call recording for verification.
//!
//! # Example
//!
//! ```ignore
//! let service = ScriptedGenerationService::new()
//!     .with_delta_text(["Hello", ", world"])
//!     .with_invoke_error(GenerationError::transport("down"));
//! ```

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{
    CompletionChunk, DeltaEvent, GenerationError, GenerationRequest, GenerationService,
    UpstreamResponse,
};

/// A queued scripted outcome for one invocation.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Return a delta-event sequence.
    Delta(Vec<Result<DeltaEvent, GenerationError>>),
    /// Return a batch of complete outputs.
    Batch(Vec<String>),
    /// Return a legacy completion-fragment sequence.
    Legacy(Vec<Result<CompletionChunk, GenerationError>>),
    /// Fail the invocation itself, before any output.
    Fail(GenerationError),
}

/// Scripted generation service.
///
/// Responses are consumed in order; once the queue is exhausted every
/// invocation returns a one-output batch reply.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGenerationService {
    responses: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl ScriptedGenerationService {
    /// Creates a service with an empty response queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an arbitrary scripted response.
    pub fn with_response(self, response: ScriptedResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Queues a delta-event sequence that streams the given fragments and
    /// closes the content block.
    pub fn with_delta_text<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut events: Vec<Result<DeltaEvent, GenerationError>> = fragments
            .into_iter()
            .map(|f| Ok(DeltaEvent::text(f.into())))
            .collect();
        events.push(Ok(DeltaEvent::ContentBlockStop));
        self.with_response(ScriptedResponse::Delta(events))
    }

    /// Queues a batch response with the given outputs.
    pub fn with_batch<I, S>(self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_response(ScriptedResponse::Batch(
            outputs.into_iter().map(Into::into).collect(),
        ))
    }

    /// Queues a legacy completion sequence with the given fragments.
    pub fn with_legacy_text<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_response(ScriptedResponse::Legacy(
            fragments
                .into_iter()
                .map(|f| Ok(CompletionChunk::new(f.into())))
                .collect(),
        ))
    }

    /// Queues an invoke-time failure.
    pub fn with_invoke_error(self, error: GenerationError) -> Self {
        self.with_response(ScriptedResponse::Fail(error))
    }

    /// Number of invocations recorded so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All recorded invocation requests.
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self) -> ScriptedResponse {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ScriptedResponse::Batch(vec!["Scripted reply".to_string()]))
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerationService {
    async fn invoke(
        &self,
        request: GenerationRequest,
    ) -> Result<UpstreamResponse, GenerationError> {
        self.calls.lock().unwrap().push(request);

        match self.next_response() {
            ScriptedResponse::Delta(events) => {
                Ok(UpstreamResponse::Delta(Box::pin(stream::iter(events))))
            }
            ScriptedResponse::Batch(outputs) => Ok(UpstreamResponse::Batch(outputs)),
            ScriptedResponse::Legacy(chunks) => {
                Ok(UpstreamResponse::Legacy(Box::pin(stream::iter(chunks))))
            }
            ScriptedResponse::Fail(error) => Err(error),
        }
    }
}
