//! Upstream Response Normalizer.
//!
//! Converts each of the three upstream response shapes into one uniform,
//! lazy sequence of [`OutputEvent`]s. Whatever the variant, the produced
//! sequence is finite, ends in exactly one terminal event (`End` or
//! `Error`), and never emits a `Token` after the terminal event. Transport
//! faults mid-sequence become a single `Error` event rather than a raw
//! failure.
//!
//! The variant is selected by configuration, not by inspecting response
//! fields at call sites; a response whose shape contradicts the configured
//! variant is a protocol fault for the whole cycle.

pub mod batch;
pub mod delta;
pub mod legacy;

use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use tracing::warn;

use crate::config::UpstreamVariant;
use crate::domain::{OutputEvent, StreamFault};
use crate::ports::{GenerationError, UpstreamResponse};

/// A normalized, finite event sequence.
pub type OutputEventStream = Pin<Box<dyn Stream<Item = OutputEvent> + Send>>;

/// Normalizes an upstream response according to the configured variant.
pub fn normalize(response: UpstreamResponse, variant: UpstreamVariant) -> OutputEventStream {
    match (variant, response) {
        (UpstreamVariant::Delta, UpstreamResponse::Delta(events)) => delta::normalize(events),
        (UpstreamVariant::Batch, UpstreamResponse::Batch(outputs)) => batch::normalize(outputs),
        (UpstreamVariant::Legacy, UpstreamResponse::Legacy(chunks)) => legacy::normalize(chunks),
        (variant, response) => {
            warn!(
                expected = ?variant,
                got = response.shape_name(),
                "upstream response shape contradicts configured variant"
            );
            single_fault(StreamFault::protocol(format!(
                "expected {:?} response, upstream returned {}",
                variant,
                response.shape_name()
            )))
        }
    }
}

/// A sequence holding exactly one `Error` event.
///
/// Used when the upstream fails before producing any output, or when the
/// response shape cannot be interpreted at all.
pub fn single_fault(fault: StreamFault) -> OutputEventStream {
    Box::pin(stream::iter([OutputEvent::Error(fault)]))
}

/// Closes a fallible token stream with exactly one terminal event.
///
/// Each `Ok` fragment becomes a `Token`. The first `Err` becomes an `Error`
/// event and the rest of the underlying sequence is abandoned; a clean end
/// of the sequence becomes `End`. Nothing is emitted after the terminal
/// event.
pub(crate) fn terminated<S>(tokens: S) -> OutputEventStream
where
    S: Stream<Item = Result<String, GenerationError>> + Send + 'static,
{
    enum State {
        Streaming(stream::BoxStream<'static, Result<String, GenerationError>>),
        Closed,
    }

    Box::pin(stream::unfold(
        State::Streaming(tokens.boxed()),
        |state| async move {
            match state {
                State::Streaming(mut inner) => match inner.next().await {
                    Some(Ok(text)) => {
                        Some((OutputEvent::Token(text), State::Streaming(inner)))
                    }
                    Some(Err(err)) => Some((OutputEvent::Error(err.into()), State::Closed)),
                    None => Some((OutputEvent::End, State::Closed)),
                },
                State::Closed => None,
            }
        },
    ))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Collects a normalized stream and asserts the terminal-event
    /// guarantees shared by all variants.
    pub async fn collect_checked(stream: OutputEventStream) -> Vec<OutputEvent> {
        let events: Vec<OutputEvent> = stream.collect().await;

        let terminal_count = events.iter().filter(|e| e.is_terminal()).count();
        assert_eq!(terminal_count, 1, "expected exactly one terminal event");
        assert!(
            events.last().is_some_and(OutputEvent::is_terminal),
            "terminal event must be last"
        );
        events
    }

    /// Concatenation of all token texts in the sequence.
    pub fn token_text(events: &[OutputEvent]) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                OutputEvent::Token(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
