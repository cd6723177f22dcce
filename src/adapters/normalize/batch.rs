//! Batch-multi-output normalization.
//!
//! The upstream returns one non-streaming response holding an ordered list
//! of complete outputs. Each output becomes one `Token`, in list order,
//! followed by `End`. There is no streaming latency win in this variant; it
//! exists to present the uniform interface over a non-streaming upstream.

use futures::stream;

use super::OutputEventStream;
use crate::domain::OutputEvent;

/// Normalizes a batch of complete outputs.
///
/// A batch with zero outputs is an empty reply, not an error: the sequence
/// is just `End`.
pub fn normalize(outputs: Vec<String>) -> OutputEventStream {
    Box::pin(stream::iter(
        outputs
            .into_iter()
            .map(OutputEvent::Token)
            .chain(std::iter::once(OutputEvent::End)),
    ))
}
