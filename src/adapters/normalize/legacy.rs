//! Legacy single-field normalization.
//!
//! The upstream emits framed events each carrying one `completion` text
//! fragment. Fragments map 1:1 to `Token`s, followed by `End` when the
//! upstream sequence closes.

use futures::StreamExt;

use super::{terminated, OutputEventStream};
use crate::ports::CompletionStream;

/// Normalizes a stream of legacy completion fragments.
pub fn normalize(chunks: CompletionStream) -> OutputEventStream {
    terminated(chunks.map(|item| item.map(|chunk| chunk.completion)))
}
