//! Incremental-delta normalization.
//!
//! The upstream emits framed events: content-deltas carrying text
//! fragments, block-stop markers, and an open-ended set of other kinds.
//! Content-deltas become `Token`s, a block-stop becomes a newline `Token`,
//! and unrecognized kinds are skipped — forward compatibility with upstream
//! event vocabulary growth is a requirement here, not an oversight.

use futures::StreamExt;

use super::{terminated, OutputEventStream};
use crate::ports::{DeltaEvent, DeltaEventStream};

/// Normalizes a stream of framed delta events.
pub fn normalize(events: DeltaEventStream) -> OutputEventStream {
    let tokens = events.filter_map(|item| async move {
        match item {
            Ok(DeltaEvent::ContentBlockDelta { delta }) => {
                delta.text.filter(|text| !text.is_empty()).map(Ok)
            }
            Ok(DeltaEvent::ContentBlockStop) => Some(Ok("\n".to_string())),
            Ok(DeltaEvent::Other) => None,
            Err(err) => Some(Err(err)),
        }
    });
    terminated(tokens)
}
