//! Normalized output events.
//!
//! Every upstream response shape is flattened into one uniform sequence of
//! [`OutputEvent`]s: zero or more `Token`s closed by exactly one terminal
//! `End` or `Error`. The relay and the session engine's accumulator both
//! consume this representation and nothing else.

use std::fmt;

/// One normalized event from an upstream generation response.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// A fragment of generated text.
    Token(String),
    /// Successful end of the sequence.
    End,
    /// The sequence failed; any tokens seen so far are still valid output.
    Error(StreamFault),
}

impl OutputEvent {
    /// Creates a token event.
    pub fn token(text: impl Into<String>) -> Self {
        Self::Token(text.into())
    }

    /// True for `End` and `Error`, the two terminal events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End | Self::Error(_))
    }
}

/// Why an event sequence terminated abnormally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The upstream transport failed mid-sequence.
    Transport,
    /// The upstream payload could not be interpreted.
    Protocol,
}

/// A normalized mid-stream failure.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamFault {
    /// Failure category.
    pub kind: FaultKind,
    /// Human-readable cause.
    pub message: String,
}

impl StreamFault {
    /// Creates a transport fault.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::Transport,
            message: message.into(),
        }
    }

    /// Creates a protocol fault.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::Protocol,
            message: message.into(),
        }
    }
}

impl fmt::Display for StreamFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FaultKind::Transport => write!(f, "transport fault: {}", self.message),
            FaultKind::Protocol => write!(f, "protocol fault: {}", self.message),
        }
    }
}
