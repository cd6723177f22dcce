//! Conversation transcript types.
//!
//! A [`Transcript`] is the ordered history of one session's turns. It is
//! owned exclusively by the session engine for the duration of one
//! inbound-message cycle and persisted as a unit (replace-whole-value
//! semantics) under the session identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The connected user.
    Human,
    /// The generative model. Older records use the label `ai`.
    #[serde(alias = "ai")]
    Assistant,
}

/// One message in a conversation.
///
/// The assistant turn of the active cycle starts empty and grows
/// monotonically while the upstream response streams in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Who sent this turn.
    #[serde(rename = "type")]
    pub role: Role,
    /// Turn text. Mutable only for the trailing assistant turn during streaming.
    pub content: String,
    /// When the turn was first created. Absent in older stored records.
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

impl Turn {
    /// Creates a human turn.
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Ordered sequence of turns for one session.
///
/// Insertion order is semantically meaningful and never reordered; a turn's
/// sequence index is its position in the underlying vector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Creates a transcript from existing turns, preserving order.
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Appends a turn at the end.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Opens a reply cycle: appends the new human turn followed by an empty
    /// assistant turn, establishing the trailing human/assistant pair.
    pub fn begin_reply_cycle(&mut self, input: impl Into<String>) {
        self.turns.push(Turn::human(input));
        self.turns.push(Turn::assistant(""));
    }

    /// Appends text to the trailing assistant turn.
    ///
    /// If the transcript does not end with an assistant turn, a fresh one is
    /// created so accumulated output is never dropped.
    pub fn append_to_reply(&mut self, text: &str) {
        match self.turns.last_mut() {
            Some(turn) if turn.role == Role::Assistant => turn.content.push_str(text),
            _ => self.turns.push(Turn::assistant(text)),
        }
    }

    /// Returns the trailing assistant turn's content, if any.
    pub fn reply_text(&self) -> Option<&str> {
        match self.turns.last() {
            Some(turn) if turn.role == Role::Assistant => Some(turn.content.as_str()),
            _ => None,
        }
    }

    /// All turns in insertion order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when the transcript has no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_reply_cycle_appends_human_then_empty_assistant() {
        let mut transcript = Transcript::new();
        transcript.begin_reply_cycle("hi");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[0].role, Role::Human);
        assert_eq!(transcript.turns()[0].content, "hi");
        assert_eq!(transcript.turns()[1].role, Role::Assistant);
        assert_eq!(transcript.turns()[1].content, "");
    }

    #[test]
    fn append_to_reply_grows_trailing_assistant_turn() {
        let mut transcript = Transcript::new();
        transcript.begin_reply_cycle("hi");
        transcript.append_to_reply("Hello");
        transcript.append_to_reply(", world");

        assert_eq!(transcript.reply_text(), Some("Hello, world"));
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn append_to_reply_without_assistant_turn_creates_one() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::human("hi"));
        transcript.append_to_reply("answer");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.reply_text(), Some("answer"));
    }

    #[test]
    fn serializes_role_as_type_field() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::human("hello"));

        let json = serde_json::to_string(&transcript).unwrap();
        assert!(json.contains(r#""type":"human""#));
        assert!(json.contains(r#""content":"hello""#));
    }

    #[test]
    fn deserializes_legacy_ai_role_label() {
        let json = r#"[{"type":"human","content":"hi"},{"type":"ai","content":"hey"}]"#;
        let transcript: Transcript = serde_json::from_str(json).unwrap();

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[1].role, Role::Assistant);
        assert_eq!(transcript.turns()[1].content, "hey");
    }

    #[test]
    fn round_trips_through_json() {
        let mut transcript = Transcript::new();
        transcript.begin_reply_cycle("question");
        transcript.append_to_reply("answer");

        let bytes = serde_json::to_vec(&transcript).unwrap();
        let restored: Transcript = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(restored, transcript);
    }
}
