//! Prompt composition.
//!
//! Renders a transcript plus the new human input into the single prompt
//! string sent upstream. Pure functions only: no truncation, no side
//! effects. Truncation and length limits are a caller policy.

use thiserror::Error;

use super::transcript::{Role, Transcript};

/// Fixed label for human turns in the rendered history block.
pub const HUMAN_LABEL: &str = "Human";

/// Template slot for the rendered history block.
const HISTORY_SLOT: &str = "{history}";
/// Template slot for the new human input.
const INPUT_SLOT: &str = "{input}";

/// Default template, in the escaped form it arrives from the environment.
pub const DEFAULT_TEMPLATE: &str = "\\n{history}\\n\\nHuman: {input}\\n\\nAssistant:\\n";

/// Errors raised while validating a prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template has no {{input}} slot")]
    MissingInputSlot,

    #[error("template has more than one {{input}} slot")]
    DuplicateInputSlot,

    #[error("template has more than one {{history}} slot")]
    DuplicateHistorySlot,
}

/// A prompt template with `{history}` and `{input}` slots.
///
/// `{input}` is required and must appear exactly once so a rendered prompt
/// carries the new input exactly once. `{history}` is optional but may not
/// repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate(String);

impl PromptTemplate {
    /// Validates and wraps a template string.
    pub fn new(template: impl Into<String>) -> Result<Self, TemplateError> {
        let template = template.into();
        match template.matches(INPUT_SLOT).count() {
            0 => return Err(TemplateError::MissingInputSlot),
            1 => {}
            _ => return Err(TemplateError::DuplicateInputSlot),
        }
        if template.matches(HISTORY_SLOT).count() > 1 {
            return Err(TemplateError::DuplicateHistorySlot);
        }
        Ok(Self(template))
    }

    /// Builds a template from the escaped form used in environment
    /// variables, where newlines arrive as literal `\n` sequences.
    pub fn from_env_escaped(template: &str) -> Result<Self, TemplateError> {
        Self::new(template.replace("\\n", "\n"))
    }

    /// Substitutes the history block and the new input into the template.
    pub fn render(&self, history: &str, input: &str) -> String {
        self.0
            .replace(HISTORY_SLOT, history)
            .replace(INPUT_SLOT, input)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::from_env_escaped(DEFAULT_TEMPLATE)
            .unwrap_or_else(|_| Self(String::from(INPUT_SLOT)))
    }
}

/// Renders transcripts into prompts using a fixed template and role labels.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    template: PromptTemplate,
    assistant_label: String,
}

impl PromptComposer {
    /// Creates a composer with the given template and assistant role label.
    pub fn new(template: PromptTemplate, assistant_label: impl Into<String>) -> Self {
        Self {
            template,
            assistant_label: assistant_label.into(),
        }
    }

    /// Renders the transcript and new input into a prompt.
    ///
    /// Each prior turn becomes one `"<RoleLabel>: <content>"` line, joined by
    /// newline in transcript order. An empty transcript renders an empty
    /// history block.
    pub fn compose(&self, transcript: &Transcript, input: &str) -> String {
        let history = transcript
            .turns()
            .iter()
            .map(|turn| {
                let label = match turn.role {
                    Role::Human => HUMAN_LABEL,
                    Role::Assistant => self.assistant_label.as_str(),
                };
                format!("{}: {}", label, turn.content)
            })
            .collect::<Vec<_>>()
            .join("\n");

        self.template.render(&history, input)
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(PromptTemplate::default(), "Assistant")
    }
}
