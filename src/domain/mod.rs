//! Domain layer - pure conversation model and logic.
//!
//! No I/O lives here: transcripts, normalized output events, and prompt
//! composition are all side-effect free.

pub mod event;
pub mod prompt;
pub mod transcript;

pub use event::{FaultKind, OutputEvent, StreamFault};
pub use prompt::{PromptComposer, PromptTemplate, TemplateError, DEFAULT_TEMPLATE, HUMAN_LABEL};
pub use transcript::{Role, Transcript, Turn};
