//! Generation service adapters.

mod scripted;

pub use scripted::{ScriptedGenerationService, ScriptedResponse};
