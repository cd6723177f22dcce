//! Generation configuration
//!
//! One engine is parameterized by this struct instead of one handler per
//! model: the model identifier, which upstream response shape to expect,
//! sampling parameters, and the prompt template all live here.

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::{PromptComposer, PromptTemplate, DEFAULT_TEMPLATE};

/// Which response shape the upstream returns for the configured model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamVariant {
    /// Incremental content-delta events.
    #[default]
    Delta,
    /// One non-streaming response with complete outputs.
    Batch,
    /// Legacy single-field completion events.
    Legacy,
}

/// Generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier sent upstream
    #[serde(default = "default_model")]
    pub model: String,

    /// Upstream response shape for this model
    #[serde(default)]
    pub variant: UpstreamVariant,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Top-k sampling cutoff
    #[serde(default = "default_top_k")]
    pub top_k: Option<u32>,

    /// Nucleus sampling cutoff
    #[serde(default = "default_top_p")]
    pub top_p: Option<f32>,

    /// Sequences that stop generation
    #[serde(default = "default_stop_sequences")]
    pub stop_sequences: Vec<String>,

    /// Prompt template with `{history}` and `{input}` slots; newlines may
    /// arrive escaped as literal `\n` from the environment
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,

    /// Role label for assistant turns in the rendered history
    #[serde(default = "default_assistant_label")]
    pub assistant_label: String,

    /// Fixed system instruction, for upstreams that accept one
    #[serde(default = "default_system_prompt")]
    pub system_prompt: Option<String>,
}

impl GenerationConfig {
    /// Builds the validated prompt template
    pub fn template(&self) -> Result<PromptTemplate, ValidationError> {
        Ok(PromptTemplate::from_env_escaped(&self.prompt_template)?)
    }

    /// Builds a prompt composer from the template and assistant label
    pub fn composer(&self) -> Result<PromptComposer, ValidationError> {
        Ok(PromptComposer::new(
            self.template()?,
            self.assistant_label.clone(),
        ))
    }

    /// Validate generation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.model.is_empty() {
            return Err(ValidationError::MissingRequired("GENERATION__MODEL"));
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::InvalidMaxTokens);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if let Some(top_p) = self.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(ValidationError::InvalidTopP);
            }
        }
        if self.assistant_label.trim().is_empty() {
            return Err(ValidationError::EmptyAssistantLabel);
        }
        self.template()?;
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            variant: UpstreamVariant::default(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            stop_sequences: default_stop_sequences(),
            prompt_template: default_prompt_template(),
            assistant_label: default_assistant_label(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_model() -> String {
    "anthropic.claude-3-haiku-20240307-v1:0".to_string()
}

fn default_max_tokens() -> u32 {
    20480
}

fn default_temperature() -> f32 {
    0.1
}

fn default_top_k() -> Option<u32> {
    Some(250)
}

fn default_top_p() -> Option<f32> {
    Some(1.0)
}

fn default_stop_sequences() -> Vec<String> {
    vec!["\n\nHuman".to_string()]
}

fn default_prompt_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

fn default_assistant_label() -> String {
    "Assistant".to_string()
}

fn default_system_prompt() -> Option<String> {
    Some(
        "You are a helpful AI assistant. Provide informative and substantive \
         responses while avoiding potential harms."
            .to_string(),
    )
}
