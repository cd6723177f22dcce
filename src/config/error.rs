//! Configuration error types

use thiserror::Error;

use crate::domain::TemplateError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid prompt template: {0}")]
    InvalidPromptTemplate(#[from] TemplateError),

    #[error("max_tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("temperature must be within 0.0..=2.0")]
    InvalidTemperature,

    #[error("top_p must be within 0.0..=1.0")]
    InvalidTopP,

    #[error("Assistant role label must not be empty")]
    EmptyAssistantLabel,

    #[error("Store table name must not be empty")]
    EmptyTableName,
}
