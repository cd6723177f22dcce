//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `CHAT_RELAY` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use chat_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Expecting {:?} upstream responses", config.generation.variant);
//! ```

mod error;
mod generation;
mod store;

pub use error::{ConfigError, ValidationError};
pub use generation::{GenerationConfig, UpstreamVariant};
pub use store::StoreConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// Every value has a default, so an empty environment yields a working
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Generation configuration (model, variant, sampling, prompt template)
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Session store configuration (key namespace)
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CHAT_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CHAT_RELAY__GENERATION__MODEL=...` -> `generation.model = ...`
    /// - `CHAT_RELAY__GENERATION__VARIANT=batch` -> `generation.variant = Batch`
    /// - `CHAT_RELAY__STORE__TABLE_NAME=...` -> `store.table_name = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHAT_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.generation.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("CHAT_RELAY__GENERATION__MODEL");
        env::remove_var("CHAT_RELAY__GENERATION__VARIANT");
        env::remove_var("CHAT_RELAY__GENERATION__PROMPT_TEMPLATE");
        env::remove_var("CHAT_RELAY__STORE__TABLE_NAME");
    }

    #[test]
    fn loads_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.table_name, "chat-sessions");
        assert_eq!(config.generation.variant, UpstreamVariant::Delta);
    }

    #[test]
    fn reads_nested_values_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CHAT_RELAY__GENERATION__MODEL", "mistral.mistral-large-2402-v1:0");
        env::set_var("CHAT_RELAY__GENERATION__VARIANT", "batch");
        env::set_var("CHAT_RELAY__STORE__TABLE_NAME", "conversations");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.generation.model, "mistral.mistral-large-2402-v1:0");
        assert_eq!(config.generation.variant, UpstreamVariant::Batch);
        assert_eq!(config.store.table_name, "conversations");
    }

    #[test]
    fn escaped_template_from_environment_validates() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var(
            "CHAT_RELAY__GENERATION__PROMPT_TEMPLATE",
            "\\n<s>[INST] {input} [/INST]\\n",
        );
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
        let template = config.generation.template().unwrap();
        assert_eq!(template.render("", "hi"), "\n<s>[INST] hi [/INST]\n");
    }
}
