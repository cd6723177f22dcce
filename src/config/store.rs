//! Session store configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Session store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Logical table (key namespace) transcripts are stored under
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

impl StoreConfig {
    /// Validate store configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.table_name.trim().is_empty() {
            return Err(ValidationError::EmptyTableName);
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
        }
    }
}

fn default_table_name() -> String {
    "chat-sessions".to_string()
}
