//! Search index service configuration

use serde::{Deserialize, Serialize};

use super::{env_or_default, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the hosted index service
    pub host: String,
    /// API key sent as a bearer token
    pub api_key: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:7700".to_string(),
            api_key: String::new(),
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default("SEARCH_HOST", "http://127.0.0.1:7700"),
            api_key: env_or_default("SEARCH_API_KEY", ""),
        })
    }
}
