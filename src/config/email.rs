//! Email delivery configuration

use serde::{Deserialize, Serialize};

use super::{env_or_default, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Base URL of the delivery provider's REST API
    pub endpoint: String,
    /// API key sent as a bearer token
    pub api_key: String,
    /// Sender address for all outgoing mail
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.resend.com".to_string(),
            api_key: String::new(),
            from_address: "Reelbox <onboarding@reelbox.dev>".to_string(),
        }
    }
}

impl EmailConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: env_or_default("EMAIL_API_BASE", "https://api.resend.com"),
            api_key: env_or_default("EMAIL_API_KEY", ""),
            from_address: env_or_default("EMAIL_FROM", "Reelbox <onboarding@reelbox.dev>"),
        })
    }
}
