//! Video platform configuration

use serde::{Deserialize, Serialize};

use super::{env_or_default, parse_env_or_default, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Base URL of the video platform API
    pub base_url: String,
    /// API token id (basic auth user)
    pub token_id: String,
    /// API token secret (basic auth password)
    pub token_secret: String,
    /// Shared secret for webhook signature verification
    pub webhook_secret: String,
    /// Origin allowed to perform direct browser uploads
    pub cors_origin: String,
    /// Maximum age in seconds of a webhook signature timestamp
    pub signature_tolerance_secs: i64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mux.com".to_string(),
            token_id: String::new(),
            token_secret: String::new(),
            webhook_secret: String::new(),
            cors_origin: "http://localhost:3000".to_string(),
            signature_tolerance_secs: 300,
        }
    }
}

impl VideoConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env_or_default("VIDEO_API_BASE", "https://api.mux.com"),
            token_id: env_or_default("VIDEO_TOKEN_ID", ""),
            token_secret: env_or_default("VIDEO_TOKEN_SECRET", ""),
            webhook_secret: env_or_default("VIDEO_WEBHOOK_SECRET", ""),
            cors_origin: env_or_default("APP_BASE_URL", "http://localhost:3000"),
            signature_tolerance_secs: parse_env_or_default(
                "VIDEO_SIGNATURE_TOLERANCE",
                "300",
                "a number of seconds",
            )?,
        })
    }
}
