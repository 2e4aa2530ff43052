//! Application configuration
//!
//! One serde config struct per concern, each with a `Default` and a
//! `from_env()` constructor. `AppConfig::from_env()` aggregates them all at
//! startup; after that the configuration is read-only for the process
//! lifetime.

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

pub mod auth;
pub mod email;
pub mod http;
pub mod i18n;
pub mod rate_limit;
pub mod redis;
pub mod search;
pub mod video;

pub use auth::AuthConfig;
pub use email::EmailConfig;
pub use http::HttpConfig;
pub use i18n::I18nConfig;
pub use rate_limit::{RateLimitConfig, LIMIT_PER_WINDOW, WINDOW_SECONDS};
pub use redis::RedisConfig;
pub use search::SearchConfig;
pub use video::VideoConfig;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {field}")]
    Missing { field: String },

    #[error("invalid value for {field}: got '{value}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub auth: AuthConfig,
    pub i18n: I18nConfig,
    pub rate_limit: RateLimitConfig,
    pub redis: RedisConfig,
    pub search: SearchConfig,
    pub video: VideoConfig,
    pub email: EmailConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = AppConfig {
            http: HttpConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            i18n: I18nConfig::from_env()?,
            rate_limit: RateLimitConfig::default(),
            redis: RedisConfig::from_env()?,
            search: SearchConfig::from_env()?,
            video: VideoConfig::from_env()?,
            email: EmailConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "http.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }
        if !self.i18n.languages.contains(&self.i18n.fallback) {
            return Err(ConfigError::ValidationFailed {
                field: "i18n.fallback".to_string(),
                message: format!(
                    "fallback language '{}' is not in the supported set",
                    self.i18n.fallback
                ),
            });
        }
        Ok(())
    }
}

/// Read an environment variable, falling back to a default when unset
pub(crate) fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable into `T`, with a default when unset
pub(crate) fn parse_env_or_default<T>(
    key: &str,
    default: &str,
    expected: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    let raw = env_or_default(key, default);
    raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        field: key.to_string(),
        value: raw,
        expected: expected.to_string(),
    })
}
