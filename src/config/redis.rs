//! Key-value store connection configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{env_or_default, parse_env_or_default, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,
    /// Time allowed for the initial connection
    #[serde(with = "super::rate_limit::duration_secs")]
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs: u64 =
            parse_env_or_default("REDIS_CONNECT_TIMEOUT", "5", "a number of seconds")?;
        Ok(Self {
            url: env_or_default("REDIS_URL", "redis://127.0.0.1:6379"),
            connection_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
