//! HTTP server configuration

use serde::{Deserialize, Serialize};

use super::{env_or_default, parse_env_or_default, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port the server binds on
    pub port: u16,
    /// Directory served under the static asset mount
    pub static_dir: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            static_dir: "public".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: parse_env_or_default("PORT", "3000", "a valid port number")?,
            static_dir: env_or_default("STATIC_DIR", "public"),
        })
    }
}
