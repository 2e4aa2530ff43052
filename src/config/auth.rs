//! Session cookie configuration
//!
//! The middleware only gates on cookie *presence*; the authoritative
//! session verification lives in the external auth provider. Cookie names
//! follow the provider's convention, which prefixes them in production so
//! browsers enforce the `__Secure-`/`__Host-` rules.

use serde::{Deserialize, Serialize};

use super::{env_or_default, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Name of the session token cookie issued by the auth provider
    pub session_cookie_name: String,
    /// Name of the CSRF token cookie issued by the auth provider
    pub csrf_cookie_name: String,
    /// Session lifetime in seconds
    pub session_max_age_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AuthConfig {
    /// Cookie names used by the auth provider in production deployments
    pub fn production() -> Self {
        Self {
            session_cookie_name: "__Secure-authjs.session-token".to_string(),
            csrf_cookie_name: "__Host-authjs.csrf-token".to_string(),
            session_max_age_secs: 30 * 24 * 60 * 60,
        }
    }

    /// Cookie names used in development, where secure prefixes would break
    /// plain-HTTP localhost
    pub fn development() -> Self {
        Self {
            session_cookie_name: "authjs.session-token".to_string(),
            csrf_cookie_name: "authjs.csrf-token".to_string(),
            session_max_age_secs: 365 * 24 * 60 * 60,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env_or_default("APP_ENV", "development");
        Ok(match environment.as_str() {
            "production" => Self::production(),
            _ => Self::development(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn production_env_selects_prefixed_cookie_names() {
        std::env::set_var("APP_ENV", "production");
        let config = AuthConfig::from_env().unwrap();
        assert_eq!(config.session_cookie_name, "__Secure-authjs.session-token");
        assert_eq!(config.csrf_cookie_name, "__Host-authjs.csrf-token");
        std::env::remove_var("APP_ENV");
    }

    #[test]
    #[serial]
    fn development_is_the_default() {
        std::env::remove_var("APP_ENV");
        let config = AuthConfig::from_env().unwrap();
        assert_eq!(config.session_cookie_name, "authjs.session-token");
        assert!(config.session_max_age_secs > AuthConfig::production().session_max_age_secs);
    }
}
