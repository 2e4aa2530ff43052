//! Locale negotiation configuration

use serde::{Deserialize, Serialize};

use super::{env_or_default, ConfigError};

/// Name of the cookie the locale middleware reads and refreshes
pub const LOCALE_COOKIE_NAME: &str = "locale";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nConfig {
    /// Languages the application ships translations for
    pub languages: Vec<String>,
    /// Language used when negotiation produces nothing usable
    pub fallback: String,
    /// Cookie carrying the visitor's resolved language
    pub cookie_name: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            languages: vec![
                "en".to_string(),
                "de".to_string(),
                "es".to_string(),
                "fr".to_string(),
            ],
            fallback: "en".to_string(),
            cookie_name: LOCALE_COOKIE_NAME.to_string(),
        }
    }
}

impl I18nConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let languages: Vec<String> = env_or_default("I18N_LANGUAGES", "en,de,es,fr")
            .split(',')
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
            .collect();
        if languages.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "I18N_LANGUAGES".to_string(),
                value: env_or_default("I18N_LANGUAGES", ""),
                expected: "a comma-separated list of language tags".to_string(),
            });
        }
        Ok(Self {
            languages,
            fallback: env_or_default("I18N_FALLBACK", "en"),
            cookie_name: LOCALE_COOKIE_NAME.to_string(),
        })
    }
}
