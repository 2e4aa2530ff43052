//! Rate limiting configuration
//!
//! The window parameters are process-wide fixed values, deliberately not
//! tunable at runtime: every deployment enforces the same budget.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum number of requests allowed per client in a window
pub const LIMIT_PER_WINDOW: u32 = 100;

/// Length of the sliding window in seconds
pub const WINDOW_SECONDS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub limit_per_window: u32,
    #[serde(with = "duration_secs")]
    pub window: Duration,
    /// Prefix for the limiter's keys in the backing store
    pub key_prefix: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit_per_window: LIMIT_PER_WINDOW,
            window: Duration::from_secs(WINDOW_SECONDS),
            key_prefix: "ratelimit".to_string(),
        }
    }
}

pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        value.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
