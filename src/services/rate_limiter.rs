//! Sliding-window rate limiter
//!
//! The limiter contract the middleware consumes, plus the default
//! implementation: a two-bucket sliding window over Redis. Requests are
//! counted into a bucket keyed by the current window; the previous
//! window's count is weighted by how much of it still overlaps the
//! sliding interval. The approximation admits at most a small burst at
//! window edges in exchange for two cheap commands per decision.
//!
//! The limiter and its backing connection are constructed at most once
//! per process through `shared()` and reused for the process lifetime.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::{RateLimitConfig, RedisConfig};

use super::redis::{self, CacheError, RedisService};

/// Rate limiter errors
#[derive(Error, Debug)]
pub enum LimiterError {
    #[error("limiter backend: {0}")]
    Backend(String),
}

impl From<CacheError> for LimiterError {
    fn from(err: CacheError) -> Self {
        LimiterError::Backend(err.to_string())
    }
}

/// Outcome of a limit check
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    /// Whether the request is within budget
    pub success: bool,
    /// Configured requests per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the current window ends, as epoch milliseconds
    pub reset_epoch_ms: i64,
}

/// External limiter contract consumed by the rate-limit middleware
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn limit(&self, key: &str) -> Result<RateLimitDecision, LimiterError>;
}

/// Two-bucket sliding window limiter over Redis
pub struct SlidingWindowLimiter {
    store: RedisService,
    limit: u32,
    window: Duration,
    key_prefix: String,
}

impl SlidingWindowLimiter {
    pub fn new(store: RedisService, config: &RateLimitConfig) -> Self {
        Self {
            store,
            limit: config.limit_per_window,
            window: config.window,
            key_prefix: config.key_prefix.clone(),
        }
    }

    async fn decide(&self, key: &str, now_ms: i64) -> Result<RateLimitDecision, LimiterError> {
        let window_ms = self.window.as_millis() as i64;
        let current_window = now_ms.div_euclid(window_ms);
        let current_key = format!("{}:{}:{}", self.key_prefix, key, current_window);
        let previous_key = format!("{}:{}:{}", self.key_prefix, key, current_window - 1);

        let current = self.store.increment(&current_key).await?;
        if current == 1 {
            // Keep the bucket around long enough to serve as "previous"
            self.store
                .expire(&current_key, (self.window.as_secs() * 2) as usize)
                .await?;
        }

        let previous: i64 = self
            .store
            .get_value(&previous_key)
            .await?
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);

        let elapsed_ms = now_ms - current_window * window_ms;
        let (success, remaining) = evaluate(
            self.limit,
            previous.max(0) as u64,
            current.max(0) as u64,
            elapsed_ms as u64,
            window_ms as u64,
        );

        Ok(RateLimitDecision {
            success,
            limit: self.limit,
            remaining,
            reset_epoch_ms: (current_window + 1) * window_ms,
        })
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn limit(&self, key: &str) -> Result<RateLimitDecision, LimiterError> {
        self.decide(key, Utc::now().timestamp_millis()).await
    }
}

/// Weighted sliding-window check
///
/// The previous window counts proportionally to how much of it is still
/// inside the sliding interval ending now.
fn evaluate(
    limit: u32,
    previous: u64,
    current: u64,
    elapsed_ms: u64,
    window_ms: u64,
) -> (bool, u32) {
    let overlap = 1.0 - elapsed_ms as f64 / window_ms as f64;
    let used = previous as f64 * overlap + current as f64;
    let success = used <= limit as f64;
    let remaining = (limit as f64 - used).floor().max(0.0) as u32;
    (success, remaining)
}

static SHARED: OnceCell<Arc<dyn RateLimiter>> = OnceCell::const_new();

/// Process-wide limiter, built on first use and cached forever
///
/// The backing store connection comes from the Redis accessor, which is
/// itself memoized, so repeated calls never reconnect.
pub async fn shared(
    redis_config: &RedisConfig,
    config: &RateLimitConfig,
) -> Result<Arc<dyn RateLimiter>, LimiterError> {
    SHARED
        .get_or_try_init(|| async {
            let store = redis::shared(redis_config).await?;
            debug!(
                limit = config.limit_per_window,
                window_secs = config.window.as_secs(),
                "rate limiter initialized"
            );
            Ok(Arc::new(SlidingWindowLimiter::new(store.clone(), config)) as Arc<dyn RateLimiter>)
        })
        .await
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_window_admits_up_to_the_limit() {
        let (success, remaining) = evaluate(100, 0, 1, 0, 60_000);
        assert!(success);
        assert_eq!(remaining, 99);

        let (success, remaining) = evaluate(100, 0, 100, 30_000, 60_000);
        assert!(success);
        assert_eq!(remaining, 0);

        let (success, _) = evaluate(100, 0, 101, 30_000, 60_000);
        assert!(!success);
    }

    #[test]
    fn previous_window_is_weighted_by_overlap() {
        // Half the window elapsed: previous counts at half weight
        let (success, remaining) = evaluate(100, 100, 50, 30_000, 60_000);
        assert!(success);
        assert_eq!(remaining, 0);

        let (success, _) = evaluate(100, 100, 51, 30_000, 60_000);
        assert!(!success);

        // Window fully elapsed: previous no longer counts
        let (success, remaining) = evaluate(100, 100, 1, 59_999, 60_000);
        assert!(success);
        assert!(remaining >= 98);
    }

    #[test]
    fn remaining_never_underflows() {
        let (_, remaining) = evaluate(10, 100, 100, 0, 60_000);
        assert_eq!(remaining, 0);
    }
}
