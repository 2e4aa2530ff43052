//! Rate limiting unit
//!
//! Derives a client key from forwarded headers and asks the process-wide
//! sliding-window limiter for a decision. Denied requests short-circuit
//! with 429 and retry guidance; allowed requests continue and the budget
//! headers are attached to whatever comes back. A limiter failure is not
//! handled here: it propagates to the outer error boundary.
//!
//! The key trusts `X-Forwarded-For`/`X-Real-IP` as sent by the client.
//! Whether that is spoofable depends on the proxy in front of this
//! process; deployments without a trusted proxy should strip those
//! headers at the edge.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::warn;

use crate::config::{RateLimitConfig, RedisConfig};
use crate::http::{error_response, with_headers, AppRequest};
use crate::services::rate_limiter::{self, RateLimitDecision, RateLimiter};

use super::{Middleware, Next, NextFuture};

/// Headers consulted for the client key, in priority order
const CLIENT_KEY_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "host"];

#[derive(Clone)]
pub struct RateLimitMiddleware {
    redis_config: RedisConfig,
    config: RateLimitConfig,
    limiter: Option<Arc<dyn RateLimiter>>,
}

impl RateLimitMiddleware {
    /// Unit backed by the process-wide limiter, constructed on first use
    pub fn new(redis_config: RedisConfig, config: RateLimitConfig) -> Self {
        Self {
            redis_config,
            config,
            limiter: None,
        }
    }

    /// Unit with an explicitly injected limiter
    pub fn with_limiter(limiter: Arc<dyn RateLimiter>, config: RateLimitConfig) -> Self {
        Self {
            redis_config: RedisConfig::default(),
            config,
            limiter: Some(limiter),
        }
    }

    async fn limiter(&self) -> Result<Arc<dyn RateLimiter>, rate_limiter::LimiterError> {
        match &self.limiter {
            Some(limiter) => Ok(limiter.clone()),
            None => rate_limiter::shared(&self.redis_config, &self.config).await,
        }
    }
}

/// First non-empty client identity source, else the literal fallback
fn client_key(request: &AppRequest) -> String {
    for header in CLIENT_KEY_HEADERS {
        if let Some(value) = request.header_str(header) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    "unknown".to_string()
}

/// Whole seconds until the window resets, rounded up
fn retry_after_secs(reset_epoch_ms: i64, now_ms: i64) -> i64 {
    let delta = reset_epoch_ms - now_ms;
    if delta <= 0 {
        0
    } else {
        (delta + 999) / 1000
    }
}

fn budget_headers(decision: &RateLimitDecision) -> [(&'static str, String); 3] {
    [
        ("X-RateLimit-Limit", decision.limit.to_string()),
        ("X-RateLimit-Remaining", decision.remaining.to_string()),
        ("X-RateLimit-Reset", decision.reset_epoch_ms.to_string()),
    ]
}

impl Middleware for RateLimitMiddleware {
    fn handle(&self, request: AppRequest, next: Next) -> NextFuture<'static> {
        let unit = self.clone();
        Box::pin(async move {
            let key = client_key(&request);
            let limiter = unit.limiter().await?;
            let decision = limiter.limit(&key).await?;
            let headers = budget_headers(&decision);

            if !decision.success {
                warn!(%key, limit = decision.limit, "rate limit exceeded");
                let retry_after =
                    retry_after_secs(decision.reset_epoch_ms, Utc::now().timestamp_millis());
                let mut headers = headers.to_vec();
                headers.push(("Retry-After", retry_after.to_string()));
                return Ok(Some(error_response(
                    "Rate limit exceeded",
                    StatusCode::TOO_MANY_REQUESTS,
                    &headers,
                )));
            }

            let response = next.run(request).await?;
            Ok(with_headers(response, &headers))
        })
    }

    fn name(&self) -> &'static str {
        "RateLimitMiddleware"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::AppResponse;
    use crate::middleware::MiddlewarePipeline;
    use crate::services::rate_limiter::LimiterError;
    use async_trait::async_trait;
    use axum::http::{HeaderMap, HeaderValue, Method};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Limiter that always returns the same decision
    struct StaticLimiter(RateLimitDecision);

    #[async_trait]
    impl RateLimiter for StaticLimiter {
        async fn limit(&self, _key: &str) -> Result<RateLimitDecision, LimiterError> {
            Ok(self.0.clone())
        }
    }

    /// Limiter whose backend is down
    struct FailingLimiter;

    #[async_trait]
    impl RateLimiter for FailingLimiter {
        async fn limit(&self, _key: &str) -> Result<RateLimitDecision, LimiterError> {
            Err(LimiterError::Backend("connection refused".to_string()))
        }
    }

    /// Limiter that records the key it was asked about
    struct KeyRecorder(std::sync::Mutex<Vec<String>>);

    #[async_trait]
    impl RateLimiter for KeyRecorder {
        async fn limit(&self, key: &str) -> Result<RateLimitDecision, LimiterError> {
            self.0.lock().unwrap().push(key.to_string());
            Ok(RateLimitDecision {
                success: true,
                limit: 100,
                remaining: 99,
                reset_epoch_ms: 0,
            })
        }
    }

    fn pipeline(limiter: Arc<dyn RateLimiter>) -> MiddlewarePipeline {
        MiddlewarePipeline::new().add(RateLimitMiddleware::with_limiter(
            limiter,
            RateLimitConfig::default(),
        ))
    }

    fn request_with(headers: &[(&str, &str)]) -> AppRequest {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(
                axum::http::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        AppRequest::new(Method::GET, "/home".parse().unwrap(), map)
    }

    #[tokio::test]
    async fn denied_requests_get_429_with_retry_guidance() {
        let reset = Utc::now().timestamp_millis() + 30_000;
        let limiter = Arc::new(StaticLimiter(RateLimitDecision {
            success: false,
            limit: 100,
            remaining: 0,
            reset_epoch_ms: reset,
        }));

        let calls = Arc::new(AtomicUsize::new(0));
        let spy = calls.clone();
        let response = pipeline(limiter)
            .execute_with(request_with(&[]), move |_request| {
                Box::pin(async move {
                    spy.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(AppResponse::ok()))
                })
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.header_str("x-ratelimit-limit"), Some("100"));
        assert_eq!(response.header_str("x-ratelimit-remaining"), Some("0"));
        assert_eq!(
            response.header_str("x-ratelimit-reset"),
            Some(reset.to_string().as_str())
        );
        let retry_after: i64 = response
            .header_str("retry-after")
            .unwrap()
            .parse()
            .unwrap();
        assert!((29..=30).contains(&retry_after));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn allowed_requests_carry_budget_headers_with_body_untouched() {
        let limiter = Arc::new(StaticLimiter(RateLimitDecision {
            success: true,
            limit: 100,
            remaining: 41,
            reset_epoch_ms: 1_700_000_000_000,
        }));

        let response = pipeline(limiter)
            .execute_with(request_with(&[]), |_request| {
                Box::pin(async {
                    Ok(Some(
                        AppResponse::with_status(StatusCode::CREATED).text("made"),
                    ))
                })
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert_eq!(response.header_str("x-ratelimit-limit"), Some("100"));
        assert_eq!(response.header_str("x-ratelimit-remaining"), Some("41"));
        assert_eq!(
            response.header_str("x-ratelimit-reset"),
            Some("1700000000000")
        );
        assert!(response.header_str("retry-after").is_none());
        assert!(matches!(
            response.body(),
            crate::http::ResponseBody::Text(text) if text == "made"
        ));
    }

    #[tokio::test]
    async fn limiter_failures_propagate() {
        let result = pipeline(Arc::new(FailingLimiter))
            .execute(request_with(&[]))
            .await;
        assert!(matches!(
            result,
            Err(crate::errors::AppError::Limiter(_))
        ));
    }

    #[tokio::test]
    async fn client_key_prefers_forwarded_headers() {
        assert_eq!(
            client_key(&request_with(&[
                ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
                ("x-real-ip", "10.0.0.2"),
                ("host", "reelbox.dev"),
            ])),
            "203.0.113.7, 10.0.0.1"
        );
        assert_eq!(
            client_key(&request_with(&[("x-real-ip", "10.0.0.2"), ("host", "h")])),
            "10.0.0.2"
        );
        assert_eq!(client_key(&request_with(&[("host", "h")])), "h");
        assert_eq!(client_key(&request_with(&[])), "unknown");
        // Empty values are skipped, not used
        assert_eq!(
            client_key(&request_with(&[("x-forwarded-for", ""), ("host", "h")])),
            "h"
        );
    }

    #[tokio::test]
    async fn limiter_sees_the_derived_key() {
        let recorder = Arc::new(KeyRecorder(std::sync::Mutex::new(Vec::new())));
        pipeline(recorder.clone())
            .execute(request_with(&[("x-real-ip", "198.51.100.4")]))
            .await
            .unwrap();
        assert_eq!(recorder.0.lock().unwrap().as_slice(), ["198.51.100.4"]);
    }

    #[test]
    fn retry_after_rounds_up_and_clamps() {
        assert_eq!(retry_after_secs(30_000, 0), 30);
        assert_eq!(retry_after_secs(30_001, 0), 31);
        assert_eq!(retry_after_secs(0, 1_000), 0);
    }
}
