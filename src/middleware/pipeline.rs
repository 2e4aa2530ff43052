//! Pipeline composition
//!
//! Builds the ordered unit chain into a single callable. Each unit
//! receives the rest of the chain as its `next` continuation; the
//! terminal continuation yields the pass-through response. Pipelines are
//! constructed once at startup and immutable afterwards.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::http::{AppRequest, AppResponse};
use crate::services::rate_limiter::RateLimiter;

use super::{
    AuthMiddleware, LocaleMiddleware, LoggingMiddleware, Middleware, Next, NextFuture,
    PipelineResult, RateLimitMiddleware,
};

/// An ordered, fixed sequence of middleware units
#[derive(Clone, Default)]
pub struct MiddlewarePipeline {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
        }
    }

    /// Append a unit to the chain
    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Execute the chain with the default pass-through terminal
    pub async fn execute(&self, request: AppRequest) -> PipelineResult {
        self.execute_with(request, |_request| {
            Box::pin(async { Ok(Some(AppResponse::next())) })
        })
        .await
    }

    /// Execute the chain with a custom terminal handler
    ///
    /// The chain is folded back to front so that the first configured
    /// unit ends up outermost; each unit's `next` is the fold so far.
    pub async fn execute_with<F>(&self, request: AppRequest, handler: F) -> PipelineResult
    where
        F: FnOnce(AppRequest) -> NextFuture<'static> + Send + 'static,
    {
        let mut chain =
            Box::new(handler) as Box<dyn FnOnce(AppRequest) -> NextFuture<'static> + Send>;

        for middleware in self.middleware.iter().rev() {
            let middleware = middleware.clone();
            let next_handler = chain;
            chain = Box::new(move |request: AppRequest| {
                let next = Next::new(next_handler);
                middleware.handle(request, next)
            });
        }

        chain(request).await
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Unit names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|unit| unit.name()).collect()
    }
}

/// The two pipelines the server selects between per request
pub struct Pipelines {
    pub app: MiddlewarePipeline,
    pub api: MiddlewarePipeline,
}

impl Pipelines {
    /// Build both pipelines from configuration
    pub fn build(config: &AppConfig) -> Self {
        Self {
            app: app_pipeline(config, None),
            api: api_pipeline(config, None),
        }
    }
}

/// Pipeline for server-rendered application routes
///
/// Logging stays first for accurate timing; an injected limiter replaces
/// the process-wide one (used by tests).
pub fn app_pipeline(
    config: &AppConfig,
    limiter: Option<Arc<dyn RateLimiter>>,
) -> MiddlewarePipeline {
    MiddlewarePipeline::new()
        .add(LoggingMiddleware::new())
        .add(AuthMiddleware::new(config.auth.clone()))
        .add(rate_limit_unit(config, limiter))
        .add(LocaleMiddleware::new(config.i18n.clone()))
}

/// Pipeline for API routes; access control is enforced per handler, so
/// the auth gate is omitted
pub fn api_pipeline(
    config: &AppConfig,
    limiter: Option<Arc<dyn RateLimiter>>,
) -> MiddlewarePipeline {
    MiddlewarePipeline::new()
        .add(LoggingMiddleware::new())
        .add(rate_limit_unit(config, limiter))
        .add(LocaleMiddleware::new(config.i18n.clone()))
}

fn rate_limit_unit(
    config: &AppConfig,
    limiter: Option<Arc<dyn RateLimiter>>,
) -> RateLimitMiddleware {
    match limiter {
        Some(limiter) => {
            RateLimitMiddleware::with_limiter(limiter, config.rate_limit.clone())
        }
        None => RateLimitMiddleware::new(config.redis.clone(), config.rate_limit.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Probe unit that records its name on the way in and out
    struct ProbeMiddleware {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for ProbeMiddleware {
        fn handle(&self, request: AppRequest, next: Next) -> NextFuture<'static> {
            let name = self.name;
            let log = self.log.clone();
            Box::pin(async move {
                log.lock().unwrap().push(format!("{name}:in"));
                let response = next.run(request).await;
                log.lock().unwrap().push(format!("{name}:out"));
                response
            })
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    fn request() -> AppRequest {
        AppRequest::get("/probe".parse().unwrap())
    }

    #[tokio::test]
    async fn units_run_in_configured_order_both_ways() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = MiddlewarePipeline::new()
            .add(ProbeMiddleware {
                name: "first",
                log: log.clone(),
            })
            .add(ProbeMiddleware {
                name: "second",
                log: log.clone(),
            })
            .add(ProbeMiddleware {
                name: "third",
                log: log.clone(),
            });

        let result = pipeline.execute(request()).await.unwrap();
        assert!(result.unwrap().is_pass_through());

        let entries = log.lock().unwrap().clone();
        assert_eq!(
            entries,
            vec![
                "first:in", "second:in", "third:in", "third:out", "second:out", "first:out"
            ]
        );
    }

    #[tokio::test]
    async fn empty_pipeline_yields_the_pass_through_response() {
        let pipeline = MiddlewarePipeline::new();
        let result = pipeline.execute(request()).await.unwrap();
        let response = result.unwrap();
        assert!(response.is_pass_through());
        assert_eq!(response.status_code(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn short_circuit_skips_downstream_units() {
        struct ShortCircuit;
        impl Middleware for ShortCircuit {
            fn handle(&self, _request: AppRequest, _next: Next) -> NextFuture<'static> {
                Box::pin(async { Ok(Some(AppResponse::redirect("/"))) })
            }
        }

        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = MiddlewarePipeline::new().add(ShortCircuit).add(ProbeMiddleware {
            name: "after",
            log: log.clone(),
        });

        let result = pipeline.execute(request()).await.unwrap().unwrap();
        assert_eq!(
            result.status_code(),
            axum::http::StatusCode::TEMPORARY_REDIRECT
        );
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn custom_terminal_handler_receives_the_request() {
        let pipeline = MiddlewarePipeline::new();
        let result = pipeline
            .execute_with(request(), |request| {
                Box::pin(async move {
                    Ok(Some(AppResponse::ok().text(request.path().to_string())))
                })
            })
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(
            result.body(),
            crate::http::ResponseBody::Text(text) if text == "/probe"
        ));
    }

    #[test]
    fn names_reflect_execution_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = MiddlewarePipeline::new()
            .add(ProbeMiddleware {
                name: "a",
                log: log.clone(),
            })
            .add(ProbeMiddleware {
                name: "b",
                log,
            });
        assert_eq!(pipeline.names(), vec!["a", "b"]);
        assert_eq!(pipeline.len(), 2);
        assert!(!pipeline.is_empty());
    }
}
