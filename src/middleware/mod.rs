//! Request middleware pipeline
//!
//! Every page and API request runs through an ordered chain of units with
//! the `handle(request, next)` contract. A unit may short-circuit by
//! returning a response without invoking `next`, or run the remainder of
//! the chain and wrap what comes back. Unit ordering is fixed at startup:
//! logging runs outermost so it observes the full latency of everything
//! beneath it.

use std::future::Future;
use std::pin::Pin;

use crate::errors::AppError;
use crate::http::{AppRequest, AppResponse};

pub mod auth;
pub mod locale;
pub mod logging;
pub mod pipeline;
pub mod rate_limit;

pub use auth::AuthMiddleware;
pub use locale::LocaleMiddleware;
pub use logging::LoggingMiddleware;
pub use pipeline::{api_pipeline, app_pipeline, MiddlewarePipeline, Pipelines};
pub use rate_limit::RateLimitMiddleware;

/// Value flowing back up the chain: a response, or nothing at all
///
/// `None` is tolerated everywhere (mutators pass it through untouched);
/// the composer's end-of-chain continuation always yields the
/// pass-through response, so `None` only appears when a unit explicitly
/// produces it.
pub type PipelineValue = Option<AppResponse>;

/// Result of running a unit or the rest of the chain
pub type PipelineResult = Result<PipelineValue, AppError>;

/// Boxed future returned by middleware units
pub type NextFuture<'a> = Pin<Box<dyn Future<Output = PipelineResult> + Send + 'a>>;

/// The remainder of the middleware chain, handed to each unit
pub struct Next {
    handler: Box<dyn FnOnce(AppRequest) -> NextFuture<'static> + Send>,
}

impl Next {
    pub fn new<F>(handler: F) -> Self
    where
        F: FnOnce(AppRequest) -> NextFuture<'static> + Send + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Run the rest of the chain with the given request
    pub async fn run(self, request: AppRequest) -> PipelineResult {
        (self.handler)(request).await
    }
}

/// A composable request interceptor
///
/// Units are stateless between invocations apart from shared resource
/// handles they own (a limiter client, configuration); they never keep
/// per-request state across calls.
pub trait Middleware: Send + Sync {
    fn handle(&self, request: AppRequest, next: Next) -> NextFuture<'static>;

    /// Unit name for logs and diagnostics
    fn name(&self) -> &'static str {
        "Middleware"
    }
}
