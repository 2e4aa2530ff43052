//! Request logging unit
//!
//! Outermost unit: records method and path on the way in, status and
//! elapsed wall-clock time on the way out. Failures from downstream are
//! logged with their timing and rethrown untouched.

use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::http::AppRequest;

use super::{Middleware, Next, NextFuture};

#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for LoggingMiddleware {
    fn handle(&self, request: AppRequest, next: Next) -> NextFuture<'static> {
        Box::pin(async move {
            let request_id = Uuid::new_v4();
            let method = request.method.clone();
            let path = request.path().to_string();
            info!(%request_id, %method, %path, "request received");

            let start = Instant::now();
            match next.run(request).await {
                Ok(response) => {
                    let elapsed_ms = start.elapsed().as_millis() as u64;
                    match &response {
                        Some(resp) => info!(
                            %request_id,
                            status = resp.status_code().as_u16(),
                            elapsed_ms,
                            "request completed"
                        ),
                        None => info!(%request_id, status = "unknown", elapsed_ms, "request completed"),
                    }
                    Ok(response)
                }
                Err(err) => {
                    let elapsed_ms = start.elapsed().as_millis() as u64;
                    error!(%request_id, %method, %path, elapsed_ms, error = %err, "request failed");
                    Err(err)
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "LoggingMiddleware"
    }
}
