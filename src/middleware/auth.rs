//! Route access enforcement unit
//!
//! Gates navigation on the route's registered access type. The session
//! check here is cookie *presence* only, a cheap pre-filter that keeps
//! the expensive session verification off every request; the auth
//! provider re-verifies the token downstream on pages that need it.

use tracing::debug;

use crate::config::AuthConfig;
use crate::http::{AppRequest, AppResponse};
use crate::routing::{self, paths};

use super::{Middleware, Next, NextFuture};

#[derive(Debug, Clone)]
pub struct AuthMiddleware {
    config: AuthConfig,
}

impl AuthMiddleware {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

impl Middleware for AuthMiddleware {
    fn handle(&self, request: AppRequest, next: Next) -> NextFuture<'static> {
        let cookie_name = self.config.session_cookie_name.clone();
        Box::pin(async move {
            let path = request.path();

            // Universal routes are reachable by everyone
            if routing::is_universal_route(path) {
                return next.run(request).await;
            }

            let has_session = request.has_cookie(&cookie_name);

            // Signed-out visitors never see protected pages
            if routing::is_protected_route(path) && !has_session {
                debug!(path, "redirecting unauthenticated request to landing");
                return Ok(Some(AppResponse::redirect(paths::LANDING)));
            }

            // Signed-in visitors skip the public (sign-in) pages
            if routing::is_public_route(path) && has_session {
                debug!(path, "redirecting authenticated request to home");
                return Ok(Some(AppResponse::redirect(paths::HOME)));
            }

            next.run(request).await
        })
    }

    fn name(&self) -> &'static str {
        "AuthMiddleware"
    }
}
