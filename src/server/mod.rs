//! HTTP server wiring
//!
//! Builds the router, threads every page and API request through the
//! middleware pipeline, and owns the outer error boundary: whatever
//! escapes the pipeline is logged and collapsed to an opaque 500, never
//! leaked to the client.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self as axum_middleware, Next as ServeNext};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::errors::AppResult;
use crate::handlers;
use crate::http::{AppRequest, AppResponse};
use crate::middleware::Pipelines;
use crate::routing;
use crate::services::email::{EmailService, ResendProvider};
use crate::services::search::SearchClient;
use crate::services::video::VideoClient;

pub mod sse;

pub use sse::{BroadcastMessage, SseHub};

/// Shared application state handed to handlers and the entry layer
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipelines: Arc<Pipelines>,
    pub video: Arc<VideoClient>,
    pub search: Arc<SearchClient>,
    pub email: Arc<EmailService>,
    pub sse: SseHub,
}

impl AppState {
    /// Construct all shared resources from configuration
    pub fn build(config: AppConfig) -> AppResult<Self> {
        let pipelines = Pipelines::build(&config);
        let provider = Arc::new(ResendProvider::new(&config.email));
        let email = Arc::new(EmailService::new(provider, &config.email)?);
        Ok(Self {
            pipelines: Arc::new(pipelines),
            video: Arc::new(VideoClient::new(config.video.clone())),
            search: Arc::new(SearchClient::new(&config.search)),
            email,
            sse: SseHub::default(),
            config: Arc::new(config),
        })
    }
}

/// Paths that bypass the middleware pipeline entirely
fn is_exempt(path: &str) -> bool {
    path == "/api/health" || path == "/favicon.ico" || path.starts_with("/assets/")
}

/// Pipeline entry layer wrapped around every route
///
/// Selects the pipeline by surface, executes it, and either returns its
/// short-circuit response or forwards to the terminal handler with the
/// pipeline's accumulated headers merged onto the real response.
async fn pipeline_entry(
    State(state): State<AppState>,
    request: Request,
    next: ServeNext,
) -> Response {
    let path = request.uri().path().to_string();
    if is_exempt(&path) {
        return next.run(request).await;
    }

    let app_request = AppRequest::new(
        request.method().clone(),
        request.uri().clone(),
        request.headers().clone(),
    );
    let pipeline = if routing::classify(&path).is_api {
        &state.pipelines.api
    } else {
        &state.pipelines.app
    };

    match pipeline.execute(app_request).await {
        Err(err) => {
            // Outer boundary: log the real error, hand the client nothing
            error!(%path, error = %err, "middleware pipeline failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        Ok(None) => next.run(request).await,
        Ok(Some(result)) if result.is_pass_through() => {
            let mut response = next.run(request).await;
            merge_pipeline_headers(result, &mut response);
            response
        }
        Ok(Some(result)) => result.into_axum(),
    }
}

/// Copy headers a pass-through pipeline accumulated onto the terminal
/// handler's response; cookies append, everything else overwrites
fn merge_pipeline_headers(pipeline_response: AppResponse, response: &mut Response) {
    for (name, value) in pipeline_response.headers() {
        if name == header::SET_COOKIE {
            response.headers_mut().append(name.clone(), value.clone());
        } else {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }
}

/// Assemble the application router
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.http.static_dir.clone();
    Router::new()
        .route(routing::paths::LANDING, get(handlers::pages::landing))
        .route(routing::paths::HOME, get(handlers::pages::home))
        .route(routing::paths::REELS, get(handlers::pages::reels_feed))
        .route(routing::paths::REELS_UPLOAD, get(handlers::pages::upload))
        .route("/api/health", get(handlers::health::check))
        .route(
            "/api/reels/upload-url",
            post(handlers::reels::create_upload_url),
        )
        .route("/api/webhooks/video", post(handlers::webhooks::video))
        .route("/api/search/users", get(handlers::search::users))
        .route(
            "/api/sse",
            get(handlers::sse::stream).post(handlers::sse::publish),
        )
        .nest_service("/assets", ServeDir::new(static_dir))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            pipeline_entry,
        ))
        .with_state(state)
}

/// Bind and serve until shutdown
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.http.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
