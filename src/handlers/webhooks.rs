//! Video platform webhook intake

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use crate::server::AppState;
use crate::services::video::{VideoError, WebhookEvent, SIGNATURE_HEADER};

/// Verify and process a webhook delivery from the video platform
pub async fn video(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        warn!("webhook delivery without a signature header");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing signature" })),
        )
            .into_response();
    };

    match state
        .video
        .verify_webhook(&body, signature, Utc::now().timestamp())
    {
        Ok(event) => {
            dispatch(&state, &event);
            Json(json!({ "message": "ok" })).into_response()
        }
        Err(err @ VideoError::InvalidSignature(_)) => {
            warn!(error = %err, "rejected webhook delivery");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid signature" })),
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "failed to process webhook");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

fn dispatch(state: &AppState, event: &WebhookEvent) {
    match event.event_type.as_str() {
        "video.upload.created"
        | "video.upload.asset_created"
        | "video.upload.cancelled"
        | "video.upload.errored" => {
            info!(event_type = %event.event_type, "upload event");
        }
        "video.asset.created" | "video.asset.updated" | "video.asset.ready" => {
            info!(event_type = %event.event_type, "asset event");
            // Viewers watching the feed learn about new reels immediately
            state.sse.publish(crate::server::BroadcastMessage {
                event: event.event_type.clone(),
                data: event.data.clone(),
            });
        }
        "video.asset.deleted" | "video.asset.errored" => {
            info!(event_type = %event.event_type, "asset issue event");
        }
        other => {
            warn!(event_type = other, "unhandled webhook type");
        }
    }
}
