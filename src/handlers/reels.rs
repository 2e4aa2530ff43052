//! Reel upload endpoints

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::http::request::parse_cookies;
use crate::server::AppState;

/// Hand the browser a direct-upload slot on the video platform
///
/// The pipeline's auth gate only covers page navigation, so the API
/// checks the session cookie itself before spending a vendor call.
pub async fn create_upload_url(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = parse_cookies(&headers);
    let Some(token) = cookies.get(&state.config.auth.session_cookie_name) else {
        warn!("upload URL requested without a session");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "You must be signed in to upload videos" })),
        )
            .into_response();
    };

    let user_ref = session_reference(token);
    match state.video.create_direct_upload(&user_ref).await {
        Ok(upload) => {
            info!(upload_id = %upload.upload_id, "upload URL created");
            Json(json!({
                "upload_id": upload.upload_id,
                "upload_url": upload.upload_url,
            }))
            .into_response()
        }
        Err(err) => {
            error!(error = %err, "failed to create upload URL");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

/// Opaque, stable reference to the session
///
/// The auth provider resolves the token to a user downstream; only a
/// digest prefix travels to the video platform's passthrough field.
fn session_reference(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("sess-{}", hex::encode(&digest[..6]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_reference_is_stable_and_opaque() {
        let a = session_reference("token-one");
        let b = session_reference("token-one");
        let c = session_reference("token-two");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("sess-"));
        assert!(!a.contains("token"));
    }
}
