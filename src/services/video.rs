//! Video platform adapter
//!
//! Two narrow operations against the hosted video service: creating a
//! direct-upload slot for the browser, and verifying inbound webhook
//! deliveries. Webhook signatures follow the `t=<unix>,v1=<hex>` scheme:
//! an HMAC-SHA256 over `"{t}.{body}"` with the shared webhook secret,
//! rejected when the digest mismatches or the timestamp falls outside
//! the configured tolerance.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::{error, info};

use crate::config::VideoConfig;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "mux-signature";

/// Video service errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("video service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("invalid webhook payload: {0}")]
    Payload(String),
}

impl From<reqwest::Error> for VideoError {
    fn from(err: reqwest::Error) -> Self {
        VideoError::Http(err.to_string())
    }
}

/// A direct-upload slot the browser can PUT the file to
#[derive(Debug, Clone)]
pub struct DirectUpload {
    pub upload_id: String,
    pub upload_url: String,
}

/// Webhook event envelope
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Deserialize)]
struct UploadData {
    id: String,
    url: String,
}

/// Client for the hosted video platform
pub struct VideoClient {
    http: reqwest::Client,
    config: VideoConfig,
}

impl VideoClient {
    pub fn new(config: VideoConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create a direct upload for the given user
    ///
    /// The user reference travels in the asset's passthrough field so the
    /// webhook can attribute the finished asset later. Playback is
    /// signed-only; public URLs are never minted for reels.
    pub async fn create_direct_upload(&self, user_id: &str) -> Result<DirectUpload, VideoError> {
        info!(user_id, "creating direct upload");
        let passthrough = serde_json::json!({ "user_id": user_id }).to_string();
        let body = serde_json::json!({
            "cors_origin": self.config.cors_origin,
            "new_asset_settings": {
                "playback_policy": ["signed"],
                "passthrough": passthrough,
            }
        });

        let response = self
            .http
            .post(format!("{}/video/v1/uploads", self.config.base_url))
            .basic_auth(&self.config.token_id, Some(&self.config.token_secret))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), %message, "upload creation failed");
            return Err(VideoError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadResponse = response.json().await?;
        Ok(DirectUpload {
            upload_id: parsed.data.id,
            upload_url: parsed.data.url,
        })
    }

    /// Verify a webhook delivery and unwrap its event
    ///
    /// `now_epoch_secs` is passed in by the caller so the check stays
    /// deterministic under test.
    pub fn verify_webhook(
        &self,
        body: &str,
        signature_header: &str,
        now_epoch_secs: i64,
    ) -> Result<WebhookEvent, VideoError> {
        let (timestamp_raw, signature_hex) = parse_signature_header(signature_header)?;

        let timestamp: i64 = timestamp_raw
            .parse()
            .map_err(|_| VideoError::InvalidSignature("timestamp is not a number".to_string()))?;
        if (now_epoch_secs - timestamp).abs() > self.config.signature_tolerance_secs {
            return Err(VideoError::InvalidSignature(
                "timestamp outside tolerance".to_string(),
            ));
        }

        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.as_bytes())
            .map_err(|_| VideoError::InvalidSignature("unusable webhook secret".to_string()))?;
        mac.update(timestamp_raw.as_bytes());
        mac.update(b".");
        mac.update(body.as_bytes());

        let signature = hex::decode(signature_hex)
            .map_err(|_| VideoError::InvalidSignature("signature is not hex".to_string()))?;
        mac.verify_slice(&signature)
            .map_err(|_| VideoError::InvalidSignature("digest mismatch".to_string()))?;

        serde_json::from_str(body).map_err(|err| VideoError::Payload(err.to_string()))
    }
}

/// Split a `t=<unix>,v1=<hex>` header into its parts
fn parse_signature_header(header: &str) -> Result<(&str, &str), VideoError> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("t=") {
            timestamp = Some(value);
        } else if let Some(value) = part.strip_prefix("v1=") {
            signature = Some(value);
        }
    }
    match (timestamp, signature) {
        (Some(t), Some(v1)) => Ok((t, v1)),
        _ => Err(VideoError::InvalidSignature(
            "missing t= or v1= element".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(secret: &str) -> VideoClient {
        VideoClient::new(VideoConfig {
            webhook_secret: secret.to_string(),
            ..VideoConfig::default()
        })
    }

    fn sign(secret: &str, timestamp: i64, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{body}").as_bytes());
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    const BODY: &str = r#"{"type":"video.asset.ready","data":{"id":"asset_1"}}"#;

    #[test]
    fn valid_signature_unwraps_the_event() {
        let now = 1_754_000_000;
        let header = sign("whsec_test", now, BODY);
        let event = client("whsec_test").verify_webhook(BODY, &header, now).unwrap();
        assert_eq!(event.event_type, "video.asset.ready");
        assert_eq!(event.data["id"], "asset_1");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = 1_754_000_000;
        let header = sign("other_secret", now, BODY);
        let err = client("whsec_test")
            .verify_webhook(BODY, &header, now)
            .unwrap_err();
        assert!(matches!(err, VideoError::InvalidSignature(_)));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let now = 1_754_000_000;
        let header = sign("whsec_test", now, BODY);
        let err = client("whsec_test")
            .verify_webhook(r#"{"type":"video.asset.deleted"}"#, &header, now)
            .unwrap_err();
        assert!(matches!(err, VideoError::InvalidSignature(_)));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let then = 1_754_000_000;
        let header = sign("whsec_test", then, BODY);
        let err = client("whsec_test")
            .verify_webhook(BODY, &header, then + 301)
            .unwrap_err();
        assert!(matches!(err, VideoError::InvalidSignature(_)));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        let client = client("whsec_test");
        for header in ["", "t=123", "v1=abc", "t=abc,v1=zz"] {
            assert!(client.verify_webhook(BODY, header, 123).is_err());
        }
    }
}
