//! Delivery providers

use serde::Deserialize;
use tracing::error;

use crate::config::EmailConfig;

use super::{EmailError, EmailMessage, EmailProvider, SendReceipt};

/// Resend-style REST delivery provider
///
/// Posts messages to the vendor's `/emails` endpoint with bearer auth.
pub struct ResendProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

impl ResendProvider {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait::async_trait]
impl EmailProvider for ResendProvider {
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, EmailError> {
        let body = serde_json::json!({
            "from": message.from,
            "to": [message.to],
            "subject": message.subject,
            "html": message.html,
            "text": message.text,
        });

        let response = self
            .http
            .post(format!("{}/emails", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| EmailError::Network {
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), %detail, "delivery provider rejected message");
            return Err(EmailError::provider(
                self.name(),
                format!("{status}: {detail}"),
            ));
        }

        let parsed: SendResponse = response.json().await.map_err(|err| {
            EmailError::provider(self.name(), format!("unreadable response: {err}"))
        })?;
        Ok(SendReceipt { id: parsed.id })
    }

    async fn validate_config(&self) -> Result<(), EmailError> {
        if self.api_key.is_empty() {
            return Err(EmailError::configuration("delivery API key is not set"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_fails_validation() {
        let provider = ResendProvider::new(&EmailConfig::default());
        assert!(matches!(
            provider.validate_config().await,
            Err(EmailError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn configured_key_passes_validation() {
        let provider = ResendProvider::new(&EmailConfig {
            api_key: "re_123".to_string(),
            ..EmailConfig::default()
        });
        assert!(provider.validate_config().await.is_ok());
    }
}
