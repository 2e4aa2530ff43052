//! Transactional email
//!
//! A provider trait over the delivery vendor's API, a template registry
//! for the mails the application sends, and the service tying them
//! together. The service validates messages before they reach the
//! provider so a half-built message never burns an API call.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::EmailConfig;

pub mod provider;
pub mod templates;

pub use provider::ResendProvider;
pub use templates::{EmailTemplate, TemplateRegistry};

/// Email system errors
#[derive(Error, Debug)]
pub enum EmailError {
    #[error("provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("template error: {message}")]
    Template { message: String },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("network error: {message}")]
    Network { message: String },
}

impl EmailError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// One outgoing email
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Provider acknowledgement for an accepted message
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub id: String,
}

/// Delivery provider contract
#[async_trait::async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, EmailError>;

    /// Cheap configuration sanity check, run at startup
    async fn validate_config(&self) -> Result<(), EmailError> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}

/// Application email service
pub struct EmailService {
    provider: Arc<dyn EmailProvider>,
    templates: TemplateRegistry,
    from_address: String,
}

impl EmailService {
    pub fn new(provider: Arc<dyn EmailProvider>, config: &EmailConfig) -> Result<Self, EmailError> {
        Ok(Self {
            provider,
            templates: TemplateRegistry::new()?,
            from_address: config.from_address.clone(),
        })
    }

    /// Run the provider's configuration sanity check
    pub async fn validate_provider(&self) -> Result<(), EmailError> {
        self.provider.validate_config().await
    }

    /// Send a fully built message
    pub async fn send(&self, message: EmailMessage) -> Result<SendReceipt, EmailError> {
        validate(&message)?;
        info!(to = %message.to, subject = %message.subject, provider = self.provider.name(), "sending email");
        self.provider.send(&message).await
    }

    /// Render a registered template and send it to the recipient
    pub async fn send_template(
        &self,
        template: EmailTemplate,
        to: &str,
        context: &tera::Context,
    ) -> Result<SendReceipt, EmailError> {
        info!(template = template.template_name(), to, "sending templated email");
        let html = self.templates.render(template, context)?;
        self.send(EmailMessage {
            to: to.to_string(),
            from: self.from_address.clone(),
            subject: template.subject().to_string(),
            html,
            text: None,
        })
        .await
    }
}

fn validate(message: &EmailMessage) -> Result<(), EmailError> {
    if !message.to.contains('@') {
        return Err(EmailError::validation("to", "not a valid address"));
    }
    if message.subject.trim().is_empty() {
        return Err(EmailError::validation("subject", "must not be empty"));
    }
    if message.html.trim().is_empty() {
        return Err(EmailError::validation("html", "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Provider that records what it was asked to send
    struct RecordingProvider {
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait::async_trait]
    impl EmailProvider for RecordingProvider {
        async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, EmailError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(SendReceipt {
                id: "msg_1".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn service() -> (Arc<RecordingProvider>, EmailService) {
        let provider = Arc::new(RecordingProvider {
            sent: Mutex::new(Vec::new()),
        });
        let service = EmailService::new(provider.clone(), &EmailConfig::default()).unwrap();
        (provider, service)
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: "ada@example.com".to_string(),
            from: "Reelbox <onboarding@reelbox.dev>".to_string(),
            subject: "Hi".to_string(),
            html: "<p>Hi</p>".to_string(),
            text: None,
        }
    }

    #[tokio::test]
    async fn valid_messages_reach_the_provider() {
        let (provider, service) = service();
        let receipt = service.send(message()).await.unwrap();
        assert_eq!(receipt.id, "msg_1");
        assert_eq!(provider.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_recipient_is_rejected_before_the_provider() {
        let (provider, service) = service();
        let err = service
            .send(EmailMessage {
                to: "not-an-address".to_string(),
                ..message()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EmailError::Validation { .. }));
        assert!(provider.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_subject_is_rejected() {
        let (_, service) = service();
        let err = service
            .send(EmailMessage {
                subject: "  ".to_string(),
                ..message()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EmailError::Validation { .. }));
    }

    #[tokio::test]
    async fn templated_send_renders_and_uses_the_configured_sender() {
        let (provider, service) = service();
        let mut context = tera::Context::new();
        context.insert("name", "Ada");

        service
            .send_template(EmailTemplate::Welcome, "ada@example.com", &context)
            .await
            .unwrap();

        let sent = provider.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, EmailConfig::default().from_address);
        assert_eq!(sent[0].subject, EmailTemplate::Welcome.subject());
        assert!(sent[0].html.contains("Ada"));
    }
}
