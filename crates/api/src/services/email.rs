//! Email delivery.
//!
//! Supports multiple email providers:
//! - `console`: Logs emails (development)
//! - `resend`: Resend HTTPS API
//! - `sendgrid`: SendGrid HTTPS API

use crate::config::EmailConfig;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

const RESEND_URL: &str = "https://api.resend.com/emails";
const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured: {0}")]
    NotConfigured(String),

    #[error("Email has no recipients")]
    NoRecipients,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: Vec<String>,
    /// Display name for the From header; defaults to the configured sender name.
    pub from_name: Option<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl EmailService {
    /// Creates a service whose HTTP calls are bounded by `timeout`.
    pub fn new(config: EmailConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to build email HTTP client, using defaults");
                reqwest::Client::new()
            });
        Self {
            config: Arc::new(config),
            client,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn wants_html(&self) -> bool {
        self.config.template_style == "html"
    }

    pub fn config(&self) -> &EmailConfig {
        &self.config
    }

    /// Sends a message through the configured provider. Disabled email is a
    /// silent success.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        if message.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        match self.config.provider.as_str() {
            "console" => {
                self.send_console(&message);
                Ok(())
            }
            "resend" => self.send_resend(message).await,
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured(format!(
                    "unknown provider {}",
                    provider
                )))
            }
        }
    }

    fn from_header(&self, message: &EmailMessage) -> String {
        format!(
            "{} <{}>",
            message.from_name.as_deref().unwrap_or(&self.config.sender_name),
            self.config.sender_email
        )
    }

    fn send_console(&self, message: &EmailMessage) {
        info!(
            to = ?message.to,
            subject = %message.subject,
            from = %self.from_header(message),
            "Email (console provider)"
        );
        info!(body_text = %message.body_text, "Email body (plain text)");
        if let Some(html) = &message.body_html {
            debug!(body_html_length = html.len(), "Email body (HTML)");
        }
    }

    async fn send_resend(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.resend_api_key.is_empty() {
            return Err(EmailError::NotConfigured("resend_api_key".into()));
        }

        let mut body = json!({
            "from": self.from_header(&message),
            "to": message.to,
            "subject": message.subject,
            "text": message.body_text,
        });
        if let Some(html) = &message.body_html {
            body["html"] = json!(html);
        }

        self.post("Resend", RESEND_URL, &self.config.resend_api_key, &body, &message)
            .await
    }

    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured("sendgrid_api_key".into()));
        }

        let to: Vec<_> = message.to.iter().map(|email| json!({ "email": email })).collect();
        let mut content = vec![json!({
            "type": "text/plain",
            "value": message.body_text
        })];
        if let Some(html) = &message.body_html {
            content.push(json!({
                "type": "text/html",
                "value": html
            }));
        }

        let body = json!({
            "personalizations": [{ "to": to }],
            "from": {
                "email": self.config.sender_email,
                "name": message.from_name.as_deref().unwrap_or(&self.config.sender_name)
            },
            "subject": message.subject,
            "content": content
        });

        self.post("SendGrid", SENDGRID_URL, &self.config.sendgrid_api_key, &body, &message)
            .await
    }

    async fn post(
        &self,
        provider: &str,
        url: &str,
        api_key: &str,
        body: &serde_json::Value,
        message: &EmailMessage,
    ) -> Result<(), EmailError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("{} request failed: {}", provider, e)))?;

        if response.status().is_success() {
            info!(
                provider,
                recipients = message.to.len(),
                subject = %message.subject,
                "Email sent"
            );
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(provider, status = %status, error = %error_body, "Email provider error");
            Err(EmailError::ProviderError(format!(
                "{} returned {}: {}",
                provider, status, error_body
            )))
        }
    }
}
