//! Resend implementation of the Notifier port.
//!
//! Single JSON call to the Resend send endpoint. Callers treat this as
//! fire-and-forget; a failure here is logged by the caller, never
//! propagated into the operation that triggered the notification.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::EmailConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{Notification, Notifier};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Resend email adapter.
pub struct ResendNotifier {
    api_key: SecretString,
    from_header: String,
    http_client: reqwest::Client,
}

impl ResendNotifier {
    /// Creates a new notifier from email configuration.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            api_key: config.resend_api_key.clone(),
            from_header: config.from_header(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send(&self, notification: Notification) -> Result<(), DomainError> {
        let request = SendEmailRequest {
            from: &self.from_header,
            to: [&notification.to_email],
            subject: &notification.subject,
            text: &notification.body,
        };

        let response = self
            .http_client
            .post(RESEND_API_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::ProviderCallFailed,
                    format!("Email send failed: {}", e),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DomainError::new(
                ErrorCode::ProviderCallFailed,
                format!("Email provider returned {}: {}", status, error_text),
            ));
        }

        Ok(())
    }
}
