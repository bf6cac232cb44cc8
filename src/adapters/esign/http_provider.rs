//! HTTP implementation of the EsignProvider port.
//!
//! One JSON call per envelope against the provider's REST API. The
//! per-request timeout is a hard bound: a hung call surfaces as
//! `EsignError::Timeout` so the caller can release its credit
//! reservation instead of waiting forever.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::EsignConfig;
use crate::ports::{EnvelopeReceipt, EnvelopeRequest, EsignError, EsignProvider};

/// HTTP e-signature provider adapter.
pub struct HttpEsignProvider {
    base_url: String,
    api_key: SecretString,
    call_timeout: Duration,
    http_client: reqwest::Client,
}

impl HttpEsignProvider {
    /// Creates a new adapter from e-sign configuration.
    pub fn new(config: &EsignConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            call_timeout: config.call_timeout(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateEnvelopeBody<'a> {
    document_id: &'a str,
    signer_email: &'a str,
    signer_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateEnvelopeResponse {
    envelope_id: String,
}

#[async_trait]
impl EsignProvider for HttpEsignProvider {
    async fn send_envelope(&self, request: EnvelopeRequest) -> Result<EnvelopeReceipt, EsignError> {
        let url = format!("{}/envelopes", self.base_url);

        let body = CreateEnvelopeBody {
            document_id: &request.document_id,
            signer_email: &request.signer_email,
            signer_name: &request.signer_name,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .timeout(self.call_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EsignError::Timeout
                } else {
                    EsignError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                document_id = %request.document_id,
                error = %error_text,
                "Envelope creation rejected"
            );
            return Err(EsignError::Rejected(error_text));
        }

        let receipt: CreateEnvelopeResponse = response
            .json()
            .await
            .map_err(|e| EsignError::Transport(format!("Invalid provider response: {}", e)))?;

        Ok(EnvelopeReceipt {
            envelope_id: receipt.envelope_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_body_serializes_expected_shape() {
        let body = CreateEnvelopeBody {
            document_id: "lease-2026-04",
            signer_email: "tenant@example.com",
            signer_name: "Jordan Lee",
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["document_id"], "lease-2026-04");
        assert_eq!(json["signer_email"], "tenant@example.com");
    }

    #[test]
    fn envelope_response_parses() {
        let receipt: CreateEnvelopeResponse =
            serde_json::from_str(r#"{"envelope_id":"env_42"}"#).unwrap();
        assert_eq!(receipt.envelope_id, "env_42");
    }
}
