//! Webhook error taxonomy.
//!
//! Maps every failure mode of the ingestion pipeline to the response the
//! provider should see. Providers retry only on non-2xx, so the mapping
//! decides whether an event is redelivered: signature and parse failures
//! are terminal (4xx), events this system will never understand are
//! acknowledged (200), and store faults are surfaced (5xx) so the
//! provider retries.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the replay-protection window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Event type this system does not handle. Acknowledged so the
    /// provider stops retrying something we will never understand.
    #[error("Unmapped event type: {0}")]
    Unmapped(String),

    /// Event references a customer or subscription with no local billing
    /// account. A configuration gap, not a transient fault; acknowledged.
    #[error("No billing account for provider object: {0}")]
    MissingAccountMapping(String),

    /// Datastore operation failed. Surfaced as 5xx to force a retry.
    #[error("Store error: {0}")]
    Store(String),
}

impl WebhookError {
    /// Returns true if the provider should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Store(_))
    }

    /// Maps the error to the HTTP status the webhook endpoint responds with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Auth failures, never retried
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }

            // Malformed input, never retried
            WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            // Acknowledged: retrying will never resolve these
            WebhookError::Unmapped(_) | WebhookError::MissingAccountMapping(_) => StatusCode::OK,

            // Transient, provider retries on 5xx
            WebhookError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
