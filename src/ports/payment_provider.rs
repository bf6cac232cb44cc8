//! Payment provider port.
//!
//! The provider is an opaque RPC service and the single source of truth
//! for subscription state. Commands here are one-way: a cancellation
//! request asks the provider to cancel and returns; local state is only
//! ever updated by the webhook that confirms the change. No method on
//! this port writes to the local datastore.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a hosted checkout session is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutKind {
    /// Recurring subscription for the platform itself.
    Subscription,
    /// One-time purchase of prepaid e-sign credits.
    CreditPack { units: u32 },
}

/// Request to create a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CreateCheckoutRequest {
    /// Our landlord id, round-tripped through checkout metadata.
    pub landlord_ref: String,
    /// Existing provider customer id, when the landlord has one.
    pub customer_id: Option<String>,
    pub kind: CheckoutKind,
    pub success_url: String,
    pub cancel_url: String,
}

/// A created hosted checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Errors from the payment provider RPC surface.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Provider rejected the request: {0}")]
    Rejected(String),

    #[error("Provider unreachable: {0}")]
    Transport(String),

    #[error("Unexpected provider response: {0}")]
    Malformed(String),
}

/// Port for the payment provider's command surface.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Creates a hosted checkout session and returns its redirect URL.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Asks the provider to cancel the subscription at period end.
    ///
    /// One-way: success means the provider accepted the request, not that
    /// the subscription is canceled. The confirming webhook updates local
    /// state.
    async fn request_cancellation(&self, subscription_id: &str) -> Result<(), PaymentError>;
}
