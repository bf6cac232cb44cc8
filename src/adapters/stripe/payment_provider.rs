//! Stripe implementation of the PaymentProvider port.
//!
//! Form-encoded calls against the v1 API. Checkout sessions carry our
//! landlord id as `client_reference_id` so the completion webhook can
//! resolve the account before any customer id is attached; credit-pack
//! sessions additionally carry the purchased unit count in metadata.
//! Cancellation is `cancel_at_period_end=true`, never an immediate
//! delete; the confirming webhook updates local state.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::PaymentConfig;
use crate::ports::{
    CheckoutKind, CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentProvider,
};

/// Stripe payment provider adapter.
pub struct StripePaymentProvider {
    api_key: SecretString,
    base_url: String,
    subscription_price_id: String,
    credit_unit_price_id: String,
    http_client: reqwest::Client,
}

impl StripePaymentProvider {
    /// Creates a new adapter from payment configuration.
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            subscription_price_id: config.subscription_price_id.clone(),
            credit_unit_price_id: config.credit_unit_price_id.clone(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Price id and mode-specific parameters for the session kind.
    fn session_params(&self, kind: &CheckoutKind) -> Vec<(String, String)> {
        match kind {
            CheckoutKind::Subscription => vec![
                ("mode".into(), "subscription".into()),
                ("line_items[0][price]".into(), self.subscription_price_id.clone()),
                ("line_items[0][quantity]".into(), "1".into()),
            ],
            CheckoutKind::CreditPack { units } => vec![
                ("mode".into(), "payment".into()),
                ("line_items[0][price]".into(), self.credit_unit_price_id.clone()),
                ("line_items[0][quantity]".into(), units.to_string()),
                ("metadata[credit_units]".into(), units.to_string()),
            ],
        }
    }
}

/// Subset of the checkout session response this adapter reads.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[async_trait]
impl PaymentProvider for StripePaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);

        let mut params = self.session_params(&request.kind);
        params.push(("client_reference_id".into(), request.landlord_ref.clone()));
        params.push(("success_url".into(), request.success_url));
        params.push(("cancel_url".into(), request.cancel_url));

        if let Some(customer_id) = &request.customer_id {
            params.push(("customer".into(), customer_id.clone()));
        }

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(error = %error_text, "Checkout session creation failed");
            return Err(PaymentError::Rejected(error_text));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Malformed(e.to_string()))?;

        let checkout_url = session.url.ok_or_else(|| {
            PaymentError::Malformed("Checkout session response missing url".into())
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url: checkout_url,
        })
    }

    async fn request_cancellation(&self, subscription_id: &str) -> Result<(), PaymentError> {
        let url = format!("{}/v1/subscriptions/{}", self.base_url, subscription_id);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.api_key.expose_secret(), Option::<&str>::None)
            .form(&[("cancel_at_period_end", "true")])
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                subscription_id,
                error = %error_text,
                "Cancellation request failed"
            );
            return Err(PaymentError::Rejected(error_text));
        }

        Ok(())
    }
}
