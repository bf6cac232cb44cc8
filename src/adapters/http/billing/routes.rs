//! Axum router configuration for billing endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{
    cancel_subscription, check_entitlement, handle_billing_webhook, provision_account,
    start_checkout, BillingAppState,
};

/// Create the billing API router.
///
/// # Routes
/// - `POST /entitlement` - Entitlement gate
/// - `POST /accounts` - Provision account at onboarding
/// - `POST /checkout` - Start hosted checkout
/// - `POST /cancel` - Request cancellation at period end
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/entitlement", post(check_entitlement))
        .route("/accounts", post(provision_account))
        .route("/checkout", post(start_checkout))
        .route("/cancel", post(cancel_subscription))
}

/// Create the webhook router.
///
/// Separate from the billing routes because webhook deliveries carry no
/// user authentication; they are verified via signature.
///
/// # Routes
/// - `POST /billing` - Payment provider webhooks
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/billing", post(handle_billing_webhook))
}
