//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query
//! handlers. The webhook endpoint is special: it consumes the raw body
//! because the signature covers the exact bytes on the wire, and its
//! status codes implement the acknowledgement contract with the provider.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use secrecy::SecretString;
use tracing::warn;

use crate::application::handlers::billing::{
    CheckEntitlementHandler, CheckEntitlementQuery, ProcessWebhookCommand, ProcessWebhookHandler,
    ProvisionAccountCommand, ProvisionAccountHandler, RequestCancellationCommand,
    RequestCancellationHandler, StartCheckoutCommand, StartCheckoutHandler,
};
use crate::domain::billing::{SubscriptionReconciler, WebhookVerifier};
use crate::domain::foundation::LandlordId;
use crate::ports::{BillingAccountStore, CreditStore, Notifier, PaymentProvider};

use super::super::error::{ApiError, ErrorResponse};
use super::dto::{
    BillingAccountResponse, CancelSubscriptionRequest, CancelSubscriptionResponse,
    CheckoutResponse, EntitlementRequest, EntitlementResponse, ProvisionAccountRequest,
    StartCheckoutRequest, WebhookAckResponse,
};

/// Signature header set by the payment provider on every delivery.
const SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the billing routes.
#[derive(Clone)]
pub struct BillingAppState {
    pub accounts: Arc<dyn BillingAccountStore>,
    pub credits: Arc<dyn CreditStore>,
    pub payments: Arc<dyn PaymentProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub webhook_secret: SecretString,
    pub trial_days: i64,
    pub billing_alerts_email: Option<String>,
}

impl BillingAppState {
    /// Create handlers on demand from the shared state.
    pub fn webhook_handler(&self) -> ProcessWebhookHandler {
        ProcessWebhookHandler::new(
            WebhookVerifier::new(self.webhook_secret.clone()),
            SubscriptionReconciler::new(self.accounts.clone(), self.credits.clone()),
            self.notifier.clone(),
            self.billing_alerts_email.clone(),
        )
    }

    pub fn entitlement_handler(&self) -> CheckEntitlementHandler {
        CheckEntitlementHandler::new(self.accounts.clone())
    }

    pub fn provision_handler(&self) -> ProvisionAccountHandler {
        ProvisionAccountHandler::new(self.accounts.clone(), self.trial_days)
    }

    pub fn checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(self.accounts.clone(), self.payments.clone())
    }

    pub fn cancellation_handler(&self) -> RequestCancellationHandler {
        RequestCancellationHandler::new(self.accounts.clone(), self.payments.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Endpoint
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/billing - Handle payment provider webhooks
pub async fn handle_billing_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        let body = ErrorResponse::new("MISSING_SIGNATURE", "Missing signature header");
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    let handler = state.webhook_handler();
    let cmd = ProcessWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match handler.handle(cmd).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAckResponse { received: true })).into_response(),
        Err(e) => {
            warn!(error = %e, retryable = e.is_retryable(), "webhook delivery rejected");
            let body = ErrorResponse::new("WEBHOOK_REJECTED", e.to_string());
            (e.status_code(), Json(body)).into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Gate and Command Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/billing/entitlement - Entitlement gate for gated features
///
/// Always 200: degraded answers (fail-open, denial reasons) are part of
/// the decision body, not the status code.
pub async fn check_entitlement(
    State(state): State<BillingAppState>,
    Json(request): Json<EntitlementRequest>,
) -> impl IntoResponse {
    let handler = state.entitlement_handler();
    let decision = handler
        .handle(CheckEntitlementQuery {
            landlord_id: LandlordId::from_uuid(request.owner_id),
        })
        .await;

    Json(EntitlementResponse {
        allowed: decision.allowed,
        reason: decision.reason,
    })
}

/// POST /api/billing/accounts - Provision the account at onboarding
pub async fn provision_account(
    State(state): State<BillingAppState>,
    Json(request): Json<ProvisionAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.provision_handler();
    let account = handler
        .handle(ProvisionAccountCommand {
            landlord_id: LandlordId::from_uuid(request.landlord_id),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BillingAccountResponse::from(account)),
    ))
}

/// POST /api/billing/checkout - Start a hosted checkout flow
pub async fn start_checkout(
    State(state): State<BillingAppState>,
    Json(request): Json<StartCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.checkout_handler();
    let session = handler
        .handle(StartCheckoutCommand {
            landlord_id: LandlordId::from_uuid(request.landlord_id),
            kind: request.kind.into(),
            success_url: request.success_url,
            cancel_url: request.cancel_url,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            checkout_url: session.url,
        }),
    ))
}

/// POST /api/billing/cancel - Ask the provider to cancel at period end
///
/// 202: the request was accepted by the provider; the local status only
/// changes when the confirming webhook arrives.
pub async fn cancel_subscription(
    State(state): State<BillingAppState>,
    Json(request): Json<CancelSubscriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.cancellation_handler();
    let result = handler
        .handle(RequestCancellationCommand {
            landlord_id: LandlordId::from_uuid(request.landlord_id),
        })
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(CancelSubscriptionResponse {
            subscription_id: result.subscription_id,
        }),
    ))
}
