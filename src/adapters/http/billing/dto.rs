//! HTTP DTOs for billing endpoints.
//!
//! These types define the JSON request/response structure for the billing
//! API and are the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::billing::{BillingAccount, BillingStatus};
use crate::ports::CheckoutKind;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to check the entitlement gate for a landlord.
#[derive(Debug, Clone, Deserialize)]
pub struct EntitlementRequest {
    /// The landlord whose gated actions are being checked.
    pub owner_id: Uuid,
}

/// Request to provision the billing account at landlord onboarding.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionAccountRequest {
    pub landlord_id: Uuid,
}

/// What the checkout pays for.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckoutKindRequest {
    Subscription,
    CreditPack { units: u32 },
}

impl From<CheckoutKindRequest> for CheckoutKind {
    fn from(kind: CheckoutKindRequest) -> Self {
        match kind {
            CheckoutKindRequest::Subscription => CheckoutKind::Subscription,
            CheckoutKindRequest::CreditPack { units } => CheckoutKind::CreditPack { units },
        }
    }
}

/// Request to start a hosted checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct StartCheckoutRequest {
    pub landlord_id: Uuid,
    pub kind: CheckoutKindRequest,
    pub success_url: String,
    pub cancel_url: String,
}

/// Request to cancel the subscription at period end.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelSubscriptionRequest {
    pub landlord_id: Uuid,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Acknowledgement body for webhook deliveries.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    pub received: bool,
}

/// The entitlement gate's answer.
#[derive(Debug, Clone, Serialize)]
pub struct EntitlementResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Billing account details for the landlord dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct BillingAccountResponse {
    pub landlord_id: Uuid,
    pub status: BillingStatus,
    pub current_period_end: Option<String>,
    pub trial_active: bool,
    pub trial_end: Option<String>,
}

impl From<BillingAccount> for BillingAccountResponse {
    fn from(account: BillingAccount) -> Self {
        Self {
            landlord_id: *account.landlord_id.as_uuid(),
            status: account.status,
            current_period_end: account
                .current_period_end
                .map(|t| t.as_datetime().to_rfc3339()),
            trial_active: account.trial_active,
            trial_end: account.trial_end.map(|t| t.as_datetime().to_rfc3339()),
        }
    }
}

/// Hosted checkout redirect.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

/// Accepted cancellation request.
#[derive(Debug, Clone, Serialize)]
pub struct CancelSubscriptionResponse {
    pub subscription_id: String,
}
