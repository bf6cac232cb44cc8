//! Billing account status.
//!
//! The status is derived state: the payment provider is the source of
//! truth and every write is a full overwrite computed from the latest
//! event. Transitions are therefore not gated; out-of-order deliveries
//! must still be applied so the account converges on the provider's view.

use serde::{Deserialize, Serialize};

/// Subscription status of a landlord's billing account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    /// No subscription has ever existed (trials disabled at provisioning).
    None,

    /// Provider-managed trial period.
    Trialing,

    /// Fully paid subscription.
    Active,

    /// Cancellation requested; paid access continues until period end.
    ActiveCancelPending,

    /// Payment failed, provider is retrying.
    PastDue,

    /// Subscription ended.
    Canceled,
}

impl BillingStatus {
    /// Translates the provider's raw subscription status vocabulary.
    ///
    /// Returns `None` for vocabulary this system does not recognize; the
    /// caller logs and acknowledges rather than guessing.
    pub fn map_raw(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(BillingStatus::Active),
            "trialing" => Some(BillingStatus::Trialing),
            "past_due" => Some(BillingStatus::PastDue),
            "canceled" | "unpaid" | "incomplete_expired" => Some(BillingStatus::Canceled),
            _ => None,
        }
    }

    /// Resolves the effective status for a subscription snapshot.
    ///
    /// A pending cancellation on an otherwise healthy subscription is
    /// surfaced as its own state so the entitlement gate and the dashboard
    /// can distinguish it from a plain active subscription. The override
    /// applies only to `Active` and `Trialing`: a canceled or delinquent
    /// snapshot keeps its mapped status even when the provider still
    /// carries a stale cancel flag, so a dead subscription can never
    /// re-enter an entitled state through that flag.
    pub fn effective(mapped: Self, cancel_at_period_end: bool) -> Self {
        if cancel_at_period_end
            && matches!(mapped, BillingStatus::Active | BillingStatus::Trialing)
        {
            BillingStatus::ActiveCancelPending
        } else {
            mapped
        }
    }

    /// Returns true if this status represents a paid, entitled subscription.
    pub fn is_paid_active(&self) -> bool {
        matches!(
            self,
            BillingStatus::Active | BillingStatus::ActiveCancelPending
        )
    }

    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingStatus::None => "none",
            BillingStatus::Trialing => "trialing",
            BillingStatus::Active => "active",
            BillingStatus::ActiveCancelPending => "active_cancel_pending",
            BillingStatus::PastDue => "past_due",
            BillingStatus::Canceled => "canceled",
        }
    }

    /// Parses the persisted string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(BillingStatus::None),
            "trialing" => Some(BillingStatus::Trialing),
            "active" => Some(BillingStatus::Active),
            "active_cancel_pending" => Some(BillingStatus::ActiveCancelPending),
            "past_due" => Some(BillingStatus::PastDue),
            "canceled" => Some(BillingStatus::Canceled),
            _ => None,
        }
    }
}
