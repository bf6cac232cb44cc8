//! BillingAccount aggregate.
//!
//! Exactly one per landlord, created at onboarding and never deleted.
//! Written only by the reconciler applying provider events; read by the
//! entitlement gate and billing-display routes. All mutators are full
//! overwrites of the derived fields so that replayed or reordered
//! deliveries converge on the provider's latest truth.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{LandlordId, Timestamp};

use super::status::BillingStatus;

/// A landlord's locally cached subscription state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAccount {
    pub landlord_id: LandlordId,

    /// Provider customer id, set by the first completed checkout.
    pub external_customer_id: Option<String>,

    /// Provider subscription id. A landlord who cancels and later
    /// re-subscribes gets a fresh id, which is why subscription events
    /// are looked up by customer id instead.
    pub external_subscription_id: Option<String>,

    pub status: BillingStatus,

    /// End of the current paid period, when known.
    pub current_period_end: Option<Timestamp>,

    /// Promotional trial flag, independent of provider-side trials.
    pub trial_active: bool,
    pub trial_end: Option<Timestamp>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BillingAccount {
    /// Creates the default account for a newly onboarded landlord.
    ///
    /// `trial_days == 0` disables the promotional trial and the account
    /// starts with no subscription state at all.
    pub fn provision(landlord_id: LandlordId, trial_days: i64, now: Timestamp) -> Self {
        let (status, trial_active, trial_end) = if trial_days > 0 {
            (BillingStatus::Trialing, true, Some(now.add_days(trial_days)))
        } else {
            (BillingStatus::None, false, None)
        };

        Self {
            landlord_id,
            external_customer_id: None,
            external_subscription_id: None,
            status,
            current_period_end: None,
            trial_active,
            trial_end,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a completed checkout: attach provider ids when not already
    /// attached. Status is deliberately untouched; the subscription event
    /// the provider sends alongside is authoritative for it.
    pub fn attach_checkout(
        &mut self,
        customer_id: &str,
        subscription_id: Option<&str>,
        now: Timestamp,
    ) {
        if self.external_customer_id.is_none() {
            self.external_customer_id = Some(customer_id.to_string());
        }
        if self.external_subscription_id.is_none() {
            if let Some(sub) = subscription_id {
                self.external_subscription_id = Some(sub.to_string());
            }
        }
        self.updated_at = now;
    }

    /// Applies a subscription snapshot: full overwrite of status and the
    /// subscription id; the period end is only overwritten when the event
    /// carries a value, so a stale or partial event cannot erase it.
    pub fn apply_subscription_state(
        &mut self,
        subscription_id: &str,
        status: BillingStatus,
        period_end: Option<Timestamp>,
        now: Timestamp,
    ) {
        self.external_subscription_id = Some(subscription_id.to_string());
        self.status = status;
        if period_end.is_some() {
            self.current_period_end = period_end;
        }
        self.updated_at = now;
    }

    /// Applies a subscription removal.
    pub fn mark_canceled(&mut self, now: Timestamp) {
        self.status = BillingStatus::Canceled;
        self.updated_at = now;
    }

    /// Whether the promotional trial currently grants access.
    pub fn promo_active(&self, now: Timestamp) -> bool {
        self.trial_active
            && self
                .trial_end
                .map(|end| !end.is_before(&now))
                .unwrap_or(false)
    }

    /// The entitlement computation: a paid subscription (including one
    /// pending cancellation) or an unexpired promotional trial.
    pub fn is_entitled(&self, now: Timestamp) -> bool {
        self.status.is_paid_active() || self.promo_active(now)
    }
}
