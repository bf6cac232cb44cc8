//! CheckEntitlementHandler - Query handler gating tenant-facing actions.
//!
//! Called before rent-collection actions (invites, payment recording).
//! The gate fails open only when the store itself is unavailable: a
//! billing outage must not block rent collection. A landlord without an
//! account row is denied; that is a provisioning gap, not an outage.

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::foundation::{LandlordId, Timestamp};
use crate::ports::BillingAccountStore;

/// Query to check whether a landlord may use gated features.
#[derive(Debug, Clone)]
pub struct CheckEntitlementQuery {
    pub landlord_id: LandlordId,
}

/// The gate's decision, with a diagnostic reason for denied or degraded
/// answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl EntitlementDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    fn fail_open(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: Some(reason.into()),
        }
    }
}

/// Handler for the entitlement gate.
pub struct CheckEntitlementHandler {
    accounts: Arc<dyn BillingAccountStore>,
}

impl CheckEntitlementHandler {
    pub fn new(accounts: Arc<dyn BillingAccountStore>) -> Self {
        Self { accounts }
    }

    /// Never returns an error: degraded answers are encoded in the
    /// decision so callers have exactly one code path.
    pub async fn handle(&self, query: CheckEntitlementQuery) -> EntitlementDecision {
        let account = match self.accounts.find_by_landlord(&query.landlord_id).await {
            Ok(account) => account,
            Err(e) => {
                error!(landlord_id = %query.landlord_id, error = %e, "entitlement lookup failed, failing open");
                return EntitlementDecision::fail_open("billing state unavailable");
            }
        };

        let Some(account) = account else {
            warn!(landlord_id = %query.landlord_id, "entitlement check for unprovisioned landlord");
            return EntitlementDecision::denied("no billing account");
        };

        if account.is_entitled(Timestamp::now()) {
            EntitlementDecision::allowed()
        } else {
            EntitlementDecision::denied(format!(
                "subscription status is {}",
                account.status.as_str()
            ))
        }
    }
}
