//! Billing account store port.
//!
//! Writes go through the reconciler and the provisioning handler only;
//! the entitlement gate and display routes read. Implementations must
//! keep the one-account-per-landlord constraint.

use async_trait::async_trait;

use crate::domain::billing::BillingAccount;
use crate::domain::foundation::{DomainError, LandlordId};

/// Store port for BillingAccount persistence.
#[async_trait]
pub trait BillingAccountStore: Send + Sync {
    /// Inserts the account if none exists for its landlord yet.
    ///
    /// Idempotent: a second provisioning attempt for the same landlord is
    /// a no-op, not an error.
    async fn create_if_absent(&self, account: &BillingAccount) -> Result<(), DomainError>;

    /// Looks up the account by its owning landlord.
    async fn find_by_landlord(
        &self,
        landlord_id: &LandlordId,
    ) -> Result<Option<BillingAccount>, DomainError>;

    /// Looks up the account by the provider's customer id. Subscription
    /// events resolve through this so a re-subscription with a fresh
    /// subscription id still finds the right landlord.
    async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<BillingAccount>, DomainError>;

    /// Looks up the account by the provider's subscription id.
    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<BillingAccount>, DomainError>;

    /// Full overwrite of the account's derived fields.
    async fn update(&self, account: &BillingAccount) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_account_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn BillingAccountStore) {}
    }
}
