//! ProvisionAccountHandler - Command handler run at landlord onboarding.

use std::sync::Arc;

use tracing::info;

use crate::domain::billing::BillingAccount;
use crate::domain::foundation::{DomainError, ErrorCode, LandlordId, Timestamp};
use crate::ports::BillingAccountStore;

/// Command to provision the billing account for a new landlord.
#[derive(Debug, Clone)]
pub struct ProvisionAccountCommand {
    pub landlord_id: LandlordId,
}

/// Handler creating the one-per-landlord billing account.
///
/// Idempotent: re-running onboarding leaves an existing account untouched.
pub struct ProvisionAccountHandler {
    accounts: Arc<dyn BillingAccountStore>,
    /// Promotional trial length; 0 disables trials.
    trial_days: i64,
}

impl ProvisionAccountHandler {
    pub fn new(accounts: Arc<dyn BillingAccountStore>, trial_days: i64) -> Self {
        Self {
            accounts,
            trial_days,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProvisionAccountCommand,
    ) -> Result<BillingAccount, DomainError> {
        let account = BillingAccount::provision(cmd.landlord_id, self.trial_days, Timestamp::now());
        self.accounts.create_if_absent(&account).await?;

        // Return the stored row: on a replay this is the original account,
        // not the one constructed above.
        let stored = self
            .accounts
            .find_by_landlord(&cmd.landlord_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::AccountNotFound, "account missing after provisioning")
            })?;

        info!(landlord_id = %stored.landlord_id, status = stored.status.as_str(), "billing account provisioned");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::BillingStatus;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockAccounts {
        accounts: Mutex<HashMap<LandlordId, BillingAccount>>,
    }

    #[async_trait]
    impl BillingAccountStore for MockAccounts {
        async fn create_if_absent(&self, account: &BillingAccount) -> Result<(), DomainError> {
            self.accounts
                .lock()
                .unwrap()
                .entry(account.landlord_id)
                .or_insert_with(|| account.clone());
            Ok(())
        }

        async fn find_by_landlord(
            &self,
            landlord_id: &LandlordId,
        ) -> Result<Option<BillingAccount>, DomainError> {
            Ok(self.accounts.lock().unwrap().get(landlord_id).cloned())
        }

        async fn find_by_customer_id(
            &self,
            _customer_id: &str,
        ) -> Result<Option<BillingAccount>, DomainError> {
            Ok(None)
        }

        async fn find_by_subscription_id(
            &self,
            _subscription_id: &str,
        ) -> Result<Option<BillingAccount>, DomainError> {
            Ok(None)
        }

        async fn update(&self, account: &BillingAccount) -> Result<(), DomainError> {
            self.accounts
                .lock()
                .unwrap()
                .insert(account.landlord_id, account.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn provisions_trialing_account() {
        let handler = ProvisionAccountHandler::new(Arc::new(MockAccounts::default()), 30);
        let landlord_id = LandlordId::new();

        let account = handler
            .handle(ProvisionAccountCommand { landlord_id })
            .await
            .unwrap();

        assert_eq!(account.landlord_id, landlord_id);
        assert_eq!(account.status, BillingStatus::Trialing);
        assert!(account.trial_active);
    }

    #[tokio::test]
    async fn zero_trial_days_provisions_without_trial() {
        let handler = ProvisionAccountHandler::new(Arc::new(MockAccounts::default()), 0);

        let account = handler
            .handle(ProvisionAccountCommand {
                landlord_id: LandlordId::new(),
            })
            .await
            .unwrap();

        assert_eq!(account.status, BillingStatus::None);
        assert!(!account.trial_active);
    }

    #[tokio::test]
    async fn replayed_provisioning_keeps_original_account() {
        let accounts = Arc::new(MockAccounts::default());
        let handler = ProvisionAccountHandler::new(accounts, 30);
        let landlord_id = LandlordId::new();

        let first = handler
            .handle(ProvisionAccountCommand { landlord_id })
            .await
            .unwrap();
        let second = handler
            .handle(ProvisionAccountCommand { landlord_id })
            .await
            .unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(first.trial_end, second.trial_end);
    }
}
