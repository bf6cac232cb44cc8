//! RequestCancellationHandler - Command handler for subscription cancellation.
//!
//! One-way: asks the provider to cancel at period end and returns. Local
//! status is deliberately not flipped here; the provider remains source
//! of truth and the confirming webhook moves the account to
//! `ActiveCancelPending` (and later `Canceled`).

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, LandlordId};
use crate::ports::{BillingAccountStore, PaymentProvider};

/// Command to request a cancellation at period end.
#[derive(Debug, Clone)]
pub struct RequestCancellationCommand {
    pub landlord_id: LandlordId,
}

/// Result of a cancellation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCancellationResult {
    /// The subscription the provider was asked to cancel.
    pub subscription_id: String,
}

/// Handler for the one-way cancellation command.
pub struct RequestCancellationHandler {
    accounts: Arc<dyn BillingAccountStore>,
    payments: Arc<dyn PaymentProvider>,
}

impl RequestCancellationHandler {
    pub fn new(
        accounts: Arc<dyn BillingAccountStore>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self { accounts, payments }
    }

    pub async fn handle(
        &self,
        cmd: RequestCancellationCommand,
    ) -> Result<RequestCancellationResult, DomainError> {
        let account = self
            .accounts
            .find_by_landlord(&cmd.landlord_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::AccountNotFound, "no billing account for landlord")
            })?;

        let subscription_id = account.external_subscription_id.ok_or_else(|| {
            DomainError::validation("subscription", "no subscription to cancel")
        })?;

        self.payments
            .request_cancellation(&subscription_id)
            .await
            .map_err(|e| DomainError::new(ErrorCode::ProviderCallFailed, e.to_string()))?;

        info!(landlord_id = %cmd.landlord_id, subscription_id, "cancellation requested");
        Ok(RequestCancellationResult { subscription_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{BillingAccount, BillingStatus};
    use crate::domain::foundation::Timestamp;
    use crate::ports::{CheckoutSession, CreateCheckoutRequest, PaymentError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockAccounts {
        account: Mutex<Option<BillingAccount>>,
    }

    impl MockAccounts {
        fn with(account: Option<BillingAccount>) -> Arc<Self> {
            Arc::new(Self {
                account: Mutex::new(account),
            })
        }
    }

    #[async_trait]
    impl BillingAccountStore for MockAccounts {
        async fn create_if_absent(&self, _account: &BillingAccount) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_by_landlord(
            &self,
            _landlord_id: &LandlordId,
        ) -> Result<Option<BillingAccount>, DomainError> {
            Ok(self.account.lock().unwrap().clone())
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
            *self.account.lock().unwrap() = Some(account.clone());
            Ok(())
        }
    }

    struct MockPayments {
        cancellations: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MockPayments {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                cancellations: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                cancellations: Mutex::new(Vec::new()),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl PaymentProvider for MockPayments {
        async fn create_checkout_session(
            &self,
            _request: CreateCheckoutRequest,
        ) -> Result<CheckoutSession, PaymentError> {
            Err(PaymentError::Rejected("not under test".into()))
        }

        async fn request_cancellation(&self, subscription_id: &str) -> Result<(), PaymentError> {
            if self.fail {
                return Err(PaymentError::Transport("connect timeout".into()));
            }
            self.cancellations
                .lock()
                .unwrap()
                .push(subscription_id.to_string());
            Ok(())
        }
    }

    fn subscribed_account() -> BillingAccount {
        let mut account = BillingAccount::provision(LandlordId::new(), 0, Timestamp::now());
        account.attach_checkout("cus_1", Some("sub_1"), Timestamp::now());
        account.apply_subscription_state("sub_1", BillingStatus::Active, None, Timestamp::now());
        account
    }

    #[tokio::test]
    async fn forwards_cancellation_and_leaves_status_untouched() {
        let accounts = MockAccounts::with(Some(subscribed_account()));
        let payments = MockPayments::ok();
        let handler = RequestCancellationHandler::new(accounts.clone(), payments.clone());

        let result = handler
            .handle(RequestCancellationCommand {
                landlord_id: LandlordId::new(),
            })
            .await
            .unwrap();

        assert_eq!(result.subscription_id, "sub_1");
        assert_eq!(payments.cancellations.lock().unwrap().as_slice(), ["sub_1"]);
        // Source of truth is the provider; only the webhook changes status.
        assert_eq!(
            accounts.account.lock().unwrap().as_ref().unwrap().status,
            BillingStatus::Active
        );
    }

    #[tokio::test]
    async fn no_subscription_is_a_validation_error() {
        let account = BillingAccount::provision(LandlordId::new(), 0, Timestamp::now());
        let handler =
            RequestCancellationHandler::new(MockAccounts::with(Some(account)), MockPayments::ok());

        let result = handler
            .handle(RequestCancellationCommand {
                landlord_id: LandlordId::new(),
            })
            .await;
        assert!(matches!(result, Err(e) if e.code == ErrorCode::ValidationFailed));
    }

    #[tokio::test]
    async fn missing_account_is_rejected() {
        let handler =
            RequestCancellationHandler::new(MockAccounts::with(None), MockPayments::ok());

        let result = handler
            .handle(RequestCancellationCommand {
                landlord_id: LandlordId::new(),
            })
            .await;
        assert!(matches!(result, Err(e) if e.code == ErrorCode::AccountNotFound));
    }

    #[tokio::test]
    async fn provider_failure_is_surfaced() {
        let handler = RequestCancellationHandler::new(
            MockAccounts::with(Some(subscribed_account())),
            MockPayments::failing(),
        );

        let result = handler
            .handle(RequestCancellationCommand {
                landlord_id: LandlordId::new(),
            })
            .await;
        assert!(matches!(result, Err(e) if e.code == ErrorCode::ProviderCallFailed));
    }
}
