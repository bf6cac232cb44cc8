//! StartCheckoutHandler - Command handler for hosted checkout sessions.
//!
//! Creates a provider-hosted checkout and hands back its redirect URL.
//! No local state changes here: the ids and the resulting subscription
//! state arrive through the webhook once checkout completes.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, LandlordId};
use crate::ports::{
    BillingAccountStore, CheckoutKind, CheckoutSession, CreateCheckoutRequest, PaymentProvider,
};

/// Command to start a hosted checkout.
#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub landlord_id: LandlordId,
    pub kind: CheckoutKind,
    pub success_url: String,
    pub cancel_url: String,
}

/// Handler for checkout session creation.
pub struct StartCheckoutHandler {
    accounts: Arc<dyn BillingAccountStore>,
    payments: Arc<dyn PaymentProvider>,
}

impl StartCheckoutHandler {
    pub fn new(
        accounts: Arc<dyn BillingAccountStore>,
        payments: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self { accounts, payments }
    }

    pub async fn handle(
        &self,
        cmd: StartCheckoutCommand,
    ) -> Result<CheckoutSession, DomainError> {
        if let CheckoutKind::CreditPack { units: 0 } = cmd.kind {
            return Err(DomainError::validation("units", "credit pack must contain at least one unit"));
        }

        let account = self
            .accounts
            .find_by_landlord(&cmd.landlord_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::AccountNotFound, "no billing account for landlord")
            })?;

        let request = CreateCheckoutRequest {
            landlord_ref: cmd.landlord_id.to_string(),
            customer_id: account.external_customer_id,
            kind: cmd.kind,
            success_url: cmd.success_url,
            cancel_url: cmd.cancel_url,
        };

        let session = self
            .payments
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::ProviderCallFailed, e.to_string())
            })?;

        info!(landlord_id = %cmd.landlord_id, session_id = session.id, "checkout session created");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::BillingAccount;
    use crate::domain::foundation::Timestamp;
    use crate::ports::PaymentError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockAccounts {
        account: Option<BillingAccount>,
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
            Ok(self.account.clone())
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

        async fn update(&self, _account: &BillingAccount) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct MockPayments {
        requests: Mutex<Vec<CreateCheckoutRequest>>,
        fail: bool,
    }

    impl MockPayments {
        fn ok() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl PaymentProvider for MockPayments {
        async fn create_checkout_session(
            &self,
            request: CreateCheckoutRequest,
        ) -> Result<CheckoutSession, PaymentError> {
            if self.fail {
                return Err(PaymentError::Transport("connect timeout".into()));
            }
            self.requests.lock().unwrap().push(request);
            Ok(CheckoutSession {
                id: "cs_1".into(),
                url: "https://pay.example.com/cs_1".into(),
            })
        }

        async fn request_cancellation(&self, _subscription_id: &str) -> Result<(), PaymentError> {
            Ok(())
        }
    }

    fn command(kind: CheckoutKind) -> StartCheckoutCommand {
        StartCheckoutCommand {
            landlord_id: LandlordId::new(),
            kind,
            success_url: "https://app.example.com/billing/done".into(),
            cancel_url: "https://app.example.com/billing".into(),
        }
    }

    #[tokio::test]
    async fn creates_subscription_checkout_with_landlord_ref() {
        let account = BillingAccount::provision(LandlordId::new(), 0, Timestamp::now());
        let payments = Arc::new(MockPayments::ok());
        let handler = StartCheckoutHandler::new(
            Arc::new(MockAccounts {
                account: Some(account),
            }),
            payments.clone(),
        );

        let cmd = command(CheckoutKind::Subscription);
        let landlord_id = cmd.landlord_id;
        let session = handler.handle(cmd).await.unwrap();

        assert_eq!(session.id, "cs_1");
        let requests = payments.requests.lock().unwrap();
        assert_eq!(requests[0].landlord_ref, landlord_id.to_string());
    }

    #[tokio::test]
    async fn existing_customer_id_is_forwarded() {
        let mut account = BillingAccount::provision(LandlordId::new(), 0, Timestamp::now());
        account.attach_checkout("cus_7", None, Timestamp::now());
        let payments = Arc::new(MockPayments::ok());
        let handler = StartCheckoutHandler::new(
            Arc::new(MockAccounts {
                account: Some(account),
            }),
            payments.clone(),
        );

        handler
            .handle(command(CheckoutKind::CreditPack { units: 5 }))
            .await
            .unwrap();

        let requests = payments.requests.lock().unwrap();
        assert_eq!(requests[0].customer_id.as_deref(), Some("cus_7"));
    }

    #[tokio::test]
    async fn empty_credit_pack_is_rejected() {
        let handler = StartCheckoutHandler::new(
            Arc::new(MockAccounts { account: None }),
            Arc::new(MockPayments::ok()),
        );

        let result = handler.handle(command(CheckoutKind::CreditPack { units: 0 })).await;
        assert!(matches!(result, Err(e) if e.code == ErrorCode::ValidationFailed));
    }

    #[tokio::test]
    async fn unprovisioned_landlord_is_rejected() {
        let handler = StartCheckoutHandler::new(
            Arc::new(MockAccounts { account: None }),
            Arc::new(MockPayments::ok()),
        );

        let result = handler.handle(command(CheckoutKind::Subscription)).await;
        assert!(matches!(result, Err(e) if e.code == ErrorCode::AccountNotFound));
    }

    #[tokio::test]
    async fn provider_failure_is_surfaced() {
        let account = BillingAccount::provision(LandlordId::new(), 0, Timestamp::now());
        let handler = StartCheckoutHandler::new(
            Arc::new(MockAccounts {
                account: Some(account),
            }),
            Arc::new(MockPayments::failing()),
        );

        let result = handler.handle(command(CheckoutKind::Subscription)).await;
        assert!(matches!(result, Err(e) if e.code == ErrorCode::ProviderCallFailed));
    }
}
