//! Subscription reconciliation.
//!
//! Applies normalized billing events to the local account cache. Every
//! application is idempotent and a full overwrite of the derived fields,
//! so the at-least-once, possibly reordered webhook stream always
//! converges on the provider's latest truth. The reconciler never calls
//! back out to the provider.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::credits::CreditLedgerEntry;
use crate::domain::foundation::{DomainError, LandlordId, Timestamp};
use crate::ports::{BillingAccountStore, CreditStore};

use super::account::BillingAccount;
use super::event::BillingEvent;
use super::status::BillingStatus;
use super::webhook_errors::WebhookError;

/// What a successfully applied event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Provider ids attached; `credit_units` purchases were appended to
    /// the ledger (zero for a plain subscription checkout).
    CheckoutApplied {
        landlord_id: LandlordId,
        credit_units: u32,
    },
    /// Subscription snapshot written with the given effective status.
    StateApplied {
        landlord_id: LandlordId,
        status: BillingStatus,
    },
    /// Subscription removal written.
    CancellationApplied { landlord_id: LandlordId },
}

/// Applies billing events to the account store and credit ledger.
pub struct SubscriptionReconciler {
    accounts: Arc<dyn BillingAccountStore>,
    credits: Arc<dyn CreditStore>,
}

impl SubscriptionReconciler {
    pub fn new(accounts: Arc<dyn BillingAccountStore>, credits: Arc<dyn CreditStore>) -> Self {
        Self { accounts, credits }
    }

    /// Applies one normalized event.
    ///
    /// # Errors
    ///
    /// - `MissingAccountMapping` when no account matches the event's ids;
    ///   the delivery is acknowledged upstream so the provider stops
    ///   retrying something we can never apply
    /// - `Unmapped` when the subscription status vocabulary is unknown
    /// - `Store` on datastore failure; surfaced as retryable upstream
    pub async fn apply(&self, event: BillingEvent) -> Result<ReconcileOutcome, WebhookError> {
        let now = Timestamp::now();
        match event {
            BillingEvent::CheckoutCompleted {
                customer_id,
                subscription_id,
                landlord_ref,
                credit_units,
            } => {
                self.apply_checkout(
                    &customer_id,
                    subscription_id.as_deref(),
                    landlord_ref.as_deref(),
                    credit_units,
                    now,
                )
                .await
            }

            BillingEvent::SubscriptionUpserted {
                subscription_id,
                customer_id,
                raw_status,
                cancel_at_period_end,
                current_period_end,
            } => {
                let mapped = match BillingStatus::map_raw(&raw_status) {
                    Some(mapped) => mapped,
                    None => {
                        warn!(raw_status, subscription_id, "unrecognized subscription status");
                        return Err(WebhookError::Unmapped(format!(
                            "subscription status '{raw_status}'"
                        )));
                    }
                };
                let effective = BillingStatus::effective(mapped, cancel_at_period_end);

                let mut account = self
                    .accounts
                    .find_by_customer_id(&customer_id)
                    .await
                    .map_err(store_err)?
                    .ok_or_else(|| {
                        warn!(customer_id, "subscription event for unknown customer, dropping");
                        WebhookError::MissingAccountMapping(customer_id.clone())
                    })?;

                account.apply_subscription_state(
                    &subscription_id,
                    effective,
                    current_period_end.and_then(Timestamp::from_unix),
                    now,
                );
                self.accounts.update(&account).await.map_err(store_err)?;

                info!(
                    landlord_id = %account.landlord_id,
                    status = effective.as_str(),
                    "applied subscription snapshot"
                );
                Ok(ReconcileOutcome::StateApplied {
                    landlord_id: account.landlord_id,
                    status: effective,
                })
            }

            BillingEvent::SubscriptionRemoved { subscription_id } => {
                let mut account = self
                    .accounts
                    .find_by_subscription_id(&subscription_id)
                    .await
                    .map_err(store_err)?
                    .ok_or_else(|| {
                        warn!(subscription_id, "removal event for unknown subscription, dropping");
                        WebhookError::MissingAccountMapping(subscription_id.clone())
                    })?;

                account.mark_canceled(now);
                self.accounts.update(&account).await.map_err(store_err)?;

                info!(landlord_id = %account.landlord_id, "applied subscription removal");
                Ok(ReconcileOutcome::CancellationApplied {
                    landlord_id: account.landlord_id,
                })
            }
        }
    }

    async fn apply_checkout(
        &self,
        customer_id: &str,
        subscription_id: Option<&str>,
        landlord_ref: Option<&str>,
        credit_units: Option<u32>,
        now: Timestamp,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let mut account = self
            .find_checkout_account(customer_id, landlord_ref)
            .await?
            .ok_or_else(|| {
                warn!(customer_id, "checkout for unknown account, dropping");
                WebhookError::MissingAccountMapping(customer_id.to_string())
            })?;

        account.attach_checkout(customer_id, subscription_id, now);
        self.accounts.update(&account).await.map_err(store_err)?;

        let units = credit_units.unwrap_or(0);
        if units > 0 {
            let entry = CreditLedgerEntry::new(account.landlord_id, units, now);
            self.credits.record_purchase(&entry).await.map_err(store_err)?;
        }

        info!(
            landlord_id = %account.landlord_id,
            credit_units = units,
            "applied checkout"
        );
        Ok(ReconcileOutcome::CheckoutApplied {
            landlord_id: account.landlord_id,
            credit_units: units,
        })
    }

    /// The first checkout arrives before a customer id has been attached,
    /// so resolution tries our own landlord reference before falling back
    /// to the customer id.
    async fn find_checkout_account(
        &self,
        customer_id: &str,
        landlord_ref: Option<&str>,
    ) -> Result<Option<BillingAccount>, WebhookError> {
        if let Some(found) = landlord_ref
            .and_then(|raw| LandlordId::from_str(raw).ok())
        {
            if let Some(account) = self
                .accounts
                .find_by_landlord(&found)
                .await
                .map_err(store_err)?
            {
                return Ok(Some(account));
            }
        }
        self.accounts
            .find_by_customer_id(customer_id)
            .await
            .map_err(store_err)
    }
}

fn store_err(e: DomainError) -> WebhookError {
    WebhookError::Store(e.to_string())
}
