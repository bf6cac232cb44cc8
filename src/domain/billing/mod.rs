//! Billing domain: webhook verification, event normalization, and the
//! reconciliation that keeps the local subscription cache converged with
//! the payment provider.

mod account;
mod event;
mod provider_event;
mod reconciler;
mod status;
mod webhook_errors;
mod webhook_verifier;

pub use account::BillingAccount;
pub use event::BillingEvent;
pub use provider_event::ProviderEvent;
pub use reconciler::{ReconcileOutcome, SubscriptionReconciler};
pub use status::BillingStatus;
pub use webhook_errors::WebhookError;
pub use webhook_verifier::WebhookVerifier;

#[cfg(test)]
pub use provider_event::ProviderEventBuilder;
#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
