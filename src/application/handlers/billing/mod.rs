//! Billing use cases.

mod check_entitlement;
mod process_webhook;
mod provision_account;
mod request_cancellation;
mod start_checkout;

pub use check_entitlement::{CheckEntitlementHandler, CheckEntitlementQuery, EntitlementDecision};
pub use process_webhook::{ProcessWebhookCommand, ProcessWebhookHandler, ProcessWebhookResult};
pub use provision_account::{ProvisionAccountCommand, ProvisionAccountHandler};
pub use request_cancellation::{
    RequestCancellationCommand, RequestCancellationHandler, RequestCancellationResult,
};
pub use start_checkout::{StartCheckoutCommand, StartCheckoutHandler};
