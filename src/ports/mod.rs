//! Ports: contracts between the application core and the outside world.
//!
//! Each port is an async trait implemented by an adapter (Postgres, the
//! payment provider's HTTP API, the e-sign provider, the email sender)
//! and by in-memory mocks in tests.

mod billing_account_store;
mod credit_store;
mod esign_provider;
mod notifier;
mod payment_provider;

pub use billing_account_store::BillingAccountStore;
pub use credit_store::{CreditStore, ReservationOutcome};
pub use esign_provider::{EnvelopeReceipt, EnvelopeRequest, EsignError, EsignProvider};
pub use notifier::{Notification, Notifier};
pub use payment_provider::{
    CheckoutKind, CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentProvider,
};
