//! Stripe adapter for the payment provider port.

mod payment_provider;

pub use payment_provider::StripePaymentProvider;
