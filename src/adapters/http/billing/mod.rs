//! Billing HTTP surface: webhook ingestion, entitlement gate, and the
//! landlord-facing billing commands.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::BillingAppState;
pub use routes::{billing_routes, webhook_routes};
