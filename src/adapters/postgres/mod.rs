//! PostgreSQL adapters implementing the store ports with sqlx.

mod billing_account_store;
mod credit_store;

pub use billing_account_store::PostgresBillingAccountStore;
pub use credit_store::PostgresCreditStore;
