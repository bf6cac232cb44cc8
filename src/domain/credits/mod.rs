//! Credit ledger domain: prepaid e-sign units and their consumption.

mod consumption;
mod ledger;

pub use consumption::{ConsumptionRecord, ConsumptionStatus, RESERVATION_EXPIRY_MINUTES};
pub use ledger::{remaining_credits, CreditLedgerEntry};
