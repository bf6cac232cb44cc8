//! Credit ledger arithmetic.
//!
//! Purchases are append-only; the remaining balance is always derived as
//! `sum(units_purchased) - count(records that count against budget)`.
//! There is no stored balance to get out of sync and no refund step:
//! failed consumptions simply never counted.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{LandlordId, LedgerEntryId, Timestamp};

use super::consumption::ConsumptionRecord;

/// Append-only record of a credit purchase. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditLedgerEntry {
    pub id: LedgerEntryId,
    pub landlord_id: LandlordId,
    pub units_purchased: u32,
    pub purchased_at: Timestamp,
}

impl CreditLedgerEntry {
    pub fn new(landlord_id: LandlordId, units_purchased: u32, purchased_at: Timestamp) -> Self {
        Self {
            id: LedgerEntryId::new(),
            landlord_id,
            units_purchased,
            purchased_at,
        }
    }
}

/// Derives the remaining credit balance for one landlord.
///
/// May be negative if purchased totals were ever corrected downward;
/// callers treat anything `<= 0` as exhausted.
pub fn remaining_credits(
    entries: &[CreditLedgerEntry],
    records: &[ConsumptionRecord],
    now: Timestamp,
) -> i64 {
    let purchased: i64 = entries.iter().map(|e| i64::from(e.units_purchased)).sum();
    let consumed = records
        .iter()
        .filter(|r| r.counts_against_budget(now))
        .count() as i64;
    purchased - consumed
}
