//! Credit store port.
//!
//! The reservation is the one operation in this subsystem that needs a
//! serialization point: `reserve` must check the remaining balance and
//! insert the `reserved` record atomically with respect to other
//! reservations for the same landlord. Reservations for different
//! landlords must never block each other.

use async_trait::async_trait;

use crate::domain::credits::{ConsumptionRecord, CreditLedgerEntry};
use crate::domain::foundation::{ConsumptionId, DomainError, LandlordId};

/// Outcome of a reservation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    /// A unit was claimed; the record is persisted as `reserved`.
    Reserved(ConsumptionRecord),
    /// Balance exhausted; nothing was written.
    NoCredits,
}

/// Store port for the credit ledger and consumption records.
#[async_trait]
pub trait CreditStore: Send + Sync {
    /// Appends a purchase to the ledger.
    async fn record_purchase(&self, entry: &CreditLedgerEntry) -> Result<(), DomainError>;

    /// Atomically checks the remaining balance and inserts a `reserved`
    /// record when positive. Two concurrent callers for the same landlord
    /// must never both claim the last unit. Stale reservations past the
    /// expiry window are treated as failed by the balance computation.
    async fn reserve(&self, landlord_id: &LandlordId) -> Result<ReservationOutcome, DomainError>;

    /// Resolves a reservation to `sent`.
    async fn mark_sent(&self, id: &ConsumptionId) -> Result<(), DomainError>;

    /// Releases a reservation to `failed`.
    async fn mark_failed(&self, id: &ConsumptionId) -> Result<(), DomainError>;

    /// Derived remaining balance for display and for the response of a
    /// consuming action. May run concurrently with reservations; the
    /// value is a snapshot, not a lock.
    async fn remaining(&self, landlord_id: &LandlordId) -> Result<i64, DomainError>;
}
