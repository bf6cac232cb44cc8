//! Credit consumption records.
//!
//! One record per attempted consuming action (an e-sign envelope). A
//! record is created as `Reserved` before the external call so the unit
//! is accounted for even if the process crashes mid-call; it resolves to
//! `Sent` or `Failed` afterward. `Failed` records are kept for audit but
//! never count against the budget.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ConsumptionId, LandlordId, StateMachine, Timestamp, ValidationError,
};

/// How long a reservation may sit unresolved before ledger reads treat it
/// as failed. Bounds credit leakage from a crashed request.
pub const RESERVATION_EXPIRY_MINUTES: i64 = 15;

/// Lifecycle of a consumption record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionStatus {
    /// Unit claimed, external call not yet resolved.
    Reserved,
    /// External provider accepted the envelope.
    Sent,
    /// Provider rejection, transport error, or timeout. Unit returns to
    /// the pool because failed records are excluded from the count.
    Failed,
}

impl ConsumptionStatus {
    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumptionStatus::Reserved => "reserved",
            ConsumptionStatus::Sent => "sent",
            ConsumptionStatus::Failed => "failed",
        }
    }

    /// Parses the persisted string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reserved" => Some(ConsumptionStatus::Reserved),
            "sent" => Some(ConsumptionStatus::Sent),
            "failed" => Some(ConsumptionStatus::Failed),
            _ => None,
        }
    }
}

impl StateMachine for ConsumptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConsumptionStatus::*;
        matches!((self, target), (Reserved, Sent) | (Reserved, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConsumptionStatus::*;
        match self {
            Reserved => vec![Sent, Failed],
            Sent | Failed => vec![],
        }
    }
}

/// A single attempted credit consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub id: ConsumptionId,
    pub landlord_id: LandlordId,
    pub status: ConsumptionStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ConsumptionRecord {
    /// Creates a fresh reservation.
    pub fn reserve(landlord_id: LandlordId, now: Timestamp) -> Self {
        Self {
            id: ConsumptionId::new(),
            landlord_id,
            status: ConsumptionStatus::Reserved,
            created_at: now,
            updated_at: now,
        }
    }

    /// Resolves the reservation after the provider accepted the envelope.
    pub fn mark_sent(&mut self, now: Timestamp) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(ConsumptionStatus::Sent)?;
        self.updated_at = now;
        Ok(())
    }

    /// Releases the reservation after a provider failure or timeout.
    pub fn mark_failed(&mut self, now: Timestamp) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(ConsumptionStatus::Failed)?;
        self.updated_at = now;
        Ok(())
    }

    /// A reservation left unresolved past the expiry window is treated as
    /// failed by every ledger read (lazy expiry); it is not trusted to
    /// resolve anymore.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.status == ConsumptionStatus::Reserved
            && self
                .created_at
                .add_minutes(RESERVATION_EXPIRY_MINUTES)
                .is_before(&now)
    }

    /// Whether this record counts against the landlord's purchased units.
    pub fn counts_against_budget(&self, now: Timestamp) -> bool {
        match self.status {
            ConsumptionStatus::Sent => true,
            ConsumptionStatus::Reserved => !self.is_expired(now),
            ConsumptionStatus::Failed => false,
        }
    }
}
