//! PostgreSQL implementation of CreditStore.
//!
//! The reservation runs inside a transaction holding a per-landlord
//! advisory lock, which is the serialization point that keeps two
//! concurrent requests from both claiming the last unit. The lock key is
//! derived from the landlord id, so reservations for different landlords
//! proceed in parallel. Stale reservations are swept to `failed` inside
//! the same transaction before the balance is computed.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::credits::{
    ConsumptionRecord, ConsumptionStatus, CreditLedgerEntry, RESERVATION_EXPIRY_MINUTES,
};
use crate::domain::foundation::{ConsumptionId, DomainError, ErrorCode, LandlordId, Timestamp};
use crate::ports::{CreditStore, ReservationOutcome};

/// PostgreSQL implementation of the CreditStore port.
pub struct PostgresCreditStore {
    pool: PgPool,
}

impl PostgresCreditStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

/// Oldest `created_at` a reservation may have and still count.
fn expiry_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(RESERVATION_EXPIRY_MINUTES)
}

/// Sweeps reservations past the expiry window to `failed`.
async fn sweep_expired(
    tx: &mut Transaction<'_, Postgres>,
    landlord_id: &Uuid,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        UPDATE consumption_records
        SET status = 'failed', updated_at = $3
        WHERE landlord_id = $1 AND status = 'reserved' AND created_at < $2
        "#,
    )
    .bind(landlord_id)
    .bind(expiry_cutoff(now))
    .bind(now)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_err("Failed to sweep expired reservations", e))?;

    Ok(())
}

/// Derived balance: purchased units minus records that count against the
/// budget (`sent`, plus unexpired `reserved`).
const REMAINING_QUERY: &str = r#"
    SELECT COALESCE(
        (SELECT SUM(units_purchased)::BIGINT
         FROM credit_ledger_entries
         WHERE landlord_id = $1), 0)
    -
        (SELECT COUNT(*)
         FROM consumption_records
         WHERE landlord_id = $1
           AND (status = 'sent'
                OR (status = 'reserved' AND created_at >= $2)))
"#;

#[async_trait]
impl CreditStore for PostgresCreditStore {
    async fn record_purchase(&self, entry: &CreditLedgerEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO credit_ledger_entries (id, landlord_id, units_purchased, purchased_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.landlord_id.as_uuid())
        .bind(entry.units_purchased as i32)
        .bind(entry.purchased_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to record credit purchase", e))?;

        Ok(())
    }

    async fn reserve(&self, landlord_id: &LandlordId) -> Result<ReservationOutcome, DomainError> {
        let now = Utc::now();
        let landlord_uuid = *landlord_id.as_uuid();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin reservation transaction", e))?;

        // Per-landlord serialization point. Held until commit or rollback.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(landlord_uuid.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to take reservation lock", e))?;

        sweep_expired(&mut tx, &landlord_uuid, now).await?;

        let remaining: i64 = sqlx::query_scalar(REMAINING_QUERY)
            .bind(landlord_uuid)
            .bind(expiry_cutoff(now))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_err("Failed to compute remaining credits", e))?;

        if remaining <= 0 {
            tx.rollback()
                .await
                .map_err(|e| db_err("Failed to roll back reservation", e))?;
            return Ok(ReservationOutcome::NoCredits);
        }

        let record = ConsumptionRecord::reserve(*landlord_id, Timestamp::from_datetime(now));

        sqlx::query(
            r#"
            INSERT INTO consumption_records (id, landlord_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.landlord_id.as_uuid())
        .bind(record.status.as_str())
        .bind(record.created_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("Failed to insert reservation", e))?;

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit reservation", e))?;

        Ok(ReservationOutcome::Reserved(record))
    }

    async fn mark_sent(&self, id: &ConsumptionId) -> Result<(), DomainError> {
        resolve_reservation(&self.pool, id, ConsumptionStatus::Sent).await
    }

    async fn mark_failed(&self, id: &ConsumptionId) -> Result<(), DomainError> {
        resolve_reservation(&self.pool, id, ConsumptionStatus::Failed).await
    }

    async fn remaining(&self, landlord_id: &LandlordId) -> Result<i64, DomainError> {
        let now = Utc::now();

        sqlx::query_scalar(REMAINING_QUERY)
            .bind(landlord_id.as_uuid())
            .bind(expiry_cutoff(now))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_err("Failed to compute remaining credits", e))
    }
}

/// Moves a `reserved` record to its terminal status. Guarding on the
/// current status keeps a late resolution from resurrecting a record the
/// expiry sweep already failed.
async fn resolve_reservation(
    pool: &PgPool,
    id: &ConsumptionId,
    target: ConsumptionStatus,
) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE consumption_records
        SET status = $2, updated_at = $3
        WHERE id = $1 AND status = 'reserved'
        "#,
    )
    .bind(id.as_uuid())
    .bind(target.as_str())
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| db_err("Failed to resolve reservation", e))?;

    if result.rows_affected() == 0 {
        return Err(DomainError::new(
            ErrorCode::ConsumptionNotFound,
            "Reservation not found or already resolved",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_cutoff_matches_reservation_window() {
        let now = Utc::now();
        let cutoff = expiry_cutoff(now);
        assert_eq!(now - cutoff, Duration::minutes(RESERVATION_EXPIRY_MINUTES));
    }
}
