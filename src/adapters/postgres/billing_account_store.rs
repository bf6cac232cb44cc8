//! PostgreSQL implementation of BillingAccountStore.
//!
//! One row per landlord in `billing_accounts`, keyed by the landlord id.
//! Lookups by provider customer and subscription ids serve the webhook
//! reconciler; writes are full overwrites of the derived fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{BillingAccount, BillingStatus};
use crate::domain::foundation::{DomainError, ErrorCode, LandlordId, Timestamp};
use crate::ports::BillingAccountStore;

/// PostgreSQL implementation of the BillingAccountStore port.
pub struct PostgresBillingAccountStore {
    pool: PgPool,
}

impl PostgresBillingAccountStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a billing account.
#[derive(Debug, sqlx::FromRow)]
struct BillingAccountRow {
    landlord_id: Uuid,
    external_customer_id: Option<String>,
    external_subscription_id: Option<String>,
    status: String,
    current_period_end: Option<DateTime<Utc>>,
    trial_active: bool,
    trial_end: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BillingAccountRow> for BillingAccount {
    type Error = DomainError;

    fn try_from(row: BillingAccountRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status)?;

        Ok(BillingAccount {
            landlord_id: LandlordId::from_uuid(row.landlord_id),
            external_customer_id: row.external_customer_id,
            external_subscription_id: row.external_subscription_id,
            status,
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            trial_active: row.trial_active,
            trial_end: row.trial_end.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<BillingStatus, DomainError> {
    BillingStatus::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid status value: {}", s),
        )
    })
}

const SELECT_COLUMNS: &str = r#"
    SELECT landlord_id, external_customer_id, external_subscription_id,
           status, current_period_end, trial_active, trial_end,
           created_at, updated_at
    FROM billing_accounts
"#;

#[async_trait]
impl BillingAccountStore for PostgresBillingAccountStore {
    async fn create_if_absent(&self, account: &BillingAccount) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO billing_accounts (
                landlord_id, external_customer_id, external_subscription_id,
                status, current_period_end, trial_active, trial_end,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (landlord_id) DO NOTHING
            "#,
        )
        .bind(account.landlord_id.as_uuid())
        .bind(&account.external_customer_id)
        .bind(&account.external_subscription_id)
        .bind(account.status.as_str())
        .bind(account.current_period_end.as_ref().map(Timestamp::as_datetime))
        .bind(account.trial_active)
        .bind(account.trial_end.as_ref().map(Timestamp::as_datetime))
        .bind(account.created_at.as_datetime())
        .bind(account.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to create billing account: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_landlord(
        &self,
        landlord_id: &LandlordId,
    ) -> Result<Option<BillingAccount>, DomainError> {
        let row: Option<BillingAccountRow> =
            sqlx::query_as(&format!("{} WHERE landlord_id = $1", SELECT_COLUMNS))
                .bind(landlord_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to find billing account: {}", e),
                    )
                })?;

        row.map(BillingAccount::try_from).transpose()
    }

    async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<BillingAccount>, DomainError> {
        let row: Option<BillingAccountRow> =
            sqlx::query_as(&format!("{} WHERE external_customer_id = $1", SELECT_COLUMNS))
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to find billing account: {}", e),
                    )
                })?;

        row.map(BillingAccount::try_from).transpose()
    }

    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<BillingAccount>, DomainError> {
        let row: Option<BillingAccountRow> = sqlx::query_as(&format!(
            "{} WHERE external_subscription_id = $1",
            SELECT_COLUMNS
        ))
        .bind(subscription_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find billing account: {}", e),
            )
        })?;

        row.map(BillingAccount::try_from).transpose()
    }

    async fn update(&self, account: &BillingAccount) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE billing_accounts SET
                external_customer_id = $2,
                external_subscription_id = $3,
                status = $4,
                current_period_end = $5,
                trial_active = $6,
                trial_end = $7,
                updated_at = $8
            WHERE landlord_id = $1
            "#,
        )
        .bind(account.landlord_id.as_uuid())
        .bind(&account.external_customer_id)
        .bind(&account.external_subscription_id)
        .bind(account.status.as_str())
        .bind(account.current_period_end.as_ref().map(Timestamp::as_datetime))
        .bind(account.trial_active)
        .bind(account.trial_end.as_ref().map(Timestamp::as_datetime))
        .bind(account.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update billing account: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                "Billing account not found",
            ));
        }

        Ok(())
    }
}
