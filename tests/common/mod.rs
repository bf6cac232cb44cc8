//! Shared in-memory test doubles and webhook fixtures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use rentdesk::domain::billing::BillingAccount;
use rentdesk::domain::credits::{remaining_credits, ConsumptionRecord, CreditLedgerEntry};
use rentdesk::domain::foundation::{
    ConsumptionId, DomainError, ErrorCode, LandlordId, Timestamp,
};
use rentdesk::ports::{
    BillingAccountStore, CreditStore, EnvelopeReceipt, EnvelopeRequest, EsignError, EsignProvider,
    Notification, Notifier, ReservationOutcome,
};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret_12345";

/// Signs a payload the way the payment provider does.
pub fn sign_payload(secret: &str, payload: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}.{}", timestamp, payload).as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={},v1={}", timestamp, signature)
}

// ════════════════════════════════════════════════════════════════════════════════
// Billing Account Store
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct InMemoryAccounts {
    accounts: Mutex<HashMap<Uuid, BillingAccount>>,
    fail_reads: AtomicBool,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(account: BillingAccount) -> Self {
        let store = Self::default();
        store
            .accounts
            .lock()
            .unwrap()
            .insert(*account.landlord_id.as_uuid(), account);
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, landlord_id: &LandlordId) -> Option<BillingAccount> {
        self.accounts
            .lock()
            .unwrap()
            .get(landlord_id.as_uuid())
            .cloned()
    }

    pub fn snapshot(&self) -> Vec<BillingAccount> {
        self.accounts.lock().unwrap().values().cloned().collect()
    }

    fn check_reads(&self) -> Result<(), DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "simulated store failure",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BillingAccountStore for InMemoryAccounts {
    async fn create_if_absent(&self, account: &BillingAccount) -> Result<(), DomainError> {
        self.accounts
            .lock()
            .unwrap()
            .entry(*account.landlord_id.as_uuid())
            .or_insert_with(|| account.clone());
        Ok(())
    }

    async fn find_by_landlord(
        &self,
        landlord_id: &LandlordId,
    ) -> Result<Option<BillingAccount>, DomainError> {
        self.check_reads()?;
        Ok(self.get(landlord_id))
    }

    async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<BillingAccount>, DomainError> {
        self.check_reads()?;
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.external_customer_id.as_deref() == Some(customer_id))
            .cloned())
    }

    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<BillingAccount>, DomainError> {
        self.check_reads()?;
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.external_subscription_id.as_deref() == Some(subscription_id))
            .cloned())
    }

    async fn update(&self, account: &BillingAccount) -> Result<(), DomainError> {
        let mut accounts = self.accounts.lock().unwrap();
        if !accounts.contains_key(account.landlord_id.as_uuid()) {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                "Billing account not found",
            ));
        }
        accounts.insert(*account.landlord_id.as_uuid(), account.clone());
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Credit Store
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct CreditState {
    entries: Vec<CreditLedgerEntry>,
    records: Vec<ConsumptionRecord>,
}

/// In-memory credit store. The mutex around the whole state is the
/// serialization point, matching the per-landlord lock semantics of the
/// real store closely enough for concurrency tests.
#[derive(Default)]
pub struct InMemoryCredits {
    state: Mutex<CreditState>,
}

impl InMemoryCredits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credits(landlord_id: LandlordId, units: u32) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().entries.push(CreditLedgerEntry::new(
            landlord_id,
            units,
            Timestamp::now(),
        ));
        store
    }

    pub fn purchases(&self, landlord_id: &LandlordId) -> Vec<CreditLedgerEntry> {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| &e.landlord_id == landlord_id)
            .cloned()
            .collect()
    }

    pub fn records(&self, landlord_id: &LandlordId) -> Vec<ConsumptionRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|r| &r.landlord_id == landlord_id)
            .cloned()
            .collect()
    }

    fn balance(state: &CreditState, landlord_id: &LandlordId, now: Timestamp) -> i64 {
        let entries: Vec<_> = state
            .entries
            .iter()
            .filter(|e| &e.landlord_id == landlord_id)
            .cloned()
            .collect();
        let records: Vec<_> = state
            .records
            .iter()
            .filter(|r| &r.landlord_id == landlord_id)
            .cloned()
            .collect();
        remaining_credits(&entries, &records, now)
    }
}

#[async_trait]
impl CreditStore for InMemoryCredits {
    async fn record_purchase(&self, entry: &CreditLedgerEntry) -> Result<(), DomainError> {
        self.state.lock().unwrap().entries.push(entry.clone());
        Ok(())
    }

    async fn reserve(&self, landlord_id: &LandlordId) -> Result<ReservationOutcome, DomainError> {
        let now = Timestamp::now();
        let mut state = self.state.lock().unwrap();

        if Self::balance(&state, landlord_id, now) <= 0 {
            return Ok(ReservationOutcome::NoCredits);
        }

        let record = ConsumptionRecord::reserve(*landlord_id, now);
        state.records.push(record.clone());
        Ok(ReservationOutcome::Reserved(record))
    }

    async fn mark_sent(&self, id: &ConsumptionId) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::ConsumptionNotFound, "Reservation not found")
            })?;
        record
            .mark_sent(Timestamp::now())
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))
    }

    async fn mark_failed(&self, id: &ConsumptionId) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::ConsumptionNotFound, "Reservation not found")
            })?;
        record
            .mark_failed(Timestamp::now())
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))
    }

    async fn remaining(&self, landlord_id: &LandlordId) -> Result<i64, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(Self::balance(&state, landlord_id, Timestamp::now()))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// E-sign Provider and Notifier
// ════════════════════════════════════════════════════════════════════════════════

/// Provider double that accepts or rejects every envelope.
pub struct StubEsign {
    pub accept: bool,
    pub calls: AtomicUsize,
}

impl StubEsign {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            accept: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EsignProvider for StubEsign {
    async fn send_envelope(&self, request: EnvelopeRequest) -> Result<EnvelopeReceipt, EsignError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.accept {
            Ok(EnvelopeReceipt {
                envelope_id: format!("env_{}_{}", request.document_id, n),
            })
        } else {
            Err(EsignError::Rejected("document not found".into()))
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}
