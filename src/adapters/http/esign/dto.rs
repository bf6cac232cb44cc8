//! HTTP DTOs for e-sign endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to start a signing envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StartEnvelopeRequest {
    pub landlord_id: Uuid,
    pub document_id: String,
    pub signer_email: String,
    pub signer_name: String,
}

/// Accepted envelope with the post-consumption balance.
#[derive(Debug, Clone, Serialize)]
pub struct EnvelopeResponse {
    pub envelope_id: String,
    pub remaining_credits: i64,
}

/// Current credit balance for the landlord dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct CreditBalanceResponse {
    pub remaining_credits: i64,
}
