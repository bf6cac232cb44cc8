//! HTTP handlers for e-sign endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::handlers::credits::{StartEnvelopeCommand, StartEnvelopeHandler};
use crate::domain::foundation::LandlordId;
use crate::ports::{CreditStore, EsignProvider};

use super::super::error::ApiError;
use super::dto::{CreditBalanceResponse, EnvelopeResponse, StartEnvelopeRequest};

/// Shared state for the e-sign routes.
#[derive(Clone)]
pub struct EsignAppState {
    pub credits: Arc<dyn CreditStore>,
    pub esign: Arc<dyn EsignProvider>,
    pub call_timeout: Duration,
}

impl EsignAppState {
    pub fn envelope_handler(&self) -> StartEnvelopeHandler {
        StartEnvelopeHandler::new(self.credits.clone(), self.esign.clone(), self.call_timeout)
    }
}

/// POST /api/esign/envelopes - Start a signing envelope, consuming one credit
pub async fn start_envelope(
    State(state): State<EsignAppState>,
    Json(request): Json<StartEnvelopeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.envelope_handler();
    let result = handler
        .handle(StartEnvelopeCommand {
            landlord_id: LandlordId::from_uuid(request.landlord_id),
            document_id: request.document_id,
            signer_email: request.signer_email,
            signer_name: request.signer_name,
        })
        .await?;

    Ok(Json(EnvelopeResponse {
        envelope_id: result.envelope_id,
        remaining_credits: result.remaining_credits,
    }))
}

/// GET /api/esign/credits/:landlord_id - Remaining credit balance
///
/// The value is a snapshot; a concurrent reservation may change it before
/// the caller acts on it.
pub async fn credit_balance(
    State(state): State<EsignAppState>,
    Path(landlord_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let remaining = state
        .credits
        .remaining(&LandlordId::from_uuid(landlord_id))
        .await?;

    Ok(Json(CreditBalanceResponse {
        remaining_credits: remaining,
    }))
}
