//! Axum router configuration for e-sign endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{credit_balance, start_envelope, EsignAppState};

/// Create the e-sign API router.
///
/// # Routes
/// - `POST /envelopes` - Start a signing envelope (consumes one credit)
/// - `GET /credits/:landlord_id` - Remaining credit balance
pub fn esign_routes() -> Router<EsignAppState> {
    Router::new()
        .route("/envelopes", post(start_envelope))
        .route("/credits/:landlord_id", get(credit_balance))
}
