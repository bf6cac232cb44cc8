//! StartEnvelopeHandler - Command handler for starting an e-sign envelope.
//!
//! Reserve-before-call: a credit unit is claimed before the provider is
//! invoked, so two concurrent requests can never share the last unit.
//! The provider call is bounded by a timeout; any failure releases the
//! reservation (`failed`) before the error is surfaced, and a timed-out
//! reservation is never reused for a retry.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::domain::foundation::{DomainError, ErrorCode, LandlordId};
use crate::ports::{CreditStore, EnvelopeRequest, EsignProvider, ReservationOutcome};

/// Command to start a signing envelope for one document and one signer.
#[derive(Debug, Clone)]
pub struct StartEnvelopeCommand {
    pub landlord_id: LandlordId,
    pub document_id: String,
    pub signer_email: String,
    pub signer_name: String,
}

/// Result returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartEnvelopeResult {
    pub envelope_id: String,
    pub remaining_credits: i64,
}

/// Handler for the credit-consuming e-sign action.
pub struct StartEnvelopeHandler {
    credits: Arc<dyn CreditStore>,
    esign: Arc<dyn EsignProvider>,
    call_timeout: Duration,
}

impl StartEnvelopeHandler {
    pub fn new(
        credits: Arc<dyn CreditStore>,
        esign: Arc<dyn EsignProvider>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            credits,
            esign,
            call_timeout,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartEnvelopeCommand,
    ) -> Result<StartEnvelopeResult, DomainError> {
        validate(&cmd)?;

        let record = match self.credits.reserve(&cmd.landlord_id).await? {
            ReservationOutcome::Reserved(record) => record,
            ReservationOutcome::NoCredits => {
                return Err(DomainError::new(
                    ErrorCode::NoCreditsRemaining,
                    "no e-sign credits remaining",
                ));
            }
        };

        let request = EnvelopeRequest {
            document_id: cmd.document_id,
            signer_email: cmd.signer_email,
            signer_name: cmd.signer_name,
        };

        let outcome = tokio::time::timeout(self.call_timeout, self.esign.send_envelope(request)).await;

        let receipt = match outcome {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                self.release(&record.id).await;
                return Err(DomainError::new(ErrorCode::ProviderCallFailed, e.to_string()));
            }
            Err(_) => {
                self.release(&record.id).await;
                return Err(DomainError::new(
                    ErrorCode::ProviderCallFailed,
                    "e-sign provider call timed out",
                ));
            }
        };

        self.credits.mark_sent(&record.id).await?;
        let remaining_credits = self.credits.remaining(&cmd.landlord_id).await?;

        info!(
            landlord_id = %cmd.landlord_id,
            envelope_id = receipt.envelope_id,
            remaining_credits,
            "envelope sent"
        );
        Ok(StartEnvelopeResult {
            envelope_id: receipt.envelope_id,
            remaining_credits,
        })
    }

    /// Releases the reservation after a failed call. A release failure
    /// leaves the record `reserved`; lazy expiry frees the unit later.
    async fn release(&self, id: &crate::domain::foundation::ConsumptionId) {
        warn!(consumption_id = %id, "releasing reservation after provider failure");
        if let Err(e) = self.credits.mark_failed(id).await {
            error!(consumption_id = %id, error = %e, "could not release reservation");
        }
    }
}

fn validate(cmd: &StartEnvelopeCommand) -> Result<(), DomainError> {
    if cmd.document_id.trim().is_empty() {
        return Err(DomainError::validation("document_id", "document id cannot be empty"));
    }
    if !cmd.signer_email.contains('@') {
        return Err(DomainError::validation("signer_email", "invalid email address"));
    }
    if cmd.signer_name.trim().is_empty() {
        return Err(DomainError::validation("signer_name", "signer name cannot be empty"));
    }
    Ok(())
}
