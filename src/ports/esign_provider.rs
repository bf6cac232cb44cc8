//! E-signature provider port.
//!
//! Opaque RPC: accepts a document reference and a signer, returns a
//! tracking id. Every call is paid, which is why the credit ledger
//! reserves a unit before invoking it. Implementations must bound the
//! call with a timeout; there is no retry-forever policy.

use async_trait::async_trait;
use thiserror::Error;

/// Request to start a signing envelope.
#[derive(Debug, Clone)]
pub struct EnvelopeRequest {
    pub document_id: String,
    pub signer_email: String,
    pub signer_name: String,
}

/// Receipt for an accepted envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeReceipt {
    /// Provider-side tracking id.
    pub envelope_id: String,
}

/// Errors from the e-signature provider.
#[derive(Debug, Error)]
pub enum EsignError {
    #[error("Provider rejected the envelope: {0}")]
    Rejected(String),

    #[error("Provider unreachable: {0}")]
    Transport(String),

    #[error("Provider call timed out")]
    Timeout,
}

/// Port for the e-signature provider.
#[async_trait]
pub trait EsignProvider: Send + Sync {
    /// Starts a signing envelope for one document and one signer.
    async fn send_envelope(&self, request: EnvelopeRequest) -> Result<EnvelopeReceipt, EsignError>;
}
