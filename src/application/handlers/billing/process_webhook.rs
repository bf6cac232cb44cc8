//! ProcessWebhookHandler - Command handler for inbound payment provider webhooks.
//!
//! Pipeline: verify signature -> normalize -> reconcile. Nothing touches
//! the datastore before verification succeeds. Deliveries that can never
//! be applied (unmapped types, unknown accounts) are acknowledged so the
//! provider stops retrying them; only transient store failures surface as
//! retryable.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::billing::{
    BillingEvent, BillingStatus, ReconcileOutcome, SubscriptionReconciler, WebhookError,
    WebhookVerifier,
};
use crate::domain::foundation::LandlordId;
use crate::ports::{Notification, Notifier};

/// Command carrying one raw webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    /// Raw request body, untouched; the signature covers these exact bytes.
    pub payload: Vec<u8>,
    /// Signature header value.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessWebhookResult {
    /// Event applied to local state.
    Applied(ReconcileOutcome),
    /// Delivery acknowledged without a write (unmapped type, unknown
    /// account, unknown status vocabulary).
    Acknowledged,
}

/// Handler for the webhook ingestion pipeline.
pub struct ProcessWebhookHandler {
    verifier: WebhookVerifier,
    reconciler: SubscriptionReconciler,
    notifier: Arc<dyn Notifier>,
    /// Recipient for cancellation notices; `None` disables them.
    billing_alerts_email: Option<String>,
}

impl ProcessWebhookHandler {
    pub fn new(
        verifier: WebhookVerifier,
        reconciler: SubscriptionReconciler,
        notifier: Arc<dyn Notifier>,
        billing_alerts_email: Option<String>,
    ) -> Self {
        Self {
            verifier,
            reconciler,
            notifier,
            billing_alerts_email,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<ProcessWebhookResult, WebhookError> {
        let event = self.verifier.verify_and_parse(&cmd.payload, &cmd.signature)?;

        let normalized = match BillingEvent::from_provider(&event) {
            Ok(normalized) => normalized,
            Err(WebhookError::Unmapped(kind)) => {
                info!(event_id = event.id, kind, "acknowledging unmapped event");
                return Ok(ProcessWebhookResult::Acknowledged);
            }
            Err(e) => return Err(e),
        };

        match self.reconciler.apply(normalized).await {
            Ok(outcome) => {
                self.notify_cancellation(&outcome);
                Ok(ProcessWebhookResult::Applied(outcome))
            }
            Err(WebhookError::Unmapped(_)) | Err(WebhookError::MissingAccountMapping(_)) => {
                Ok(ProcessWebhookResult::Acknowledged)
            }
            Err(e) => Err(e),
        }
    }

    /// Spawns a detached notification when a cancellation was confirmed.
    /// Failures are logged and never affect the webhook response.
    fn notify_cancellation(&self, outcome: &ReconcileOutcome) {
        let (landlord_id, ended) = match outcome {
            ReconcileOutcome::CancellationApplied { landlord_id } => (*landlord_id, true),
            ReconcileOutcome::StateApplied {
                landlord_id,
                status: BillingStatus::ActiveCancelPending,
            } => (*landlord_id, false),
            _ => return,
        };
        let Some(to_email) = self.billing_alerts_email.clone() else {
            return;
        };

        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            let notification = cancellation_notice(to_email, landlord_id, ended);
            if let Err(error) = notifier.send(notification).await {
                warn!(%error, %landlord_id, "cancellation notice not sent");
            }
        });
    }
}

fn cancellation_notice(to_email: String, landlord_id: LandlordId, ended: bool) -> Notification {
    let (subject, body) = if ended {
        (
            "Subscription ended".to_string(),
            format!("The subscription for landlord {landlord_id} has ended."),
        )
    } else {
        (
            "Cancellation scheduled".to_string(),
            format!(
                "The subscription for landlord {landlord_id} will cancel at the end of the current period."
            ),
        )
    };
    Notification {
        to_email,
        subject,
        body,
    }
}
