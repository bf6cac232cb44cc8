//! Event normalization.
//!
//! Maps the provider-specific event envelope into the small internal
//! event vocabulary the reconciler understands. Everything else is
//! rejected as `Unmapped` and acknowledged upstream.

use serde::Deserialize;

use super::provider_event::ProviderEvent;
use super::webhook_errors::WebhookError;

/// Normalized billing event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEvent {
    /// A hosted checkout finished. Attaches provider ids to the account;
    /// the status itself is settled by the subscription event the provider
    /// sends alongside. Credit-pack checkouts carry the purchased units.
    CheckoutCompleted {
        customer_id: String,
        subscription_id: Option<String>,
        /// Our landlord id, round-tripped through the checkout's client
        /// reference. Used to find the account on the very first checkout,
        /// before a customer id has been attached.
        landlord_ref: Option<String>,
        credit_units: Option<u32>,
    },

    /// Snapshot of a subscription's current provider-side state. Sent for
    /// both creation and every later change; application is a full
    /// overwrite so replays and reordering are harmless.
    SubscriptionUpserted {
        subscription_id: String,
        customer_id: String,
        raw_status: String,
        cancel_at_period_end: bool,
        /// Unix seconds; absent on some partial events. An absent value
        /// must never null-out a previously stored period end.
        current_period_end: Option<i64>,
    },

    /// The subscription no longer exists on the provider side.
    SubscriptionRemoved { subscription_id: String },
}

/// Checkout session object, as far as normalization needs it.
#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    customer: Option<String>,
    subscription: Option<String>,
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: CheckoutMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct CheckoutMetadata {
    /// Set by our checkout creation for e-sign credit packs.
    credit_units: Option<String>,
}

/// Subscription object, as far as normalization needs it.
#[derive(Debug, Deserialize)]
struct SubscriptionObject {
    id: String,
    customer: Option<String>,
    status: String,
    #[serde(default)]
    cancel_at_period_end: bool,
    current_period_end: Option<i64>,
}

impl BillingEvent {
    /// Normalizes a verified provider event.
    ///
    /// # Errors
    ///
    /// - `Unmapped` for event types this system does not handle
    /// - `MissingField` when a handled type lacks a required field
    /// - `ParseError` when the data object has the wrong shape
    pub fn from_provider(event: &ProviderEvent) -> Result<Self, WebhookError> {
        match event.event_type.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutSessionObject = event
                    .deserialize_object()
                    .map_err(|e| WebhookError::ParseError(e.to_string()))?;

                let customer_id = session
                    .customer
                    .ok_or(WebhookError::MissingField("customer"))?;

                let credit_units = match session.metadata.credit_units {
                    Some(raw) => Some(
                        raw.parse::<u32>()
                            .map_err(|_| WebhookError::MissingField("metadata.credit_units"))?,
                    ),
                    None => None,
                };

                Ok(BillingEvent::CheckoutCompleted {
                    customer_id,
                    subscription_id: session.subscription,
                    landlord_ref: session.client_reference_id,
                    credit_units,
                })
            }

            "customer.subscription.created" | "customer.subscription.updated" => {
                let sub: SubscriptionObject = event
                    .deserialize_object()
                    .map_err(|e| WebhookError::ParseError(e.to_string()))?;

                let customer_id = sub.customer.ok_or(WebhookError::MissingField("customer"))?;

                Ok(BillingEvent::SubscriptionUpserted {
                    subscription_id: sub.id,
                    customer_id,
                    raw_status: sub.status,
                    cancel_at_period_end: sub.cancel_at_period_end,
                    current_period_end: sub.current_period_end,
                })
            }

            "customer.subscription.deleted" => {
                let sub: SubscriptionObject = event
                    .deserialize_object()
                    .map_err(|e| WebhookError::ParseError(e.to_string()))?;

                Ok(BillingEvent::SubscriptionRemoved {
                    subscription_id: sub.id,
                })
            }

            other => Err(WebhookError::Unmapped(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::provider_event::ProviderEventBuilder;
    use serde_json::json;

    #[test]
    fn normalizes_checkout_completed() {
        let event = ProviderEventBuilder::new()
            .event_type("checkout.session.completed")
            .object(json!({
                "id": "cs_1",
                "customer": "cus_1",
                "subscription": "sub_1",
                "client_reference_id": "7c7cb071-7fcb-4a2f-9b69-3d0a1a0c3a11"
            }))
            .build();

        let normalized = BillingEvent::from_provider(&event).unwrap();
        assert_eq!(
            normalized,
            BillingEvent::CheckoutCompleted {
                customer_id: "cus_1".into(),
                subscription_id: Some("sub_1".into()),
                landlord_ref: Some("7c7cb071-7fcb-4a2f-9b69-3d0a1a0c3a11".into()),
                credit_units: None,
            }
        );
    }

    #[test]
    fn normalizes_credit_pack_checkout() {
        let event = ProviderEventBuilder::new()
            .event_type("checkout.session.completed")
            .object(json!({
                "id": "cs_2",
                "customer": "cus_1",
                "subscription": null,
                "metadata": { "credit_units": "5" }
            }))
            .build();

        let normalized = BillingEvent::from_provider(&event).unwrap();
        assert_eq!(
            normalized,
            BillingEvent::CheckoutCompleted {
                customer_id: "cus_1".into(),
                subscription_id: None,
                landlord_ref: None,
                credit_units: Some(5),
            }
        );
    }

    #[test]
    fn checkout_without_customer_is_missing_field() {
        let event = ProviderEventBuilder::new()
            .event_type("checkout.session.completed")
            .object(json!({ "id": "cs_3" }))
            .build();

        let result = BillingEvent::from_provider(&event);
        assert!(matches!(result, Err(WebhookError::MissingField("customer"))));
    }

    #[test]
    fn malformed_credit_units_is_rejected() {
        let event = ProviderEventBuilder::new()
            .event_type("checkout.session.completed")
            .object(json!({
                "id": "cs_4",
                "customer": "cus_1",
                "metadata": { "credit_units": "five" }
            }))
            .build();

        assert!(BillingEvent::from_provider(&event).is_err());
    }

    #[test]
    fn normalizes_subscription_updated() {
        let event = ProviderEventBuilder::new()
            .event_type("customer.subscription.updated")
            .object(json!({
                "id": "sub_1",
                "customer": "cus_1",
                "status": "active",
                "cancel_at_period_end": true,
                "current_period_end": 1720000000
            }))
            .build();

        let normalized = BillingEvent::from_provider(&event).unwrap();
        assert_eq!(
            normalized,
            BillingEvent::SubscriptionUpserted {
                subscription_id: "sub_1".into(),
                customer_id: "cus_1".into(),
                raw_status: "active".into(),
                cancel_at_period_end: true,
                current_period_end: Some(1720000000),
            }
        );
    }

    #[test]
    fn subscription_created_normalizes_like_updated() {
        let event = ProviderEventBuilder::new()
            .event_type("customer.subscription.created")
            .object(json!({
                "id": "sub_2",
                "customer": "cus_2",
                "status": "trialing"
            }))
            .build();

        let normalized = BillingEvent::from_provider(&event).unwrap();
        assert!(matches!(
            normalized,
            BillingEvent::SubscriptionUpserted {
                current_period_end: None,
                ..
            }
        ));
    }

    #[test]
    fn normalizes_subscription_deleted() {
        let event = ProviderEventBuilder::new()
            .event_type("customer.subscription.deleted")
            .object(json!({
                "id": "sub_1",
                "customer": "cus_1",
                "status": "canceled"
            }))
            .build();

        let normalized = BillingEvent::from_provider(&event).unwrap();
        assert_eq!(
            normalized,
            BillingEvent::SubscriptionRemoved {
                subscription_id: "sub_1".into(),
            }
        );
    }

    #[test]
    fn unknown_event_type_is_unmapped() {
        let event = ProviderEventBuilder::new()
            .event_type("invoice.finalized")
            .build();

        let result = BillingEvent::from_provider(&event);
        assert!(matches!(result, Err(WebhookError::Unmapped(t)) if t == "invoice.finalized"));
    }
}
