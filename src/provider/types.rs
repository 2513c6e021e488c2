//! Payment provider wire types.
//!
//! Shapes follow the provider's JSON API: identifiers are opaque strings,
//! amounts are minor currency units.

use serde::{Deserialize, Serialize};

/// A payment intent created server-side; its `client_secret` is handed to
/// the storefront to complete payment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    /// Provider intent identifier.
    pub id: String,
    /// Secret the storefront uses to confirm the intent.
    pub client_secret: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// ISO currency code, lowercase.
    pub currency: String,
    /// Provider-side status string.
    pub status: String,
}

/// A hosted checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Provider session identifier.
    pub id: String,
    /// Hosted checkout URL to redirect the customer to.
    pub url: String,
    /// Provider-side status string.
    pub status: String,
}

/// A refund issued against a captured payment.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderRefund {
    /// Provider refund identifier.
    pub id: String,
    /// Refunded amount in minor currency units.
    pub amount: i64,
    /// Provider-side status string.
    pub status: String,
}

/// One line item of a checkout session.
#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    /// Display name shown on the hosted checkout page.
    pub name: String,
    /// Unit amount in minor currency units.
    pub amount_minor: i64,
    /// ISO currency code, lowercase.
    pub currency: String,
    /// Quantity.
    pub quantity: i64,
}

/// Envelope of an inbound webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEvent {
    /// Provider event identifier (idempotency key).
    pub id: String,
    /// Event type discriminator (e.g. `"checkout.session.completed"`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload.
    pub data: ProviderEventData,
}

/// Payload wrapper inside a webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEventData {
    /// The object the event describes (e.g. a checkout session).
    pub object: serde_json::Value,
}

impl ProviderEvent {
    /// Extracts the checkout session id from the event payload, if present.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.data.object.get("id").and_then(|v| v.as_str())
    }

    /// Extracts the payment/charge id attached to the session, if present.
    #[must_use]
    pub fn payment_id(&self) -> Option<&str> {
        self.data
            .object
            .get("payment_intent")
            .and_then(|v| v.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn event_envelope_parses() {
        let json = serde_json::json!({
            "id": "evt_123",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_456",
                    "payment_intent": "pi_789"
                }
            }
        });
        let Ok(event) = serde_json::from_value::<ProviderEvent>(json) else {
            panic!("envelope should parse");
        };
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.session_id(), Some("cs_456"));
        assert_eq!(event.payment_id(), Some("pi_789"));
    }

    #[test]
    fn missing_payment_intent_is_none() {
        let json = serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.expired",
            "data": { "object": { "id": "cs_1" } }
        });
        let Ok(event) = serde_json::from_value::<ProviderEvent>(json) else {
            panic!("envelope should parse");
        };
        assert_eq!(event.payment_id(), None);
    }
}
