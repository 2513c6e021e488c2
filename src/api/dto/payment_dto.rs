//! Payment DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::persistence::models::PaymentRow;
use crate::provider::{CheckoutSession, PaymentIntent};

/// Request body for `POST /payments/intents`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIntentRequest {
    /// Booking to pay for.
    pub booking_id: Uuid,
}

/// Response body for `POST /payments/intents`.
#[derive(Debug, Serialize, ToSchema)]
pub struct IntentResponse {
    /// Provider intent identifier.
    pub intent_id: String,
    /// Secret the storefront uses to confirm the intent.
    pub client_secret: String,
    /// Amount in minor currency units.
    pub amount_minor: i64,
    /// ISO currency code, lowercase.
    pub currency: String,
    /// Publishable key for the storefront SDK.
    pub public_key: String,
}

impl IntentResponse {
    /// Builds the response from a provider intent and the publishable key.
    #[must_use]
    pub fn new(intent: PaymentIntent, public_key: String) -> Self {
        Self {
            intent_id: intent.id,
            client_secret: intent.client_secret,
            amount_minor: intent.amount,
            currency: intent.currency,
            public_key,
        }
    }
}

/// Request body for `POST /payments/checkout-sessions`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Booking to pay for.
    pub booking_id: Uuid,
}

/// Response body for `POST /payments/checkout-sessions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Provider session identifier.
    pub session_id: String,
    /// Hosted checkout URL to redirect the customer to.
    pub url: String,
}

impl From<CheckoutSession> for SessionResponse {
    fn from(session: CheckoutSession) -> Self {
        Self {
            session_id: session.id,
            url: session.url,
        }
    }
}

/// Request body for `POST /payments/:booking_id/refund`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RefundRequest {
    /// Amount to refund, minor currency units. Omit for a full refund of
    /// the remainder.
    #[serde(default)]
    pub amount_minor: Option<i64>,
}

/// Payment representation returned by payment endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResponse {
    /// Payment identifier.
    pub id: Uuid,
    /// Booking this payment belongs to.
    pub booking_id: Uuid,
    /// Captured (or to-capture) amount, minor currency units.
    pub amount_minor: i64,
    /// Amount refunded so far, minor currency units.
    pub refunded_minor: i64,
    /// ISO currency code, lowercase.
    pub currency: String,
    /// Lifecycle status.
    pub status: String,
    /// Provider-side payment identifier.
    pub provider_payment_id: Option<String>,
    /// Provider-side checkout session identifier.
    pub provider_session_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentRow> for PaymentResponse {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            amount_minor: row.amount_minor,
            refunded_minor: row.refunded_minor,
            currency: row.currency,
            status: row.status,
            provider_payment_id: row.provider_payment_id,
            provider_session_id: row.provider_session_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Request body for `PUT /profile`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// Contact email (profile key).
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact phone.
    #[serde(default)]
    pub phone: String,
}

/// Customer profile representation.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    /// Customer identifier.
    pub id: Uuid,
    /// Contact email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<crate::persistence::models::CustomerRow> for ProfileResponse {
    fn from(row: crate::persistence::models::CustomerRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            phone: row.phone,
            updated_at: row.updated_at,
        }
    }
}
