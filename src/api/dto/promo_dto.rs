//! Promo code DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::persistence::NewPromoCode;
use crate::persistence::models::PromoCodeRow;
use crate::service::promo_service::PromoQuote;

/// Request body for `POST /promos`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePromoRequest {
    /// The redeemable code (stored uppercase).
    pub code: String,
    /// Percentage discount, 1–100. Mutually exclusive with `amount_off`.
    #[serde(default)]
    pub percent_off: Option<i32>,
    /// Fixed discount in minor currency units.
    #[serde(default)]
    pub amount_off: Option<i64>,
    /// Maximum redemptions; `0` (the default) means unlimited.
    #[serde(default)]
    pub max_uses: i32,
    /// Optional expiry instant.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<CreatePromoRequest> for NewPromoCode {
    fn from(req: CreatePromoRequest) -> Self {
        Self {
            code: req.code,
            percent_off: req.percent_off,
            amount_off: req.amount_off,
            max_uses: req.max_uses,
            expires_at: req.expires_at,
        }
    }
}

/// Promo code representation returned by promo endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct PromoResponse {
    /// Promo identifier.
    pub id: Uuid,
    /// The redeemable code.
    pub code: String,
    /// Percentage discount, if percentage-based.
    pub percent_off: Option<i32>,
    /// Fixed discount in minor currency units, if fixed.
    pub amount_off: Option<i64>,
    /// Maximum redemptions; `0` means unlimited.
    pub max_uses: i32,
    /// Redemptions so far.
    pub times_used: i32,
    /// Optional expiry instant.
    pub expires_at: Option<DateTime<Utc>>,
    /// Admin kill-switch.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<PromoCodeRow> for PromoResponse {
    fn from(row: PromoCodeRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            percent_off: row.percent_off,
            amount_off: row.amount_off,
            max_uses: row.max_uses,
            times_used: row.times_used,
            expires_at: row.expires_at,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

/// Request body for `POST /promos/validate`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidatePromoRequest {
    /// Code to validate.
    pub code: String,
    /// Order total to quote against, minor currency units.
    pub total_minor: i64,
}

/// Response body for `POST /promos/validate`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidatePromoResponse {
    /// The validated code.
    pub code: String,
    /// Amount taken off, minor currency units.
    pub amount_off_minor: i64,
    /// Total after the discount, minor currency units.
    pub total_after_minor: i64,
}

impl ValidatePromoResponse {
    /// Builds the response from a service quote.
    #[must_use]
    pub fn from_quote(code: String, quote: &PromoQuote) -> Self {
        Self {
            code,
            amount_off_minor: quote.amount_off_minor,
            total_after_minor: quote.total_after_minor,
        }
    }
}

/// Request body for `POST /promos/reserve`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReservePromoRequest {
    /// Code to reserve one use of.
    pub code: String,
}
