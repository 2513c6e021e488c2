//! Booking DTOs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common_dto::{PaginationMeta, PaginationParams};
use crate::persistence::models::BookingRow;

/// Request body for `POST /bookings`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    /// Tour to book.
    pub tour_id: Uuid,
    /// Occurrence date.
    pub date: NaiveDate,
    /// Occurrence start time.
    pub start_time: NaiveTime,
    /// Seats requested.
    pub seats: i32,
    /// Customer display name.
    pub customer_name: String,
    /// Customer contact email.
    pub customer_email: String,
    /// Customer contact phone.
    #[serde(default)]
    pub customer_phone: String,
    /// Optional promo code to redeem.
    #[serde(default)]
    pub promo_code: Option<String>,
}

/// Request body for `PATCH /bookings/:id`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingRequest {
    /// New seat count.
    pub seats: i32,
}

/// Request body for `PUT /bookings/:id/payment-link`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentLinkRequest {
    /// Hosted checkout URL.
    pub payment_link: String,
}

/// Booking representation returned by all booking endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    /// Booking identifier.
    pub id: Uuid,
    /// Booked tour.
    pub tour_id: Uuid,
    /// Occurrence date.
    pub date: NaiveDate,
    /// Occurrence start time.
    pub start_time: NaiveTime,
    /// Seats reserved.
    pub seats: i32,
    /// Customer display name.
    pub customer_name: String,
    /// Customer contact email.
    pub customer_email: String,
    /// Customer contact phone.
    pub customer_phone: String,
    /// Total price after discount, minor currency units.
    pub total_minor: i64,
    /// ISO currency code, lowercase.
    pub currency: String,
    /// Applied promo code, if any.
    pub promo_code: Option<String>,
    /// Hosted checkout URL, if a session was created.
    pub payment_link: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<BookingRow> for BookingResponse {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            tour_id: row.tour_id,
            date: row.date,
            start_time: row.start_time,
            seats: row.seats,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            total_minor: row.total_minor,
            currency: row.currency,
            promo_code: row.promo_code,
            payment_link: row.payment_link,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Query parameters for `GET /bookings`.
///
/// Pagination fields are inlined rather than flattened: the query-string
/// deserializer does not support `serde(flatten)`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingListQuery {
    /// Restrict to one tour.
    #[serde(default)]
    pub tour_id: Option<Uuid>,
    /// Restrict to one status (e.g. `"pending"`).
    #[serde(default)]
    pub status: Option<String>,
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl BookingListQuery {
    /// Extracts the pagination portion of the query.
    #[must_use]
    pub fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Response body for `GET /bookings`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingListResponse {
    /// Bookings on this page.
    pub data: Vec<BookingResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
