//! Database row models.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::promo::{Discount, PromoTerms};

/// A row from the `tours` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TourRow {
    /// Tour identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// URL-friendly unique slug.
    pub slug: String,
    /// Long-form description.
    pub description: String,
    /// Seats per occurrence.
    pub capacity: i32,
    /// Price per seat, minor currency units.
    pub price_minor: i64,
    /// ISO currency code, lowercase.
    pub currency: String,
    /// Duration in minutes.
    pub duration_min: i32,
    /// Whether the tour is publicly bookable.
    pub active: bool,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A row from the `scheduled_occurrences` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OccurrenceRow {
    /// Occurrence identifier.
    pub id: Uuid,
    /// Owning tour.
    pub tour_id: Uuid,
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time.
    pub start_time: NaiveTime,
    /// Capacity captured from the tour at generation time.
    pub max_slots: i32,
    /// Seats currently reserved. Maintained transactionally with bookings.
    pub booked_slots: i32,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A row from the `bookings` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookingRow {
    /// Booking identifier.
    pub id: Uuid,
    /// Booked tour.
    pub tour_id: Uuid,
    /// Booked occurrence.
    pub occurrence_id: Uuid,
    /// Occurrence date (denormalized for listing).
    pub date: NaiveDate,
    /// Occurrence start time (denormalized for listing).
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
    /// Lifecycle status column.
    pub status: String,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A row from the `payments` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PaymentRow {
    /// Payment identifier.
    pub id: Uuid,
    /// Booking this payment belongs to (unique).
    pub booking_id: Uuid,
    /// Captured (or to-capture) amount, minor currency units.
    pub amount_minor: i64,
    /// Amount refunded so far, minor currency units.
    pub refunded_minor: i64,
    /// ISO currency code, lowercase.
    pub currency: String,
    /// Lifecycle status column.
    pub status: String,
    /// Provider-side payment/charge identifier.
    pub provider_payment_id: Option<String>,
    /// Provider-side checkout session identifier.
    pub provider_session_id: Option<String>,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A row from the `promo_codes` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PromoCodeRow {
    /// Promo identifier.
    pub id: Uuid,
    /// The redeemable code, unique.
    pub code: String,
    /// Percentage discount, 1–100. Mutually exclusive with `amount_off`.
    pub percent_off: Option<i32>,
    /// Fixed discount in minor currency units.
    pub amount_off: Option<i64>,
    /// Maximum redemptions; `0` means unlimited.
    pub max_uses: i32,
    /// Redemptions so far.
    pub times_used: i32,
    /// Optional expiry instant.
    pub expires_at: Option<DateTime<Utc>>,
    /// Admin kill-switch.
    pub active: bool,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl PromoCodeRow {
    /// Maps the row to the redemption-relevant [`PromoTerms`] view.
    ///
    /// # Errors
    ///
    /// Returns an error message if the row carries neither a percentage
    /// nor a fixed discount (the schema forbids this).
    pub fn terms(&self) -> Result<PromoTerms, String> {
        let discount = match (self.percent_off, self.amount_off) {
            (Some(pct), _) => Discount::Percentage(pct),
            (None, Some(off)) => Discount::Fixed(off),
            (None, None) => return Err(format!("promo {} has no discount", self.code)),
        };
        Ok(PromoTerms {
            discount,
            max_uses: self.max_uses,
            times_used: self.times_used,
            expires_at: self.expires_at,
            active: self.active,
        })
    }
}

/// A row from the `customers` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerRow {
    /// Customer identifier.
    pub id: Uuid,
    /// Contact email, unique.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn promo_row() -> PromoCodeRow {
        PromoCodeRow {
            id: Uuid::new_v4(),
            code: "SUMMER10".to_string(),
            percent_off: Some(10),
            amount_off: None,
            max_uses: 100,
            times_used: 3,
            expires_at: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn percent_row_maps_to_percentage_discount() {
        let row = promo_row();
        let Ok(terms) = row.terms() else {
            panic!("terms should map");
        };
        assert_eq!(terms.discount, Discount::Percentage(10));
        assert_eq!(terms.max_uses, 100);
    }

    #[test]
    fn fixed_row_maps_to_fixed_discount() {
        let mut row = promo_row();
        row.percent_off = None;
        row.amount_off = Some(1500);
        let Ok(terms) = row.terms() else {
            panic!("terms should map");
        };
        assert_eq!(terms.discount, Discount::Fixed(1500));
    }

    #[test]
    fn discountless_row_is_an_error() {
        let mut row = promo_row();
        row.percent_off = None;
        row.amount_off = None;
        assert!(row.terms().is_err());
    }
}
