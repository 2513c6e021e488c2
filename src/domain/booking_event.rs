//! Domain events reflecting booking-platform state mutations.
//!
//! Every state change emits a [`BookingEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers
//! (the admin dashboard's live feed).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use super::{BookingId, TourId};
use crate::domain::booking::BookingStatus;

/// Domain event emitted after every state mutation.
///
/// All money amounts are minor currency units (`i64`).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum BookingEvent {
    /// Emitted after schedule generation inserts occurrences for a tour.
    OccurrencesGenerated {
        /// Tour the occurrences belong to.
        tour_id: TourId,
        /// Rows actually inserted.
        inserted: u64,
        /// Rows skipped because they already existed.
        skipped: u64,
        /// Generation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a booking is created (status `pending`).
    BookingCreated {
        /// Booking identifier.
        booking_id: BookingId,
        /// Tour being booked.
        tour_id: TourId,
        /// Occurrence date.
        date: NaiveDate,
        /// Occurrence start time.
        start_time: NaiveTime,
        /// Seats reserved.
        seats: i32,
        /// Seats left on the occurrence after this booking.
        remaining_slots: i32,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a booking changes status.
    BookingStatusChanged {
        /// Booking identifier.
        booking_id: BookingId,
        /// Tour the booking belongs to.
        tour_id: TourId,
        /// Status before the transition.
        from: BookingStatus,
        /// Status after the transition.
        to: BookingStatus,
        /// Transition timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a payment is recorded or updated for a booking.
    PaymentRecorded {
        /// Booking the payment belongs to.
        booking_id: BookingId,
        /// Tour the booking belongs to.
        tour_id: TourId,
        /// Payment status column value (e.g. `"succeeded"`).
        status: String,
        /// Amount in minor currency units.
        amount_minor: i64,
        /// Record timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a promo code use is reserved against a booking.
    PromoRedeemed {
        /// The redeemed code.
        code: String,
        /// Tour of the booking that redeemed it.
        tour_id: TourId,
        /// Amount taken off, minor currency units.
        amount_off_minor: i64,
        /// Redemption timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl BookingEvent {
    /// The tour this event concerns (WebSocket subscription filter key).
    #[must_use]
    pub fn tour_id(&self) -> TourId {
        match self {
            Self::OccurrencesGenerated { tour_id, .. }
            | Self::BookingCreated { tour_id, .. }
            | Self::BookingStatusChanged { tour_id, .. }
            | Self::PaymentRecorded { tour_id, .. }
            | Self::PromoRedeemed { tour_id, .. } => *tour_id,
        }
    }

    /// Snake-case event type string, matching the serialized tag.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::OccurrencesGenerated { .. } => "occurrences_generated",
            Self::BookingCreated { .. } => "booking_created",
            Self::BookingStatusChanged { .. } => "booking_status_changed",
            Self::PaymentRecorded { .. } => "payment_recorded",
            Self::PromoRedeemed { .. } => "promo_redeemed",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn tour_id_accessor_covers_all_variants() {
        let tour_id = TourId::new();
        let event = BookingEvent::PromoRedeemed {
            code: "SUMMER10".to_string(),
            tour_id,
            amount_off_minor: 500,
            timestamp: Utc::now(),
        };
        assert_eq!(event.tour_id(), tour_id);
    }

    #[test]
    fn serialized_tag_matches_type_str() {
        let event = BookingEvent::OccurrencesGenerated {
            tour_id: TourId::new(),
            inserted: 52,
            skipped: 0,
            timestamp: Utc::now(),
        };
        let Ok(json) = serde_json::to_value(&event) else {
            panic!("serialization failed");
        };
        assert_eq!(
            json.get("event_type").and_then(|v| v.as_str()),
            Some(event.event_type_str())
        );
    }
}
