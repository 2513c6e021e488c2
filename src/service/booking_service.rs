//! Booking service: availability reads and the booking lifecycle.

use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::domain::availability::remaining_slots;
use crate::domain::{BookingEvent, BookingId, BookingStatus, EventBus, TourId};
use crate::error::ApiError;
use crate::persistence::models::BookingRow;
use crate::persistence::{BookingFilter, NewBooking, PostgresStore};

/// Availability of one occurrence.
#[derive(Debug, Clone, Copy)]
pub struct Availability {
    /// Capacity captured at generation time.
    pub max_slots: i32,
    /// Seats currently reserved.
    pub booked_slots: i32,
    /// Seats still available.
    pub remaining: i32,
}

/// A booking request from the storefront.
#[derive(Debug, Clone)]
pub struct BookingRequest {
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
    pub customer_phone: String,
    /// Optional promo code to redeem.
    pub promo_code: Option<String>,
}

/// Orchestrates bookings: availability, atomic creation, seat changes,
/// and lifecycle transitions.
#[derive(Debug, Clone)]
pub struct BookingService {
    store: PostgresStore,
    event_bus: EventBus,
}

impl BookingService {
    /// Creates a new `BookingService`.
    #[must_use]
    pub fn new(store: PostgresStore, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Reports the availability of `(tour, date, time)`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::OccurrenceNotFound`] if nothing is scheduled
    /// there, or [`ApiError::Database`] on failure. A read failure is an
    /// error, never "sold out".
    pub async fn availability(
        &self,
        tour_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<Availability, ApiError> {
        let occurrence = self.store.get_occurrence(tour_id, date, start_time).await?;
        Ok(Availability {
            max_slots: occurrence.max_slots,
            booked_slots: occurrence.booked_slots,
            remaining: remaining_slots(occurrence.max_slots, occurrence.booked_slots),
        })
    }

    /// Creates a booking: price lookup, optional promo redemption, then
    /// the transactional seat reservation + insert.
    ///
    /// A promo use reserved before a failed reservation is released as
    /// compensation.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on validation failure, unknown tour or
    /// occurrence, rejected promo, insufficient seats, or database failure.
    pub async fn create_booking(&self, request: BookingRequest) -> Result<BookingRow, ApiError> {
        validate_request(&request)?;

        let tour = self.store.get_tour(request.tour_id).await?;
        if !tour.active {
            return Err(ApiError::InvalidRequest(
                "tour is not open for booking".to_string(),
            ));
        }
        let occurrence = self
            .store
            .get_occurrence(request.tour_id, request.date, request.start_time)
            .await?;

        let base_total = tour.price_minor * i64::from(request.seats);

        // Reserve the promo use first; it is compensated on any failure
        // after this point.
        let mut total_minor = base_total;
        let mut amount_off = 0;
        if let Some(code) = &request.promo_code {
            let reserved = self.store.reserve_promo_use(code).await?;
            match reserved {
                Some(row) => {
                    let discount = row
                        .terms()
                        .map_err(ApiError::Internal)?
                        .discount;
                    amount_off = discount.amount_off(base_total);
                    total_minor = discount.apply(base_total);
                }
                None => {
                    // Distinguish unknown codes from rejected ones.
                    let row = self.store.get_promo(code).await?;
                    let rejection = crate::domain::promo::validate(
                        &row.terms().map_err(ApiError::Internal)?,
                        Utc::now(),
                    )
                    .err();
                    return Err(match rejection {
                        Some(rejection) => rejection.into(),
                        None => ApiError::PromoRejected {
                            reason: "code could not be reserved".to_string(),
                        },
                    });
                }
            }
        }

        let new_booking = NewBooking {
            tour_id: request.tour_id,
            occurrence_id: occurrence.id,
            date: request.date,
            start_time: request.start_time,
            seats: request.seats,
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            customer_phone: request.customer_phone,
            total_minor,
            currency: tour.currency.clone(),
            promo_code: request.promo_code.clone(),
        };

        let created = self.store.create_booking(&new_booking).await;
        let (row, remaining_after) = match created {
            Ok(ok) => ok,
            Err(e) => {
                if let Some(code) = &request.promo_code {
                    if let Err(release_err) = self.store.release_promo_use(code).await {
                        tracing::error!(code = %code, error = %release_err, "promo release failed");
                    }
                }
                return Err(e);
            }
        };

        let tour_id = TourId::from_uuid(row.tour_id);
        let _ = self.event_bus.publish(BookingEvent::BookingCreated {
            booking_id: BookingId::from_uuid(row.id),
            tour_id,
            date: row.date,
            start_time: row.start_time,
            seats: row.seats,
            remaining_slots: remaining_after,
            timestamp: Utc::now(),
        });
        if let Some(code) = &row.promo_code {
            let _ = self.event_bus.publish(BookingEvent::PromoRedeemed {
                code: code.clone(),
                tour_id,
                amount_off_minor: amount_off,
                timestamp: Utc::now(),
            });
        }

        tracing::info!(
            booking_id = %row.id,
            tour_id = %row.tour_id,
            seats = row.seats,
            remaining = remaining_after,
            "booking created"
        );
        Ok(row)
    }

    /// Changes a booking's seat count; the delta goes through the same
    /// conditional reservation as creation, so the booking's own held
    /// seats never count against it.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on invalid seat count, unknown booking,
    /// insufficient seats, or database failure.
    pub async fn update_seats(
        &self,
        booking_id: Uuid,
        new_seats: i32,
    ) -> Result<BookingRow, ApiError> {
        if new_seats <= 0 {
            return Err(ApiError::InvalidRequest(
                "seats must be positive".to_string(),
            ));
        }

        let booking = self.store.get_booking(booking_id).await?;
        let tour = self.store.get_tour(booking.tour_id).await?;

        let base_total = tour.price_minor * i64::from(new_seats);
        let total_minor = match &booking.promo_code {
            Some(code) => {
                let row = self.store.get_promo(code).await?;
                row.terms().map_err(ApiError::Internal)?.discount.apply(base_total)
            }
            None => base_total,
        };

        let row = self
            .store
            .update_booking_seats(booking_id, new_seats, total_minor)
            .await?;
        tracing::info!(booking_id = %row.id, seats = new_seats, "booking seats updated");
        Ok(row)
    }

    /// Cancels a booking, releasing its seats.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidTransition`] from terminal states,
    /// [`ApiError::BookingNotFound`], or [`ApiError::Database`].
    pub async fn cancel(&self, booking_id: Uuid) -> Result<BookingRow, ApiError> {
        self.transition(booking_id, BookingStatus::Cancelled).await
    }

    /// Moves a booking to `to`, validating the lifecycle graph and
    /// publishing the status change.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidTransition`] when the graph forbids the
    /// move, [`ApiError::BookingNotFound`], or [`ApiError::Database`].
    pub async fn transition(
        &self,
        booking_id: Uuid,
        to: BookingStatus,
    ) -> Result<BookingRow, ApiError> {
        let booking = self.store.get_booking(booking_id).await?;
        let from = BookingStatus::parse(&booking.status)
            .map_err(|s| ApiError::Internal(format!("unknown booking status {s}")))?;

        if !from.can_transition_to(to) {
            return Err(ApiError::InvalidTransition { from, to });
        }

        let row = self.store.transition_booking(booking_id, from, to).await?;

        let _ = self.event_bus.publish(BookingEvent::BookingStatusChanged {
            booking_id: BookingId::from_uuid(row.id),
            tour_id: TourId::from_uuid(row.tour_id),
            from,
            to,
            timestamp: Utc::now(),
        });
        tracing::info!(booking_id = %row.id, %from, %to, "booking status changed");
        Ok(row)
    }

    /// Fetches a booking by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BookingNotFound`] or [`ApiError::Database`].
    pub async fn get(&self, booking_id: Uuid) -> Result<BookingRow, ApiError> {
        self.store.get_booking(booking_id).await
    }

    /// Lists bookings with the total match count.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn list(
        &self,
        filter: &BookingFilter,
    ) -> Result<(Vec<BookingRow>, i64), ApiError> {
        self.store.list_bookings(filter).await
    }

    /// Stores the hosted checkout URL on a booking.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BookingNotFound`] or [`ApiError::Database`].
    pub async fn set_payment_link(
        &self,
        booking_id: Uuid,
        payment_link: &str,
    ) -> Result<BookingRow, ApiError> {
        self.store.set_payment_link(booking_id, payment_link).await
    }
}

fn validate_request(request: &BookingRequest) -> Result<(), ApiError> {
    if request.seats <= 0 {
        return Err(ApiError::InvalidRequest(
            "seats must be positive".to_string(),
        ));
    }
    if request.customer_name.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "customer name is required".to_string(),
        ));
    }
    if request.customer_email.trim().is_empty() || !request.customer_email.contains('@') {
        return Err(ApiError::InvalidRequest(
            "a valid customer email is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BookingRequest {
        BookingRequest {
            tour_id: Uuid::new_v4(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 9, 14).unwrap_or_default(),
            start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            seats: 2,
            customer_name: "Alex Doe".to_string(),
            customer_email: "alex@example.com".to_string(),
            customer_phone: String::new(),
            promo_code: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate_request(&request()).is_ok());
    }

    #[test]
    fn zero_seats_rejected() {
        let mut r = request();
        r.seats = 0;
        assert!(validate_request(&r).is_err());
    }

    #[test]
    fn blank_name_rejected() {
        let mut r = request();
        r.customer_name = " ".to_string();
        assert!(validate_request(&r).is_err());
    }

    #[test]
    fn mail_without_at_sign_rejected() {
        let mut r = request();
        r.customer_email = "not-an-email".to_string();
        assert!(validate_request(&r).is_err());
    }
}
