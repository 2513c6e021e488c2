//! Booking queries: atomic seat reservation, status transitions, listings.
//!
//! Seat accounting is never check-then-act across round trips. Every
//! reservation or release is a single conditional `UPDATE` on the
//! occurrence row executed in the same transaction as the booking write,
//! so two concurrent requests for the last seat serialize on the row lock
//! and exactly one succeeds.

use uuid::Uuid;

use super::models::BookingRow;
use super::postgres::PostgresStore;
use crate::domain::BookingStatus;
use crate::error::ApiError;

const BOOKING_COLUMNS: &str = "id, tour_id, occurrence_id, date, start_time, seats, \
                               customer_name, customer_email, customer_phone, total_minor, \
                               currency, promo_code, payment_link, status, created_at, updated_at";

/// Fields for a new booking row. Occurrence coordinates are denormalized
/// onto the booking for listing without joins.
#[derive(Debug, Clone)]
pub struct NewBooking {
    /// Booked tour.
    pub tour_id: Uuid,
    /// Booked occurrence.
    pub occurrence_id: Uuid,
    /// Occurrence date.
    pub date: chrono::NaiveDate,
    /// Occurrence start time.
    pub start_time: chrono::NaiveTime,
    /// Seats requested.
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
}

/// Filters for booking listings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Restrict to one tour.
    pub tour_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<BookingStatus>,
    /// Page offset.
    pub offset: i64,
    /// Page size.
    pub limit: i64,
}

impl PostgresStore {
    /// Reserves seats and inserts the booking in one transaction.
    ///
    /// The reservation is a conditional update
    /// (`booked_slots + seats <= max_slots`); if it matches no row the
    /// transaction rolls back and the current remaining count is reported
    /// in the error. Returns the booking row and the seats remaining on
    /// the occurrence after the reservation.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotEnoughSlots`] when the seats do not fit,
    /// [`ApiError::OccurrenceNotFound`] if the occurrence vanished, or
    /// [`ApiError::Database`] on failure.
    pub async fn create_booking(
        &self,
        booking: &NewBooking,
    ) -> Result<(BookingRow, i32), ApiError> {
        let mut tx = self.pool.begin().await?;

        let remaining_after = sqlx::query_scalar::<_, i32>(
            "UPDATE scheduled_occurrences \
             SET booked_slots = booked_slots + $2 \
             WHERE id = $1 AND booked_slots + $2 <= max_slots \
             RETURNING max_slots - booked_slots",
        )
        .bind(booking.occurrence_id)
        .bind(booking.seats)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(remaining_after) = remaining_after else {
            // The conditional update matched nothing: either sold out or
            // the occurrence is gone. Look once, then roll back.
            let remaining = sqlx::query_scalar::<_, i32>(
                "SELECT max_slots - booked_slots FROM scheduled_occurrences WHERE id = $1",
            )
            .bind(booking.occurrence_id)
            .fetch_optional(&mut *tx)
            .await?;
            tx.rollback().await?;
            return Err(match remaining {
                Some(remaining) => ApiError::NotEnoughSlots {
                    remaining: remaining.max(0),
                },
                None => ApiError::OccurrenceNotFound,
            });
        };

        let sql = format!(
            "INSERT INTO bookings (id, tour_id, occurrence_id, date, start_time, seats, \
             customer_name, customer_email, customer_phone, total_minor, currency, promo_code, \
             status) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'pending') \
             RETURNING {BOOKING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(booking.tour_id)
            .bind(booking.occurrence_id)
            .bind(booking.date)
            .bind(booking.start_time)
            .bind(booking.seats)
            .bind(&booking.customer_name)
            .bind(&booking.customer_email)
            .bind(&booking.customer_phone)
            .bind(booking.total_minor)
            .bind(&booking.currency)
            .bind(&booking.promo_code)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((row, remaining_after))
    }

    /// Changes a booking's seat count, applying the delta through the same
    /// conditional update as creation. The booking's own held seats are
    /// excluded from the check by construction: only the difference is
    /// reserved or released.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotEnoughSlots`] when the increase does not fit,
    /// [`ApiError::BookingNotFound`] for an unknown id, or
    /// [`ApiError::Database`] on failure.
    pub async fn update_booking_seats(
        &self,
        booking_id: Uuid,
        new_seats: i32,
        new_total_minor: i64,
    ) -> Result<BookingRow, ApiError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, (Uuid, i32, String)>(
            "SELECT occurrence_id, seats, status FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((occurrence_id, seats, status)) = current else {
            tx.rollback().await?;
            return Err(ApiError::BookingNotFound(booking_id));
        };

        let holds_seats = BookingStatus::parse(&status)
            .map(BookingStatus::holds_seats)
            .unwrap_or(false);
        if !holds_seats {
            tx.rollback().await?;
            return Err(ApiError::InvalidRequest(
                "only pending or confirmed bookings can change seats".to_string(),
            ));
        }

        let delta = new_seats - seats;
        if delta != 0 {
            let updated = sqlx::query_scalar::<_, i32>(
                "UPDATE scheduled_occurrences \
                 SET booked_slots = booked_slots + $2 \
                 WHERE id = $1 AND booked_slots + $2 <= max_slots AND booked_slots + $2 >= 0 \
                 RETURNING max_slots - booked_slots",
            )
            .bind(occurrence_id)
            .bind(delta)
            .fetch_optional(&mut *tx)
            .await?;

            if updated.is_none() {
                let remaining = sqlx::query_scalar::<_, i32>(
                    "SELECT max_slots - booked_slots FROM scheduled_occurrences WHERE id = $1",
                )
                .bind(occurrence_id)
                .fetch_optional(&mut *tx)
                .await?
                .unwrap_or(0);
                tx.rollback().await?;
                return Err(ApiError::NotEnoughSlots {
                    remaining: remaining.max(0),
                });
            }
        }

        let sql = format!(
            "UPDATE bookings SET seats = $2, total_minor = $3, updated_at = now() \
             WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .bind(new_seats)
            .bind(new_total_minor)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Transitions a booking from `from` to `to`, releasing its seats in
    /// the same transaction when the transition drops the hold. The status
    /// predicate is part of the `UPDATE`, so a concurrent transition makes
    /// this one fail cleanly instead of double-applying.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidTransition`] if the row is no longer in
    /// `from`, [`ApiError::BookingNotFound`] for an unknown id, or
    /// [`ApiError::Database`] on failure.
    pub async fn transition_booking(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<BookingRow, ApiError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE bookings SET status = $3, updated_at = now() \
             WHERE id = $1 AND status = $2 RETURNING {BOOKING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM bookings WHERE id = $1)",
            )
            .bind(booking_id)
            .fetch_one(&mut *tx)
            .await?;
            tx.rollback().await?;
            return Err(if exists {
                ApiError::InvalidTransition { from, to }
            } else {
                ApiError::BookingNotFound(booking_id)
            });
        };

        if from.holds_seats() && !to.holds_seats() {
            sqlx::query(
                "UPDATE scheduled_occurrences SET booked_slots = booked_slots - $2 \
                 WHERE id = $1",
            )
            .bind(row.occurrence_id)
            .bind(row.seats)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    /// Fetches a booking by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BookingNotFound`] for an unknown id, or
    /// [`ApiError::Database`] on failure.
    pub async fn get_booking(&self, booking_id: Uuid) -> Result<BookingRow, ApiError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::BookingNotFound(booking_id))
    }

    /// Lists bookings matching `filter`, newest first, with the total
    /// match count for pagination.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn list_bookings(
        &self,
        filter: &BookingFilter,
    ) -> Result<(Vec<BookingRow>, i64), ApiError> {
        let status = filter.status.map(BookingStatus::as_str);

        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE ($1::uuid IS NULL OR tour_id = $1) \
               AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC OFFSET $3 LIMIT $4"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(filter.tour_id)
            .bind(status)
            .bind(filter.offset)
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings \
             WHERE ($1::uuid IS NULL OR tour_id = $1) \
               AND ($2::text IS NULL OR status = $2)",
        )
        .bind(filter.tour_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Stores the hosted checkout URL on a booking.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BookingNotFound`] for an unknown id, or
    /// [`ApiError::Database`] on failure.
    pub async fn set_payment_link(
        &self,
        booking_id: Uuid,
        payment_link: &str,
    ) -> Result<BookingRow, ApiError> {
        let sql = format!(
            "UPDATE bookings SET payment_link = $2, updated_at = now() \
             WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        );
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .bind(payment_link)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::BookingNotFound(booking_id))
    }
}
