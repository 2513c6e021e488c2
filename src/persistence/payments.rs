//! Payment record queries.

use uuid::Uuid;

use super::models::PaymentRow;
use super::postgres::PostgresStore;
use crate::domain::PaymentStatus;
use crate::error::ApiError;

const PAYMENT_COLUMNS: &str = "id, booking_id, amount_minor, refunded_minor, currency, status, \
                               provider_payment_id, provider_session_id, created_at, updated_at";

impl PostgresStore {
    /// Creates or refreshes the payment record for a booking.
    ///
    /// There is at most one payment per booking; retrying a checkout
    /// replaces the provider identifiers on the existing row and resets
    /// its status to `created`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn upsert_payment(
        &self,
        booking_id: Uuid,
        amount_minor: i64,
        currency: &str,
        provider_payment_id: Option<&str>,
        provider_session_id: Option<&str>,
    ) -> Result<PaymentRow, ApiError> {
        let sql = format!(
            "INSERT INTO payments (id, booking_id, amount_minor, currency, status, \
             provider_payment_id, provider_session_id) \
             VALUES ($1, $2, $3, $4, 'created', $5, $6) \
             ON CONFLICT (booking_id) DO UPDATE SET \
               amount_minor = EXCLUDED.amount_minor, \
               currency = EXCLUDED.currency, \
               status = 'created', \
               provider_payment_id = EXCLUDED.provider_payment_id, \
               provider_session_id = EXCLUDED.provider_session_id, \
               updated_at = now() \
             RETURNING {PAYMENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(booking_id)
            .bind(amount_minor)
            .bind(currency)
            .bind(provider_payment_id)
            .bind(provider_session_id)
            .fetch_one(&self.pool)
            .await?)
    }

    /// Fetches the payment record for a booking.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PaymentNotFound`] if the booking has no payment,
    /// or [`ApiError::Database`] on failure.
    pub async fn get_payment_by_booking(&self, booking_id: Uuid) -> Result<PaymentRow, ApiError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE booking_id = $1");
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::PaymentNotFound(booking_id))
    }

    /// Fetches the payment record carrying a provider checkout session id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure. A missing row is `None`
    /// (webhooks for unknown sessions are acknowledged, not errored).
    pub async fn get_payment_by_session(
        &self,
        provider_session_id: &str,
    ) -> Result<Option<PaymentRow>, ApiError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE provider_session_id = $1");
        Ok(sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(provider_session_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Sets a payment's status, optionally attaching the provider payment
    /// id reported by a webhook.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PaymentNotFound`] for an unknown id, or
    /// [`ApiError::Database`] on failure.
    pub async fn set_payment_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
        provider_payment_id: Option<&str>,
    ) -> Result<PaymentRow, ApiError> {
        let sql = format!(
            "UPDATE payments SET status = $2, \
             provider_payment_id = COALESCE($3, provider_payment_id), updated_at = now() \
             WHERE id = $1 RETURNING {PAYMENT_COLUMNS}"
        );
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(payment_id)
            .bind(status.as_str())
            .bind(provider_payment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::PaymentNotFound(payment_id))
    }

    /// Records a refund: bumps `refunded_minor` and moves the status to
    /// `refunded` once the whole captured amount is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PaymentNotFound`] for an unknown id, or
    /// [`ApiError::Database`] on failure.
    pub async fn record_refund(
        &self,
        payment_id: Uuid,
        refund_minor: i64,
    ) -> Result<PaymentRow, ApiError> {
        let sql = format!(
            "UPDATE payments SET \
               refunded_minor = refunded_minor + $2, \
               status = CASE WHEN refunded_minor + $2 >= amount_minor \
                             THEN 'refunded' ELSE status END, \
               updated_at = now() \
             WHERE id = $1 RETURNING {PAYMENT_COLUMNS}"
        );
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(payment_id)
            .bind(refund_minor)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::PaymentNotFound(payment_id))
    }
}
