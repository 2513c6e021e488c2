//! Payment service: intents, checkout sessions, refunds, and webhook
//! processing.
//!
//! Webhook database writes run under a bounded retry with exponential
//! backoff so a transient infrastructure blip does not drop a provider
//! notification (the provider retries too, but dedup means a retried
//! delivery would be acknowledged without reprocessing).

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::payment::validate_refund;
use crate::domain::{BookingEvent, BookingId, BookingStatus, EventBus, PaymentStatus, TourId};
use crate::error::ApiError;
use crate::persistence::PostgresStore;
use crate::persistence::models::PaymentRow;
use crate::provider::types::LineItem;
use crate::provider::{CheckoutSession, PaymentIntent, ProviderClient, ProviderEvent};
use crate::service::BookingService;

/// Webhook write retry attempts.
const WEBHOOK_RETRIES: u32 = 3;
/// Initial backoff delay; doubles per attempt.
const WEBHOOK_BACKOFF: Duration = Duration::from_millis(200);

/// Outcome of processing one webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The event was applied.
    Processed,
    /// The event id was seen before; nothing was re-applied.
    Duplicate,
    /// The event type or target is not ours to handle.
    Ignored,
}

/// A created payment intent together with the publishable key the
/// storefront needs to confirm it.
#[derive(Debug, Clone)]
pub struct IntentHandle {
    /// The provider intent.
    pub intent: PaymentIntent,
    /// Publishable key for the storefront SDK.
    pub public_key: String,
}

/// Orchestrates payment provider calls and webhook-driven state changes.
#[derive(Debug, Clone)]
pub struct PaymentService {
    store: PostgresStore,
    provider: ProviderClient,
    bookings: BookingService,
    event_bus: EventBus,
    public_key: String,
    base_url: String,
}

impl PaymentService {
    /// Creates a new `PaymentService`.
    #[must_use]
    pub fn new(
        store: PostgresStore,
        provider: ProviderClient,
        bookings: BookingService,
        event_bus: EventBus,
        public_key: String,
        base_url: String,
    ) -> Self {
        Self {
            store,
            provider,
            bookings,
            event_bus,
            public_key,
            base_url,
        }
    }

    /// Creates a payment intent for a pending booking. The amount comes
    /// from the booking row, never from the client.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for unknown bookings, non-pending
    /// bookings, provider failures, or database failures.
    pub async fn create_intent(&self, booking_id: Uuid) -> Result<IntentHandle, ApiError> {
        let booking = self.store.get_booking(booking_id).await?;
        if booking.status != BookingStatus::Pending.as_str() {
            return Err(ApiError::InvalidRequest(
                "only pending bookings can be paid".to_string(),
            ));
        }

        let intent = self
            .provider
            .create_payment_intent(booking.total_minor, &booking.currency, &booking.id.to_string())
            .await?;

        let payment = self
            .store
            .upsert_payment(
                booking.id,
                booking.total_minor,
                &booking.currency,
                Some(&intent.id),
                None,
            )
            .await?;
        self.publish_payment(&booking.tour_id, &payment);

        tracing::info!(booking_id = %booking.id, intent_id = %intent.id, "payment intent created");
        Ok(IntentHandle {
            intent,
            public_key: self.public_key.clone(),
        })
    }

    /// Creates a hosted checkout session for a pending booking and stores
    /// the session URL as the booking's payment link.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for unknown bookings, non-pending
    /// bookings, provider failures, or database failures.
    pub async fn create_checkout_session(
        &self,
        booking_id: Uuid,
    ) -> Result<CheckoutSession, ApiError> {
        let booking = self.store.get_booking(booking_id).await?;
        if booking.status != BookingStatus::Pending.as_str() {
            return Err(ApiError::InvalidRequest(
                "only pending bookings can be paid".to_string(),
            ));
        }
        let tour = self.store.get_tour(booking.tour_id).await?;

        let line_items = [LineItem {
            name: format!("{} ({} {})", tour.name, booking.date, booking.start_time),
            // The hosted page shows one discounted line rather than
            // per-seat pricing plus a separate discount object.
            amount_minor: booking.total_minor,
            currency: booking.currency.clone(),
            quantity: 1,
        }];
        let success_url = format!("{}/booking/{}/success", self.base_url, booking.id);
        let cancel_url = format!("{}/booking/{}/cancelled", self.base_url, booking.id);

        let session = self
            .provider
            .create_checkout_session(
                &line_items,
                &booking.id.to_string(),
                &success_url,
                &cancel_url,
            )
            .await?;

        let payment = self
            .store
            .upsert_payment(
                booking.id,
                booking.total_minor,
                &booking.currency,
                None,
                Some(&session.id),
            )
            .await?;
        self.store.set_payment_link(booking.id, &session.url).await?;
        self.publish_payment(&booking.tour_id, &payment);

        tracing::info!(
            booking_id = %booking.id,
            session_id = %session.id,
            "checkout session created"
        );
        Ok(session)
    }

    /// Refunds a booking's payment; `amount_minor = None` refunds the
    /// remainder. A full refund also moves the booking to `refunded`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RefundRejected`] for double or oversized
    /// refunds, [`ApiError::PaymentNotFound`], provider failures, or
    /// database failures.
    pub async fn refund(
        &self,
        booking_id: Uuid,
        amount_minor: Option<i64>,
    ) -> Result<PaymentRow, ApiError> {
        let payment = self.store.get_payment_by_booking(booking_id).await?;
        let status = PaymentStatus::parse(&payment.status)
            .map_err(|s| ApiError::Internal(format!("unknown payment status {s}")))?;

        let refund_minor = validate_refund(
            status,
            payment.amount_minor,
            payment.refunded_minor,
            amount_minor,
        )?;

        let provider_payment_id = payment
            .provider_payment_id
            .as_deref()
            .ok_or_else(|| ApiError::RefundRejected {
                reason: "payment has no provider charge to refund".to_string(),
            })?;

        let refund = self
            .provider
            .create_refund(provider_payment_id, Some(refund_minor))
            .await?;
        let updated = self.store.record_refund(payment.id, refund_minor).await?;

        let booking = self.store.get_booking(booking_id).await?;
        if updated.status == PaymentStatus::Refunded.as_str() {
            // Full refund: reflect it on the booking.
            match self
                .bookings
                .transition(booking_id, BookingStatus::Refunded)
                .await
            {
                Ok(_) => {}
                Err(ApiError::InvalidTransition { from, to }) => {
                    tracing::warn!(%booking_id, %from, %to, "refund transition skipped");
                }
                Err(e) => return Err(e),
            }
        }
        self.publish_payment(&booking.tour_id, &updated);

        tracing::info!(
            %booking_id,
            refund_id = %refund.id,
            amount = refund_minor,
            "refund issued"
        );
        Ok(updated)
    }

    /// Applies a verified, deserialized webhook event.
    ///
    /// Duplicate deliveries (by provider event id) are acknowledged
    /// without reprocessing. Database writes are retried with exponential
    /// backoff before the error is surfaced (a surfaced error makes the
    /// provider redeliver later).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] after exhausted retries.
    pub async fn process_webhook(&self, event: &ProviderEvent) -> Result<WebhookOutcome, ApiError> {
        let payload = serde_json::json!({ "object": event.data.object.clone() });
        let fresh = self
            .store
            .record_webhook_event(&event.id, &event.event_type, &payload)
            .await?;
        if !fresh {
            tracing::debug!(event_id = %event.id, "duplicate webhook delivery");
            return Ok(WebhookOutcome::Duplicate);
        }

        match event.event_type.as_str() {
            "checkout.session.completed" => {
                self.apply_session_outcome(event, PaymentStatus::Succeeded).await
            }
            "checkout.session.expired" => {
                self.apply_session_outcome(event, PaymentStatus::Failed).await
            }
            other => {
                tracing::debug!(event_type = other, "ignoring webhook event type");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    /// Applies a checkout session outcome: payment status, booking
    /// transition, events.
    async fn apply_session_outcome(
        &self,
        event: &ProviderEvent,
        payment_status: PaymentStatus,
    ) -> Result<WebhookOutcome, ApiError> {
        let Some(session_id) = event.session_id() else {
            tracing::warn!(event_id = %event.id, "webhook event carries no session id");
            return Ok(WebhookOutcome::Ignored);
        };

        let Some(payment) = self.store.get_payment_by_session(session_id).await? else {
            tracing::warn!(session_id, "webhook for unknown checkout session");
            return Ok(WebhookOutcome::Ignored);
        };

        let provider_payment_id = event.payment_id();
        let payment = with_retry(|| {
            self.store
                .set_payment_status(payment.id, payment_status, provider_payment_id)
        })
        .await?;

        let booking_status = match payment_status {
            PaymentStatus::Succeeded => BookingStatus::Confirmed,
            _ => BookingStatus::Expired,
        };
        let result =
            with_retry(|| self.bookings.transition(payment.booking_id, booking_status)).await;
        match result {
            Ok(booking) => {
                self.publish_payment(&booking.tour_id, &payment);
            }
            Err(ApiError::InvalidTransition { from, to }) => {
                // Already moved (e.g. cancelled before payment settled).
                tracing::warn!(
                    booking_id = %payment.booking_id,
                    %from,
                    %to,
                    "webhook transition skipped"
                );
            }
            Err(e) => return Err(e),
        }

        tracing::info!(
            event_id = %event.id,
            session_id,
            status = %payment_status,
            "webhook applied"
        );
        Ok(WebhookOutcome::Processed)
    }

    fn publish_payment(&self, tour_id: &Uuid, payment: &PaymentRow) {
        let _ = self.event_bus.publish(BookingEvent::PaymentRecorded {
            booking_id: BookingId::from_uuid(payment.booking_id),
            tour_id: TourId::from_uuid(*tour_id),
            status: payment.status.clone(),
            amount_minor: payment.amount_minor,
            timestamp: Utc::now(),
        });
    }
}

/// Runs `op` up to [`WEBHOOK_RETRIES`] times, doubling the delay between
/// attempts. Only [`ApiError::Database`] is retried; other errors are
/// deterministic and surface immediately.
async fn with_retry<T, F, Fut>(mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut delay = WEBHOOK_BACKOFF;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(ApiError::Database(e)) if attempt < WEBHOOK_RETRIES => {
                tracing::warn!(attempt, error = %e, "webhook write failed; retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retry_returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ApiError>(7) }
        })
        .await;
        assert!(matches!(result, Ok(7)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_recovers_from_transient_database_errors() {
        let calls = AtomicU32::new(0);
        let result = with_retry(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ApiError::Database(sqlx::Error::PoolTimedOut))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert!(matches!(result, Ok(42)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_gives_up_after_bounded_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ApiError::Database(sqlx::Error::PoolTimedOut)) }
        })
        .await;
        assert!(matches!(result, Err(ApiError::Database(_))));
        assert_eq!(calls.load(Ordering::SeqCst), WEBHOOK_RETRIES);
    }

    #[tokio::test]
    async fn retry_does_not_retry_deterministic_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ApiError::InvalidRequest("bad".to_string())) }
        })
        .await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
