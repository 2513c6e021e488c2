//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Downstream failures (database, payment provider) never forward their
//! raw messages to clients; the details go to `tracing` only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::payment::RefundRejection;
use crate::domain::promo::PromoRejection;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "not enough available slots: 2 remaining",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                |
/// |-----------|------------------|----------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request            |
/// | 2000–2999 | Not Found / State| 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server           | 500 Internal Server Error  |
/// | 4000–4999 | Business         | 422 Unprocessable Entity   |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Tour with the given ID was not found.
    #[error("tour not found: {0}")]
    TourNotFound(uuid::Uuid),

    /// No scheduled occurrence matches the given tour/date/time.
    #[error("no scheduled occurrence for this tour at the requested date and time")]
    OccurrenceNotFound,

    /// Booking with the given ID was not found.
    #[error("booking not found: {0}")]
    BookingNotFound(uuid::Uuid),

    /// Promo code was not found.
    #[error("promo code not found: {0}")]
    PromoNotFound(String),

    /// Payment record for the booking was not found.
    #[error("payment not found for booking: {0}")]
    PaymentNotFound(uuid::Uuid),

    /// Customer profile was not found.
    #[error("customer not found: {0}")]
    CustomerNotFound(String),

    /// Requested seats exceed the occurrence's remaining capacity.
    #[error("not enough available slots: {remaining} remaining")]
    NotEnoughSlots {
        /// Seats still available on the occurrence.
        remaining: i32,
    },

    /// Booking status transition outside the lifecycle graph.
    #[error("booking cannot move from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: crate::domain::BookingStatus,
        /// Requested status.
        to: crate::domain::BookingStatus,
    },

    /// Promo code failed validation.
    #[error("promo code rejected: {reason}")]
    PromoRejected {
        /// Human-readable rejection reason.
        reason: String,
    },

    /// Refund request rejected.
    #[error("refund rejected: {reason}")]
    RefundRejected {
        /// Human-readable rejection reason.
        reason: String,
    },

    /// Webhook signature verification failed.
    #[error("webhook signature verification failed")]
    InvalidSignature,

    /// Database failure. The driver error is logged, never returned.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Payment provider call failure. Details are logged, never returned.
    #[error("payment provider error")]
    Provider(String),

    /// Internal server error.
    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidSignature => 1002,
            Self::TourNotFound(_) => 2001,
            Self::OccurrenceNotFound => 2002,
            Self::BookingNotFound(_) => 2003,
            Self::PromoNotFound(_) => 2004,
            Self::PaymentNotFound(_) => 2005,
            Self::CustomerNotFound(_) => 2006,
            Self::InvalidTransition { .. } => 2101,
            Self::NotEnoughSlots { .. } => 4001,
            Self::PromoRejected { .. } => 4002,
            Self::RefundRejected { .. } => 4003,
            Self::Database(_) => 3001,
            Self::Provider(_) => 3002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::TourNotFound(_)
            | Self::OccurrenceNotFound
            | Self::BookingNotFound(_)
            | Self::PromoNotFound(_)
            | Self::PaymentNotFound(_)
            | Self::CustomerNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::NotEnoughSlots { .. }
            | Self::PromoRejected { .. }
            | Self::RefundRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) | Self::Provider(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PromoRejection> for ApiError {
    fn from(rejection: PromoRejection) -> Self {
        let reason = match rejection {
            PromoRejection::Inactive => "code is not active",
            PromoRejection::Expired => "code has expired",
            PromoRejection::Exhausted => "code has reached its usage limit",
        };
        Self::PromoRejected {
            reason: reason.to_string(),
        }
    }
}

impl From<RefundRejection> for ApiError {
    fn from(rejection: RefundRejection) -> Self {
        let reason = match rejection {
            RefundRejection::NotCaptured => "payment was never captured".to_string(),
            RefundRejection::AlreadyRefunded => "payment is already fully refunded".to_string(),
            RefundRejection::ExceedsRemaining { refundable_minor } => {
                format!("amount exceeds refundable remainder of {refundable_minor}")
            }
            RefundRejection::InvalidAmount => "refund amount must be positive".to_string(),
        };
        Self::RefundRejected { reason }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Downstream detail stays server-side.
        match &self {
            Self::Database(e) => tracing::error!(error = %e, "database failure"),
            Self::Provider(detail) | Self::Internal(detail) => {
                tracing::error!(detail = %detail, "internal failure");
            }
            _ => {}
        }

        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookingStatus;

    #[test]
    fn not_enough_slots_is_unprocessable() {
        let err = ApiError::NotEnoughSlots { remaining: 2 };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), 4001);
    }

    #[test]
    fn database_error_hides_driver_message() {
        let err = ApiError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.to_string(), "database error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_transition_is_conflict() {
        let err = ApiError::InvalidTransition {
            from: BookingStatus::Cancelled,
            to: BookingStatus::Confirmed,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn promo_rejection_maps_to_message() {
        let err: ApiError = PromoRejection::Expired.into();
        assert!(err.to_string().contains("expired"));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn not_found_variants_are_404() {
        assert_eq!(
            ApiError::OccurrenceNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::PromoNotFound("X".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
