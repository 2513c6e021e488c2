//! Payment handlers: intents, checkout sessions, refunds, profiles.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    CreateIntentRequest, CreateSessionRequest, IntentResponse, PaymentResponse, ProfileResponse,
    RefundRequest, SessionResponse, UpdateProfileRequest,
};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /payments/intents` — Create a payment intent for a booking.
///
/// # Errors
///
/// Returns [`ApiError`] for unknown or non-pending bookings and provider
/// failures.
#[utoipa::path(
    post,
    path = "/api/v1/payments/intents",
    tag = "Payments",
    summary = "Create a payment intent",
    request_body = CreateIntentRequest,
    responses(
        (status = 201, description = "Intent created", body = IntentResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
    )
)]
pub async fn create_intent(
    State(state): State<AppState>,
    Json(req): Json<CreateIntentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = state.payments.create_intent(req.booking_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(IntentResponse::new(handle.intent, handle.public_key)),
    ))
}

/// `POST /payments/checkout-sessions` — Create a hosted checkout session.
///
/// The session URL is stored as the booking's payment link.
///
/// # Errors
///
/// Returns [`ApiError`] for unknown or non-pending bookings and provider
/// failures.
#[utoipa::path(
    post,
    path = "/api/v1/payments/checkout-sessions",
    tag = "Payments",
    summary = "Create a checkout session",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
    )
)]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.payments.create_checkout_session(req.booking_id).await?;
    Ok((StatusCode::CREATED, Json(SessionResponse::from(session))))
}

/// `POST /payments/:booking_id/refund` — Refund a captured payment.
///
/// A second full refund of an already fully-refunded payment is
/// rejected.
///
/// # Errors
///
/// Returns [`ApiError::RefundRejected`] for double or oversized refunds,
/// or [`ApiError::PaymentNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/payments/{booking_id}/refund",
    tag = "Payments",
    summary = "Refund a payment",
    params(("booking_id" = uuid::Uuid, Path, description = "Booking UUID")),
    request_body = RefundRequest,
    responses(
        (status = 200, description = "Refund recorded", body = PaymentResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 422, description = "Refund rejected", body = ErrorResponse),
    )
)]
pub async fn refund(
    State(state): State<AppState>,
    Path(booking_id): Path<uuid::Uuid>,
    Json(req): Json<RefundRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.payments.refund(booking_id, req.amount_minor).await?;
    Ok(Json(PaymentResponse::from(row)))
}

/// `PUT /profile` — Create or update a customer profile by email.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] for a missing email.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    tag = "Profile",
    summary = "Update a customer profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile stored", body = ProfileResponse),
        (status = 400, description = "Invalid email", body = ErrorResponse),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::InvalidRequest(
            "a valid email is required".to_string(),
        ));
    }
    let row = state
        .store
        .upsert_customer(&email, req.name.trim(), req.phone.trim())
        .await?;
    Ok(Json(ProfileResponse::from(row)))
}

/// `GET /profile/:email` — Fetch a customer profile.
///
/// # Errors
///
/// Returns [`ApiError::CustomerNotFound`] for unknown emails.
#[utoipa::path(
    get,
    path = "/api/v1/profile/{email}",
    tag = "Profile",
    summary = "Get a customer profile",
    params(("email" = String, Path, description = "Customer email")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "Unknown email", body = ErrorResponse),
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.store.get_customer(&email.trim().to_lowercase()).await?;
    Ok(Json(ProfileResponse::from(row)))
}

/// Payment and profile routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments/intents", post(create_intent))
        .route("/payments/checkout-sessions", post(create_checkout_session))
        .route("/payments/{booking_id}/refund", post(refund))
        .route("/profile", put(update_profile))
        .route("/profile/{email}", get(get_profile))
}
