//! Booking handlers: create, list, get, update, cancel, payment link.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{
    BookingListQuery, BookingListResponse, BookingResponse, CreateBookingRequest,
    PaymentLinkRequest, UpdateBookingRequest,
};
use crate::app_state::AppState;
use crate::domain::BookingStatus;
use crate::error::{ApiError, ErrorResponse};
use crate::persistence::BookingFilter;
use crate::service::booking_service::BookingRequest;

/// `POST /bookings` — Create a booking.
///
/// Seat reservation and the booking insert happen in one transaction;
/// when two requests race for the last seat, exactly one succeeds and
/// the other receives a 422.
///
/// # Errors
///
/// Returns [`ApiError`] on validation failure, unknown tour or
/// occurrence, rejected promo, or insufficient seats.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    summary = "Create a booking",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 404, description = "Tour or occurrence not found", body = ErrorResponse),
        (status = 422, description = "Not enough seats or promo rejected", body = ErrorResponse),
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .bookings
        .create_booking(BookingRequest {
            tour_id: req.tour_id,
            date: req.date,
            start_time: req.start_time,
            seats: req.seats,
            customer_name: req.customer_name,
            customer_email: req.customer_email,
            customer_phone: req.customer_phone,
            promo_code: req.promo_code,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(row))))
}

/// `GET /bookings` — List bookings with filters and pagination.
///
/// # Errors
///
/// Returns [`ApiError`] on invalid status filters or internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    summary = "List bookings",
    params(BookingListQuery),
    responses(
        (status = 200, description = "Paginated booking list", body = BookingListResponse),
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(BookingStatus::parse)
        .transpose()
        .map_err(|s| ApiError::InvalidRequest(format!("invalid status: {s}")))?;

    let pagination = query.pagination().clamped();
    let filter = BookingFilter {
        tour_id: query.tour_id,
        status,
        offset: pagination.offset(),
        limit: i64::from(pagination.per_page),
    };

    let (rows, total) = state.bookings.list(&filter).await?;
    Ok(Json(BookingListResponse {
        data: rows.into_iter().map(BookingResponse::from).collect(),
        pagination: pagination.meta(u32::try_from(total).unwrap_or(u32::MAX)),
    }))
}

/// `GET /bookings/:id` — Get booking details.
///
/// # Errors
///
/// Returns [`ApiError::BookingNotFound`] if the booking does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    summary = "Get booking details",
    params(("id" = uuid::Uuid, Path, description = "Booking UUID")),
    responses(
        (status = 200, description = "Booking details", body = BookingResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.bookings.get(id).await?;
    Ok(Json(BookingResponse::from(row)))
}

/// `PATCH /bookings/:id` — Change a booking's seat count.
///
/// Only the seat-count difference is checked against the occurrence's
/// remaining capacity, so shrinking a booking always succeeds.
///
/// # Errors
///
/// Returns [`ApiError::NotEnoughSlots`] when the increase does not fit,
/// or [`ApiError::BookingNotFound`].
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    summary = "Change a booking's seats",
    params(("id" = uuid::Uuid, Path, description = "Booking UUID")),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Booking updated", body = BookingResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 422, description = "Not enough seats", body = ErrorResponse),
    )
)]
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.bookings.update_seats(id, req.seats).await?;
    Ok(Json(BookingResponse::from(row)))
}

/// `POST /bookings/:id/cancel` — Cancel a booking, releasing its seats.
///
/// # Errors
///
/// Returns [`ApiError::InvalidTransition`] from terminal states, or
/// [`ApiError::BookingNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/cancel",
    tag = "Bookings",
    summary = "Cancel a booking",
    params(("id" = uuid::Uuid, Path, description = "Booking UUID")),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 409, description = "Booking is in a terminal state", body = ErrorResponse),
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.bookings.cancel(id).await?;
    Ok(Json(BookingResponse::from(row)))
}

/// `PUT /bookings/:id/payment-link` — Store a hosted checkout URL.
///
/// # Errors
///
/// Returns [`ApiError::BookingNotFound`] if the booking does not exist.
#[utoipa::path(
    put,
    path = "/api/v1/bookings/{id}/payment-link",
    tag = "Bookings",
    summary = "Set a booking's payment link",
    params(("id" = uuid::Uuid, Path, description = "Booking UUID")),
    request_body = PaymentLinkRequest,
    responses(
        (status = 200, description = "Payment link stored", body = BookingResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
    )
)]
pub async fn set_payment_link(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PaymentLinkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.payment_link.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "payment_link is required".to_string(),
        ));
    }
    let row = state.bookings.set_payment_link(id, &req.payment_link).await?;
    Ok(Json(BookingResponse::from(row)))
}

/// Booking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/bookings/{id}", get(get_booking).patch(update_booking))
        .route("/bookings/{id}/cancel", post(cancel_booking))
        .route("/bookings/{id}/payment-link", put(set_payment_link))
}
