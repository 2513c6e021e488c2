//! Promo code handlers: create, list, validate, reserve, delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    CreatePromoRequest, PromoResponse, ReservePromoRequest, ValidatePromoRequest,
    ValidatePromoResponse,
};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /promos` — Create a promo code.
///
/// # Errors
///
/// Returns [`ApiError`] on invalid discount configuration.
#[utoipa::path(
    post,
    path = "/api/v1/promos",
    tag = "Promos",
    summary = "Create a promo code",
    request_body = CreatePromoRequest,
    responses(
        (status = 201, description = "Promo created", body = PromoResponse),
        (status = 400, description = "Invalid discount", body = ErrorResponse),
    )
)]
pub async fn create_promo(
    State(state): State<AppState>,
    Json(req): Json<CreatePromoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.promos.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(PromoResponse::from(row))))
}

/// `GET /promos` — List promo codes.
///
/// # Errors
///
/// Returns [`ApiError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/promos",
    tag = "Promos",
    summary = "List promo codes",
    responses(
        (status = 200, description = "Promo list", body = Vec<PromoResponse>),
    )
)]
pub async fn list_promos(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.promos.list().await?;
    let promos: Vec<PromoResponse> = rows.into_iter().map(PromoResponse::from).collect();
    Ok(Json(promos))
}

/// `POST /promos/validate` — Quote a code against an order total without
/// consuming a use.
///
/// # Errors
///
/// Returns [`ApiError::PromoNotFound`] or [`ApiError::PromoRejected`].
#[utoipa::path(
    post,
    path = "/api/v1/promos/validate",
    tag = "Promos",
    summary = "Validate a promo code",
    request_body = ValidatePromoRequest,
    responses(
        (status = 200, description = "Discount quote", body = ValidatePromoResponse),
        (status = 404, description = "Unknown code", body = ErrorResponse),
        (status = 422, description = "Expired or exhausted code", body = ErrorResponse),
    )
)]
pub async fn validate_promo(
    State(state): State<AppState>,
    Json(req): Json<ValidatePromoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = state.promos.validate(&req.code, req.total_minor).await?;
    Ok(Json(ValidatePromoResponse::from_quote(
        req.code.trim().to_uppercase(),
        &quote,
    )))
}

/// `POST /promos/reserve` — Atomically reserve one use of a code.
///
/// # Errors
///
/// Returns [`ApiError::PromoNotFound`] or [`ApiError::PromoRejected`].
#[utoipa::path(
    post,
    path = "/api/v1/promos/reserve",
    tag = "Promos",
    summary = "Reserve a promo code use",
    request_body = ReservePromoRequest,
    responses(
        (status = 200, description = "Use reserved", body = PromoResponse),
        (status = 404, description = "Unknown code", body = ErrorResponse),
        (status = 422, description = "Expired or exhausted code", body = ErrorResponse),
    )
)]
pub async fn reserve_promo(
    State(state): State<AppState>,
    Json(req): Json<ReservePromoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.promos.reserve(&req.code).await?;
    Ok(Json(PromoResponse::from(row)))
}

/// `DELETE /promos/:code` — Delete a promo code.
///
/// # Errors
///
/// Returns [`ApiError::PromoNotFound`] for unknown codes.
#[utoipa::path(
    delete,
    path = "/api/v1/promos/{code}",
    tag = "Promos",
    summary = "Delete a promo code",
    params(("code" = String, Path, description = "Promo code")),
    responses(
        (status = 204, description = "Promo deleted"),
        (status = 404, description = "Unknown code", body = ErrorResponse),
    )
)]
pub async fn delete_promo(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.promos.delete(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Promo code routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/promos", post(create_promo).get(list_promos))
        .route("/promos/validate", post(validate_promo))
        .route("/promos/reserve", post(reserve_promo))
        .route("/promos/{code}", axum::routing::delete(delete_promo))
}
