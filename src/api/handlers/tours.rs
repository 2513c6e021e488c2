//! Tour catalog handlers: CRUD, schedule generation, availability.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Days, NaiveTime, Utc};

use crate::api::dto::{
    AvailabilityQuery, AvailabilityResponse, GenerateScheduleRequest, GenerateScheduleResponse,
    OccurrenceDto, RuleDto, ScheduleQuery, TourListQuery, TourRequest, TourResponse,
};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// `POST /tours` — Create a tour.
///
/// # Errors
///
/// Returns [`ApiError`] on invalid fields.
#[utoipa::path(
    post,
    path = "/api/v1/tours",
    tag = "Tours",
    summary = "Create a tour",
    request_body = TourRequest,
    responses(
        (status = 201, description = "Tour created", body = TourResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
    )
)]
pub async fn create_tour(
    State(state): State<AppState>,
    Json(req): Json<TourRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.catalog.create_tour(req.into()).await?;
    Ok((StatusCode::CREATED, Json(TourResponse::from(row))))
}

/// `GET /tours` — List tours.
///
/// # Errors
///
/// Returns [`ApiError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/tours",
    tag = "Tours",
    summary = "List tours",
    params(TourListQuery),
    responses(
        (status = 200, description = "Tour list", body = Vec<TourResponse>),
    )
)]
pub async fn list_tours(
    State(state): State<AppState>,
    Query(query): Query<TourListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.catalog.list_tours(query.active).await?;
    let tours: Vec<TourResponse> = rows.into_iter().map(TourResponse::from).collect();
    Ok(Json(tours))
}

/// `GET /tours/:id` — Get tour details.
///
/// # Errors
///
/// Returns [`ApiError::TourNotFound`] if the tour does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/tours/{id}",
    tag = "Tours",
    summary = "Get tour details",
    params(("id" = uuid::Uuid, Path, description = "Tour UUID")),
    responses(
        (status = 200, description = "Tour details", body = TourResponse),
        (status = 404, description = "Tour not found", body = ErrorResponse),
    )
)]
pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.catalog.get_tour(id).await?;
    Ok(Json(TourResponse::from(row)))
}

/// `PUT /tours/:id` — Update a tour.
///
/// # Errors
///
/// Returns [`ApiError::TourNotFound`] or validation errors.
#[utoipa::path(
    put,
    path = "/api/v1/tours/{id}",
    tag = "Tours",
    summary = "Update a tour",
    params(("id" = uuid::Uuid, Path, description = "Tour UUID")),
    request_body = TourRequest,
    responses(
        (status = 200, description = "Tour updated", body = TourResponse),
        (status = 404, description = "Tour not found", body = ErrorResponse),
    )
)]
pub async fn update_tour(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<TourRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.catalog.update_tour(id, req.into()).await?;
    Ok(Json(TourResponse::from(row)))
}

/// `DELETE /tours/:id` — Delete a tour.
///
/// # Errors
///
/// Returns [`ApiError::TourNotFound`] if the tour does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/tours/{id}",
    tag = "Tours",
    summary = "Delete a tour",
    params(("id" = uuid::Uuid, Path, description = "Tour UUID")),
    responses(
        (status = 204, description = "Tour deleted"),
        (status = 404, description = "Tour not found", body = ErrorResponse),
    )
)]
pub async fn delete_tour(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.catalog.delete_tour(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /tours/:id/schedule` — Expand recurrence rules into occurrences.
///
/// # Errors
///
/// Returns [`ApiError`] on invalid rules, unknown tour, or database
/// failure (the whole generation aborts).
#[utoipa::path(
    post,
    path = "/api/v1/tours/{id}/schedule",
    tag = "Tours",
    summary = "Generate a tour's schedule",
    description = "Expands weekly recurrence rules into dated occurrences for the coming year. \
                   Existing occurrences are skipped, so regeneration is safe.",
    params(("id" = uuid::Uuid, Path, description = "Tour UUID")),
    request_body = GenerateScheduleRequest,
    responses(
        (status = 200, description = "Generation report", body = GenerateScheduleResponse),
        (status = 404, description = "Tour not found", body = ErrorResponse),
    )
)]
pub async fn generate_schedule(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<GenerateScheduleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let rules = req
        .rules
        .iter()
        .map(RuleDto::parse)
        .collect::<Result<Vec<_>, _>>()?;
    let from = req.from.unwrap_or_else(|| Utc::now().date_naive());

    let report = state.catalog.generate_schedule(id, &rules, from).await?;
    Ok(Json(GenerateScheduleResponse {
        inserted: report.inserted,
        skipped: report.skipped,
    }))
}

/// `GET /tours/:id/schedule` — List occurrences with live availability.
///
/// # Errors
///
/// Returns [`ApiError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/tours/{id}/schedule",
    tag = "Tours",
    summary = "List a tour's occurrences",
    params(
        ("id" = uuid::Uuid, Path, description = "Tour UUID"),
        ScheduleQuery,
    ),
    responses(
        (status = 200, description = "Occurrence list", body = Vec<OccurrenceDto>),
    )
)]
pub async fn list_schedule(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(query): Query<ScheduleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());
    let to = query
        .to
        .or_else(|| from.checked_add_days(Days::new(365)))
        .unwrap_or(from);

    let rows = state.catalog.list_schedule(id, from, to).await?;
    let occurrences: Vec<OccurrenceDto> = rows.into_iter().map(OccurrenceDto::from).collect();
    Ok(Json(occurrences))
}

/// `GET /tours/:id/availability` — Remaining seats for one occurrence.
///
/// # Errors
///
/// Returns [`ApiError::OccurrenceNotFound`] when nothing is scheduled at
/// the requested date and time; infrastructure failures surface as
/// errors, never as zero availability.
#[utoipa::path(
    get,
    path = "/api/v1/tours/{id}/availability",
    tag = "Tours",
    summary = "Remaining seats for an occurrence",
    params(
        ("id" = uuid::Uuid, Path, description = "Tour UUID"),
        AvailabilityQuery,
    ),
    responses(
        (status = 200, description = "Availability", body = AvailabilityResponse),
        (status = 404, description = "No such occurrence", body = ErrorResponse),
    )
)]
pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let time = NaiveTime::parse_from_str(&query.time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&query.time, "%H:%M"))
        .map_err(|_| ApiError::InvalidRequest(format!("invalid time: {}", query.time)))?;

    let info = state.bookings.availability(id, query.date, time).await?;
    Ok(Json(AvailabilityResponse {
        max_slots: info.max_slots,
        booked_slots: info.booked_slots,
        remaining: info.remaining,
    }))
}

/// Tour catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tours", post(create_tour).get(list_tours))
        .route(
            "/tours/{id}",
            get(get_tour).put(update_tour).delete(delete_tour),
        )
        .route(
            "/tours/{id}/schedule",
            post(generate_schedule).get(list_schedule),
        )
        .route("/tours/{id}/availability", get(availability))
}
