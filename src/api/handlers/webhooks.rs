//! Inbound payment-provider webhook handler.
//!
//! The body must be read raw: the signature covers the exact bytes the
//! provider sent, so deserialization happens only after verification.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};
use crate::provider::ProviderEvent;
use crate::provider::signature;

/// Name of the signature header the provider sends.
pub const SIGNATURE_HEADER: &str = "tourline-signature";

/// `POST /webhooks/payment` — Verify and apply a provider event.
///
/// Duplicate deliveries are acknowledged with 200 without reprocessing.
/// A database failure after exhausted retries returns 500 so the
/// provider redelivers later.
///
/// # Errors
///
/// Returns [`ApiError::InvalidSignature`] on a missing or bad signature,
/// [`ApiError::InvalidRequest`] on an undecodable body, or
/// [`ApiError::Database`] after exhausted retries.
#[utoipa::path(
    post,
    path = "/webhooks/payment",
    tag = "Webhooks",
    summary = "Payment provider webhook",
    request_body(content = String, description = "Raw webhook payload bytes"),
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Bad signature or body", body = ErrorResponse),
    )
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::InvalidSignature)?;

    signature::verify(
        state.config.webhook_secret.as_bytes(),
        header,
        &body,
        Utc::now().timestamp(),
        state.config.webhook_tolerance_secs,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "webhook signature rejected");
        ApiError::InvalidSignature
    })?;

    let event: ProviderEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidRequest(format!("undecodable webhook body: {e}")))?;

    let outcome = state.payments.process_webhook(&event).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "received": true, "outcome": format!("{outcome:?}").to_lowercase() })),
    ))
}

/// Webhook routes, mounted at the root (not under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/webhooks/payment", post(payment_webhook))
}
