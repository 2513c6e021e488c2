//! REST endpoint handlers organized by resource.

pub mod bookings;
pub mod payments;
pub mod promos;
pub mod system;
pub mod tours;
pub mod webhooks;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(tours::routes())
        .merge(bookings::routes())
        .merge(promos::routes())
        .merge(payments::routes())
}
