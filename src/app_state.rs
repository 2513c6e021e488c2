//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::EventBus;
use crate::service::{BookingService, CatalogService, PaymentService, PromoService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Tour catalog and schedule generation.
    pub catalog: Arc<CatalogService>,
    /// Booking lifecycle and availability.
    pub bookings: Arc<BookingService>,
    /// Promo code management and redemption.
    pub promos: Arc<PromoService>,
    /// Payment provider integration.
    pub payments: Arc<PaymentService>,
    /// Customer profile store access.
    pub store: crate::persistence::PostgresStore,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Runtime configuration (webhook secret, tolerances).
    pub config: Arc<AppConfig>,
}
