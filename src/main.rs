//! tourline-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tourline_gateway::api;
use tourline_gateway::app_state::AppState;
use tourline_gateway::config::AppConfig;
use tourline_gateway::domain::EventBus;
use tourline_gateway::persistence::PostgresStore;
use tourline_gateway::provider::ProviderClient;
use tourline_gateway::service::{BookingService, CatalogService, PaymentService, PromoService};
use tourline_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting tourline-gateway");

    // Connect storage and run migrations
    let store = PostgresStore::connect(&config).await?;

    // Build domain + service layers
    let event_bus = EventBus::new(config.event_bus_capacity);
    let provider = ProviderClient::new(&config);

    let catalog = Arc::new(CatalogService::new(store.clone(), event_bus.clone()));
    let bookings = Arc::new(BookingService::new(store.clone(), event_bus.clone()));
    let promos = Arc::new(PromoService::new(store.clone()));
    let payments = Arc::new(PaymentService::new(
        store.clone(),
        provider,
        BookingService::new(store.clone(), event_bus.clone()),
        event_bus.clone(),
        config.provider_public_key.clone(),
        config.base_url.clone(),
    ));

    // Build application state
    let app_state = AppState {
        catalog,
        bookings,
        promos,
        payments,
        store,
        event_bus,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(
            "/api-docs/openapi.json",
            tourline_gateway::api::docs::ApiDoc::openapi(),
        ))
    };

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
