//! # tourline-gateway
//!
//! REST API and WebSocket gateway for the tourline tours & rentals
//! booking platform.
//!
//! This crate is the whole backend: catalog and schedule management,
//! seat-accurate bookings, promo codes, and payment-provider
//! integration (intents, hosted checkout, refunds, signed webhooks).
//! Seat capacity is enforced with single conditional writes inside the
//! booking transaction, so an occurrence can never be overbooked under
//! concurrent load.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── CatalogService / BookingService /
//!     │   PromoService / PaymentService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── PostgresStore (persistence/)
//!     └── ProviderClient (provider/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod provider;
pub mod service;
pub mod ws;
