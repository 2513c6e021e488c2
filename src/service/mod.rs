//! Service layer: business logic orchestration.
//!
//! Each service coordinates one resource's operations against the
//! [`crate::persistence::PostgresStore`] and emits events through the
//! [`crate::domain::EventBus`].

pub mod booking_service;
pub mod catalog_service;
pub mod payment_service;
pub mod promo_service;

pub use booking_service::BookingService;
pub use catalog_service::CatalogService;
pub use payment_service::PaymentService;
pub use promo_service::PromoService;
