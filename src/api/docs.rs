//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

/// OpenAPI specification covering every REST endpoint. Schemas are
/// collected from the registered paths.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        super::handlers::tours::create_tour,
        super::handlers::tours::list_tours,
        super::handlers::tours::get_tour,
        super::handlers::tours::update_tour,
        super::handlers::tours::delete_tour,
        super::handlers::tours::generate_schedule,
        super::handlers::tours::list_schedule,
        super::handlers::tours::availability,
        super::handlers::bookings::create_booking,
        super::handlers::bookings::list_bookings,
        super::handlers::bookings::get_booking,
        super::handlers::bookings::update_booking,
        super::handlers::bookings::cancel_booking,
        super::handlers::bookings::set_payment_link,
        super::handlers::promos::create_promo,
        super::handlers::promos::list_promos,
        super::handlers::promos::validate_promo,
        super::handlers::promos::reserve_promo,
        super::handlers::promos::delete_promo,
        super::handlers::payments::create_intent,
        super::handlers::payments::create_checkout_session,
        super::handlers::payments::refund,
        super::handlers::payments::update_profile,
        super::handlers::payments::get_profile,
        super::handlers::webhooks::payment_webhook,
        super::handlers::system::health_handler,
    ),
    tags(
        (name = "Tours", description = "Tour catalog and schedules"),
        (name = "Bookings", description = "Booking lifecycle and availability"),
        (name = "Promos", description = "Promo code management and redemption"),
        (name = "Payments", description = "Payment provider integration"),
        (name = "Profile", description = "Customer profiles"),
        (name = "Webhooks", description = "Inbound provider notifications"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;
