//! Domain layer: core booking types, recurrence expansion, and the
//! event system.
//!
//! This module contains the server-side domain model: typed entity
//! identifiers, the recurrence-rule/occurrence distinction and its
//! expansion function, seat-availability arithmetic, booking and payment
//! lifecycles, promo validation, and the event bus for broadcasting
//! state changes.

pub mod availability;
pub mod booking;
pub mod booking_event;
pub mod event_bus;
pub mod ids;
pub mod payment;
pub mod promo;
pub mod recurrence;

pub use booking::BookingStatus;
pub use booking_event::BookingEvent;
pub use event_bus::EventBus;
pub use ids::{BookingId, OccurrenceId, PromoId, TourId};
pub use payment::PaymentStatus;
pub use promo::Discount;
pub use recurrence::RecurrenceRule;
