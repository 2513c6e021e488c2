//! Persistence layer: PostgreSQL store for the booking platform.
//!
//! [`PostgresStore`] owns the `sqlx::PgPool`; each resource's queries live
//! in their own module as an `impl` block on the store. All queries are
//! runtime-checked (`sqlx::query_as` with string SQL); seat and promo
//! accounting use single conditional statements so the capacity and usage
//! invariants hold under concurrency.

pub mod bookings;
pub mod customers;
pub mod models;
pub mod payments;
pub mod postgres;
pub mod promos;
pub mod tours;
pub mod webhook_events;

pub use bookings::{BookingFilter, NewBooking};
pub use postgres::PostgresStore;
pub use promos::NewPromoCode;
pub use tours::{OccurrenceInsertReport, TourFields};
