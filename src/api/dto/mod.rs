//! Data Transfer Objects for REST request/response serialization.
//!
//! All money amounts are minor currency units (`i64`).

pub mod booking_dto;
pub mod common_dto;
pub mod payment_dto;
pub mod promo_dto;
pub mod tour_dto;

pub use booking_dto::*;
pub use common_dto::*;
pub use payment_dto::*;
pub use promo_dto::*;
pub use tour_dto::*;
