//! Payment provider integration: HTTP client, wire types, and webhook
//! signature verification.

pub mod client;
pub mod signature;
pub mod types;

pub use client::ProviderClient;
pub use types::{CheckoutSession, LineItem, PaymentIntent, ProviderEvent, ProviderRefund};
