//! Booking status lifecycle.
//!
//! Bookings are never hard-deleted; every terminal outcome is a status
//! transition. The allowed graph:
//!
//! ```text
//! pending ──► confirmed | cancelled | expired
//! confirmed ──► cancelled | refunded
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created, awaiting payment.
    Pending,
    /// Payment completed.
    Confirmed,
    /// Cancelled by customer or admin; seats released.
    Cancelled,
    /// Checkout session lapsed without payment; seats released.
    Expired,
    /// Confirmed booking whose payment was refunded in full.
    Refunded,
}

impl BookingStatus {
    /// Returns `true` if a transition from `self` to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled | Self::Expired)
                | (Self::Confirmed, Self::Cancelled | Self::Refunded)
        )
    }

    /// Returns `true` if the booking's seats are currently held
    /// (counted against the occurrence's capacity).
    #[must_use]
    pub fn holds_seats(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Database column representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Refunded => "refunded",
        }
    }

    /// Parses the database column representation.
    ///
    /// # Errors
    ///
    /// Returns the unrecognized input on failure.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            "refunded" => Ok(Self::Refunded),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_confirm_cancel_expire() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Expired));
    }

    #[test]
    fn confirmed_can_cancel_or_refund() {
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Refunded));
    }

    #[test]
    fn terminal_states_transition_nowhere() {
        for terminal in [
            BookingStatus::Cancelled,
            BookingStatus::Expired,
            BookingStatus::Refunded,
        ] {
            for next in [
                BookingStatus::Pending,
                BookingStatus::Confirmed,
                BookingStatus::Cancelled,
                BookingStatus::Expired,
                BookingStatus::Refunded,
            ] {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn pending_cannot_refund_directly() {
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Refunded));
    }

    #[test]
    fn seats_held_only_while_pending_or_confirmed() {
        assert!(BookingStatus::Pending.holds_seats());
        assert!(BookingStatus::Confirmed.holds_seats());
        assert!(!BookingStatus::Cancelled.holds_seats());
        assert!(!BookingStatus::Expired.holds_seats());
        assert!(!BookingStatus::Refunded.holds_seats());
    }

    #[test]
    fn column_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Expired,
            BookingStatus::Refunded,
        ] {
            let Ok(parsed) = BookingStatus::parse(status.as_str()) else {
                panic!("round trip failed for {status}");
            };
            assert_eq!(parsed, status);
        }
        assert!(BookingStatus::parse("bogus").is_err());
    }
}
