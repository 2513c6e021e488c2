//! Pure seat-availability arithmetic.
//!
//! The persistence layer enforces the capacity invariant with a conditional
//! update; the functions here are the single place where the arithmetic
//! behind that decision is written down (and unit-tested).

/// Outcome of asking whether `requested` seats fit into an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatDecision {
    /// The request fits; this many seats remain after accepting it.
    Accepted {
        /// Seats left after the reservation.
        remaining_after: i32,
    },
    /// The request does not fit.
    Rejected {
        /// Seats currently available.
        remaining: i32,
    },
}

/// Seats still available on an occurrence. Never negative: an over-booked
/// counter (which the schema forbids, but defensively) reports zero.
#[must_use]
pub fn remaining_slots(max_slots: i32, booked_slots: i32) -> i32 {
    (max_slots - booked_slots).max(0)
}

/// Decides whether `requested` seats fit into `max_slots` given
/// `booked_slots` already taken.
///
/// This mirrors the predicate of the conditional reservation update
/// (`booked + requested <= max`); the database statement is authoritative
/// under concurrency, this function documents and tests the rule.
#[must_use]
pub fn decide(max_slots: i32, booked_slots: i32, requested: i32) -> SeatDecision {
    let remaining = remaining_slots(max_slots, booked_slots);
    if requested > 0 && requested <= remaining {
        SeatDecision::Accepted {
            remaining_after: remaining - requested,
        }
    } else {
        SeatDecision::Rejected { remaining }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_is_capacity_minus_booked() {
        assert_eq!(remaining_slots(8, 5), 3);
    }

    #[test]
    fn remaining_never_negative() {
        assert_eq!(remaining_slots(8, 9), 0);
        assert_eq!(remaining_slots(8, 8), 0);
    }

    #[test]
    fn accepts_request_up_to_last_seat() {
        assert_eq!(
            decide(8, 5, 3),
            SeatDecision::Accepted { remaining_after: 0 }
        );
    }

    #[test]
    fn rejects_request_past_capacity() {
        assert_eq!(decide(8, 5, 4), SeatDecision::Rejected { remaining: 3 });
    }

    #[test]
    fn rejects_zero_and_negative_requests() {
        assert_eq!(decide(8, 0, 0), SeatDecision::Rejected { remaining: 8 });
        assert_eq!(decide(8, 0, -2), SeatDecision::Rejected { remaining: 8 });
    }

    #[test]
    fn full_occurrence_rejects_single_seat() {
        assert_eq!(decide(8, 8, 1), SeatDecision::Rejected { remaining: 0 });
    }
}
