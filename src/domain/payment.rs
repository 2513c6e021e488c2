//! Payment status and refund policy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Intent or checkout session created; no money captured yet.
    Created,
    /// Provider confirmed capture.
    Succeeded,
    /// Provider reported failure or the session expired.
    Failed,
    /// Captured amount fully refunded.
    Refunded,
}

impl PaymentStatus {
    /// Database column representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
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
            "created" => Ok(Self::Created),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a refund request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundRejection {
    /// The payment never succeeded; there is nothing to refund.
    NotCaptured,
    /// The payment is already fully refunded.
    AlreadyRefunded,
    /// The requested amount exceeds what is left to refund.
    ExceedsRemaining {
        /// Amount in minor units still refundable.
        refundable_minor: i64,
    },
    /// Non-positive refund amount.
    InvalidAmount,
}

/// Validates a refund of `amount_minor` (or the full remainder when `None`)
/// against the payment's captured and already-refunded amounts.
///
/// Returns the concrete amount to refund. A second full refund on an
/// already fully-refunded payment is rejected with
/// [`RefundRejection::AlreadyRefunded`].
///
/// # Errors
///
/// Returns a [`RefundRejection`] describing why the refund is not allowed.
pub fn validate_refund(
    status: PaymentStatus,
    amount_minor: i64,
    refunded_minor: i64,
    requested_minor: Option<i64>,
) -> Result<i64, RefundRejection> {
    match status {
        PaymentStatus::Succeeded => {}
        PaymentStatus::Refunded => return Err(RefundRejection::AlreadyRefunded),
        PaymentStatus::Created | PaymentStatus::Failed => {
            return Err(RefundRejection::NotCaptured);
        }
    }

    let refundable = amount_minor - refunded_minor;
    if refundable <= 0 {
        return Err(RefundRejection::AlreadyRefunded);
    }

    let requested = requested_minor.unwrap_or(refundable);
    if requested <= 0 {
        return Err(RefundRejection::InvalidAmount);
    }
    if requested > refundable {
        return Err(RefundRejection::ExceedsRemaining {
            refundable_minor: refundable,
        });
    }

    Ok(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_refund_of_captured_payment() {
        assert_eq!(
            validate_refund(PaymentStatus::Succeeded, 5000, 0, None),
            Ok(5000)
        );
    }

    #[test]
    fn partial_refund_leaves_remainder() {
        assert_eq!(
            validate_refund(PaymentStatus::Succeeded, 5000, 0, Some(2000)),
            Ok(2000)
        );
        assert_eq!(
            validate_refund(PaymentStatus::Succeeded, 5000, 2000, None),
            Ok(3000)
        );
    }

    #[test]
    fn second_full_refund_rejected() {
        assert_eq!(
            validate_refund(PaymentStatus::Refunded, 5000, 5000, None),
            Err(RefundRejection::AlreadyRefunded)
        );
    }

    #[test]
    fn refund_past_remaining_rejected() {
        assert_eq!(
            validate_refund(PaymentStatus::Succeeded, 5000, 4000, Some(2000)),
            Err(RefundRejection::ExceedsRemaining {
                refundable_minor: 1000
            })
        );
    }

    #[test]
    fn uncaptured_payment_not_refundable() {
        assert_eq!(
            validate_refund(PaymentStatus::Created, 5000, 0, None),
            Err(RefundRejection::NotCaptured)
        );
        assert_eq!(
            validate_refund(PaymentStatus::Failed, 5000, 0, None),
            Err(RefundRejection::NotCaptured)
        );
    }

    #[test]
    fn non_positive_amount_rejected() {
        assert_eq!(
            validate_refund(PaymentStatus::Succeeded, 5000, 0, Some(0)),
            Err(RefundRejection::InvalidAmount)
        );
        assert_eq!(
            validate_refund(PaymentStatus::Succeeded, 5000, 0, Some(-100)),
            Err(RefundRejection::InvalidAmount)
        );
    }

    #[test]
    fn status_column_round_trip() {
        for status in [
            PaymentStatus::Created,
            PaymentStatus::Succeeded,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Ok(status));
        }
        assert!(PaymentStatus::parse("void").is_err());
    }
}
