//! Promo code discounts and validation.
//!
//! [`validate`] is the single implementation of the redemption rules:
//! the HTTP validation endpoint, booking creation, and the atomic reserve
//! statement all answer to the same predicates. The reserve statement's
//! `WHERE` clause mirrors these rules so that the database-side gate and
//! this function can never disagree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discount carried by a promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Discount {
    /// Percentage off the order total, 1–100.
    Percentage(i32),
    /// Fixed amount off in minor currency units.
    Fixed(i64),
}

impl Discount {
    /// Applies the discount to `total_minor`, clamping at zero.
    #[must_use]
    pub fn apply(self, total_minor: i64) -> i64 {
        let discounted = match self {
            Self::Percentage(pct) => total_minor - total_minor * i64::from(pct) / 100,
            Self::Fixed(off) => total_minor - off,
        };
        discounted.max(0)
    }

    /// Amount taken off `total_minor`.
    #[must_use]
    pub fn amount_off(self, total_minor: i64) -> i64 {
        total_minor - self.apply(total_minor)
    }
}

/// The redemption-relevant view of a promo code row.
#[derive(Debug, Clone, Copy)]
pub struct PromoTerms {
    /// The discount the code grants.
    pub discount: Discount,
    /// Maximum redemptions; `0` means unlimited.
    pub max_uses: i32,
    /// Redemptions so far.
    pub times_used: i32,
    /// Optional expiry instant.
    pub expires_at: Option<DateTime<Utc>>,
    /// Admin kill-switch.
    pub active: bool,
}

/// Why a promo code cannot be redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoRejection {
    /// Code was deactivated by an admin.
    Inactive,
    /// `expires_at` is in the past.
    Expired,
    /// `times_used` reached `max_uses`.
    Exhausted,
}

/// Validates a promo code's terms at instant `now`.
///
/// # Errors
///
/// Returns a [`PromoRejection`] naming the first failing rule.
pub fn validate(terms: &PromoTerms, now: DateTime<Utc>) -> Result<Discount, PromoRejection> {
    if !terms.active {
        return Err(PromoRejection::Inactive);
    }
    if let Some(expires_at) = terms.expires_at
        && expires_at <= now
    {
        return Err(PromoRejection::Expired);
    }
    if terms.max_uses > 0 && terms.times_used >= terms.max_uses {
        return Err(PromoRejection::Exhausted);
    }
    Ok(terms.discount)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn terms(discount: Discount) -> PromoTerms {
        PromoTerms {
            discount,
            max_uses: 0,
            times_used: 0,
            expires_at: None,
            active: true,
        }
    }

    #[test]
    fn percentage_discount_applies() {
        let d = Discount::Percentage(25);
        assert_eq!(d.apply(10_000), 7_500);
        assert_eq!(d.amount_off(10_000), 2_500);
    }

    #[test]
    fn fixed_discount_applies_and_clamps() {
        let d = Discount::Fixed(3_000);
        assert_eq!(d.apply(10_000), 7_000);
        assert_eq!(d.apply(2_000), 0);
        assert_eq!(d.amount_off(2_000), 2_000);
    }

    #[test]
    fn hundred_percent_is_free() {
        assert_eq!(Discount::Percentage(100).apply(9_999), 0);
    }

    #[test]
    fn valid_code_returns_discount() {
        let now = Utc::now();
        let t = terms(Discount::Percentage(10));
        assert_eq!(validate(&t, now), Ok(Discount::Percentage(10)));
    }

    #[test]
    fn expired_code_rejected() {
        let now = Utc::now();
        let mut t = terms(Discount::Fixed(500));
        t.expires_at = Some(now - Duration::hours(1));
        assert_eq!(validate(&t, now), Err(PromoRejection::Expired));
    }

    #[test]
    fn future_expiry_accepted() {
        let now = Utc::now();
        let mut t = terms(Discount::Fixed(500));
        t.expires_at = Some(now + Duration::hours(1));
        assert!(validate(&t, now).is_ok());
    }

    #[test]
    fn exhausted_code_rejected() {
        let now = Utc::now();
        let mut t = terms(Discount::Percentage(5));
        t.max_uses = 3;
        t.times_used = 3;
        assert_eq!(validate(&t, now), Err(PromoRejection::Exhausted));
    }

    #[test]
    fn zero_max_uses_means_unlimited() {
        let now = Utc::now();
        let mut t = terms(Discount::Percentage(5));
        t.max_uses = 0;
        t.times_used = 10_000;
        assert!(validate(&t, now).is_ok());
    }

    #[test]
    fn inactive_code_rejected() {
        let now = Utc::now();
        let mut t = terms(Discount::Percentage(5));
        t.active = false;
        assert_eq!(validate(&t, now), Err(PromoRejection::Inactive));
    }
}
