//! Promo code service.

use chrono::Utc;

use crate::domain::promo::{self, Discount};
use crate::error::ApiError;
use crate::persistence::models::PromoCodeRow;
use crate::persistence::{NewPromoCode, PostgresStore};

/// Result of validating a promo code against an order total.
#[derive(Debug, Clone, Copy)]
pub struct PromoQuote {
    /// The discount the code grants.
    pub discount: Discount,
    /// Amount taken off the given total, minor currency units.
    pub amount_off_minor: i64,
    /// Total after the discount, minor currency units.
    pub total_after_minor: i64,
}

/// Orchestrates promo code management and redemption.
#[derive(Debug, Clone)]
pub struct PromoService {
    store: PostgresStore,
}

impl PromoService {
    /// Creates a new `PromoService`.
    #[must_use]
    pub fn new(store: PostgresStore) -> Self {
        Self { store }
    }

    /// Creates a promo code. The code is stored uppercase.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on invalid fields or database failure.
    pub async fn create(&self, mut promo: NewPromoCode) -> Result<PromoCodeRow, ApiError> {
        promo.code = promo.code.trim().to_uppercase();
        if promo.code.is_empty() {
            return Err(ApiError::InvalidRequest("code is required".to_string()));
        }
        match (promo.percent_off, promo.amount_off) {
            (Some(pct), None) if (1..=100).contains(&pct) => {}
            (None, Some(off)) if off > 0 => {}
            (Some(_), Some(_)) => {
                return Err(ApiError::InvalidRequest(
                    "specify either percent_off or amount_off, not both".to_string(),
                ));
            }
            _ => {
                return Err(ApiError::InvalidRequest(
                    "a discount is required: percent_off 1-100 or a positive amount_off"
                        .to_string(),
                ));
            }
        }
        if promo.max_uses < 0 {
            return Err(ApiError::InvalidRequest(
                "max_uses must not be negative".to_string(),
            ));
        }

        let row = self.store.insert_promo(&promo).await?;
        tracing::info!(code = %row.code, "promo code created");
        Ok(row)
    }

    /// Validates a code against an order total without consuming a use.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PromoNotFound`], [`ApiError::PromoRejected`],
    /// or [`ApiError::Database`].
    pub async fn validate(&self, code: &str, total_minor: i64) -> Result<PromoQuote, ApiError> {
        let row = self.store.get_promo(&code.trim().to_uppercase()).await?;
        let terms = row.terms().map_err(ApiError::Internal)?;
        let discount = promo::validate(&terms, Utc::now())?;
        Ok(PromoQuote {
            discount,
            amount_off_minor: discount.amount_off(total_minor),
            total_after_minor: discount.apply(total_minor),
        })
    }

    /// Atomically reserves one use of a code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PromoNotFound`] for unknown codes,
    /// [`ApiError::PromoRejected`] when a validity predicate fails, or
    /// [`ApiError::Database`].
    pub async fn reserve(&self, code: &str) -> Result<PromoCodeRow, ApiError> {
        let code = code.trim().to_uppercase();
        if let Some(row) = self.store.reserve_promo_use(&code).await? {
            tracing::info!(code = %row.code, times_used = row.times_used, "promo use reserved");
            return Ok(row);
        }
        // Reservation failed: report why.
        let row = self.store.get_promo(&code).await?;
        let terms = row.terms().map_err(ApiError::Internal)?;
        match promo::validate(&terms, Utc::now()) {
            Err(rejection) => Err(rejection.into()),
            Ok(_) => Err(ApiError::PromoRejected {
                reason: "code could not be reserved".to_string(),
            }),
        }
    }

    /// Lists all promo codes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn list(&self) -> Result<Vec<PromoCodeRow>, ApiError> {
        self.store.list_promos().await
    }

    /// Deletes a promo code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PromoNotFound`] or [`ApiError::Database`].
    pub async fn delete(&self, code: &str) -> Result<(), ApiError> {
        let code = code.trim().to_uppercase();
        self.store.delete_promo(&code).await?;
        tracing::info!(%code, "promo code deleted");
        Ok(())
    }
}
