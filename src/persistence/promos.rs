//! Promo code queries.
//!
//! Redemption is a single conditional `UPDATE`: every validity predicate
//! (`active`, expiry, usage cap) sits in the `WHERE` clause, mirroring
//! [`crate::domain::promo::validate`], so reservation is atomic and the
//! two rule sets cannot drift apart.

use uuid::Uuid;

use super::models::PromoCodeRow;
use super::postgres::PostgresStore;
use crate::error::ApiError;

const PROMO_COLUMNS: &str =
    "id, code, percent_off, amount_off, max_uses, times_used, expires_at, active, created_at";

/// Fields for a new promo code.
#[derive(Debug, Clone)]
pub struct NewPromoCode {
    /// The redeemable code, unique, stored uppercase.
    pub code: String,
    /// Percentage discount, 1–100. Mutually exclusive with `amount_off`.
    pub percent_off: Option<i32>,
    /// Fixed discount in minor currency units.
    pub amount_off: Option<i64>,
    /// Maximum redemptions; `0` means unlimited.
    pub max_uses: i32,
    /// Optional expiry instant.
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl PostgresStore {
    /// Inserts a new promo code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure (including duplicate codes).
    pub async fn insert_promo(&self, promo: &NewPromoCode) -> Result<PromoCodeRow, ApiError> {
        let sql = format!(
            "INSERT INTO promo_codes (id, code, percent_off, amount_off, max_uses, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PROMO_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, PromoCodeRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&promo.code)
            .bind(promo.percent_off)
            .bind(promo.amount_off)
            .bind(promo.max_uses)
            .bind(promo.expires_at)
            .fetch_one(&self.pool)
            .await?)
    }

    /// Fetches a promo code row by its code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PromoNotFound`] for an unknown code, or
    /// [`ApiError::Database`] on failure.
    pub async fn get_promo(&self, code: &str) -> Result<PromoCodeRow, ApiError> {
        let sql = format!("SELECT {PROMO_COLUMNS} FROM promo_codes WHERE code = $1");
        sqlx::query_as::<_, PromoCodeRow>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::PromoNotFound(code.to_string()))
    }

    /// Lists all promo codes, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn list_promos(&self) -> Result<Vec<PromoCodeRow>, ApiError> {
        let sql = format!("SELECT {PROMO_COLUMNS} FROM promo_codes ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, PromoCodeRow>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Deletes a promo code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::PromoNotFound`] for an unknown code, or
    /// [`ApiError::Database`] on failure.
    pub async fn delete_promo(&self, code: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM promo_codes WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::PromoNotFound(code.to_string()));
        }
        Ok(())
    }

    /// Atomically reserves one use of a promo code.
    ///
    /// The validity predicates live in the `WHERE` clause, so concurrent
    /// redemptions of a nearly-exhausted code serialize on the row and
    /// cannot exceed `max_uses`. Returns the row as it was after the
    /// reservation, or `None` if the code exists but failed a predicate.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn reserve_promo_use(
        &self,
        code: &str,
    ) -> Result<Option<PromoCodeRow>, ApiError> {
        let sql = format!(
            "UPDATE promo_codes SET times_used = times_used + 1 \
             WHERE code = $1 AND active \
               AND (expires_at IS NULL OR expires_at > now()) \
               AND (max_uses = 0 OR times_used < max_uses) \
             RETURNING {PROMO_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, PromoCodeRow>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Returns a reserved use, compensating a booking that failed after
    /// the promo was reserved.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn release_promo_use(&self, code: &str) -> Result<(), ApiError> {
        sqlx::query(
            "UPDATE promo_codes SET times_used = GREATEST(times_used - 1, 0) WHERE code = $1",
        )
        .bind(code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
