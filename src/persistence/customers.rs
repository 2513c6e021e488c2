//! Customer profile queries.

use uuid::Uuid;

use super::models::CustomerRow;
use super::postgres::PostgresStore;
use crate::error::ApiError;

const CUSTOMER_COLUMNS: &str = "id, email, name, phone, created_at, updated_at";

impl PostgresStore {
    /// Creates or updates the profile for an email address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn upsert_customer(
        &self,
        email: &str,
        name: &str,
        phone: &str,
    ) -> Result<CustomerRow, ApiError> {
        let sql = format!(
            "INSERT INTO customers (id, email, name, phone) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (email) DO UPDATE SET \
               name = EXCLUDED.name, phone = EXCLUDED.phone, updated_at = now() \
             RETURNING {CUSTOMER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(name)
            .bind(phone)
            .fetch_one(&self.pool)
            .await?)
    }

    /// Fetches a profile by email.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::CustomerNotFound`] for an unknown email, or
    /// [`ApiError::Database`] on failure.
    pub async fn get_customer(&self, email: &str) -> Result<CustomerRow, ApiError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = $1");
        sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::CustomerNotFound(email.to_string()))
    }
}
