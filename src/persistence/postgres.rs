//! PostgreSQL store: connection pool and migrations.
//!
//! [`PostgresStore`] wraps a `sqlx::PgPool`; the per-resource query
//! methods live in the sibling modules (`tours`, `bookings`, `payments`,
//! `promos`, `customers`, `webhook_events`), each an `impl` block on this
//! type.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::error::ApiError;

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pub(super) pool: PgPool,
}

impl PostgresStore {
    /// Creates a store from an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to PostgreSQL using the pool settings from `config` and
    /// runs pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError::Database`] if the connection or a migration
    /// fails.
    pub async fn connect(config: &AppConfig) -> Result<Self, ApiError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ApiError::Internal(format!("migration failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
