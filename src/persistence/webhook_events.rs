//! Inbound webhook event log for idempotent processing.

use super::postgres::PostgresStore;
use crate::error::ApiError;

impl PostgresStore {
    /// Records an inbound provider event id.
    ///
    /// Returns `true` if the event is new and should be processed, `false`
    /// if it was already recorded (duplicate delivery).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn record_webhook_event(
        &self,
        event_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<bool, ApiError> {
        let result = sqlx::query(
            "INSERT INTO webhook_events (event_id, event_type, payload) VALUES ($1, $2, $3) \
             ON CONFLICT (event_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(event_type)
        .bind(payload)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
