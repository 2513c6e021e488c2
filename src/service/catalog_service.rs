//! Catalog service: tour management and schedule generation.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::recurrence::{RecurrenceRule, expand_rules};
use crate::domain::{BookingEvent, EventBus, TourId};
use crate::error::ApiError;
use crate::persistence::models::{OccurrenceRow, TourRow};
use crate::persistence::{OccurrenceInsertReport, PostgresStore, TourFields};

/// Orchestrates tour CRUD and recurrence expansion.
///
/// Follows the mutate → emit → log pattern: every state change goes
/// through the store, then publishes a [`BookingEvent`] for live
/// subscribers.
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: PostgresStore,
    event_bus: EventBus,
}

impl CatalogService {
    /// Creates a new `CatalogService`.
    #[must_use]
    pub fn new(store: PostgresStore, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Creates a tour.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on invalid fields or database failure.
    pub async fn create_tour(&self, fields: TourFields) -> Result<TourRow, ApiError> {
        validate_fields(&fields)?;
        let row = self.store.insert_tour(&fields).await?;
        tracing::info!(tour_id = %row.id, name = %row.name, "tour created");
        Ok(row)
    }

    /// Updates a tour's editable fields.
    ///
    /// Already-generated occurrences keep the capacity captured at their
    /// generation time; only future generations see the new value.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on invalid fields, unknown id, or database
    /// failure.
    pub async fn update_tour(&self, id: Uuid, fields: TourFields) -> Result<TourRow, ApiError> {
        validate_fields(&fields)?;
        let row = self.store.update_tour(id, &fields).await?;
        tracing::info!(tour_id = %row.id, "tour updated");
        Ok(row)
    }

    /// Fetches a tour by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TourNotFound`] or [`ApiError::Database`].
    pub async fn get_tour(&self, id: Uuid) -> Result<TourRow, ApiError> {
        self.store.get_tour(id).await
    }

    /// Lists tours; `active_only` restricts to publicly bookable ones.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn list_tours(&self, active_only: bool) -> Result<Vec<TourRow>, ApiError> {
        self.store.list_tours(active_only).await
    }

    /// Deletes a tour and its occurrences.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TourNotFound`] or [`ApiError::Database`].
    pub async fn delete_tour(&self, id: Uuid) -> Result<(), ApiError> {
        self.store.delete_tour(id).await?;
        tracing::info!(tour_id = %id, "tour deleted");
        Ok(())
    }

    /// Expands recurrence rules into concrete occurrences for the coming
    /// year and bulk-inserts them, skipping any that already exist.
    ///
    /// The tour's current capacity is captured as each occurrence's
    /// `max_slots`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an empty rule list,
    /// [`ApiError::TourNotFound`], or [`ApiError::Database`]; any database
    /// error aborts the whole generation.
    pub async fn generate_schedule(
        &self,
        tour_id: Uuid,
        rules: &[RecurrenceRule],
        from: NaiveDate,
    ) -> Result<OccurrenceInsertReport, ApiError> {
        if rules.is_empty() {
            return Err(ApiError::InvalidRequest(
                "at least one recurrence rule is required".to_string(),
            ));
        }

        let tour = self.store.get_tour(tour_id).await?;
        let seeds = expand_rules(rules, from, tour.capacity);
        let report = self.store.insert_occurrences(tour_id, &seeds).await?;

        let _ = self.event_bus.publish(BookingEvent::OccurrencesGenerated {
            tour_id: TourId::from_uuid(tour_id),
            inserted: report.inserted,
            skipped: report.skipped,
            timestamp: Utc::now(),
        });

        tracing::info!(
            %tour_id,
            inserted = report.inserted,
            skipped = report.skipped,
            "schedule generated"
        );
        Ok(report)
    }

    /// Lists a tour's occurrences within an inclusive date range.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn list_schedule(
        &self,
        tour_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OccurrenceRow>, ApiError> {
        self.store.list_occurrences(tour_id, from, to).await
    }
}

fn validate_fields(fields: &TourFields) -> Result<(), ApiError> {
    if fields.name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("name is required".to_string()));
    }
    if fields.slug.trim().is_empty() {
        return Err(ApiError::InvalidRequest("slug is required".to_string()));
    }
    if fields.capacity <= 0 {
        return Err(ApiError::InvalidRequest(
            "capacity must be positive".to_string(),
        ));
    }
    if fields.price_minor < 0 {
        return Err(ApiError::InvalidRequest(
            "price must not be negative".to_string(),
        ));
    }
    if fields.duration_min <= 0 {
        return Err(ApiError::InvalidRequest(
            "duration must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> TourFields {
        TourFields {
            name: "Sunset Kayak".to_string(),
            slug: "sunset-kayak".to_string(),
            description: String::new(),
            capacity: 8,
            price_minor: 4_500,
            currency: "usd".to_string(),
            duration_min: 120,
            active: true,
        }
    }

    #[test]
    fn valid_fields_pass() {
        assert!(validate_fields(&fields()).is_ok());
    }

    #[test]
    fn blank_name_rejected() {
        let mut f = fields();
        f.name = "  ".to_string();
        assert!(validate_fields(&f).is_err());
    }

    #[test]
    fn non_positive_capacity_rejected() {
        let mut f = fields();
        f.capacity = 0;
        assert!(validate_fields(&f).is_err());
        f.capacity = -3;
        assert!(validate_fields(&f).is_err());
    }

    #[test]
    fn negative_price_rejected() {
        let mut f = fields();
        f.price_minor = -1;
        assert!(validate_fields(&f).is_err());
    }
}
