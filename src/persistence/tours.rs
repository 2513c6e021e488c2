//! Tour and scheduled-occurrence queries.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use super::models::{OccurrenceRow, TourRow};
use super::postgres::PostgresStore;
use crate::domain::recurrence::OccurrenceSeed;
use crate::error::ApiError;

const TOUR_COLUMNS: &str = "id, name, slug, description, capacity, price_minor, currency, \
                            duration_min, active, created_at, updated_at";

const OCCURRENCE_COLUMNS: &str =
    "id, tour_id, date, start_time, max_slots, booked_slots, created_at";

/// Editable tour fields for insert and update.
#[derive(Debug, Clone)]
pub struct TourFields {
    /// Display name.
    pub name: String,
    /// URL-friendly unique slug.
    pub slug: String,
    /// Long-form description.
    pub description: String,
    /// Seats per occurrence.
    pub capacity: i32,
    /// Price per seat, minor currency units.
    pub price_minor: i64,
    /// ISO currency code, lowercase.
    pub currency: String,
    /// Duration in minutes.
    pub duration_min: i32,
    /// Whether the tour is publicly bookable.
    pub active: bool,
}

/// Result of a bulk occurrence insert.
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceInsertReport {
    /// Rows actually inserted.
    pub inserted: u64,
    /// Rows skipped because the occurrence already existed.
    pub skipped: u64,
}

impl PostgresStore {
    /// Inserts a new tour and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure (including slug collisions).
    pub async fn insert_tour(&self, fields: &TourFields) -> Result<TourRow, ApiError> {
        let sql = format!(
            "INSERT INTO tours (id, name, slug, description, capacity, price_minor, currency, \
             duration_min, active) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {TOUR_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TourRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&fields.name)
            .bind(&fields.slug)
            .bind(&fields.description)
            .bind(fields.capacity)
            .bind(fields.price_minor)
            .bind(&fields.currency)
            .bind(fields.duration_min)
            .bind(fields.active)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Updates a tour's editable fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TourNotFound`] if the id does not exist, or
    /// [`ApiError::Database`] on failure.
    pub async fn update_tour(&self, id: Uuid, fields: &TourFields) -> Result<TourRow, ApiError> {
        let sql = format!(
            "UPDATE tours SET name = $2, slug = $3, description = $4, capacity = $5, \
             price_minor = $6, currency = $7, duration_min = $8, active = $9, updated_at = now() \
             WHERE id = $1 RETURNING {TOUR_COLUMNS}"
        );
        sqlx::query_as::<_, TourRow>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.slug)
            .bind(&fields.description)
            .bind(fields.capacity)
            .bind(fields.price_minor)
            .bind(&fields.currency)
            .bind(fields.duration_min)
            .bind(fields.active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::TourNotFound(id))
    }

    /// Fetches a tour by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TourNotFound`] if the id does not exist, or
    /// [`ApiError::Database`] on failure.
    pub async fn get_tour(&self, id: Uuid) -> Result<TourRow, ApiError> {
        let sql = format!("SELECT {TOUR_COLUMNS} FROM tours WHERE id = $1");
        sqlx::query_as::<_, TourRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::TourNotFound(id))
    }

    /// Lists tours, optionally restricted to active ones, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn list_tours(&self, active_only: bool) -> Result<Vec<TourRow>, ApiError> {
        let sql = if active_only {
            format!("SELECT {TOUR_COLUMNS} FROM tours WHERE active ORDER BY created_at DESC")
        } else {
            format!("SELECT {TOUR_COLUMNS} FROM tours ORDER BY created_at DESC")
        };
        Ok(sqlx::query_as::<_, TourRow>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Deletes a tour (cascading to its occurrences).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TourNotFound`] if the id does not exist, or
    /// [`ApiError::Database`] on failure.
    pub async fn delete_tour(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::TourNotFound(id));
        }
        Ok(())
    }

    /// Bulk-inserts occurrence seeds for a tour in one statement.
    ///
    /// Already-existing `(tour, date, time)` rows are skipped via
    /// `ON CONFLICT DO NOTHING`, making regeneration idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure; the whole batch aborts.
    pub async fn insert_occurrences(
        &self,
        tour_id: Uuid,
        seeds: &[OccurrenceSeed],
    ) -> Result<OccurrenceInsertReport, ApiError> {
        if seeds.is_empty() {
            return Ok(OccurrenceInsertReport {
                inserted: 0,
                skipped: 0,
            });
        }

        let ids: Vec<Uuid> = seeds.iter().map(|_| Uuid::new_v4()).collect();
        let dates: Vec<NaiveDate> = seeds.iter().map(|s| s.date).collect();
        let times: Vec<NaiveTime> = seeds.iter().map(|s| s.start_time).collect();
        let slots: Vec<i32> = seeds.iter().map(|s| s.max_slots).collect();

        let result = sqlx::query(
            "INSERT INTO scheduled_occurrences (id, tour_id, date, start_time, max_slots) \
             SELECT id, $2, date, start_time, max_slots \
             FROM UNNEST($1::uuid[], $3::date[], $4::time[], $5::int[]) \
             AS t (id, date, start_time, max_slots) \
             ON CONFLICT (tour_id, date, start_time) DO NOTHING",
        )
        .bind(&ids)
        .bind(tour_id)
        .bind(&dates)
        .bind(&times)
        .bind(&slots)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected();
        Ok(OccurrenceInsertReport {
            inserted,
            skipped: seeds.len() as u64 - inserted,
        })
    }

    /// Lists a tour's occurrences within an inclusive date range.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Database`] on failure.
    pub async fn list_occurrences(
        &self,
        tour_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OccurrenceRow>, ApiError> {
        let sql = format!(
            "SELECT {OCCURRENCE_COLUMNS} FROM scheduled_occurrences \
             WHERE tour_id = $1 AND date >= $2 AND date <= $3 \
             ORDER BY date, start_time"
        );
        Ok(sqlx::query_as::<_, OccurrenceRow>(&sql)
            .bind(tour_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Fetches the occurrence for `(tour, date, time)`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::OccurrenceNotFound`] if no such occurrence is
    /// scheduled, or [`ApiError::Database`] on failure. A read failure is
    /// never reported as "no availability".
    pub async fn get_occurrence(
        &self,
        tour_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<OccurrenceRow, ApiError> {
        let sql = format!(
            "SELECT {OCCURRENCE_COLUMNS} FROM scheduled_occurrences \
             WHERE tour_id = $1 AND date = $2 AND start_time = $3"
        );
        sqlx::query_as::<_, OccurrenceRow>(&sql)
            .bind(tour_id)
            .bind(date)
            .bind(start_time)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::OccurrenceNotFound)
    }
}
