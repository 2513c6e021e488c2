//! Tour and schedule DTOs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::RecurrenceRule;
use crate::domain::availability::remaining_slots;
use crate::error::ApiError;
use crate::persistence::TourFields;
use crate::persistence::models::{OccurrenceRow, TourRow};

/// Request body for `POST /tours` and `PUT /tours/:id`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TourRequest {
    /// Display name.
    pub name: String,
    /// URL-friendly unique slug.
    pub slug: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Seats per occurrence.
    pub capacity: i32,
    /// Price per seat, minor currency units.
    pub price_minor: i64,
    /// ISO currency code, lowercase. Defaults to `"usd"`.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Duration in minutes.
    pub duration_min: i32,
    /// Whether the tour is publicly bookable. Defaults to `true`.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_currency() -> String {
    "usd".to_string()
}

const fn default_active() -> bool {
    true
}

impl From<TourRequest> for TourFields {
    fn from(req: TourRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
            description: req.description,
            capacity: req.capacity,
            price_minor: req.price_minor,
            currency: req.currency,
            duration_min: req.duration_min,
            active: req.active,
        }
    }
}

/// Tour representation returned by all tour endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct TourResponse {
    /// Tour identifier.
    pub id: Uuid,
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
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<TourRow> for TourResponse {
    fn from(row: TourRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            capacity: row.capacity,
            price_minor: row.price_minor,
            currency: row.currency,
            duration_min: row.duration_min,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Query parameters for `GET /tours`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TourListQuery {
    /// When `true`, only publicly bookable tours are returned.
    #[serde(default)]
    pub active: bool,
}

/// One weekly recurrence rule in a schedule-generation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RuleDto {
    /// Day of the week, e.g. `"monday"` or `"mon"`.
    pub weekday: String,
    /// Start time, `HH:MM` or `HH:MM:SS`.
    pub start_time: String,
}

impl RuleDto {
    /// Parses the DTO into a domain [`RecurrenceRule`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for unrecognized weekday or
    /// time strings.
    pub fn parse(&self) -> Result<RecurrenceRule, ApiError> {
        let weekday: Weekday = self
            .weekday
            .parse()
            .map_err(|_| ApiError::InvalidRequest(format!("invalid weekday: {}", self.weekday)))?;
        let start_time = NaiveTime::parse_from_str(&self.start_time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&self.start_time, "%H:%M"))
            .map_err(|_| {
                ApiError::InvalidRequest(format!("invalid start_time: {}", self.start_time))
            })?;
        Ok(RecurrenceRule {
            weekday,
            start_time,
        })
    }
}

/// Request body for `POST /tours/:id/schedule`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateScheduleRequest {
    /// Weekly rules to expand.
    pub rules: Vec<RuleDto>,
    /// Generation start date. Defaults to today (UTC).
    #[serde(default)]
    pub from: Option<NaiveDate>,
}

/// Response body for `POST /tours/:id/schedule`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateScheduleResponse {
    /// Occurrences inserted.
    pub inserted: u64,
    /// Occurrences skipped because they already existed.
    pub skipped: u64,
}

/// Query parameters for `GET /tours/:id/schedule`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScheduleQuery {
    /// Range start (inclusive). Defaults to today (UTC).
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Range end (inclusive). Defaults to one year after `from`.
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

/// One scheduled occurrence with its live availability.
#[derive(Debug, Serialize, ToSchema)]
pub struct OccurrenceDto {
    /// Occurrence identifier.
    pub id: Uuid,
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time.
    pub start_time: NaiveTime,
    /// Capacity captured at generation time.
    pub max_slots: i32,
    /// Seats currently reserved.
    pub booked_slots: i32,
    /// Seats still available.
    pub remaining: i32,
}

impl From<OccurrenceRow> for OccurrenceDto {
    fn from(row: OccurrenceRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            start_time: row.start_time,
            max_slots: row.max_slots,
            booked_slots: row.booked_slots,
            remaining: remaining_slots(row.max_slots, row.booked_slots),
        }
    }
}

/// Query parameters for `GET /tours/:id/availability`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    /// Occurrence date.
    pub date: NaiveDate,
    /// Occurrence start time, `HH:MM` or `HH:MM:SS`.
    pub time: String,
}

/// Response body for `GET /tours/:id/availability`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    /// Capacity captured at generation time.
    pub max_slots: i32,
    /// Seats currently reserved.
    pub booked_slots: i32,
    /// Seats still available.
    pub remaining: i32,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn rule_parses_long_and_short_weekdays() {
        for day in ["monday", "Mon", "MONDAY"] {
            let dto = RuleDto {
                weekday: day.to_string(),
                start_time: "09:00".to_string(),
            };
            let Ok(rule) = dto.parse() else {
                panic!("{day} should parse");
            };
            assert_eq!(rule.weekday, Weekday::Mon);
        }
    }

    #[test]
    fn rule_parses_both_time_formats() {
        for time in ["14:30", "14:30:00"] {
            let dto = RuleDto {
                weekday: "fri".to_string(),
                start_time: time.to_string(),
            };
            let Ok(rule) = dto.parse() else {
                panic!("{time} should parse");
            };
            assert_eq!(rule.start_time, NaiveTime::from_hms_opt(14, 30, 0).unwrap_or_default());
        }
    }

    #[test]
    fn bad_weekday_and_time_rejected() {
        let dto = RuleDto {
            weekday: "someday".to_string(),
            start_time: "09:00".to_string(),
        };
        assert!(dto.parse().is_err());

        let dto = RuleDto {
            weekday: "monday".to_string(),
            start_time: "25:99".to_string(),
        };
        assert!(dto.parse().is_err());
    }

    #[test]
    fn occurrence_dto_computes_remaining() {
        let row = OccurrenceRow {
            id: Uuid::new_v4(),
            tour_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 9, 14).unwrap_or_default(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            max_slots: 8,
            booked_slots: 5,
            created_at: Utc::now(),
        };
        let dto = OccurrenceDto::from(row);
        assert_eq!(dto.remaining, 3);
    }
}
