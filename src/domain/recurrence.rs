//! Weekly recurrence rules and their expansion into concrete occurrences.
//!
//! A [`RecurrenceRule`] is a `(weekday, start time)` pair describing when a
//! tour runs each week. [`expand_rules`] maps rules to the concrete dated
//! occurrences for the coming year. The two concepts are deliberately kept
//! as separate types: a rule has no date, an occurrence always does.

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Number of weekly repeats generated per rule.
pub const GENERATION_WEEKS: u32 = 52;

/// A weekly recurrence rule: the tour runs every `weekday` at `start_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    /// Day of the week the tour runs on.
    pub weekday: Weekday,
    /// Local start time of the tour.
    pub start_time: NaiveTime,
}

/// A concrete occurrence produced by expanding a rule, before it is
/// persisted. Carries the capacity captured from the tour at generation
/// time; later capacity edits do not rewrite already-generated occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceSeed {
    /// Calendar date of the occurrence.
    pub date: NaiveDate,
    /// Start time of the occurrence.
    pub start_time: NaiveTime,
    /// Seats available, captured from the tour at generation time.
    pub max_slots: i32,
}

/// Expands each rule into [`GENERATION_WEEKS`] weekly occurrences.
///
/// For every rule the first occurrence is the earliest date on or after
/// `from` falling on the rule's weekday; subsequent occurrences follow at
/// seven-day steps. No produced date precedes `from`, and every date falls
/// on its rule's weekday.
///
/// Expansion is pure and deterministic; idempotence of regeneration is
/// provided by the unique `(tour, date, time)` constraint at the
/// persistence layer, which skips already-existing rows.
#[must_use]
pub fn expand_rules(rules: &[RecurrenceRule], from: NaiveDate, max_slots: i32) -> Vec<OccurrenceSeed> {
    let mut seeds = Vec::with_capacity(rules.len() * GENERATION_WEEKS as usize);
    for rule in rules {
        let first = next_on_or_after(from, rule.weekday);
        for week in 0..GENERATION_WEEKS {
            let Some(date) = first.checked_add_days(Days::new(u64::from(week) * 7)) else {
                // Date arithmetic overflows only at the far end of the
                // calendar; stop expanding this rule there.
                break;
            };
            seeds.push(OccurrenceSeed {
                date,
                start_time: rule.start_time,
                max_slots,
            });
        }
    }
    seeds
}

/// Returns the earliest date on or after `from` that falls on `weekday`.
fn next_on_or_after(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let offset = (7 + weekday.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64)
        % 7;
    from.checked_add_days(Days::new(offset.unsigned_abs()))
        .unwrap_or(from)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
            panic!("valid date");
        };
        date
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        let Some(time) = NaiveTime::from_hms_opt(h, m, 0) else {
            panic!("valid time");
        };
        time
    }

    #[test]
    fn monday_rule_produces_52_mondays_none_in_past() {
        // 2026-08-05 is a Wednesday.
        let from = date(2026, 8, 5);
        let rule = RecurrenceRule {
            weekday: Weekday::Mon,
            start_time: time(9, 0),
        };

        let seeds = expand_rules(&[rule], from, 8);

        assert_eq!(seeds.len(), 52);
        for seed in &seeds {
            assert_eq!(seed.date.weekday(), Weekday::Mon);
            assert!(seed.date >= from);
            assert_eq!(seed.max_slots, 8);
        }
    }

    #[test]
    fn first_occurrence_is_nearest_matching_day() {
        // Wednesday start: the first Monday is five days later.
        let from = date(2026, 8, 5);
        let rule = RecurrenceRule {
            weekday: Weekday::Mon,
            start_time: time(9, 0),
        };

        let seeds = expand_rules(&[rule], from, 4);
        assert_eq!(seeds.first().map(|s| s.date), Some(date(2026, 8, 10)));
    }

    #[test]
    fn rule_on_start_weekday_includes_start_date() {
        // 2026-08-05 is itself a Wednesday.
        let from = date(2026, 8, 5);
        let rule = RecurrenceRule {
            weekday: Weekday::Wed,
            start_time: time(14, 30),
        };

        let seeds = expand_rules(&[rule], from, 10);
        assert_eq!(seeds.first().map(|s| s.date), Some(from));
    }

    #[test]
    fn occurrences_are_seven_days_apart() {
        let from = date(2026, 1, 1);
        let rule = RecurrenceRule {
            weekday: Weekday::Sat,
            start_time: time(10, 0),
        };

        let seeds = expand_rules(&[rule], from, 6);
        for pair in seeds.windows(2) {
            let [a, b] = pair else {
                panic!("windows of two");
            };
            assert_eq!((b.date - a.date).num_days(), 7);
        }
    }

    #[test]
    fn multiple_rules_expand_independently() {
        let from = date(2026, 8, 5);
        let rules = [
            RecurrenceRule {
                weekday: Weekday::Mon,
                start_time: time(9, 0),
            },
            RecurrenceRule {
                weekday: Weekday::Mon,
                start_time: time(15, 0),
            },
            RecurrenceRule {
                weekday: Weekday::Fri,
                start_time: time(9, 0),
            },
        ];

        let seeds = expand_rules(&rules, from, 12);
        assert_eq!(seeds.len(), 3 * 52);
        // Same weekday, different times: distinct occurrences.
        let mondays_9 = seeds
            .iter()
            .filter(|s| s.date.weekday() == Weekday::Mon && s.start_time == time(9, 0))
            .count();
        let mondays_15 = seeds
            .iter()
            .filter(|s| s.date.weekday() == Weekday::Mon && s.start_time == time(15, 0))
            .count();
        assert_eq!(mondays_9, 52);
        assert_eq!(mondays_15, 52);
    }

    #[test]
    fn expansion_is_deterministic() {
        let from = date(2026, 3, 1);
        let rule = RecurrenceRule {
            weekday: Weekday::Sun,
            start_time: time(8, 0),
        };
        assert_eq!(
            expand_rules(&[rule], from, 5),
            expand_rules(&[rule], from, 5)
        );
    }
}
