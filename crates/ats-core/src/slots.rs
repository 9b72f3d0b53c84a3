//! Slot generation from weekly availability and existing bookings.
//!
//! Availability rules are tiled into consecutive fixed-length slots starting
//! at each rule's start time. A slot survives only if it fits entirely inside
//! its rule, begins strictly after "now", and overlaps no busy interval.
//! Output order is the traversal order (day, then rule, then time) and is not
//! re-sorted, so overlapping rules on one day can yield out-of-order starts.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{AvailabilityRule, ScheduleError, TimeRange, UserId};

/// Parameters of a slot search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotQuery {
    pub interviewer_id: UserId,
    pub candidate_id: UserId,
    /// First day searched, inclusive.
    pub start_date: NaiveDate,
    /// Last day searched, inclusive.
    pub end_date: NaiveDate,
    pub duration_minutes: u32,
}

impl SlotQuery {
    /// Checks the query shape and returns the slot length and search window.
    pub fn validate(&self, max_range_days: u32) -> Result<(Duration, TimeRange), ScheduleError> {
        if self.end_date < self.start_date {
            return Err(ScheduleError::InvalidRange(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        if self.duration_minutes == 0 {
            return Err(ScheduleError::InvalidRange(
                "slot duration must be positive".to_string(),
            ));
        }
        let days = (self.end_date - self.start_date).num_days() + 1;
        if days > i64::from(max_range_days) {
            return Err(ScheduleError::InvalidRange(format!(
                "range spans {days} days, more than the {max_range_days} day limit"
            )));
        }
        let window = TimeRange::covering_days(self.start_date, self.end_date)?;
        Ok((Duration::minutes(i64::from(self.duration_minutes)), window))
    }
}

/// Computes open slot start times.
///
/// `busy` holds every booked interval of either party; `duration` must be
/// positive and `start_date <= end_date` (see [`SlotQuery::validate`]).
/// `booked_length` is how long a booking made at an offered start will hold;
/// a start is offered only if neither the slot nor that hold collides with
/// `busy`.
pub fn generate_slots(
    rules: &[AvailabilityRule],
    busy: &[TimeRange],
    start_date: NaiveDate,
    end_date: NaiveDate,
    duration: Duration,
    booked_length: Duration,
    now: NaiveDateTime,
) -> Vec<NaiveDateTime> {
    if duration <= Duration::zero() {
        return Vec::new();
    }
    let hold = duration.max(booked_length);

    let mut open = Vec::new();
    for date in start_date.iter_days().take_while(|date| *date <= end_date) {
        for rule in rules.iter().filter(|rule| rule.applies_on(date)) {
            let window = rule.window_on(date);
            let mut slot_start = window.start;
            while let Some(slot_end) = slot_start
                .checked_add_signed(duration)
                .filter(|end| *end <= window.end)
            {
                let held = slot_start.checked_add_signed(hold).map(|end| TimeRange {
                    start: slot_start,
                    end,
                });
                let free =
                    held.is_some_and(|held| !busy.iter().any(|booked| held.overlaps(booked)));
                if slot_start > now && free {
                    open.push(slot_start);
                }
                slot_start = slot_end;
            }
        }
    }
    open
}
