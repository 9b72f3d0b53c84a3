//! Half-open time intervals.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::ScheduleError;

/// Years that print as exactly four digits, so stored timestamps sort as text.
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// A `[start, end)` interval of naive timestamps.
///
/// All timestamps in the engine share one implicit timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// Creates a range, rejecting empty or inverted intervals and years
    /// outside 0000-9999.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, ScheduleError> {
        for bound in [start, end] {
            if !SUPPORTED_YEARS.contains(&bound.year()) {
                return Err(ScheduleError::InvalidRange(format!(
                    "{bound} is outside the supported years 0000-9999"
                )));
            }
        }
        if end <= start {
            return Err(ScheduleError::InvalidRange(format!(
                "end {end} must be after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Creates a range starting at `start` and lasting `duration`.
    pub fn starting_at(start: NaiveDateTime, duration: Duration) -> Result<Self, ScheduleError> {
        let end = start.checked_add_signed(duration).ok_or_else(|| {
            ScheduleError::InvalidRange(format!("{start} plus {duration} is out of range"))
        })?;
        Self::new(start, end)
    }

    /// Covers every instant of the inclusive day range `[first, last]`.
    pub fn covering_days(first: NaiveDate, last: NaiveDate) -> Result<Self, ScheduleError> {
        let after_last = last.succ_opt().ok_or_else(|| {
            ScheduleError::InvalidRange(format!("{last} is the last representable date"))
        })?;
        Self::new(first.and_time(NaiveTime::MIN), after_last.and_time(NaiveTime::MIN))
    }

    /// Half-open overlap: ranges that merely touch do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
