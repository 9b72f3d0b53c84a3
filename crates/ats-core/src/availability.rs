//! Recurring weekly availability.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{ScheduleError, TimeRange, UserId};

/// Day of the week an availability rule recurs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// The weekday a calendar date falls on.
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = UnknownWeekday;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day| day.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownWeekday(s.to_string()))
    }
}

impl Serialize for Weekday {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unrecognized weekday names.
#[derive(Debug, Clone)]
pub struct UnknownWeekday(String);

impl fmt::Display for UnknownWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown weekday: {}", self.0)
    }
}

impl std::error::Error for UnknownWeekday {}

/// A recurring `[start_time, end_time)` window on one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRule")]
pub struct AvailabilityRule {
    pub day_of_week: Weekday,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
}

impl AvailabilityRule {
    /// Creates a rule, enforcing minute precision and `start_time < end_time`.
    pub fn new(
        day_of_week: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, ScheduleError> {
        for time in [start_time, end_time] {
            if time.second() != 0 || time.nanosecond() != 0 {
                return Err(ScheduleError::InvalidRange(format!(
                    "{time} is not on a minute boundary"
                )));
            }
        }
        if start_time >= end_time {
            return Err(ScheduleError::InvalidRange(format!(
                "{day_of_week} window {} must start before {}",
                start_time.format(hh_mm::FORMAT),
                end_time.format(hh_mm::FORMAT)
            )));
        }
        Ok(Self {
            day_of_week,
            start_time,
            end_time,
        })
    }

    /// Parses `HH:MM` bounds, as stored and as typed by interviewers.
    pub fn parse(day_of_week: Weekday, start: &str, end: &str) -> Result<Self, ScheduleError> {
        Self::new(day_of_week, parse_time_of_day(start)?, parse_time_of_day(end)?)
    }

    /// Whether the rule recurs on the given date.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.day_of_week == Weekday::of(date)
    }

    /// The concrete window this rule yields on `date`.
    pub fn window_on(&self, date: NaiveDate) -> TimeRange {
        TimeRange {
            start: NaiveDateTime::new(date, self.start_time),
            end: NaiveDateTime::new(date, self.end_time),
        }
    }
}

impl fmt::Display for AvailabilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.day_of_week,
            self.start_time.format(hh_mm::FORMAT),
            self.end_time.format(hh_mm::FORMAT)
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    day_of_week: Weekday,
    #[serde(with = "hh_mm")]
    start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    end_time: NaiveTime,
}

impl TryFrom<RawRule> for AvailabilityRule {
    type Error = ScheduleError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        Self::new(raw.day_of_week, raw.start_time, raw.end_time)
    }
}

/// Parses a time of day in `HH:MM` form.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(s.trim(), hh_mm::FORMAT)
        .map_err(|err| ScheduleError::InvalidRange(format!("invalid time of day {s:?}: {err}")))
}

/// An interviewer's complete set of weekly rules.
///
/// Rules are kept in the order the interviewer supplied them; slot output
/// follows that order within a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAvailability {
    pub owner_id: UserId,
    pub rules: Vec<AvailabilityRule>,
}

impl WeeklyAvailability {
    pub const fn new(owner_id: UserId, rules: Vec<AvailabilityRule>) -> Self {
        Self { owner_id, rules }
    }

    pub const fn empty(owner_id: UserId) -> Self {
        Self::new(owner_id, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules recurring on the given date, in stored order.
    pub fn rules_on(&self, date: NaiveDate) -> impl Iterator<Item = &AvailabilityRule> {
        self.rules.iter().filter(move |rule| rule.applies_on(date))
    }
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_parse_is_case_insensitive() {
        assert_eq!("monday".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("SUNDAY".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert_eq!(" Friday ".parse::<Weekday>().unwrap(), Weekday::Friday);

        let err = "Funday".parse::<Weekday>().unwrap_err();
        assert_eq!(err.to_string(), "unknown weekday: Funday");
    }

    #[test]
    fn weekday_of_known_dates() {
        let monday = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
        assert_eq!(Weekday::of(monday), Weekday::Monday);
        assert_eq!(Weekday::of(monday.succ_opt().unwrap()), Weekday::Tuesday);
        assert_eq!(
            Weekday::of(NaiveDate::from_ymd_opt(2030, 1, 13).unwrap()),
            Weekday::Sunday
        );
    }

    #[test]
    fn rule_requires_start_before_end() {
        assert!(AvailabilityRule::parse(Weekday::Monday, "09:00", "17:00").is_ok());
        assert!(AvailabilityRule::parse(Weekday::Monday, "17:00", "09:00").is_err());
        assert!(AvailabilityRule::parse(Weekday::Monday, "09:00", "09:00").is_err());
        assert!(AvailabilityRule::parse(Weekday::Monday, "9am", "17:00").is_err());
    }

    #[test]
    fn rule_rejects_sub_minute_precision() {
        let start = NaiveTime::from_hms_opt(9, 0, 30).unwrap();
        let end = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert!(AvailabilityRule::new(Weekday::Monday, start, end).is_err());
    }

    #[test]
    fn rule_serializes_with_day_names_and_minutes() {
        let rule = AvailabilityRule::parse(Weekday::Wednesday, "13:30", "15:00").unwrap();
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(
            json,
            r#"{"dayOfWeek":"Wednesday","startTime":"13:30","endTime":"15:00"}"#
        );
        assert_eq!(rule.to_string(), "Wednesday 13:30-15:00");
    }

    #[test]
    fn deserializing_inverted_rule_fails() {
        let json = r#"{"dayOfWeek":"monday","startTime":"17:00","endTime":"09:00"}"#;
        assert!(serde_json::from_str::<AvailabilityRule>(json).is_err());

        let json = r#"{"dayOfWeek":"monday","startTime":"09:00","endTime":"10:00"}"#;
        let rule: AvailabilityRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.day_of_week, Weekday::Monday);
    }

    #[test]
    fn rules_on_keeps_stored_order_and_filters_weekday() {
        let availability = WeeklyAvailability::new(
            1,
            vec![
                AvailabilityRule::parse(Weekday::Monday, "14:00", "15:00").unwrap(),
                AvailabilityRule::parse(Weekday::Tuesday, "09:00", "10:00").unwrap(),
                AvailabilityRule::parse(Weekday::Monday, "09:00", "10:00").unwrap(),
            ],
        );
        let monday = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
        let starts: Vec<_> = availability
            .rules_on(monday)
            .map(|rule| rule.start_time.format("%H:%M").to_string())
            .collect();
        assert_eq!(starts, vec!["14:00", "09:00"]);
    }
}
