//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use ats_core::{AvailabilityRule, Weekday};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// Pre-compiled regex for weekly rules such as "Monday 09:00-17:00".
static RULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)([a-z]+)\s+(\d{1,2}:\d{2})\s*-\s*(\d{1,2}:\d{2})$")
        .expect("rule pattern is valid")
});

/// Naive timestamp layouts accepted on the command line, most precise first.
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {s}. Use YYYY-MM-DD (e.g., 2030-01-07)"))
}

/// Parse a wall-clock timestamp.
///
/// Supports:
/// - Seconds optional: "2030-01-07T10:00", "2030-01-07T10:00:00.000"
/// - A trailing `Z`, which is dropped since all times share one naive clock
pub fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    let trimmed = s.trim();
    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .with_context(|| format!("Invalid timestamp: {s}. Use ISO 8601 (e.g., 2030-01-07T10:00)"))
}

/// Parse a weekly availability rule such as "Monday 09:00-17:00".
pub fn parse_rule(s: &str) -> anyhow::Result<AvailabilityRule> {
    let Some(caps) = RULE_RE.captures(s.trim()) else {
        anyhow::bail!("Invalid availability rule: {s}. Use \"<Weekday> HH:MM-HH:MM\"");
    };
    let day: Weekday = caps[1].parse()?;
    let start = pad_hour(&caps[2]);
    let end = pad_hour(&caps[3]);
    AvailabilityRule::parse(day, &start, &end)
        .with_context(|| format!("Invalid availability rule: {s}"))
}

fn pad_hour(time: &str) -> String {
    if time.len() == 4 {
        format!("0{time}")
    } else {
        time.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2030-01-07").unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
        );
        assert!(parse_date("07/01/2030").is_err());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2030, 1, 7)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2030-01-07T10:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2030-01-07T10:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2030-01-07T10:00:00.000Z").unwrap(), expected);
        assert!(parse_timestamp("2030-01-07 10:00").is_err());
        assert!(parse_timestamp("tomorrow").is_err());
    }

    #[test]
    fn test_parse_rule() {
        let rule = parse_rule("monday 9:00 - 17:30").unwrap();
        assert_eq!(rule.day_of_week, Weekday::Monday);
        assert_eq!(rule.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(rule.end_time, NaiveTime::from_hms_opt(17, 30, 0).unwrap());
        assert_eq!(rule.to_string(), "Monday 09:00-17:30");
    }

    #[test]
    fn test_parse_rule_rejects_bad_input() {
        assert!(parse_rule("Funday 09:00-17:00").is_err());
        assert!(parse_rule("Monday 17:00-09:00").is_err());
        assert!(parse_rule("Monday 09:00").is_err());
    }
}
