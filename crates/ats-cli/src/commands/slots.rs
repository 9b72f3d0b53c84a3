//! Open slot search.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use ats_core::store::{AvailabilityStore, BookingStore};
use ats_core::{Scheduler, SlotQuery, Weekday};
use chrono::{NaiveDateTime, Utc};

/// Formats slot start times one per line, grouped under their day.
pub fn format_slots(slots: &[NaiveDateTime]) -> String {
    let mut output = String::new();
    if slots.is_empty() {
        output.push_str("No open slots.\n");
        return output;
    }
    let mut current_day = None;
    for slot in slots {
        let day = slot.date();
        if current_day != Some(day) {
            let _ = writeln!(output, "{} {day}", Weekday::of(day));
            current_day = Some(day);
        }
        let _ = writeln!(output, "  {}", slot.format("%H:%M"));
    }
    output
}

/// Formats slot start times as a JSON array of naive ISO 8601 timestamps.
pub fn format_slots_json(slots: &[NaiveDateTime]) -> Result<String> {
    Ok(serde_json::to_string_pretty(slots)?)
}

/// Runs the slots command against the current time.
pub fn run<W, S, N>(
    writer: &mut W,
    scheduler: &Scheduler<S, N>,
    query: &SlotQuery,
    json: bool,
) -> Result<()>
where
    W: Write,
    S: AvailabilityStore + BookingStore,
{
    run_at(writer, scheduler, query, json, Utc::now().naive_utc())
}

/// Runs the slots command, treating `now` as the current time.
pub fn run_at<W, S, N>(
    writer: &mut W,
    scheduler: &Scheduler<S, N>,
    query: &SlotQuery,
    json: bool,
    now: NaiveDateTime,
) -> Result<()>
where
    W: Write,
    S: AvailabilityStore + BookingStore,
{
    let slots = scheduler.find_open_slots_at(query, now).with_context(|| {
        format!(
            "failed to find slots for interviewer {} and candidate {}",
            query.interviewer_id, query.candidate_id
        )
    })?;

    if json {
        writeln!(writer, "{}", format_slots_json(&slots)?)?;
    } else {
        write!(writer, "{}", format_slots(&slots))?;
    }
    Ok(())
}
