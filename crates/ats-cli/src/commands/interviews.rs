//! Booked interview listing.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use ats_core::Booking;
use ats_db::Database;

use super::book::format_booking;

pub fn format_interviews(interviews: &[Booking]) -> String {
    if interviews.is_empty() {
        return "No interviews booked.\n".to_string();
    }
    let mut output = String::new();
    for booking in interviews {
        let _ = writeln!(output, "{}", format_booking(booking));
    }
    output
}

pub fn run<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let interviews = db.list_interviews().context("failed to list interviews")?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&interviews)?)?;
    } else {
        write!(writer, "{}", format_interviews(&interviews))?;
    }
    Ok(())
}
