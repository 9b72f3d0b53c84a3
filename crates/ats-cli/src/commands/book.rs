//! Interview booking.

use std::io::Write;

use anyhow::{Context, Result};
use ats_core::store::{ApplicationTracker, BookingStore, Directory};
use ats_core::{Booking, BookingRequest, Notifier, Scheduler};

/// One-line summary of a booked interview.
pub fn format_booking(booking: &Booking) -> String {
    format!(
        "Interview {}: {} to {} (job {}, candidate {}, interviewer {})",
        booking.interview_id,
        booking.start_time.format("%Y-%m-%d %H:%M"),
        booking.end_time.format("%H:%M"),
        booking.job_id,
        booking.candidate_id,
        booking.effective_interviewer(),
    )
}

pub fn run<W, S, N>(
    writer: &mut W,
    scheduler: &mut Scheduler<S, N>,
    request: &BookingRequest,
    json: bool,
) -> Result<()>
where
    W: Write,
    S: BookingStore + Directory + ApplicationTracker,
    N: Notifier,
{
    let booking = scheduler
        .book_interview(request)
        .with_context(|| format!("failed to book interview at {}", request.start_time))?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&booking)?)?;
    } else {
        writeln!(writer, "Booked {}", format_booking(&booking))?;
    }
    Ok(())
}
