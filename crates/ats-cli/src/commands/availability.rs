//! Weekly availability commands.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use ats_core::store::AvailabilityStore;
use ats_core::{Scheduler, WeeklyAvailability};

use super::util::parse_rule;
use crate::AvailabilityAction;

/// Formats availability as one rule per line.
pub fn format_availability(availability: &WeeklyAvailability) -> String {
    let mut output = String::new();
    if availability.is_empty() {
        let _ = writeln!(output, "User {} has no availability.", availability.owner_id);
        return output;
    }
    let _ = writeln!(output, "Availability for user {}:", availability.owner_id);
    for rule in &availability.rules {
        let _ = writeln!(output, "  {rule}");
    }
    output
}

pub fn run<W, S, N>(
    writer: &mut W,
    scheduler: &mut Scheduler<S, N>,
    action: &AvailabilityAction,
) -> Result<()>
where
    W: Write,
    S: AvailabilityStore,
{
    match action {
        AvailabilityAction::Set { owner, rules } => {
            let rules = rules
                .iter()
                .map(|rule| parse_rule(rule))
                .collect::<Result<Vec<_>>>()?;
            let availability = WeeklyAvailability::new(*owner, rules);
            scheduler
                .set_availability(&availability)
                .with_context(|| format!("failed to set availability for user {owner}"))?;
            write!(writer, "{}", format_availability(&availability))?;
        }
        AvailabilityAction::Show { owner, json } => {
            let availability = scheduler
                .availability(*owner)
                .with_context(|| format!("failed to load availability for user {owner}"))?;
            if *json {
                writeln!(writer, "{}", serde_json::to_string_pretty(&availability.rules)?)?;
            } else {
                write!(writer, "{}", format_availability(&availability))?;
            }
        }
    }
    Ok(())
}
