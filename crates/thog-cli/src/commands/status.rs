//! Live status table: `thog status`.

use std::fmt::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use thog_core::{Person, activity_summary, format_time};
use thog_store::Store;

/// Shows every person with live elapsed and total times.
pub fn run(store: &Store) -> Result<()> {
    let now = Utc::now();
    let persons = store.load()?;
    print!("{}", format_status(&persons, now));
    Ok(())
}

/// Renders the status table. Totals are recomputed from `now` at every call.
pub fn format_status(persons: &[Person], now: DateTime<Utc>) -> String {
    let mut output = String::new();

    if persons.is_empty() {
        writeln!(output, "No persons yet. Add one with 'thog add <name>'.").unwrap();
        return output;
    }

    let name_width = persons
        .iter()
        .map(|p| p.name.as_str().len())
        .max()
        .unwrap_or(0)
        .max(4);

    writeln!(
        output,
        "{:<name_width$}  {:<8}  {:<10}  TOTAL",
        "NAME", "STATE", "CURRENT"
    )
    .unwrap();
    for person in persons {
        let state = if person.is_running() { "running" } else { "stopped" };
        let current = if person.is_running() {
            format_time(person.current_session_elapsed(now))
        } else {
            "-".to_string()
        };
        writeln!(
            output,
            "{:<name_width$}  {:<8}  {:<10}  {}",
            person.name.as_str(),
            state,
            current,
            format_time(person.total_time(now))
        )
        .unwrap();
    }

    let summary = activity_summary(persons, now);
    writeln!(output).unwrap();
    writeln!(
        output,
        "{} active, {} running, combined total {}",
        summary.active_people,
        summary.running_count,
        format_time(summary.combined_total_secs)
    )
    .unwrap();
    output
}
