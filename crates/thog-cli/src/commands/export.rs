//! CSV export to stdout: `thog export`.
//!
//! Two tabular views: a summary with one row per person, and a detailed view
//! with one row per session (including the synthetic open session of a
//! running timer). Cells are quoted; timestamps are rendered in local time.

use std::fmt::Write as FmtWrite;
use std::io::{BufWriter, Write, stdout};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use thog_core::{Person, format_time, seconds_to_days, seconds_to_hours};
use thog_store::Store;

/// Writes the requested CSV view to stdout.
pub fn run(store: &Store, detailed: bool) -> Result<()> {
    let now = Utc::now();
    let persons = store.load()?;
    let csv = if detailed {
        detailed_csv(&persons, now)
    } else {
        summary_csv(&persons, now)
    };

    let stdout = stdout();
    let mut writer = BufWriter::new(stdout.lock());
    // Handle broken pipe gracefully (e.g., when piped to `head`)
    let _ = writer.write_all(csv.as_bytes());
    Ok(())
}

fn csv_row(cells: &[String]) -> String {
    let quoted: Vec<String> = cells
        .iter()
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect();
    quoted.join(",")
}

fn local_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

fn local_time_of_day(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// One row per person: name, formatted total, hours, days, status.
pub fn summary_csv(persons: &[Person], now: DateTime<Utc>) -> String {
    let mut output = String::new();
    writeln!(
        output,
        "Name,Total Time (dd hh:mm:ss),Total Time (hours),Total Time (days),Status"
    )
    .unwrap();

    for person in persons {
        let total = person.total_time(now);
        let row = csv_row(&[
            person.name.to_string(),
            format_time(total),
            seconds_to_hours(total),
            seconds_to_days(total),
            if person.is_running() { "Running" } else { "Stopped" }.to_string(),
        ]);
        writeln!(output, "{row}").unwrap();
    }
    output
}

/// One row per session, the running timer's open session included.
pub fn detailed_csv(persons: &[Person], now: DateTime<Utc>) -> String {
    let mut output = String::new();
    writeln!(
        output,
        "Name,Session ID,Start Date,Start Time,End Date,End Time,\
         Duration (dd hh:mm:ss),Duration (hours),Duration (days),Status"
    )
    .unwrap();

    for person in persons {
        for session in person.sessions() {
            let duration = session.duration_secs();
            let row = csv_row(&[
                person.name.to_string(),
                session.id().to_string(),
                local_date(session.start_time()),
                local_time_of_day(session.start_time()),
                local_date(session.end_time()),
                local_time_of_day(session.end_time()),
                format_time(duration),
                seconds_to_hours(duration),
                seconds_to_days(duration),
                "Completed".to_string(),
            ]);
            writeln!(output, "{row}").unwrap();
        }

        if let Some(started_at) = person.current_session_start() {
            let elapsed = person.current_session_elapsed(now);
            let row = csv_row(&[
                person.name.to_string(),
                "current".to_string(),
                local_date(started_at),
                local_time_of_day(started_at),
                String::new(),
                String::new(),
                format_time(elapsed),
                seconds_to_hours(elapsed),
                seconds_to_days(elapsed),
                "Running".to_string(),
            ]);
            writeln!(output, "{row}").unwrap();
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use thog_core::PersonName;

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
            .single()
            .expect("valid test timestamp")
            + Duration::minutes(minutes)
    }

    #[test]
    fn summary_has_one_row_per_person() {
        let mut alice = Person::new(PersonName::new("Alice").unwrap());
        alice.start_timer(ts(0));
        alice.stop_timer(ts(0) + Duration::seconds(3661));
        let bob = Person::new(PersonName::new("Bob").unwrap());

        let csv = summary_csv(&[alice, bob], ts(120));
        insta::assert_snapshot!(csv, @r#"
        Name,Total Time (dd hh:mm:ss),Total Time (hours),Total Time (days),Status
        "Alice","1:01:01","1.02","0.042","Stopped"
        "Bob","0:00","0.00","0.000","Stopped"
        "#);
    }

    #[test]
    fn summary_marks_running_person() {
        let mut alice = Person::new(PersonName::new("Alice").unwrap());
        alice.start_timer(ts(0));
        let csv = summary_csv(&[alice], ts(30));
        assert!(csv.contains("\"Running\""));
        assert!(csv.contains("\"30:00\""));
    }

    #[test]
    fn detailed_includes_synthetic_open_session() {
        let mut alice = Person::new(PersonName::new("Alice").unwrap());
        alice.start_timer(ts(0));
        alice.stop_timer(ts(60));
        alice.start_timer(ts(90));

        let csv = detailed_csv(&[alice], ts(100));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3); // header + closed + open
        assert!(lines[1].contains("\"Completed\""));
        assert!(lines[2].contains("\"current\""));
        assert!(lines[2].contains("\"Running\""));
        assert!(lines[2].contains("\"10:00\"")); // 10 minutes elapsed
        // The open session has no end columns.
        assert!(lines[2].contains("\"\",\"\""));
    }

    #[test]
    fn detailed_omits_open_row_for_stopped_person() {
        let mut alice = Person::new(PersonName::new("Alice").unwrap());
        alice.start_timer(ts(0));
        alice.stop_timer(ts(60));

        let csv = detailed_csv(&[alice], ts(100));
        assert_eq!(csv.lines().count(), 2);
        assert!(!csv.contains("\"current\""));
    }

    #[test]
    fn quotes_inside_cells_are_escaped() {
        let mut alice = Person::new(PersonName::new("Alice \"Ace\" M").unwrap());
        alice.start_timer(ts(0));
        alice.stop_timer(ts(1));
        let csv = summary_csv(&[alice], ts(5));
        assert!(csv.contains("\"Alice \"\"Ace\"\" M\""));
    }
}
