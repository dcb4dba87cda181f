//! Aggregated report renderings: `thog report`.
//!
//! This module renders the aggregation engine's three views (daily,
//! cumulative, leaderboard) as text for a terminal. All values are
//! recomputed from the stored sessions at render time.

use std::fmt::Write;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use thog_core::{
    ChartUnit, DayBucket, Person, TimeRange, TimelineEntry, Window, cumulative_series,
    daily_totals, filter_window, format_time, leaderboard, unified_timeline, window_for,
};
use thog_store::Store;

use crate::ReportView;

/// Renders the requested view for the requested window.
pub fn run(store: &Store, range: TimeRange, view: ReportView) -> Result<()> {
    let now = Utc::now();
    let persons = store.load()?;
    print!("{}", render_report(&persons, range, view, now));
    Ok(())
}

/// Produces the full report text.
pub fn render_report(
    persons: &[Person],
    range: TimeRange,
    view: ReportView,
    now: DateTime<Utc>,
) -> String {
    let timeline = unified_timeline(persons, now);
    let Some(window) = window_for(range, &timeline, now) else {
        return "No sessions recorded yet.\n".to_string();
    };
    let entries = filter_window(&timeline, window);

    match view {
        ReportView::Daily => render_daily(&entries, window, persons, range),
        ReportView::Cumulative => render_cumulative(&entries, window, persons, range),
        ReportView::Leaderboard => render_leaderboard(&entries, persons, range),
    }
}

fn section_header(output: &mut String, title: &str, range: TimeRange) {
    let heading = format!("{title} ({range})");
    writeln!(output, "{heading}").unwrap();
    writeln!(output, "{}", "─".repeat(heading.chars().count())).unwrap();
}

/// Generates a 10-character progress bar.
/// Nonzero values below 5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn progress_bar(value: i64, max: i64) -> String {
    if max == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

fn render_daily(
    entries: &[TimelineEntry],
    window: Window,
    persons: &[Person],
    range: TimeRange,
) -> String {
    let mut output = String::new();
    section_header(&mut output, "DAILY TOTALS", range);

    let days = daily_totals(entries, window);
    let max_day = days.iter().map(DayBucket::total_secs).max().unwrap_or(0);
    if max_day == 0 {
        writeln!(output, "No sessions in this time period.").unwrap();
        return output;
    }

    for day in &days {
        let total = day.total_secs();
        writeln!(
            output,
            "{}  {}  {}",
            day.date.format("%Y-%m-%d"),
            progress_bar(total, max_day),
            format_time(total)
        )
        .unwrap();
        // Per-person breakdown only where more than one person contributed.
        let mut contributors: Vec<_> = persons
            .iter()
            .map(|p| (p, day.total_for(p.id())))
            .filter(|(_, secs)| *secs > 0)
            .collect();
        if contributors.len() > 1 {
            contributors.sort_by(|a, b| b.1.cmp(&a.1));
            for (person, secs) in contributors {
                writeln!(output, "    {}  {}", person.name, format_time(secs)).unwrap();
            }
        }
    }
    output
}

fn render_cumulative(
    entries: &[TimelineEntry],
    window: Window,
    persons: &[Person],
    range: TimeRange,
) -> String {
    let mut output = String::new();
    section_header(&mut output, "CUMULATIVE TIME", range);

    let with_entries: Vec<&Person> = persons
        .iter()
        .filter(|p| entries.iter().any(|e| e.person_id == p.id()))
        .collect();
    if with_entries.is_empty() {
        writeln!(output, "No sessions in this time period.").unwrap();
        return output;
    }

    // One unit for the whole chart, picked from the largest final total.
    let max_total = with_entries
        .iter()
        .map(|p| {
            entries
                .iter()
                .filter(|e| e.person_id == p.id())
                .map(|e| e.duration_secs)
                .sum::<i64>()
        })
        .max()
        .unwrap_or(0);
    let unit = ChartUnit::best_for(max_total);

    for person in with_entries {
        writeln!(output, "{}", person.name).unwrap();
        for point in cumulative_series(entries, window, person.id()) {
            writeln!(
                output,
                "  {}  {} ({})",
                point.at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                format_time(point.total_secs),
                unit.format_scaled(point.total_secs)
            )
            .unwrap();
        }
    }
    output
}

fn render_leaderboard(entries: &[TimelineEntry], persons: &[Person], range: TimeRange) -> String {
    let mut output = String::new();
    section_header(&mut output, "LEADERBOARD", range);

    let rows = leaderboard(entries, persons);
    if rows.is_empty() {
        writeln!(output, "No sessions in this time period.").unwrap();
        return output;
    }

    let unit = ChartUnit::best_for(rows.iter().map(|r| r.total_secs).max().unwrap_or(0));
    let name_width = rows
        .iter()
        .map(|r| r.name.as_str().len())
        .max()
        .unwrap_or(0)
        .max(4);

    for (index, row) in rows.iter().enumerate() {
        writeln!(
            output,
            "{:>2}. {:<name_width$}  {:>11} ({})  {} session{}, avg {}{}",
            index + 1,
            row.name.as_str(),
            format_time(row.total_secs),
            unit.format_scaled(row.total_secs),
            row.session_count,
            if row.session_count == 1 { "" } else { "s" },
            format_time(row.avg_secs),
            if row.is_running { "  [recording]" } else { "" }
        )
        .unwrap();
    }
    output
}
