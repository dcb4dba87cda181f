//! Time-bucketed aggregation over a windowed timeline.
//!
//! All functions here take entries that already went through
//! [`crate::timeline::filter_window`]; they never re-filter.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::person::Person;
use crate::timeline::{TimelineEntry, Window};
use crate::types::{PersonId, PersonName};

/// Per-person totals for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub totals: HashMap<PersonId, i64>,
}

impl DayBucket {
    /// Seconds accumulated by one person on this day (0 when absent).
    #[must_use]
    pub fn total_for(&self, person: PersonId) -> i64 {
        self.totals.get(&person).copied().unwrap_or(0)
    }

    /// Combined seconds across all persons on this day.
    #[must_use]
    pub fn total_secs(&self) -> i64 {
        self.totals.values().sum()
    }
}

/// Buckets each entry's duration by the local calendar day of its start.
///
/// Every local calendar day covered by the window appears in the output in
/// ascending order, zero-total days included, so consumers can render
/// continuous day series without gaps.
#[must_use]
pub fn daily_totals(entries: &[TimelineEntry], window: Window) -> Vec<DayBucket> {
    let mut days: BTreeMap<NaiveDate, HashMap<PersonId, i64>> = BTreeMap::new();

    let first = window.start.with_timezone(&Local).date_naive();
    let last = window.end.with_timezone(&Local).date_naive();
    let mut day = first;
    while day <= last {
        days.insert(day, HashMap::new());
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    for entry in entries {
        let date = entry.start_time.with_timezone(&Local).date_naive();
        if let Some(totals) = days.get_mut(&date) {
            *totals.entry(entry.person_id).or_insert(0) += entry.duration_secs;
        }
    }

    days.into_iter()
        .map(|(date, totals)| DayBucket { date, totals })
        .collect()
}

/// One point of a cumulative series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulativePoint {
    pub at: DateTime<Utc>,
    pub total_secs: i64,
}

/// Cumulative step series for one person over the window.
///
/// Starts at zero at the window start, steps by each entry's duration at its
/// end instant, and closes with the person's full windowed total at the
/// window end. Monotone non-decreasing by construction.
#[must_use]
pub fn cumulative_series(
    entries: &[TimelineEntry],
    window: Window,
    person: PersonId,
) -> Vec<CumulativePoint> {
    let mut own: Vec<&TimelineEntry> = entries
        .iter()
        .filter(|e| e.person_id == person)
        .collect();
    own.sort_by_key(|e| e.end_time);

    let mut points = Vec::with_capacity(own.len() + 2);
    points.push(CumulativePoint {
        at: window.start,
        total_secs: 0,
    });
    let mut total = 0;
    for entry in own {
        total += entry.duration_secs;
        points.push(CumulativePoint {
            at: entry.end_time,
            total_secs: total,
        });
    }
    points.push(CumulativePoint {
        at: window.end,
        total_secs: total,
    });
    points
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub person_id: PersonId,
    pub name: PersonName,
    pub total_secs: i64,
    pub session_count: usize,
    /// `total_secs / session_count`, truncating.
    pub avg_secs: i64,
    /// Whether the open synthetic entry contributed to the total.
    pub is_running: bool,
}

/// Ranks persons by total windowed time, descending.
///
/// Ties keep first-seen order from the (sorted) timeline; the stable sort is
/// what makes that hold. Persons with no entries in the window are absent.
#[must_use]
pub fn leaderboard(entries: &[TimelineEntry], persons: &[Person]) -> Vec<LeaderboardEntry> {
    struct Tally {
        total_secs: i64,
        session_count: usize,
        is_running: bool,
    }

    let mut order: Vec<PersonId> = Vec::new();
    let mut tallies: HashMap<PersonId, Tally> = HashMap::new();
    for entry in entries {
        let tally = tallies.entry(entry.person_id).or_insert_with(|| {
            order.push(entry.person_id);
            Tally {
                total_secs: 0,
                session_count: 0,
                is_running: false,
            }
        });
        tally.total_secs += entry.duration_secs;
        tally.session_count += 1;
        if entry.is_open() {
            tally.is_running = true;
        }
    }

    let mut rows: Vec<LeaderboardEntry> = order
        .into_iter()
        .filter_map(|person_id| {
            let tally = tallies.remove(&person_id)?;
            let name = persons.iter().find(|p| p.id() == person_id)?.name.clone();
            let count = i64::try_from(tally.session_count).unwrap_or(i64::MAX);
            Some(LeaderboardEntry {
                person_id,
                name,
                total_secs: tally.total_secs,
                session_count: tally.session_count,
                avg_secs: tally.total_secs / count.max(1),
                is_running: tally.is_running,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.total_secs.cmp(&a.total_secs));
    rows
}

/// Headline numbers for the statistics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySummary {
    /// Persons with recorded time or a running timer.
    pub active_people: usize,
    /// Persons currently running.
    pub running_count: usize,
    /// Combined total across active persons, live.
    pub combined_total_secs: i64,
}

/// Computes the headline summary across all persons as of `now`.
#[must_use]
pub fn activity_summary(persons: &[Person], now: DateTime<Utc>) -> ActivitySummary {
    let mut active_people = 0;
    let mut running_count = 0;
    let mut combined_total_secs = 0;
    for person in persons {
        let total = person.total_time(now);
        if total > 0 || person.is_running() {
            active_people += 1;
            combined_total_secs += total;
        }
        if person.is_running() {
            running_count += 1;
        }
    }
    ActivitySummary {
        active_people,
        running_count,
        combined_total_secs,
    }
}
