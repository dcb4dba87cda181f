//! The unified cross-person session timeline and time-range windowing.
//!
//! Aggregation consumers work on one flat, sorted list of intervals: every
//! closed session of every person, plus one synthetic open entry per running
//! person. The open entry is tagged distinctly ([`EntryKind::Open`]) and is
//! not a [`Session`], so it can never be persisted or double-counted.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::person::{Person, TimerState, whole_seconds_between};
use crate::types::{PersonId, SessionId};

/// What a timeline entry was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A closed, persisted session.
    Closed { session_id: SessionId },
    /// The synthetic open interval of a running timer, ended at `now`.
    Open,
}

/// One interval on the unified timeline, tagged with its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEntry {
    pub person_id: PersonId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_secs: i64,
    pub kind: EntryKind,
}

impl TimelineEntry {
    /// True for the synthetic running entry.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.kind, EntryKind::Open)
    }
}

/// Flattens all persons into one timeline sorted ascending by start time.
///
/// Ties keep the input person order (stable sort), which later gives the
/// leaderboard its deterministic tie-break.
#[must_use]
pub fn unified_timeline(persons: &[Person], now: DateTime<Utc>) -> Vec<TimelineEntry> {
    let mut entries = Vec::new();
    for person in persons {
        for session in person.sessions() {
            entries.push(TimelineEntry {
                person_id: person.id(),
                start_time: session.start_time(),
                end_time: session.end_time(),
                duration_secs: session.duration_secs(),
                kind: EntryKind::Closed {
                    session_id: session.id(),
                },
            });
        }
        if let TimerState::Running { started_at } = person.timer() {
            entries.push(TimelineEntry {
                person_id: person.id(),
                start_time: started_at,
                end_time: now,
                duration_secs: whole_seconds_between(started_at, now).max(0),
                kind: EntryKind::Open,
            });
        }
    }
    entries.sort_by_key(|e| e.start_time);
    entries
}

/// A time range selector for filtering the unified timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    /// The current local calendar day, midnight to 23:59:59.999.
    Today,
    #[default]
    Last7Days,
    Last30Days,
    /// From the earliest session start to now.
    All,
}

impl TimeRange {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "24h",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" | "today" => Ok(Self::Today),
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "all" => Ok(Self::All),
            _ => Err(format!("invalid time range: {s} (expected 24h, 7d, 30d or all)")),
        }
    }
}

/// Concrete window bounds resolved from a [`TimeRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn local_midnight_to_utc(local_date: NaiveDate) -> DateTime<Utc> {
    let midnight = local_date.and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    match Local.from_local_datetime(&midnight) {
        // Single or ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight is rare but possible
            // Use 1am local which is guaranteed to exist
            let one_am = local_date.and_time(NaiveTime::from_hms_opt(1, 0, 0).unwrap());
            Local
                .from_local_datetime(&one_am)
                .unwrap()
                .with_timezone(&Utc)
        }
    }
}

/// Resolves a range into window bounds.
///
/// Returns `None` only for [`TimeRange::All`] over an empty timeline, where
/// no earliest start exists.
#[must_use]
pub fn window_for(
    range: TimeRange,
    timeline: &[TimelineEntry],
    now: DateTime<Utc>,
) -> Option<Window> {
    match range {
        TimeRange::Today => {
            let today = now.with_timezone(&Local).date_naive();
            let start = local_midnight_to_utc(today);
            let end = local_midnight_to_utc(today + Duration::days(1)) - Duration::milliseconds(1);
            Some(Window { start, end })
        }
        TimeRange::Last7Days => Some(Window {
            start: now - Duration::days(7),
            end: now,
        }),
        TimeRange::Last30Days => Some(Window {
            start: now - Duration::days(30),
            end: now,
        }),
        TimeRange::All => timeline
            .iter()
            .map(|e| e.start_time)
            .min()
            .map(|start| Window { start, end: now }),
    }
}

/// Filters the timeline to entries starting inside the window.
///
/// An entry straddling the window start is excluded whole, not clipped:
/// windowed duration sums then always equal the sum of the entries shown.
/// Clipping at the boundary would be a reasonable alternative, but it has to
/// change the sums and the rendered bars together or the two disagree.
#[must_use]
pub fn filter_window(timeline: &[TimelineEntry], window: Window) -> Vec<TimelineEntry> {
    timeline
        .iter()
        .filter(|e| e.start_time >= window.start)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PersonName;
    use chrono::TimeZone;

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
            .single()
            .expect("valid test timestamp")
            + Duration::minutes(minutes)
    }

    fn person(name: &str) -> Person {
        Person::new(PersonName::new(name).unwrap())
    }

    #[test]
    fn timeline_merges_and_sorts_across_persons() {
        let mut alice = person("Alice");
        alice.start_timer(ts(30));
        alice.stop_timer(ts(40));
        let mut bob = person("Bob");
        bob.start_timer(ts(0));
        bob.stop_timer(ts(10));

        let timeline = unified_timeline(&[alice.clone(), bob.clone()], ts(60));
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].person_id, bob.id());
        assert_eq!(timeline[1].person_id, alice.id());
        assert!(timeline.iter().all(|e| !e.is_open()));
    }

    #[test]
    fn running_person_contributes_one_open_entry_ending_now() {
        let mut alice = person("Alice");
        alice.start_timer(ts(0));
        alice.stop_timer(ts(10));
        alice.start_timer(ts(20));

        let timeline = unified_timeline(&[alice], ts(25));
        assert_eq!(timeline.len(), 2);
        let open = &timeline[1];
        assert!(open.is_open());
        assert_eq!(open.end_time, ts(25));
        assert_eq!(open.duration_secs, 5 * 60);
    }

    #[test]
    fn stopped_person_contributes_no_open_entry() {
        let mut alice = person("Alice");
        alice.start_timer(ts(0));
        alice.stop_timer(ts(10));

        let timeline = unified_timeline(&[alice], ts(25));
        assert_eq!(timeline.len(), 1);
        assert!(!timeline[0].is_open());
    }

    #[test]
    fn relative_windows_span_back_from_now() {
        let now = ts(0);
        let week = window_for(TimeRange::Last7Days, &[], now).unwrap();
        assert_eq!(week.start, now - Duration::days(7));
        assert_eq!(week.end, now);

        let month = window_for(TimeRange::Last30Days, &[], now).unwrap();
        assert_eq!(month.start, now - Duration::days(30));
        assert_eq!(month.end, now);
    }

    #[test]
    fn today_window_covers_the_local_day() {
        let now = ts(0);
        let window = window_for(TimeRange::Today, &[], now).unwrap();
        assert!(window.start <= now);
        assert!(window.end >= now);
        // Exactly one local day minus the final millisecond.
        assert_eq!(
            window.end - window.start,
            Duration::days(1) - Duration::milliseconds(1)
        );
    }

    #[test]
    fn all_window_starts_at_earliest_session() {
        let mut alice = person("Alice");
        alice.start_timer(ts(5));
        alice.stop_timer(ts(15));
        let mut bob = person("Bob");
        bob.start_timer(ts(2));
        bob.stop_timer(ts(4));

        let timeline = unified_timeline(&[alice, bob], ts(60));
        let window = window_for(TimeRange::All, &timeline, ts(60)).unwrap();
        assert_eq!(window.start, ts(2));
        assert_eq!(window.end, ts(60));
    }

    #[test]
    fn all_window_is_none_for_empty_timeline() {
        assert!(window_for(TimeRange::All, &[], ts(0)).is_none());
    }

    #[test]
    fn filter_excludes_straddling_entries_whole() {
        let mut alice = person("Alice");
        alice.start_timer(ts(-30));
        alice.stop_timer(ts(30)); // Straddles a window starting at ts(0).
        alice.start_timer(ts(40));
        alice.stop_timer(ts(50));

        let timeline = unified_timeline(&[alice], ts(60));
        let window = Window {
            start: ts(0),
            end: ts(60),
        };
        let filtered = filter_window(&timeline, window);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].start_time, ts(40));
    }

    #[test]
    fn filter_keeps_entry_starting_exactly_at_window_start() {
        let mut alice = person("Alice");
        alice.start_timer(ts(0));
        alice.stop_timer(ts(10));

        let timeline = unified_timeline(&[alice], ts(60));
        let window = Window {
            start: ts(0),
            end: ts(60),
        };
        assert_eq!(filter_window(&timeline, window).len(), 1);
    }

    #[test]
    fn time_range_parses_selectors() {
        assert_eq!("24h".parse::<TimeRange>(), Ok(TimeRange::Today));
        assert_eq!("today".parse::<TimeRange>(), Ok(TimeRange::Today));
        assert_eq!("7d".parse::<TimeRange>(), Ok(TimeRange::Last7Days));
        assert_eq!("30d".parse::<TimeRange>(), Ok(TimeRange::Last30Days));
        assert_eq!("all".parse::<TimeRange>(), Ok(TimeRange::All));
        assert!("48h".parse::<TimeRange>().is_err());
    }

    #[test]
    fn time_range_roundtrips_through_as_str() {
        for range in [
            TimeRange::Today,
            TimeRange::Last7Days,
            TimeRange::Last30Days,
            TimeRange::All,
        ] {
            assert_eq!(range.as_str().parse::<TimeRange>(), Ok(range));
        }
    }
}
