//! Core domain logic for the timehogger time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Persons and sessions: the timer state machine and live totals
//! - Session editing: working-copy edits with batch validation
//! - The unified timeline: cross-person intervals, windowing
//! - Aggregation: daily buckets, cumulative series, leaderboard
//! - Formatting: human-readable durations and chart unit scaling
//!
//! No function here performs I/O or reads the clock; wall-clock `now` is an
//! explicit parameter throughout.

pub mod aggregate;
pub mod editor;
pub mod format;
pub mod person;
pub mod timeline;
pub mod types;

pub use aggregate::{
    ActivitySummary, CumulativePoint, DayBucket, LeaderboardEntry, activity_summary,
    cumulative_series, daily_totals, leaderboard,
};
pub use editor::{CommitOutcome, EditError, EntryRef, SessionEditor, parse_datetime};
pub use format::{ChartUnit, format_time, seconds_to_days, seconds_to_hours};
pub use person::{Person, Session, TimerError, TimerEvent, TimerState};
pub use timeline::{
    EntryKind, TimeRange, TimelineEntry, Window, filter_window, unified_timeline, window_for,
};
pub use types::{PersonId, PersonName, SessionId, ValidationError};
