//! Persons, sessions and the timer state machine.
//!
//! A [`Person`] accrues time across closed [`Session`] intervals plus, while
//! the timer runs, a live open interval. The timer has exactly two states
//! ([`TimerState::Stopped`] and [`TimerState::Running`]); `start` while
//! running and `stop` while stopped are silent no-ops, never errors.
//!
//! All arithmetic takes wall-clock `now` as an explicit parameter so results
//! are deterministic under test and recomputed at time-of-read, never cached.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::format_time;
use crate::types::{PersonId, PersonName, SessionId};

/// Errors from session construction and person deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// A session's end did not fall strictly after its start.
    #[error("session end {end} is not after start {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// `is_running` and `current_session_start` disagreed in stored data.
    #[error("inconsistent timer state: is_running={is_running}, current_session_start present={has_start}")]
    InconsistentTimerState { is_running: bool, has_start: bool },
}

/// Whole seconds between two instants, floored (sub-second time is dropped).
pub(crate) fn whole_seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_seconds()
}

/// A closed, immutable time interval.
///
/// The constructor enforces `end_time > start_time` strictly and derives
/// `duration_secs`; the serde representation revalidates on deserialization,
/// so a stored session can never carry an inconsistent triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionRepr", into = "SessionRepr")]
pub struct Session {
    id: SessionId,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    duration_secs: i64,
}

impl Session {
    /// Creates a session after validating the interval.
    pub fn new(
        id: SessionId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, TimerError> {
        if end_time <= start_time {
            return Err(TimerError::InvalidRange {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            id,
            start_time,
            end_time,
            duration_secs: whole_seconds_between(start_time, end_time),
        })
    }

    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub const fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Duration in whole seconds, `floor((end - start) / 1s)`.
    #[must_use]
    pub const fn duration_secs(&self) -> i64 {
        self.duration_secs
    }
}

/// External representation of a session.
///
/// `duration_secs` is accepted on input for compatibility but always
/// recomputed from the interval.
#[derive(Debug, Serialize, Deserialize)]
struct SessionRepr {
    id: SessionId,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    #[serde(default)]
    duration_secs: i64,
}

impl TryFrom<SessionRepr> for Session {
    type Error = TimerError;

    fn try_from(repr: SessionRepr) -> Result<Self, Self::Error> {
        Self::new(repr.id, repr.start_time, repr.end_time)
    }
}

impl From<Session> for SessionRepr {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            start_time: session.start_time,
            end_time: session.end_time,
            duration_secs: session.duration_secs,
        }
    }
}

/// The two timer states of a person.
///
/// The running state carries its start instant, so "running without a start
/// time" (or the reverse) is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Stopped,
    Running { started_at: DateTime<Utc> },
}

impl TimerState {
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Notification emitted by a timer mutation, for display by the caller.
///
/// A suggested side channel: nothing in the core depends on these being
/// observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Started {
        person: PersonName,
    },
    Stopped {
        person: PersonName,
        duration_secs: i64,
    },
    Reset {
        person: PersonName,
        discarded_sessions: usize,
    },
}

impl std::fmt::Display for TimerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started { person } => write!(f, "timer started for {person}"),
            Self::Stopped {
                person,
                duration_secs,
            } => write!(
                f,
                "timer stopped for {person} after {}",
                format_time(*duration_secs)
            ),
            Self::Reset {
                person,
                discarded_sessions,
            } => write!(
                f,
                "sessions reset for {person} ({discarded_sessions} discarded)"
            ),
        }
    }
}

/// A tracked individual with cumulative time and timer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersonRepr", into = "PersonRepr")]
pub struct Person {
    id: PersonId,
    pub name: PersonName,
    /// Cosmetic emoji or image reference; irrelevant to accounting.
    pub avatar: Option<String>,
    /// Cosmetic display color; irrelevant to accounting.
    pub avatar_color: Option<String>,
    sessions: Vec<Session>,
    timer: TimerState,
}

impl Person {
    /// Creates a person with a fresh id, no sessions and a stopped timer.
    #[must_use]
    pub fn new(name: PersonName) -> Self {
        Self {
            id: PersonId::random(),
            name,
            avatar: None,
            avatar_color: None,
            sessions: Vec::new(),
            timer: TimerState::Stopped,
        }
    }

    #[must_use]
    pub const fn id(&self) -> PersonId {
        self.id
    }

    /// Closed sessions, sorted ascending by start time.
    #[must_use]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    #[must_use]
    pub const fn timer(&self) -> TimerState {
        self.timer
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Start instant of the open session, if one is running.
    #[must_use]
    pub const fn current_session_start(&self) -> Option<DateTime<Utc>> {
        match self.timer {
            TimerState::Running { started_at } => Some(started_at),
            TimerState::Stopped => None,
        }
    }

    /// Elapsed whole seconds of the open session; 0 when stopped.
    #[must_use]
    pub fn current_session_elapsed(&self, now: DateTime<Utc>) -> i64 {
        match self.timer {
            TimerState::Running { started_at } => whole_seconds_between(started_at, now).max(0),
            TimerState::Stopped => 0,
        }
    }

    /// Total accumulated seconds: every closed session plus the live open
    /// interval when running. Recomputed from `now` on every call.
    #[must_use]
    pub fn total_time(&self, now: DateTime<Utc>) -> i64 {
        let closed: i64 = self.sessions.iter().map(Session::duration_secs).sum();
        closed + self.current_session_elapsed(now)
    }

    /// Starts the timer. No-op (returns `None`) when already running.
    pub fn start_timer(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        if self.timer.is_running() {
            return None;
        }
        self.timer = TimerState::Running { started_at: now };
        Some(TimerEvent::Started {
            person: self.name.clone(),
        })
    }

    /// Stops the timer, converting the open interval into a closed session
    /// appended to the list. No-op (returns `None`) when not running.
    pub fn stop_timer(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        let TimerState::Running { started_at } = self.timer else {
            return None;
        };
        // A closed session must end strictly after it starts; if the clock
        // has not advanced past the start instant, pin the end 1ms later.
        let end = now.max(started_at + Duration::milliseconds(1));
        let session = Session {
            id: SessionId::random(),
            start_time: started_at,
            end_time: end,
            duration_secs: whole_seconds_between(started_at, end),
        };
        let duration_secs = session.duration_secs;
        self.sessions.push(session);
        self.sessions.sort_by_key(Session::start_time);
        self.timer = TimerState::Stopped;
        Some(TimerEvent::Stopped {
            person: self.name.clone(),
            duration_secs,
        })
    }

    /// Clears every session and any running state.
    ///
    /// The open interval, if any, is discarded without emitting a session.
    /// Destructive and unrecoverable; callers confirm with the user first.
    pub fn reset_sessions(&mut self) -> TimerEvent {
        let discarded_sessions = self.sessions.len();
        self.sessions.clear();
        self.timer = TimerState::Stopped;
        TimerEvent::Reset {
            person: self.name.clone(),
            discarded_sessions,
        }
    }

    /// Installs an edited session list, keeping it sorted by start time.
    ///
    /// Used by the session editor's commit; the running state is untouched.
    pub fn replace_sessions(&mut self, mut sessions: Vec<Session>) {
        sessions.sort_by_key(Session::start_time);
        self.sessions = sessions;
    }
}

/// External representation of a person.
///
/// Keeps the persistence contract's flat `is_running` +
/// `current_session_start` pair; deserializing a mismatched pair is rejected.
#[derive(Debug, Serialize, Deserialize)]
struct PersonRepr {
    id: PersonId,
    name: PersonName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar_color: Option<String>,
    #[serde(default)]
    sessions: Vec<Session>,
    #[serde(default)]
    is_running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_session_start: Option<DateTime<Utc>>,
}

impl TryFrom<PersonRepr> for Person {
    type Error = TimerError;

    fn try_from(repr: PersonRepr) -> Result<Self, Self::Error> {
        let timer = match (repr.is_running, repr.current_session_start) {
            (true, Some(started_at)) => TimerState::Running { started_at },
            (false, None) => TimerState::Stopped,
            (is_running, start) => {
                return Err(TimerError::InconsistentTimerState {
                    is_running,
                    has_start: start.is_some(),
                });
            }
        };
        let mut sessions = repr.sessions;
        sessions.sort_by_key(Session::start_time);
        Ok(Self {
            id: repr.id,
            name: repr.name,
            avatar: repr.avatar,
            avatar_color: repr.avatar_color,
            sessions,
            timer,
        })
    }
}

impl From<Person> for PersonRepr {
    fn from(person: Person) -> Self {
        let current_session_start = person.current_session_start();
        Self {
            id: person.id,
            name: person.name,
            avatar: person.avatar,
            avatar_color: person.avatar_color,
            sessions: person.sessions,
            is_running: current_session_start.is_some(),
            current_session_start,
        }
    }
}
