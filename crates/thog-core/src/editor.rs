//! Session editing against a working copy of a person's history.
//!
//! Edits accumulate on drafts and are validated once at [`SessionEditor::commit`],
//! not per mutation: a user entering start and end independently passes
//! through transiently inverted ranges, and rejecting those midway would make
//! two-field entry impossible. Adding a brand-new session is the exception;
//! an interval that is already known to be inverted is refused up front.
//!
//! When the person's timer is running the editor also carries a read-only
//! synthetic entry for the open interval, so callers can render the full
//! picture. That entry is not a [`Session`], can be neither edited nor
//! deleted here (stopping or resetting the timer is the only way out), and is
//! never part of the committed list.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use crate::person::{Person, Session, TimerState, whole_seconds_between};
use crate::types::SessionId;

/// Errors from session editing operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The proposed interval ends at or before it starts.
    #[error("session end must be strictly after its start")]
    InvalidRange,

    /// No draft session carries the given id.
    #[error("no session with id {0}")]
    NotFound(SessionId),

    /// The synthetic running-session entry was targeted.
    #[error("the running session cannot be edited or deleted here; stop or reset the timer")]
    CurrentSession,

    /// A timestamp string could not be parsed.
    #[error("unparseable timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Reference to an entry in the editor: a historical draft or the synthetic
/// running entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRef {
    Session(SessionId),
    Current,
}

impl std::str::FromStr for EntryRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("current") {
            return Ok(Self::Current);
        }
        s.parse::<SessionId>()
            .map(Self::Session)
            .map_err(|_| format!("invalid session reference: {s}"))
    }
}

/// An editable copy of one session. May hold a transiently invalid range
/// until commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftSession {
    pub id: SessionId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl DraftSession {
    /// Current duration of the draft in whole seconds (0 when inverted).
    #[must_use]
    pub fn duration_secs(&self) -> i64 {
        whole_seconds_between(self.start_time, self.end_time).max(0)
    }
}

/// The read-only synthetic entry for an open timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentEntry {
    pub started_at: DateTime<Utc>,
    /// Pinned to `now` at editor construction, for display only.
    pub as_of: DateTime<Utc>,
}

impl CurrentEntry {
    #[must_use]
    pub fn elapsed_secs(&self) -> i64 {
        whole_seconds_between(self.started_at, self.as_of).max(0)
    }
}

/// Result of committing an edit batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// The surviving, validated sessions sorted by start time.
    pub sessions: Vec<Session>,
    /// How many drafts failed validation and were dropped.
    pub dropped_invalid: usize,
}

/// A working copy of a person's session list.
#[derive(Debug, Clone)]
pub struct SessionEditor {
    drafts: Vec<DraftSession>,
    current: Option<CurrentEntry>,
}

impl SessionEditor {
    /// Builds an editor over a person's sessions as of `now`.
    #[must_use]
    pub fn for_person(person: &Person, now: DateTime<Utc>) -> Self {
        let drafts = person
            .sessions()
            .iter()
            .map(|s| DraftSession {
                id: s.id(),
                start_time: s.start_time(),
                end_time: s.end_time(),
            })
            .collect();
        let current = match person.timer() {
            TimerState::Running { started_at } => Some(CurrentEntry {
                started_at,
                as_of: now,
            }),
            TimerState::Stopped => None,
        };
        Self { drafts, current }
    }

    /// Historical drafts, sorted ascending by start time.
    #[must_use]
    pub fn drafts(&self) -> &[DraftSession] {
        &self.drafts
    }

    /// The synthetic running entry, when the person's timer is open.
    #[must_use]
    pub const fn current(&self) -> Option<&CurrentEntry> {
        self.current.as_ref()
    }

    /// Total seconds currently represented by the working copy, including
    /// the synthetic entry. Display aid; inverted drafts count as zero.
    #[must_use]
    pub fn preview_total_secs(&self) -> i64 {
        let drafts: i64 = self.drafts.iter().map(DraftSession::duration_secs).sum();
        drafts + self.current.map_or(0, |c| c.elapsed_secs())
    }

    /// Adds a new session, rejecting an interval already known to be
    /// inverted or empty.
    pub fn add(
        &mut self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<SessionId, EditError> {
        if end_time <= start_time {
            return Err(EditError::InvalidRange);
        }
        let id = SessionId::random();
        self.drafts.push(DraftSession {
            id,
            start_time,
            end_time,
        });
        self.drafts.sort_by_key(|d| d.start_time);
        Ok(id)
    }

    /// Moves a draft's start instant. The range may become transiently
    /// invalid; commit decides.
    pub fn set_start(&mut self, entry: EntryRef, start_time: DateTime<Utc>) -> Result<(), EditError> {
        let draft = self.draft_mut(entry)?;
        draft.start_time = start_time;
        self.drafts.sort_by_key(|d| d.start_time);
        Ok(())
    }

    /// Moves a draft's end instant. The range may become transiently
    /// invalid; commit decides.
    pub fn set_end(&mut self, entry: EntryRef, end_time: DateTime<Utc>) -> Result<(), EditError> {
        let draft = self.draft_mut(entry)?;
        draft.end_time = end_time;
        Ok(())
    }

    /// Removes a historical draft.
    pub fn delete(&mut self, entry: EntryRef) -> Result<(), EditError> {
        let id = Self::session_id(entry)?;
        let position = self
            .drafts
            .iter()
            .position(|d| d.id == id)
            .ok_or(EditError::NotFound(id))?;
        self.drafts.remove(position);
        Ok(())
    }

    /// Validates the batch and produces the surviving session list.
    ///
    /// Drafts failing `end > start` with a positive whole-second duration are
    /// silently dropped; the count of drops is reported so callers can tell
    /// the user a filtering pass occurred. The synthetic running entry is
    /// excluded and not counted.
    #[must_use]
    pub fn commit(self) -> CommitOutcome {
        let mut sessions = Vec::with_capacity(self.drafts.len());
        let mut dropped_invalid = 0;
        for draft in self.drafts {
            match Session::new(draft.id, draft.start_time, draft.end_time) {
                Ok(session) if session.duration_secs() > 0 => sessions.push(session),
                Ok(_) | Err(_) => {
                    dropped_invalid += 1;
                    tracing::debug!(session = %draft.id, "dropping invalid session draft at commit");
                }
            }
        }
        sessions.sort_by_key(Session::start_time);
        CommitOutcome {
            sessions,
            dropped_invalid,
        }
    }

    fn session_id(entry: EntryRef) -> Result<SessionId, EditError> {
        match entry {
            EntryRef::Session(id) => Ok(id),
            EntryRef::Current => Err(EditError::CurrentSession),
        }
    }

    fn draft_mut(&mut self, entry: EntryRef) -> Result<&mut DraftSession, EditError> {
        let id = Self::session_id(entry)?;
        self.drafts
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(EditError::NotFound(id))
    }
}

/// Parses a timestamp from editing UI input.
///
/// Accepts RFC 3339 (`2025-03-10T09:00:00Z`, offsets allowed) and naive
/// local datetimes (`2025-03-10T09:00` or with seconds), interpreted in the
/// local timezone. Malformed input is rejected, never coerced to a default
/// instant.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>, EditError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .map_err(|_| EditError::InvalidTimestamp(input.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| EditError::InvalidTimestamp(input.to_string()))
}
