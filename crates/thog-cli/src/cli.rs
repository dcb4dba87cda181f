//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use thog_core::{EntryRef, TimeRange};

/// Personal and team time tracker.
///
/// Tracks time per person across discrete start/stop sessions and derives
/// aggregated views: daily totals, cumulative series and a leaderboard.
#[derive(Debug, Parser)]
#[command(name = "thog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the data file (overrides configuration).
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a person to the directory.
    Add {
        /// Display name (must be non-empty).
        name: String,

        /// Avatar emoji.
        #[arg(long)]
        avatar: Option<String>,

        /// Display color (e.g. #3B82F6).
        #[arg(long)]
        color: Option<String>,
    },

    /// Remove a person and their entire history.
    Remove {
        /// Person name or id prefix.
        person: String,
    },

    /// Start a person's timer. A no-op if it is already running.
    Start {
        /// Person name or id prefix.
        person: String,
    },

    /// Stop a running timer, recording a closed session.
    Stop {
        /// Person name or id prefix.
        person: Option<String>,

        /// Stop every running timer.
        #[arg(long, conflicts_with = "person")]
        all: bool,
    },

    /// Clear a person's sessions and running state. Destructive.
    Reset {
        /// Person name or id prefix.
        person: Option<String>,

        /// Reset every person.
        #[arg(long, conflicts_with = "person")]
        all: bool,

        /// Confirm the reset. Without this flag nothing is touched.
        #[arg(long)]
        force: bool,
    },

    /// Show live status for every person.
    Status,

    /// Inspect or edit a person's session history.
    Sessions {
        /// Person name or id prefix.
        person: String,

        #[command(subcommand)]
        action: SessionsAction,
    },

    /// Aggregated views over a time window.
    Report {
        /// Time window: 24h, 7d, 30d or all.
        #[arg(long, default_value = "7d")]
        range: TimeRange,

        /// Which aggregation to render.
        #[arg(long, value_enum, default_value = "leaderboard")]
        view: ReportView,
    },

    /// Export person data as CSV to stdout.
    Export {
        /// One row per session instead of one row per person.
        #[arg(long)]
        detailed: bool,
    },

    /// Create a point-in-time backup of the data file.
    Snapshot,
}

/// Session history subcommands.
#[derive(Debug, Subcommand)]
pub enum SessionsAction {
    /// List sessions, including the running one.
    List,

    /// Add a closed session.
    Add {
        /// Start instant (RFC 3339 or local `YYYY-MM-DDTHH:MM`).
        #[arg(long)]
        start: String,

        /// End instant (RFC 3339 or local `YYYY-MM-DDTHH:MM`).
        #[arg(long)]
        end: String,
    },

    /// Edit a session's start and/or end; its duration is recomputed.
    Edit {
        /// Session id (or `current`, which is always refused).
        session: EntryRef,

        /// New start instant.
        #[arg(long)]
        start: Option<String>,

        /// New end instant.
        #[arg(long)]
        end: Option<String>,
    },

    /// Delete a session.
    Delete {
        /// Session id (or `current`, which is always refused).
        session: EntryRef,
    },
}

/// Report renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportView {
    /// Per-day totals across the window.
    Daily,
    /// Running totals over time, per person.
    Cumulative,
    /// Persons ranked by total time.
    Leaderboard,
}
