//! Time tracker CLI library.
//!
//! This crate provides the CLI interface for the timehogger tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ReportView, SessionsAction};
pub use config::Config;
