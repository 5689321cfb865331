//! Command-line interface for hydromon.
//!
//! This module provides the CLI structure and argument parsing for the
//! `hydromon` binary.

mod commands;

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, ExportCommand, ListCommand, OutputFormat,
    PlantTypeArg, StatsCommand,
};

use crate::error::{Error, Result};

/// hydromon - Keep records of your hydroponic plants
///
/// Log per-plant EC/pH measurements with notes and photos, filter them by
/// date range, compute aggregate statistics, and export to CSV.
#[derive(Debug, Parser)]
#[command(name = "hydromon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List a plant's entries, optionally restricted to a date range
    List(ListCommand),

    /// Record a new monitoring entry
    Add(AddCommand),

    /// Delete an entry (and its attached photo)
    Delete(DeleteCommand),

    /// Show aggregate statistics for a plant
    Stats(StatsCommand),

    /// Export a plant's entries to CSV
    Export(ExportCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

/// Parse a user-supplied date argument.
///
/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` calendar date,
/// which is taken to mean midnight UTC (matching how date bounds were
/// interpreted upstream of the service).
///
/// # Errors
///
/// Returns [`Error::Parse`] when the input is neither form.
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| {
            Error::parse(
                "date",
                format!("'{input}' is not a YYYY-MM-DD date or RFC 3339 timestamp"),
            )
        })
}
