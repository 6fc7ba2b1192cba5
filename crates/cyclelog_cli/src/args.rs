//! Command-line definition.
//!
//! Global flags may appear before or after the subcommand. Unknown flags and
//! stray positionals are usage errors (exit code 2).

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cyclelog_core::{EntryId, RECENT_DEFAULT_LIMIT, SERIES_DEFAULT_LIMIT};
use std::path::PathBuf;

/// cyclelog: cycle ledger over one SQLite file.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "cyclelog")]
#[command(about = "Cycle ledger with forecast and statistics")]
#[command(long_about = None)]
pub struct Cli {
    /// SQLite file (defaults to CYCLELOG_DB_PATH or the temp dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Pin "today" instead of reading the system clock
    #[arg(long, global = true, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub today: Option<NaiveDate>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record a cycle start
    Add {
        #[arg(value_name = "YYYY-MM-DD", value_parser = parse_date)]
        date: NaiveDate,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete one or more entries as one batch
    Delete {
        #[arg(value_name = "ID", required = true, value_parser = parse_id)]
        ids: Vec<EntryId>,
    },

    /// Every entry, oldest first
    List,

    /// Most recent entries
    Recent {
        #[arg(long, default_value_t = RECENT_DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Cycle lengths for charting
    Series {
        #[arg(long, default_value_t = SERIES_DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Import date,notes rows
    Import {
        path: PathBuf,

        /// Show what would be imported without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Write export text (stdout by default)
    Export { path: Option<PathBuf> },

    /// Next expected start
    Forecast,

    /// Average, deviation and phase
    Stats,

    /// Verify stored cycle lengths
    Check,

    /// Print the core version
    Version,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date `{raw}`; expected YYYY-MM-DD"))
}

fn parse_id(raw: &str) -> Result<EntryId, String> {
    uuid::Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid entry id `{raw}`"))
}
