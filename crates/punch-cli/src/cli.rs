//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Attendance clock.
///
/// Records clock-in/out and break punches and reports worked hours per day,
/// even when punches are missing or out of order.
#[derive(Debug, Parser)]
#[command(name = "punch", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database if needed.
    Init,

    /// Show database location, time zone and row counts.
    Status,

    /// Record a punch.
    Record {
        /// Who is punching.
        name: String,

        /// One of: in, out, break_in, break_out.
        kind: String,

        /// When the punch happened (ISO 8601, local "YYYY-MM-DD HH:MM[:SS]",
        /// or relative like "2 hours ago"). Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Show one user's worked hours for recent days.
    Me {
        /// The user to report on.
        name: String,

        /// Number of days, counting back from today.
        #[arg(long, default_value_t = 7)]
        days: u32,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show every user's worked hours for one day.
    Today {
        /// Day to report (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the latest punches recorded today.
    Recent,

    /// Export punches as CSV.
    Export {
        /// First day (YYYY-MM-DD).
        #[arg(long)]
        from: NaiveDate,

        /// Last day, inclusive (YYYY-MM-DD).
        #[arg(long)]
        to: NaiveDate,

        /// File or directory to write to. Writes to stdout if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
