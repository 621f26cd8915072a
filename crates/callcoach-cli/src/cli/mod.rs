//! CLI command definitions for the `callcoach` binary.

pub mod call;
pub mod coach;
pub mod model;
pub mod rep;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color};

/// Coach sales reps from their call transcripts.
#[derive(Parser)]
#[command(name = "callcoach", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a coaching analysis on a call transcript.
    Coach {
        /// Call to analyze.
        call_id: String,

        /// Model id (see `callcoach models`). Defaults to the configured model.
        #[arg(long, short)]
        model: Option<String>,
    },

    /// Show every coaching run recorded for a call, newest first.
    History {
        call_id: String,
    },

    /// Import a call and its transcript from a JSON file.
    Import {
        /// Path to a `{"call": {...}, "segments": [...]}` document.
        file: PathBuf,
    },

    /// List calls, newest first, with coaching status.
    #[command(alias = "ls")]
    Calls,

    /// Show a call's metadata, transcript and latest coaching.
    Call {
        call_id: String,
    },

    /// List reps with call counts and average scores.
    Reps,

    /// Show a rep's skill trends and recent coaching.
    Rep {
        rep_id: String,
    },

    /// List the models available for coaching.
    Models,
}

/// Table cell for a 1-5 (or averaged) score, colored by band.
pub(crate) fn score_cell(score: f64) -> Cell {
    let color = if score >= 4.0 {
        Color::Green
    } else if score >= 3.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{score:.1}")).fg(color)
}

pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

pub(crate) fn format_duration(duration_sec: u32) -> String {
    format!("{}m {:02}s", duration_sec / 60, duration_sec % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m 00s");
        assert_eq!(format_duration(1805), "30m 05s");
    }

    #[test]
    fn test_format_timestamp() {
        let dt = DateTime::parse_from_rfc3339("2026-03-02T15:04:59Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(&dt), "2026-03-02 15:04");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["callcoach", "rep", "rep-1", "-vv", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
    }
}
