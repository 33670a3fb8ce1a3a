//! `stay` CLI — rolling-year statistics and empty periods from planner snapshots.
//!
//! ## Usage
//!
//! ```sh
//! # Member stats as of today (snapshot on stdin)
//! stay stats < family-planner-data.json
//!
//! # Member stats for a what-if reference date, strict window test
//! stay stats -i planner.json --date 2026-12-01 --strict-window --pretty
//!
//! # Date ranges with nobody present
//! stay empty -i planner.json --today 2026-10-17
//!
//! # Rewrite a legacy snapshot (memberId -> memberIds)
//! stay migrate -i old.json -o new.json
//!
//! # Export trips as CSV
//! stay export-csv -i planner.json -o trips.csv
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` or pass `-v` for more detail.

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stay_engine::rolling::{compute_state_stats, WindowPredicate};
use stay_engine::{compute_empty_periods, persistence, PlannerState};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stay",
    version,
    about = "Rolling-year stay accounting for family travel plans"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-member presence, rolling-year day counts, and active warnings
    Stats {
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Reference date as yyyy-MM-dd (defaults to today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        /// Only highlight trips that actually overlap the year around the reference date
        #[arg(long)]
        strict_window: bool,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Date ranges in which no member is present
    Empty {
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Date to treat as today, yyyy-MM-dd (defaults to today)
        #[arg(long, value_parser = parse_date_arg)]
        today: Option<NaiveDate>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Rewrite a snapshot in the current format
    Migrate {
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Export trips as CSV, one row per traveling member
    ExportCsv {
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Stats {
            input,
            date,
            strict_window,
            pretty,
        } => {
            let state = read_state(input.as_deref())?;
            let reference = date.unwrap_or_else(today);
            let window = if strict_window {
                WindowPredicate::Overlapping
            } else {
                WindowPredicate::Either
            };
            debug!(%reference, ?window, members = state.members.len(), "computing member stats");
            let stats = compute_state_stats(&state, reference, window);
            println!("{}", to_json(&stats, pretty)?);
        }
        Commands::Empty {
            input,
            today: today_arg,
            pretty,
        } => {
            let state = read_state(input.as_deref())?;
            let today = today_arg.unwrap_or_else(today);

            debug!(%today, trips = state.trips.len(), "computing empty periods");
            let periods = compute_empty_periods(&state.trips, &state.members, today);
            println!("{}", to_json(&periods, pretty)?);
        }
        Commands::Migrate { input, output } => {
            let state = read_state(input.as_deref())?;
            let json = serde_json::to_string_pretty(&state)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::ExportCsv { input, output } => {
            let state = read_state(input.as_deref())?;
            let csv = stay_engine::export::trips_to_csv(&state).context("Failed to export trips")?;
            write_output(output.as_deref(), &csv)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(io::stderr)
        .init();
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    stay_engine::parse_date(s).map_err(|e| e.to_string())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn read_state(path: Option<&str>) -> Result<PlannerState> {
    let text = read_input(path)?;
    persistence::parse_snapshot(&text).context("Failed to parse planner snapshot")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
