//! Command-line parsing for the Brent dashboard/forecast binary.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the data/forecast code.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "brent", version, about = "Brent crude-oil price dashboard & forecast service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the feed and print the summary + monthly-close report.
    Report(ReportArgs),
    /// Load the trained model and print a forecast.
    Forecast(ForecastArgs),
    /// Serve the JSON prediction endpoint.
    Serve(ServeArgs),
    /// Launch the interactive TUI dashboard.
    ///
    /// This uses the same load/enrich pipeline as `brent report`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(ReportArgs),
}

/// Common options for feed-backed commands (report, tui).
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// Feed URL override (default: $BRENT_FEED_URL or the published feed).
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Model artifact URL override (used by the TUI forecast action).
    #[arg(long)]
    pub model_url: Option<String>,

    /// Drop observations before this date.
    #[arg(long, default_value = "2020-01-01")]
    pub date_floor: NaiveDate,

    /// First year of the inclusive reporting window.
    #[arg(long, default_value_t = 2020)]
    pub year_min: i32,

    /// Last year of the inclusive reporting window.
    #[arg(long, default_value_t = 2024)]
    pub year_max: i32,
}

/// Options for the one-shot forecast command.
#[derive(Debug, Parser)]
pub struct ForecastArgs {
    /// Forecast horizon in days (must be >= 1).
    #[arg(long, default_value_t = 365)]
    pub days: i64,

    /// Model artifact URL override (default: $BRENT_MODEL_URL or the
    /// published artifact).
    #[arg(long)]
    pub model_url: Option<String>,

    /// Print the forecast as JSON records instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Options for the prediction server.
#[derive(Debug, Parser)]
pub struct ServeArgs {
    /// Socket address to bind.
    #[arg(long, default_value = "0.0.0.0:8000")]
    pub bind: String,

    /// Model artifact URL override.
    #[arg(long)]
    pub model_url: Option<String>,
}

impl ReportArgs {
    pub fn enrich_policy(&self) -> crate::domain::EnrichPolicy {
        crate::domain::EnrichPolicy {
            date_floor: self.date_floor,
            year_min: self.year_min,
            year_max: self.year_max,
        }
    }
}
