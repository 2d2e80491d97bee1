//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches and enriches the Brent feed
//! - prints reports/forecasts
//! - starts the TUI or the prediction server

use clap::Parser;

use crate::cli::{Command, ForecastArgs, ReportArgs, ServeArgs};
use crate::data::{ArtifactSource, FeedClient};
use crate::error::AppError;
use crate::forecast::ForecastService;

pub mod pipeline;

/// Entry point for the `brent` binary.
pub fn run() -> Result<(), AppError> {
    // We want `brent` and `brent --year-min 2021` to behave like `brent tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Serve(args) => handle_serve(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let feed = FeedClient::from_env(args.feed_url.as_deref());
    let data = pipeline::load_dashboard_data(&feed, &args.enrich_policy())?;

    print!(
        "{}",
        crate::report::format_summary(&data.outcome, &data.enriched, &data.stats)
    );
    println!();

    let closes = crate::transform::monthly_close(&data.enriched);
    print!("{}", crate::report::format_monthly_close(&closes));

    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let source = ArtifactSource::from_env(args.model_url.as_deref());
    let service = ForecastService::load(&source)
        .map_err(|e| AppError::new(4, format!("Failed to load model from '{}': {e}", source.url())))?;

    let points = service
        .predict(args.days)
        .map_err(|e| AppError::new(2, e.to_string()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&points)
            .map_err(|e| AppError::new(4, format!("Failed to serialize forecast: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", crate::report::format_forecast(&points));
    }

    Ok(())
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    crate::server::run(&args.bind, args.model_url.as_deref())
}

/// Rewrite argv so `brent` defaults to `brent tui`.
///
/// Rules:
/// - `brent`                       -> `brent tui`
/// - `brent --year-min 2021 ...`   -> `brent tui --year-min 2021 ...`
/// - `brent --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "forecast" | "serve" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["brent"])), argv(&["brent", "tui"]));
    }

    #[test]
    fn leading_flag_is_routed_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["brent", "--year-min", "2021"])),
            argv(&["brent", "tui", "--year-min", "2021"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(
            rewrite_args(argv(&["brent", "serve"])),
            argv(&["brent", "serve"])
        );
        assert_eq!(
            rewrite_args(argv(&["brent", "--help"])),
            argv(&["brent", "--help"])
        );
    }
}
