//! Shared "load + enrich" pipeline used by the CLI report and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! feed fetch -> parse/clean -> enrich (policy window + calendar fields)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::{FeedClient, LoadOutcome};
use crate::domain::{DatasetStats, EnrichPolicy, EnrichedObservation};
use crate::error::AppError;

/// All computed outputs of a single feed load.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub outcome: LoadOutcome,
    pub enriched: Vec<EnrichedObservation>,
    pub stats: DatasetStats,
}

/// Fetch the feed and enrich it under the given policy.
pub fn load_dashboard_data(
    feed: &FeedClient,
    policy: &EnrichPolicy,
) -> Result<DashboardData, AppError> {
    let outcome = feed
        .load()
        .map_err(|e| AppError::new(3, format!("Brent feed {e} ({})", feed.url())))?;

    let enriched = crate::transform::enrich(&outcome.observations, policy);
    let stats = DatasetStats::from_rows(&enriched);

    Ok(DashboardData {
        outcome,
        enriched,
        stats,
    })
}
