//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - price observations as loaded from the feed (`PriceObservation`)
//! - calendar-enriched rows used by the dashboard (`EnrichedObservation`)
//! - forecast output points (`ForecastPoint`)
//! - the enrichment policy window (`EnrichPolicy`)

pub mod types;

pub use types::*;
