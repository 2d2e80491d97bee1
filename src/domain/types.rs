//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the transform/report code
//! - rendered in the TUI
//! - exported as JSON by the prediction endpoint

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Locale-independent three-letter month tokens (1-indexed by month number).
const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A single (date, price) observation from the Brent feed.
///
/// Invariants after load: one observation per date, dates ascending when the
/// sequence is sorted, price non-negative. Immutable after load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    /// Price in USD per barrel.
    pub price: f64,
}

/// A price observation plus calendar fields derived from `date`.
///
/// The derived fields are pure functions of `date` (see `EnrichedObservation::new`)
/// and are never stored independently of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedObservation {
    pub date: NaiveDate,
    pub price: f64,
    /// Year-month grouping key, e.g. `"2020-02"`.
    pub month_key: String,
    /// Weekday index, 0 = Monday .. 6 = Sunday.
    pub weekday: u32,
    pub year: i32,
    /// Three-letter month token, e.g. `"Feb"`.
    pub month_abbrev: &'static str,
}

impl EnrichedObservation {
    pub fn new(obs: PriceObservation) -> Self {
        let date = obs.date;
        Self {
            date,
            price: obs.price,
            month_key: format!("{:04}-{:02}", date.year(), date.month()),
            weekday: date.weekday().num_days_from_monday(),
            year: date.year(),
            month_abbrev: MONTH_ABBREV[date.month0() as usize],
        }
    }
}

/// One forecasted day: point prediction plus interval bounds.
///
/// Field names match the prediction endpoint's wire format.
/// Invariant: `yhat_lower <= yhat <= yhat_upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Enrichment policy window.
///
/// The original report hardcoded these (floor 2020-01-01, years 2020–2024);
/// here they are named configuration so the pipeline can be reused on other
/// slices of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichPolicy {
    /// Observations strictly before this date are dropped.
    pub date_floor: NaiveDate,
    /// Inclusive year window applied after enrichment.
    pub year_min: i32,
    pub year_max: i32,
}

impl Default for EnrichPolicy {
    fn default() -> Self {
        Self {
            // Dataset-specific defaults for the 2020-2024 Brent report.
            date_floor: NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid literal date"),
            year_min: 2020,
            year_max: 2024,
        }
    }
}

/// Summary stats about the enriched rows actually shown/reported.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
    pub price_min: f64,
    pub price_max: f64,
}

impl DatasetStats {
    pub fn from_rows(rows: &[EnrichedObservation]) -> Self {
        let (mut price_min, mut price_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for r in rows {
            price_min = price_min.min(r.price);
            price_max = price_max.max(r.price);
        }
        Self {
            n_rows: rows.len(),
            date_min: rows.first().map(|r| r.date),
            date_max: rows.last().map(|r| r.date),
            price_min,
            price_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrichment_derives_calendar_fields() {
        // 2020-02-10 is a Monday.
        let obs = PriceObservation {
            date: NaiveDate::from_ymd_opt(2020, 2, 10).unwrap(),
            price: 44.76,
        };
        let row = EnrichedObservation::new(obs);
        assert_eq!(row.month_key, "2020-02");
        assert_eq!(row.weekday, 0);
        assert_eq!(row.year, 2020);
        assert_eq!(row.month_abbrev, "Feb");
    }

    #[test]
    fn weekday_is_monday_based() {
        // 2020-02-16 is a Sunday.
        let obs = PriceObservation {
            date: NaiveDate::from_ymd_opt(2020, 2, 16).unwrap(),
            price: 50.0,
        };
        assert_eq!(EnrichedObservation::new(obs).weekday, 6);
    }
}
