//! Data transformer: enrichment, filtering, and monthly aggregation.
//!
//! All functions here are pure over slices and preserve the input's relative
//! order (the feed loader guarantees chronological order), so the dashboard
//! and reports can layer filters without re-sorting.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::{EnrichedObservation, EnrichPolicy, PriceObservation};

/// Apply the policy window and derive calendar fields.
///
/// Drops observations before `policy.date_floor`, then restricts to the
/// inclusive `[year_min, year_max]` window.
pub fn enrich(observations: &[PriceObservation], policy: &EnrichPolicy) -> Vec<EnrichedObservation> {
    observations
        .iter()
        .filter(|o| o.date >= policy.date_floor)
        .map(|o| EnrichedObservation::new(*o))
        .filter(|r| r.year >= policy.year_min && r.year <= policy.year_max)
        .collect()
}

/// Inclusive date-range filter plus optional year restriction.
///
/// An empty `years` set means "no year restriction" and passes every row
/// through — deliberately distinct from selecting all years explicitly.
pub fn filter_range(
    rows: &[EnrichedObservation],
    start: NaiveDate,
    end: NaiveDate,
    years: &BTreeSet<i32>,
) -> Vec<EnrichedObservation> {
    rows.iter()
        .filter(|r| r.date >= start && r.date <= end)
        .filter(|r| years.is_empty() || years.contains(&r.year))
        .cloned()
        .collect()
}

/// Keep the last-dated row per month-key: a synthetic "month-end" value.
///
/// "Last" means last *observed*, not calendar month-end — the feed skips
/// weekends and holidays. Input must be sorted ascending by date (the loader
/// guarantees this); output stays chronological.
pub fn monthly_close(rows: &[EnrichedObservation]) -> Vec<EnrichedObservation> {
    let mut out: Vec<EnrichedObservation> = Vec::new();
    for row in rows {
        match out.last_mut() {
            Some(last) if last.month_key == row.month_key => {
                if row.date >= last.date {
                    *last = row.clone();
                }
            }
            _ => out.push(row.clone()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(y: i32, m: u32, d: u32, price: f64) -> PriceObservation {
        PriceObservation {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            price,
        }
    }

    fn enriched(y: i32, m: u32, d: u32, price: f64) -> EnrichedObservation {
        EnrichedObservation::new(obs(y, m, d, price))
    }

    #[test]
    fn enrich_applies_floor_and_year_window() {
        let observations = vec![
            obs(2019, 12, 31, 60.0),
            obs(2020, 1, 2, 61.0),
            obs(2024, 12, 30, 74.0),
            obs(2025, 1, 2, 75.0),
        ];
        let rows = enrich(&observations, &EnrichPolicy::default());
        let years: Vec<_> = rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2020, 2024]);
    }

    #[test]
    fn filter_range_is_inclusive_and_idempotent() {
        let rows = vec![
            enriched(2020, 2, 10, 44.76),
            enriched(2020, 2, 11, 45.0),
            enriched(2020, 2, 12, 46.0),
        ];
        let start = NaiveDate::from_ymd_opt(2020, 2, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 2, 11).unwrap();
        let years = BTreeSet::new();

        let once = filter_range(&rows, start, end, &years);
        assert_eq!(once.len(), 2);
        assert!(once.iter().all(|r| r.date >= start && r.date <= end));

        let twice = filter_range(&once, start, end, &years);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_year_set_is_a_pass_through() {
        let rows = vec![enriched(2020, 3, 2, 50.0), enriched(2021, 3, 2, 60.0)];
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();

        let all = filter_range(&rows, start, end, &BTreeSet::new());
        assert_eq!(all.len(), 2);

        let only_2021: BTreeSet<i32> = [2021].into_iter().collect();
        let filtered = filter_range(&rows, start, end, &only_2021);
        assert_eq!(filtered.len(), 1);
        assert!(filtered.iter().all(|r| r.year == 2021));
    }

    #[test]
    fn monthly_close_keeps_max_dated_row_per_month() {
        let rows = vec![
            enriched(2020, 2, 10, 44.76),
            enriched(2020, 2, 28, 50.52),
            enriched(2020, 3, 2, 51.9),
            enriched(2020, 3, 31, 22.74),
        ];
        let closes = monthly_close(&rows);
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].date, NaiveDate::from_ymd_opt(2020, 2, 28).unwrap());
        assert_eq!(closes[1].date, NaiveDate::from_ymd_opt(2020, 3, 31).unwrap());
        assert!((closes[1].price - 22.74).abs() < 1e-12);
    }

    #[test]
    fn monthly_close_is_at_most_one_row_per_month_key() {
        let rows = vec![
            enriched(2020, 2, 10, 1.0),
            enriched(2020, 2, 11, 2.0),
            enriched(2020, 2, 12, 3.0),
        ];
        let closes = monthly_close(&rows);
        assert_eq!(closes.len(), 1);
        assert_eq!(closes[0].month_key, "2020-02");
    }
}
