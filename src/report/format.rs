//! Headline metrics and plain-text tables for the `report`/`forecast`
//! subcommands. The TUI reuses `HeadlineMetrics` for its header panel.

use crate::data::LoadOutcome;
use crate::domain::{DatasetStats, EnrichedObservation, ForecastPoint};

/// The "latest scenario" metrics shown at the top of the dashboard.
#[derive(Debug, Clone)]
pub struct HeadlineMetrics {
    pub last_date: Option<chrono::NaiveDate>,
    pub last_price: Option<f64>,
    /// Mean price over the year preceding the latest observed year.
    pub prev_year_mean: Option<f64>,
}

impl HeadlineMetrics {
    pub fn from_rows(rows: &[EnrichedObservation]) -> Self {
        let last = rows.last();
        let prev_year_mean = last.and_then(|l| {
            let prev_year = l.year - 1;
            let prices: Vec<f64> = rows
                .iter()
                .filter(|r| r.year == prev_year)
                .map(|r| r.price)
                .collect();
            if prices.is_empty() {
                None
            } else {
                Some(prices.iter().sum::<f64>() / prices.len() as f64)
            }
        });

        Self {
            last_date: last.map(|r| r.date),
            last_price: last.map(|r| r.price),
            prev_year_mean,
        }
    }
}

/// Format the run summary: feed provenance, row counts, headline metrics.
pub fn format_summary(
    outcome: &LoadOutcome,
    rows: &[EnrichedObservation],
    stats: &DatasetStats,
) -> String {
    let metrics = HeadlineMetrics::from_rows(rows);
    let mut out = String::new();

    out.push_str("=== brent - Crude Oil Price Report ===\n");
    out.push_str(&format!(
        "Feed rows: read={} used={} rejected={} duplicates={}\n",
        outcome.rows_read,
        outcome.observations.len(),
        outcome.rows_rejected(),
        outcome.duplicates_dropped,
    ));
    out.push_str(&format!(
        "Window: n={} | dates=[{}, {}] | price=[{:.2}, {:.2}] USD\n",
        stats.n_rows,
        fmt_opt_date(stats.date_min),
        fmt_opt_date(stats.date_max),
        stats.price_min,
        stats.price_max,
    ));

    out.push_str("\nLatest scenario:\n");
    out.push_str(&format!("- last update : {}\n", fmt_opt_date(metrics.last_date)));
    out.push_str(&format!(
        "- last price  : {}\n",
        metrics
            .last_price
            .map(|p| format!("${p:.2}"))
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str(&format!(
        "- prev-year mean: {}\n",
        metrics
            .prev_year_mean
            .map(|p| format!("${p:.2}"))
            .unwrap_or_else(|| "-".to_string())
    ));

    if !outcome.row_errors.is_empty() {
        out.push_str("\nRejected rows:\n");
        for err in outcome.row_errors.iter().take(10) {
            out.push_str(&format!("- line {}: {}\n", err.line, err.message));
        }
        if outcome.row_errors.len() > 10 {
            out.push_str(&format!(
                "- ... and {} more\n",
                outcome.row_errors.len() - 10
            ));
        }
    }

    out
}

/// Format the monthly-close table (last observed price per month).
pub fn format_monthly_close(closes: &[EnrichedObservation]) -> String {
    let mut out = String::new();

    out.push_str("Monthly close (last observed price per month):\n");
    out.push_str(&format!(
        "{:<8} {:<6} {:>12} {:>12}\n",
        "month", "label", "date", "price"
    ));
    out.push_str(&format!("{:-<8} {:-<6} {:-<12} {:-<12}\n", "", "", "", ""));

    for row in closes {
        out.push_str(&format!(
            "{:<8} {:<6} {:>12} {:>12.2}\n",
            row.month_key, row.month_abbrev, row.date, row.price
        ));
    }

    out
}

/// Format the forecast table.
pub fn format_forecast(points: &[ForecastPoint]) -> String {
    let mut out = String::new();

    out.push_str(&format!("Forecast ({} days):\n", points.len()));
    out.push_str(&format!(
        "{:>12} {:>10} {:>10} {:>10}\n",
        "date", "yhat", "lower", "upper"
    ));
    out.push_str(&format!("{:-<12} {:-<10} {:-<10} {:-<10}\n", "", "", "", ""));

    for p in points {
        out.push_str(&format!(
            "{:>12} {:>10.2} {:>10.2} {:>10.2}\n",
            p.ds, p.yhat, p.yhat_lower, p.yhat_upper
        ));
    }

    out
}

fn fmt_opt_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{EnrichedObservation, PriceObservation};

    fn row(y: i32, m: u32, d: u32, price: f64) -> EnrichedObservation {
        EnrichedObservation::new(PriceObservation {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            price,
        })
    }

    #[test]
    fn prev_year_mean_uses_the_year_before_the_latest() {
        let rows = vec![
            row(2023, 6, 1, 70.0),
            row(2023, 6, 2, 90.0),
            row(2024, 1, 2, 75.0),
        ];
        let metrics = HeadlineMetrics::from_rows(&rows);
        assert_eq!(metrics.last_date, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(metrics.last_price, Some(75.0));
        assert!((metrics.prev_year_mean.unwrap() - 80.0).abs() < 1e-12);
    }

    #[test]
    fn prev_year_mean_is_none_without_prior_year_data() {
        let rows = vec![row(2020, 1, 2, 66.0)];
        let metrics = HeadlineMetrics::from_rows(&rows);
        assert!(metrics.prev_year_mean.is_none());
    }

    #[test]
    fn monthly_close_table_lists_each_month() {
        let closes = vec![row(2020, 2, 28, 50.52), row(2020, 3, 31, 22.74)];
        let table = format_monthly_close(&closes);
        assert!(table.contains("2020-02"));
        assert!(table.contains("Feb"));
        assert!(table.contains("22.74"));
    }

    #[test]
    fn forecast_table_includes_bounds() {
        let points = vec![ForecastPoint {
            ds: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            yhat: 75.0,
            yhat_lower: 72.5,
            yhat_upper: 77.5,
        }];
        let table = format_forecast(&points);
        assert!(table.contains("75.00"));
        assert!(table.contains("72.50"));
        assert!(table.contains("77.50"));
    }
}
