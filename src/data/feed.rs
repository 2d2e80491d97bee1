//! Brent price feed: HTTP fetch + CSV normalization.
//!
//! The IPEA export is a semicolon-delimited CSV with comma decimal separators
//! and three columns: date, price, and a trailing column we ignore. This
//! module turns it into a clean, date-sorted `PriceObservation` sequence.
//!
//! Design goals:
//! - **Fail fast on transport errors** (single attempt, no retry)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden locale/format guessing)

use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::domain::PriceObservation;
use crate::error::FetchError;

/// Published location of the Brent price CSV.
const DEFAULT_FEED_URL: &str = "https://drive.google.com/uc?id=1ilAXCcKolm_2WAVdiC_1ycQTq5zHMwhj";

/// Environment override for the feed location.
const FEED_URL_VAR: &str = "BRENT_FEED_URL";

/// A row that failed date/price parsing and was excluded from the load.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based data row number (header excluded).
    pub line: usize,
    pub message: String,
}

/// Result pair of a feed load: the clean series plus what was rejected.
///
/// Malformed rows are a policy decision (drop, never abort), but the counts
/// are kept so callers can log or display them instead of losing the
/// information.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Clean observations, sorted ascending by date, one per date.
    pub observations: Vec<PriceObservation>,
    /// Data rows seen in the payload (header excluded).
    pub rows_read: usize,
    /// Rows excluded for unparseable/invalid date or price.
    pub row_errors: Vec<RowError>,
    /// Rows dropped because an observation for the same date already existed
    /// (the later row wins).
    pub duplicates_dropped: usize,
}

impl LoadOutcome {
    pub fn rows_rejected(&self) -> usize {
        self.row_errors.len()
    }
}

pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    /// Resolve the feed URL: explicit override → `BRENT_FEED_URL` → default.
    pub fn from_env(url_override: Option<&str>) -> Self {
        dotenvy::dotenv().ok();
        let url = url_override
            .map(str::to_string)
            .or_else(|| std::env::var(FEED_URL_VAR).ok())
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        Self {
            client: Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the feed. Transport errors are fatal; malformed rows
    /// are excluded and reported in the outcome.
    pub fn load(&self) -> Result<LoadOutcome, FetchError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        let body = resp
            .text()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(parse_feed_csv(&body))
    }
}

/// Parse the raw feed payload into clean observations.
///
/// Exposed separately from the HTTP fetch so parsing is testable offline.
pub fn parse_feed_csv(body: &str) -> LoadOutcome {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut observations: Vec<PriceObservation> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, record) in reader.records().enumerate() {
        let line = idx + 1;
        rows_read += 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("unreadable row: {e}"),
                });
                continue;
            }
        };

        // Columns: [date, price, ignorable]. The third column is dropped
        // positionally; extra trailing columns are ignored the same way.
        match parse_row(&record) {
            Ok(obs) => observations.push(obs),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    // Enforce the invariants: ascending dates, one observation per date.
    // The source is pre-sorted in practice, but we don't rely on it.
    observations.sort_by_key(|o| o.date);
    let before = observations.len();
    dedup_keep_last(&mut observations);
    let duplicates_dropped = before - observations.len();

    LoadOutcome {
        observations,
        rows_read,
        row_errors,
        duplicates_dropped,
    }
}

fn parse_row(record: &csv::StringRecord) -> Result<PriceObservation, String> {
    let date_raw = record
        .get(0)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing date".to_string())?;
    let price_raw = record
        .get(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing price".to_string())?;

    let date = parse_date(date_raw)?;
    let price = parse_price(price_raw)?;

    Ok(PriceObservation { date, price })
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // The feed uses ISO dates; `DD/MM/YYYY` shows up in older IPEA exports,
    // so we accept a small fixed set of formats to keep parsing deterministic.
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("invalid date '{s}'"))
}

/// Parse a comma-decimal price, e.g. `"44,76"` → `44.76`.
fn parse_price(s: &str) -> Result<f64, String> {
    let normalized = s.replace(',', ".");
    let v = normalized
        .parse::<f64>()
        .map_err(|_| format!("invalid price '{s}'"))?;
    if !v.is_finite() {
        return Err(format!("non-finite price '{s}'"));
    }
    if v < 0.0 {
        return Err(format!("negative price '{s}'"));
    }
    Ok(v)
}

/// Deduplicate a date-sorted series in place, keeping the last row per date.
fn dedup_keep_last(observations: &mut Vec<PriceObservation>) {
    let mut out: Vec<PriceObservation> = Vec::with_capacity(observations.len());
    for obs in observations.drain(..) {
        match out.last_mut() {
            Some(last) if last.date == obs.date => *last = obs,
            _ => out.push(obs),
        }
    }
    *observations = out;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_semicolon_comma_decimal_rows() {
        let body = "data;preco;extra\n2020-02-10;44,76;X\n2020-02-11;45,10;X\n";
        let outcome = parse_feed_csv(body);
        assert_eq!(outcome.rows_read, 2);
        assert!(outcome.row_errors.is_empty());
        assert_eq!(outcome.observations.len(), 2);

        let first = outcome.observations[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2020, 2, 10).unwrap());
        assert!((first.price - 44.76).abs() < 1e-12);
    }

    #[test]
    fn malformed_rows_are_dropped_and_counted() {
        let body = "data;preco;extra\n\
                    2020-02-10;44,76;X\n\
                    not-a-date;44,76;X\n\
                    2020-02-12;not-a-price;X\n\
                    2020-02-13;-1,00;X\n";
        let outcome = parse_feed_csv(body);
        assert_eq!(outcome.rows_read, 4);
        assert_eq!(outcome.observations.len(), 1);
        assert_eq!(outcome.rows_rejected(), 3);
        assert_eq!(outcome.row_errors[0].line, 2);
    }

    #[test]
    fn output_is_sorted_and_deduplicated() {
        let body = "data;preco;extra\n\
                    2020-02-11;45,00;X\n\
                    2020-02-10;44,76;X\n\
                    2020-02-11;46,00;X\n";
        let outcome = parse_feed_csv(body);
        let dates: Vec<_> = outcome.observations.iter().map(|o| o.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2020, 2, 10).unwrap(),
                NaiveDate::from_ymd_opt(2020, 2, 11).unwrap(),
            ]
        );
        // Later row wins on a duplicate date.
        assert!((outcome.observations[1].price - 46.0).abs() < 1e-12);
        assert_eq!(outcome.duplicates_dropped, 1);
    }

    #[test]
    fn prices_are_non_negative() {
        let body = "data;preco;extra\n2020-02-10;0,00;X\n";
        let outcome = parse_feed_csv(body);
        assert_eq!(outcome.observations.len(), 1);
        assert!(outcome.observations.iter().all(|o| o.price >= 0.0));
    }
}
