use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{PriceSeries, SeriesInvariantError, CLOSE};

/// Header of the column used as the series index.
pub const DATE: &str = "Date";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A ticker and the CSV file holding its daily history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSource {
    pub ticker: String,
    pub path: PathBuf,
}

impl StockSource {
    pub fn new(ticker: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            ticker: ticker.into(),
            path: path.into(),
        }
    }
}

/// Failure to turn a CSV file into a [`PriceSeries`].
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no `{column}` column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{} line {line}: {reason}", .path.display())]
    InvalidRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("invalid series in {}: {source}", .path.display())]
    Invariant {
        path: PathBuf,
        #[source]
        source: SeriesInvariantError,
    },
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Resolve `ticker` against `sources` and load the first matching file.
///
/// Tickers match after trimming, ignoring ASCII case. An unknown ticker is
/// not an error: it yields `Ok(None)`. When the same ticker is listed more
/// than once only the first entry is consulted.
pub fn load_series(
    ticker: &str,
    sources: &[StockSource],
) -> Result<Option<PriceSeries>, SeriesError> {
    let ticker = ticker.trim();
    let Some(source) = sources
        .iter()
        .find(|s| s.ticker.trim().eq_ignore_ascii_case(ticker))
    else {
        debug!(ticker, known = sources.len(), "no source registered for ticker");
        return Ok(None);
    };

    read_price_csv(ticker, &source.path).map(Some)
}

/// Parse a CSV with `Date` and `Close` columns into a [`PriceSeries`].
///
/// * Extra columns are ignored and the two required columns may appear in any
///   position.
/// * Rows whose close is blank or `null` are skipped.
/// * Dates must be strictly increasing; closes must be non-negative numbers.
pub fn read_price_csv(ticker: &str, path: impl AsRef<Path>) -> Result<PriceSeries, SeriesError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|source| SeriesError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let csv_err = |source| SeriesError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(csv_err)?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SeriesError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
    };
    let date_idx = column(DATE)?;
    let close_idx = column(CLOSE)?;

    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut closes = Vec::new();
    let mut skipped = 0usize;

    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let line = record
            .position()
            .map_or(idx as u64 + 2, |p| p.line());
        let invalid = |reason: String| SeriesError::InvalidRow {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let raw_close = record.get(close_idx).unwrap_or_default();
        if raw_close.is_empty() || raw_close.eq_ignore_ascii_case("null") {
            skipped += 1;
            continue;
        }

        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = parse_date(raw_date)
            .ok_or_else(|| invalid(format!("unparseable date `{raw_date}`")))?;

        let close: f64 = raw_close
            .parse()
            .map_err(|_| invalid(format!("close `{raw_close}` is not a number")))?;
        if !close.is_finite() || close < 0.0 {
            return Err(invalid(format!("close {close} is not a valid price")));
        }

        if let Some(previous) = dates.last() {
            if date <= *previous {
                return Err(invalid(format!("date {date} does not follow {previous}")));
            }
        }

        dates.push(date);
        closes.push(close);
    }

    if skipped > 0 {
        debug!(ticker, skipped, "rows without a close price skipped");
    }

    let series = PriceSeries::new(ticker, dates, closes).map_err(|source| {
        SeriesError::Invariant {
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!(
        ticker,
        path = %path.display(),
        rows = series.len(),
        "price series loaded"
    );

    Ok(series)
}

/// Accept `YYYY-MM-DD`, optionally followed by a time part separated by a
/// space or `T`.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.split(|c: char| c == ' ' || c == 'T').next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
