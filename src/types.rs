// =============================================================================
// Shared types used across the analyzer
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Name of the source price column, as it appears in CSV headers and charts.
pub const CLOSE: &str = "Close";

/// Broken [`PriceSeries`] invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesInvariantError {
    #[error("date {date} does not follow {previous}")]
    NonIncreasingDate { previous: NaiveDate, date: NaiveDate },

    #[error("close {close} on {date} is not a finite non-negative price")]
    InvalidClose { date: NaiveDate, close: f64 },

    #[error("{dates} dates but {closes} closes")]
    LengthMismatch { dates: usize, closes: usize },
}

// -----------------------------------------------------------------------------
// PriceSeries
// -----------------------------------------------------------------------------

/// Daily closing prices for one ticker, indexed by strictly increasing date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
}

impl PriceSeries {
    /// Build a series, checking date order and close validity.
    pub fn new(
        ticker: impl Into<String>,
        dates: Vec<NaiveDate>,
        closes: Vec<f64>,
    ) -> Result<Self, SeriesInvariantError> {
        if dates.len() != closes.len() {
            return Err(SeriesInvariantError::LengthMismatch {
                dates: dates.len(),
                closes: closes.len(),
            });
        }

        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(SeriesInvariantError::NonIncreasingDate {
                    previous: pair[0],
                    date: pair[1],
                });
            }
        }

        if let Some((date, close)) = dates
            .iter()
            .zip(&closes)
            .find(|(_, c)| !c.is_finite() || **c < 0.0)
        {
            return Err(SeriesInvariantError::InvalidClose {
                date: *date,
                close: *close,
            });
        }

        Ok(Self {
            ticker: ticker.into(),
            dates,
            closes,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Indicator columns
// -----------------------------------------------------------------------------

/// Derived columns attached by the indicator pipeline, in attachment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorColumn {
    #[serde(rename = "SMA")]
    Sma,
    #[serde(rename = "RSI")]
    Rsi,
    #[serde(rename = "EMA")]
    Ema,
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "MACD_Signal")]
    MacdSignal,
}

impl IndicatorColumn {
    pub const ALL: [IndicatorColumn; 5] = [
        Self::Sma,
        Self::Rsi,
        Self::Ema,
        Self::Macd,
        Self::MacdSignal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sma => "SMA",
            Self::Rsi => "RSI",
            Self::Ema => "EMA",
            Self::Macd => "MACD",
            Self::MacdSignal => "MACD_Signal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl std::fmt::Display for IndicatorColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Named indicator columns aligned to a [`PriceSeries`] index.
///
/// `None` marks entries that are undefined because the look-back window has
/// not filled yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSet {
    columns: Vec<(IndicatorColumn, Vec<Option<f64>>)>,
}

impl IndicatorSet {
    /// Append a column. Replaces an existing column of the same kind in place
    /// so the attachment order never changes.
    pub fn insert(&mut self, column: IndicatorColumn, values: Vec<Option<f64>>) {
        match self.columns.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = values,
            None => self.columns.push((column, values)),
        }
    }

    pub fn get(&self, column: IndicatorColumn) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v.as_slice())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(c, _)| c.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndicatorColumn, &[Option<f64>])> {
        self.columns.iter().map(|(c, v)| (*c, v.as_slice()))
    }
}

// -----------------------------------------------------------------------------
// AnalyzedSeries
// -----------------------------------------------------------------------------

/// A price series together with the indicators computed from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedSeries {
    pub series: PriceSeries,
    pub indicators: IndicatorSet,
}

impl AnalyzedSeries {
    /// Look up a column by its display name (`Close` or an indicator name).
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        if name == CLOSE {
            return Some(self.series.closes().iter().copied().map(Some).collect());
        }
        let column = IndicatorColumn::from_name(name)?;
        self.indicators.get(column).map(<[_]>::to_vec)
    }

    /// Most recent defined value of an indicator, with its date.
    pub fn latest(&self, column: IndicatorColumn) -> Option<(NaiveDate, f64)> {
        let values = self.indicators.get(column)?;
        self.series
            .dates()
            .iter()
            .zip(values)
            .rev()
            .find_map(|(d, v)| v.map(|v| (*d, v)))
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn series_rejects_unordered_dates() {
        let err = PriceSeries::new("AAPL", vec![day(2), day(2)], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            SeriesInvariantError::NonIncreasingDate {
                previous: day(2),
                date: day(2)
            }
        );
    }

    #[test]
    fn series_rejects_negative_close() {
        let err = PriceSeries::new("AAPL", vec![day(1), day(2)], vec![1.0, -2.0]).unwrap_err();
        assert!(matches!(err, SeriesInvariantError::InvalidClose { .. }));
    }

    #[test]
    fn series_rejects_length_mismatch() {
        let err = PriceSeries::new("AAPL", vec![day(1)], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, SeriesInvariantError::LengthMismatch { .. }));
    }

    #[test]
    fn indicator_names_round_trip() {
        for column in IndicatorColumn::ALL {
            assert_eq!(IndicatorColumn::from_name(column.name()), Some(column));
        }
        assert_eq!(IndicatorColumn::from_name("Close"), None);
    }

    #[test]
    fn insert_keeps_first_position() {
        let mut set = IndicatorSet::default();
        set.insert(IndicatorColumn::Sma, vec![None]);
        set.insert(IndicatorColumn::Rsi, vec![None]);
        set.insert(IndicatorColumn::Sma, vec![Some(1.0)]);
        assert_eq!(set.names(), vec!["SMA", "RSI"]);
        assert_eq!(set.get(IndicatorColumn::Sma), Some(&[Some(1.0)][..]));
    }

    #[test]
    fn analyzed_column_lookup() {
        let series = PriceSeries::new("AAPL", vec![day(1), day(2)], vec![10.0, 11.0]).unwrap();
        let mut indicators = IndicatorSet::default();
        indicators.insert(IndicatorColumn::Ema, vec![None, Some(10.5)]);
        let analyzed = AnalyzedSeries { series, indicators };

        assert_eq!(analyzed.column("Close"), Some(vec![Some(10.0), Some(11.0)]));
        assert_eq!(analyzed.column("EMA"), Some(vec![None, Some(10.5)]));
        assert_eq!(analyzed.column("RSI"), None);
        assert_eq!(analyzed.latest(IndicatorColumn::Ema), Some((day(2), 10.5)));
    }
}
