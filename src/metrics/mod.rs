// =============================================================================
// Financial metrics snapshot
// =============================================================================
//
// Six headline figures per ticker, read from a remote key/value bag.  A field
// the provider does not report becomes `N/A`; it never fails the snapshot.
// =============================================================================

pub mod yahoo;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, instrument};

pub use yahoo::YahooClient;

/// Sentinel shown for metrics the provider did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// Display name and provider key of every metric, in snapshot order.
pub const METRIC_FIELDS: [(&str, &str); 6] = [
    ("P/E Ratio", "forwardPE"),
    ("Market Cap", "marketCap"),
    ("Dividend Yield", "dividendYield"),
    ("Beta", "beta"),
    ("EPS", "trailingEps"),
    ("Revenue", "totalRevenue"),
];

/// A remote source of per-ticker key/value data.
#[async_trait]
pub trait MetricsSource {
    /// Every numeric field the provider reports for `symbol`.
    async fn info(&self, symbol: &str) -> Result<HashMap<String, f64>>;
}

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Value(f64),
    NotAvailable,
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// The six metrics for one ticker, always in [`METRIC_FIELDS`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialMetrics {
    pub symbol: String,
    entries: Vec<(&'static str, MetricValue)>,
}

impl FinancialMetrics {
    /// Pick the six metrics out of a provider bag.
    pub fn from_info(symbol: impl Into<String>, info: &HashMap<String, f64>) -> Self {
        let entries = METRIC_FIELDS
            .iter()
            .map(|(name, key)| {
                let value = info
                    .get(*key)
                    .copied()
                    .map_or(MetricValue::NotAvailable, MetricValue::Value);
                (*name, value)
            })
            .collect();

        Self {
            symbol: symbol.into(),
            entries,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, MetricValue)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn available(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, v)| *v != MetricValue::NotAvailable)
            .count()
    }
}

/// Serialises as a JSON object keyed by metric name, in snapshot order.
impl Serialize for FinancialMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
impl FinancialMetrics {
    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Query `source` for `symbol` and build the six-field snapshot.
///
/// Missing fields come back as [`MetricValue::NotAvailable`]; only a failure
/// of the request itself is an error.
#[instrument(skip(source), name = "metrics::fetch")]
pub async fn fetch_metrics<S>(source: &S, symbol: &str) -> Result<FinancialMetrics>
where
    S: MetricsSource + ?Sized + Sync,
{
    let info = source.info(symbol).await?;
    let metrics = FinancialMetrics::from_info(symbol, &info);
    debug!(
        symbol,
        reported = info.len(),
        available = metrics.available(),
        "financial metrics assembled"
    );
    Ok(metrics)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource(HashMap<String, f64>);

    #[async_trait]
    impl MetricsSource for StaticSource {
        async fn info(&self, _symbol: &str) -> Result<HashMap<String, f64>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl MetricsSource for FailingSource {
        async fn info(&self, symbol: &str) -> Result<HashMap<String, f64>> {
            anyhow::bail!("no route to provider for {symbol}")
        }
    }

    fn bag(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[tokio::test]
    async fn full_bag_maps_every_metric() {
        let source = StaticSource(bag(&[
            ("forwardPE", 28.5),
            ("marketCap", 3.0e12),
            ("dividendYield", 0.0044),
            ("beta", 1.24),
            ("trailingEps", 6.42),
            ("totalRevenue", 3.85e11),
            ("fiftyTwoWeekHigh", 199.6),
        ]));
        let metrics = fetch_metrics(&source, "AAPL").await.unwrap();

        assert_eq!(metrics.symbol, "AAPL");
        assert_eq!(metrics.len(), 6);
        assert_eq!(metrics.get("P/E Ratio"), Some(MetricValue::Value(28.5)));
        assert_eq!(metrics.get("Market Cap"), Some(MetricValue::Value(3.0e12)));
        assert_eq!(metrics.get("Dividend Yield"), Some(MetricValue::Value(0.0044)));
        assert_eq!(metrics.get("Beta"), Some(MetricValue::Value(1.24)));
        assert_eq!(metrics.get("EPS"), Some(MetricValue::Value(6.42)));
        assert_eq!(metrics.get("Revenue"), Some(MetricValue::Value(3.85e11)));
        assert_eq!(metrics.available(), 6);
    }

    #[tokio::test]
    async fn missing_fields_become_not_available() {
        let source = StaticSource(bag(&[("beta", 0.9)]));
        let metrics = fetch_metrics(&source, "GOOG").await.unwrap();

        assert_eq!(metrics.len(), 6);
        assert_eq!(metrics.get("Beta"), Some(MetricValue::Value(0.9)));
        for name in ["P/E Ratio", "Market Cap", "Dividend Yield", "EPS", "Revenue"] {
            assert_eq!(metrics.get(name), Some(MetricValue::NotAvailable), "{name}");
        }
    }

    #[tokio::test]
    async fn empty_bag_still_has_six_keys() {
        let metrics = fetch_metrics(&StaticSource(HashMap::new()), "TSLA")
            .await
            .unwrap();
        let names: Vec<&str> = metrics.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["P/E Ratio", "Market Cap", "Dividend Yield", "Beta", "EPS", "Revenue"]
        );
        assert_eq!(metrics.available(), 0);
    }

    #[tokio::test]
    async fn request_failure_is_an_error() {
        let err = fetch_metrics(&FailingSource, "AMZN").await.unwrap_err();
        assert!(err.to_string().contains("AMZN"));
    }

    #[test]
    fn serialises_numbers_and_sentinel_in_order() {
        let metrics = FinancialMetrics::from_info("META", &bag(&[("forwardPE", 22.0)]));
        let json = serde_json::to_string(&metrics).unwrap();
        assert_eq!(
            json,
            r#"{"P/E Ratio":22.0,"Market Cap":"N/A","Dividend Yield":"N/A","Beta":"N/A","EPS":"N/A","Revenue":"N/A"}"#
        );
    }

    #[test]
    fn display_uses_sentinel() {
        assert_eq!(MetricValue::NotAvailable.to_string(), "N/A");
        assert_eq!(MetricValue::Value(1.5).to_string(), "1.5");
    }
}
