// =============================================================================
// Runtime Configuration — analyzer settings loaded from JSON
// =============================================================================
//
// Every tunable lives here: where each ticker's CSV is, which tickers to
// analyze, indicator periods, where charts go, and whether to query the
// remote metrics provider.
//
// All fields carry `#[serde(default)]` so that a partial (or empty) JSON file
// still loads, with the missing fields taking their defaults.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::market_data::StockSource;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_sources() -> Vec<StockSource> {
    ["AAPL", "AMZN", "GOOG", "META", "MSFT", "NVDA", "TSLA"]
        .into_iter()
        .map(|t| StockSource::new(t, format!("data/{t}_historical_data.csv")))
        .collect()
}

fn default_chart_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_yahoo_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_sma_period() -> usize {
    20
}

fn default_rsi_period() -> usize {
    14
}

fn default_ema_period() -> usize {
    20
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Look-back periods for the indicator pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_sma_period")]
    pub sma_period: usize,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_ema_period")]
    pub ema_period: usize,

    /// Fast EMA period of the MACD line.
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    /// Slow EMA period of the MACD line.
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    /// EMA period of the MACD signal line.
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_period: default_sma_period(),
            rsi_period: default_rsi_period(),
            ema_period: default_ema_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
        }
    }
}

// =============================================================================
// AnalyzerConfig
// =============================================================================

/// Top-level configuration for an analyzer run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Known `(ticker, CSV path)` pairs. The first entry wins for a ticker
    /// listed more than once.
    #[serde(default = "default_sources")]
    pub sources: Vec<StockSource>,

    /// Tickers to analyze. Empty means every ticker in `sources`.
    #[serde(default)]
    pub tickers: Vec<String>,

    #[serde(default)]
    pub indicators: IndicatorParams,

    /// Directory the HTML charts are written to.
    #[serde(default = "default_chart_dir")]
    pub chart_dir: PathBuf,

    /// Query the remote provider for the financial metrics snapshot.
    #[serde(default = "default_true")]
    pub fetch_metrics: bool,

    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            tickers: Vec::new(),
            indicators: IndicatorParams::default(),
            chart_dir: default_chart_dir(),
            fetch_metrics: true,
            yahoo_base_url: default_yahoo_base_url(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analyzer config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse analyzer config from {}", path.display()))?;

        info!(
            path = %path.display(),
            sources = config.sources.len(),
            tickers = ?config.tickers,
            "analyzer config loaded"
        );

        Ok(config)
    }

    /// The tickers this run covers, in order and without repeats.
    pub fn selected_tickers(&self) -> Vec<String> {
        let candidates: Vec<&String> = if self.tickers.is_empty() {
            self.sources.iter().map(|s| &s.ticker).collect()
        } else {
            self.tickers.iter().collect()
        };

        let mut selected: Vec<String> = Vec::with_capacity(candidates.len());
        for ticker in candidates {
            let ticker = ticker.trim().to_uppercase();
            if !ticker.is_empty() && !selected.contains(&ticker) {
                selected.push(ticker);
            }
        }
        selected
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.sources.len(), 7);
        assert_eq!(cfg.sources[0].ticker, "AAPL");
        assert_eq!(
            cfg.sources[0].path,
            PathBuf::from("data/AAPL_historical_data.csv")
        );
        assert!(cfg.tickers.is_empty());
        assert_eq!(cfg.chart_dir, PathBuf::from("charts"));
        assert!(cfg.fetch_metrics);
        assert_eq!(cfg.indicators.sma_period, 20);
        assert_eq!(cfg.indicators.rsi_period, 14);
        assert_eq!(cfg.indicators.ema_period, 20);
        assert_eq!(
            (cfg.indicators.macd_fast, cfg.indicators.macd_slow, cfg.indicators.macd_signal),
            (12, 26, 9)
        );
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: AnalyzerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.sources, AnalyzerConfig::default().sources);
        assert_eq!(cfg.indicators, IndicatorParams::default());
        assert_eq!(cfg.yahoo_base_url, "https://query1.finance.yahoo.com");
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "sources": [{ "ticker": "AAPL", "path": "a.csv" }],
            "indicators": { "rsi_period": 7 },
            "fetch_metrics": false
        }"#;
        let cfg: AnalyzerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.sources, vec![StockSource::new("AAPL", "a.csv")]);
        assert_eq!(cfg.indicators.rsi_period, 7);
        assert_eq!(cfg.indicators.sma_period, 20);
        assert!(!cfg.fetch_metrics);
        assert_eq!(cfg.chart_dir, PathBuf::from("charts"));
    }

    #[test]
    fn selected_tickers_defaults_to_sources() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(
            cfg.selected_tickers(),
            vec!["AAPL", "AMZN", "GOOG", "META", "MSFT", "NVDA", "TSLA"]
        );
    }

    #[test]
    fn selected_tickers_normalises_and_dedups() {
        let cfg = AnalyzerConfig {
            tickers: vec![" msft".into(), "MSFT".into(), "".into(), "goog".into()],
            ..AnalyzerConfig::default()
        };
        assert_eq!(cfg.selected_tickers(), vec!["MSFT", "GOOG"]);
    }

    #[test]
    fn selected_lowercase_source_still_loads() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "Date,Close\n2024-01-02,1.0\n").unwrap();
        let cfg = AnalyzerConfig {
            sources: vec![StockSource::new("aapl", &path)],
            ..AnalyzerConfig::default()
        };

        let selected = cfg.selected_tickers();
        assert_eq!(selected, vec!["AAPL"]);
        let series = crate::market_data::load_series(&selected[0], &cfg.sources)
            .unwrap()
            .unwrap();
        assert_eq!(series.closes(), &[1.0]);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(AnalyzerConfig::load(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("analyzer_config.json");
        std::fs::write(&path, r#"{ "tickers": ["NVDA"] }"#).unwrap();
        let cfg = AnalyzerConfig::load(&path).unwrap();
        assert_eq!(cfg.selected_tickers(), vec!["NVDA"]);
    }
}
