// =============================================================================
// Stock Lens — Main Entry Point
// =============================================================================
//
// One pass per configured ticker: load its CSV history, attach the technical
// indicators, write the four interactive charts, then fetch the financial
// metrics snapshot.  Tickers are processed one after another; a failure for
// one ticker is logged and the run moves on to the next.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod charts;
mod indicators;
mod market_data;
mod metrics;
mod pipeline;
mod runtime_config;
mod types;

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::charts::{ChartRenderer, HtmlChartRenderer};
use crate::indicators::rsi::rsi_zone;
use crate::market_data::load_series;
use crate::metrics::{fetch_metrics, FinancialMetrics, YahooClient};
use crate::pipeline::IndicatorPipeline;
use crate::runtime_config::AnalyzerConfig;
use crate::types::{AnalyzedSeries, IndicatorColumn};

const CONFIG_PATH: &str = "analyzer_config.json";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Stock Lens — starting up");

    let config = AnalyzerConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AnalyzerConfig::default()
    });

    let tickers = config.selected_tickers();
    let pipeline = IndicatorPipeline::new(config.indicators);
    let renderer = HtmlChartRenderer::new(&config.chart_dir);

    info!(tickers = ?tickers, params = ?pipeline.params(), "Configured analysis");

    // ── 2. Metrics provider ──────────────────────────────────────────────
    let yahoo = if config.fetch_metrics {
        match YahooClient::new(&config.yahoo_base_url) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "Metrics client unavailable, skipping metrics");
                None
            }
        }
    } else {
        info!("Metrics fetch disabled by config");
        None
    };

    // ── 3. Per-ticker pass ───────────────────────────────────────────────
    let mut analyzed = 0usize;
    for ticker in &tickers {
        match analyze_ticker(ticker, &config, &pipeline, &renderer) {
            Ok(true) => analyzed += 1,
            Ok(false) => warn!(ticker = %ticker, "No CSV source configured for ticker"),
            Err(e) => error!(ticker = %ticker, error = %e, "Analysis failed"),
        }

        if let Some(client) = &yahoo {
            match fetch_metrics(client, ticker).await {
                Ok(metrics) => log_metrics(&metrics),
                Err(e) => warn!(ticker = %ticker, error = %e, "Financial metrics unavailable"),
            }
        }
    }

    info!(
        analyzed,
        total = tickers.len(),
        chart_dir = %renderer.output_dir().display(),
        "Run complete"
    );
    Ok(())
}

/// Load, analyze and chart one ticker. `Ok(false)` means the ticker has no
/// configured source.
fn analyze_ticker(
    ticker: &str,
    config: &AnalyzerConfig,
    pipeline: &IndicatorPipeline,
    renderer: &dyn ChartRenderer,
) -> Result<bool> {
    let Some(series) = load_series(ticker, &config.sources)? else {
        return Ok(false);
    };
    if series.is_empty() {
        warn!(ticker, "price history has no rows, charts will be empty");
    }

    let analyzed = pipeline.compute_indicators(&series);
    log_latest(&analyzed);
    charts::render_all(renderer, &analyzed)?;
    Ok(true)
}

fn log_latest(analyzed: &AnalyzedSeries) {
    let ticker = analyzed.series.ticker();
    for (column, _) in analyzed.indicators.iter() {
        match analyzed.latest(column) {
            Some((date, value)) if column == IndicatorColumn::Rsi => {
                info!(ticker, indicator = %column, %date, value, zone = rsi_zone(value), "latest value");
            }
            Some((date, value)) => {
                info!(ticker, indicator = %column, %date, value, "latest value");
            }
            None => warn!(ticker, indicator = %column, "not enough history for indicator"),
        }
    }
}

fn log_metrics(metrics: &FinancialMetrics) {
    for (name, value) in metrics.iter() {
        info!(ticker = %metrics.symbol, metric = name, value = %value, "financial metric");
    }
    info!(
        ticker = %metrics.symbol,
        reported = metrics.available(),
        total = metrics.len(),
        "financial metrics snapshot"
    );
}
