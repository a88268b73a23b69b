// =============================================================================
// Indicator Pipeline — price series in, analyzed series out
// =============================================================================
//
// Stateless: every call borrows its input series and returns a fresh
// `AnalyzedSeries`, so running it twice on the same data yields identical
// columns.
// =============================================================================

use tracing::debug;

use crate::indicators::{ema::ema_series, macd::macd_series, rsi::rsi_series, sma::sma_series};
use crate::runtime_config::IndicatorParams;
use crate::types::{AnalyzedSeries, IndicatorColumn, IndicatorSet, PriceSeries};

#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorPipeline {
    params: IndicatorParams,
}

impl IndicatorPipeline {
    pub fn new(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// SMA of the close over `window_size` trailing observations, aligned to
    /// the series index.
    pub fn compute_sma(series: &PriceSeries, window_size: usize) -> Vec<Option<f64>> {
        sma_series(series.closes(), window_size)
    }

    /// Attach SMA, RSI, EMA, MACD and MACD_Signal, in that order.
    pub fn compute_indicators(&self, series: &PriceSeries) -> AnalyzedSeries {
        let p = &self.params;
        let closes = series.closes();

        let mut indicators = IndicatorSet::default();
        indicators.insert(
            IndicatorColumn::Sma,
            Self::compute_sma(series, p.sma_period),
        );
        indicators.insert(IndicatorColumn::Rsi, rsi_series(closes, p.rsi_period));
        indicators.insert(IndicatorColumn::Ema, ema_series(closes, p.ema_period));

        let (macd, signal) = macd_series(closes, p.macd_fast, p.macd_slow, p.macd_signal);
        indicators.insert(IndicatorColumn::Macd, macd);
        indicators.insert(IndicatorColumn::MacdSignal, signal);

        debug!(
            ticker = series.ticker(),
            rows = series.len(),
            columns = ?indicators.names(),
            "indicators computed"
        );

        AnalyzedSeries {
            series: series.clone(),
            indicators,
        }
    }
}
