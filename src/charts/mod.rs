// =============================================================================
// Charts — column selection and null filtering ahead of rendering
// =============================================================================
//
// Each adapter picks its columns from an `AnalyzedSeries`, keeps only the
// rows where every picked column is defined, and hands the result to a
// `ChartRenderer` under a fixed title.
// =============================================================================

pub mod html;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{AnalyzedSeries, IndicatorColumn, CLOSE};

pub use html::HtmlChartRenderer;

pub const PRICE_SMA_TITLE: &str = "Stock Price with Moving Average";
pub const RSI_TITLE: &str = "Relative Strength Index (RSI)";
pub const PRICE_EMA_TITLE: &str = "Stock Price with Exponential Moving Average";
pub const MACD_TITLE: &str = "Moving Average Convergence Divergence (MACD)";

/// One named line of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub values: Vec<f64>,
}

/// A line chart ready to render: every trace has one value per date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub ticker: String,
    pub title: String,
    pub dates: Vec<NaiveDate>,
    pub traces: Vec<Trace>,
}

impl LineChart {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Something that can display a [`LineChart`].
pub trait ChartRenderer {
    fn render(&self, chart: &LineChart) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

pub fn price_with_sma(analyzed: &AnalyzedSeries) -> LineChart {
    select(analyzed, PRICE_SMA_TITLE, &[CLOSE, IndicatorColumn::Sma.name()])
}

pub fn rsi(analyzed: &AnalyzedSeries) -> LineChart {
    select(analyzed, RSI_TITLE, &[IndicatorColumn::Rsi.name()])
}

pub fn price_with_ema(analyzed: &AnalyzedSeries) -> LineChart {
    select(analyzed, PRICE_EMA_TITLE, &[CLOSE, IndicatorColumn::Ema.name()])
}

pub fn macd_with_signal(analyzed: &AnalyzedSeries) -> LineChart {
    select(
        analyzed,
        MACD_TITLE,
        &[IndicatorColumn::Macd.name(), IndicatorColumn::MacdSignal.name()],
    )
}

/// The four standard charts, in display order.
pub fn standard_charts(analyzed: &AnalyzedSeries) -> [LineChart; 4] {
    [
        price_with_sma(analyzed),
        rsi(analyzed),
        price_with_ema(analyzed),
        macd_with_signal(analyzed),
    ]
}

/// Render the four standard charts, stopping at the first failure.
pub fn render_all(renderer: &dyn ChartRenderer, analyzed: &AnalyzedSeries) -> Result<()> {
    for chart in standard_charts(analyzed) {
        renderer.render(&chart)?;
    }
    Ok(())
}

/// Keep the rows where every requested column is defined. A column missing
/// from the series drops every row.
fn select(analyzed: &AnalyzedSeries, title: &str, columns: &[&str]) -> LineChart {
    let len = analyzed.series.len();
    let picked: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|name| analyzed.column(name).unwrap_or_else(|| vec![None; len]))
        .collect();

    let mut dates = Vec::new();
    let mut traces: Vec<Trace> = columns
        .iter()
        .map(|name| Trace {
            name: (*name).to_string(),
            values: Vec::new(),
        })
        .collect();

    for (row, date) in analyzed.series.dates().iter().enumerate() {
        let values: Option<Vec<f64>> = picked.iter().map(|col| col[row]).collect();
        if let Some(values) = values {
            dates.push(*date);
            for (trace, value) in traces.iter_mut().zip(values) {
                trace.values.push(value);
            }
        }
    }

    LineChart {
        ticker: analyzed.series.ticker().to_string(),
        title: title.to_string(),
        dates,
        traces,
    }
}
