// =============================================================================
// HTML chart renderer — one self-contained interactive Plotly page per chart
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, warn};

use super::{ChartRenderer, LineChart};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Writes `<output_dir>/<ticker>_<title-slug>.html` for every chart.
#[derive(Debug, Clone)]
pub struct HtmlChartRenderer {
    output_dir: PathBuf,
}

impl HtmlChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where `chart` ends up on disk.
    pub fn chart_path(&self, chart: &LineChart) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.html", slug(&chart.ticker), slug(&chart.title)))
    }

    /// Build the full HTML document for `chart`.
    pub fn to_html(chart: &LineChart) -> Result<String> {
        let data: Vec<serde_json::Value> = chart
            .traces
            .iter()
            .map(|trace| {
                json!({
                    "type": "scatter",
                    "mode": "lines",
                    "name": trace.name,
                    "x": chart.dates,
                    "y": trace.values,
                })
            })
            .collect();
        let layout = json!({
            "title": { "text": chart.title },
            "xaxis": { "title": { "text": "Date" } },
            "yaxis": { "title": { "text": "value" } },
            "legend": { "title": { "text": "variable" } },
        });

        let data = script_safe(&serde_json::to_string(&data).context("failed to encode chart traces")?);
        let layout =
            script_safe(&serde_json::to_string(&layout).context("failed to encode chart layout")?);
        let page_title = escape_html(&format!("{}: {}", chart.ticker, chart.title));

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{page_title}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:90vh;"></div>
<script>
Plotly.newPlot("chart", {data}, {layout}, {{"responsive": true}});
</script>
</body>
</html>
"#
        ))
    }
}

impl ChartRenderer for HtmlChartRenderer {
    fn render(&self, chart: &LineChart) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("failed to create chart directory {}", self.output_dir.display())
        })?;

        let path = self.chart_path(chart);
        let html = Self::to_html(chart)?;
        std::fs::write(&path, html)
            .with_context(|| format!("failed to write chart to {}", path.display()))?;

        if chart.is_empty() {
            warn!(
                ticker = %chart.ticker,
                title = %chart.title,
                path = %path.display(),
                "chart has no rows with defined values"
            );
        } else {
            info!(
                ticker = %chart.ticker,
                title = %chart.title,
                rows = chart.dates.len(),
                path = %path.display(),
                "chart written"
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Lowercase ASCII alphanumerics joined by single underscores.
fn slug(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// JSON embedded in a `<script>` block must not close it early.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
