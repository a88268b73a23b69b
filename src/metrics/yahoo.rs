// =============================================================================
// Yahoo Finance quoteSummary client — cookie + crumb session
// =============================================================================
//
// Yahoo rejects quoteSummary calls that lack a session cookie and the
// matching crumb token.  The cookie lives in the reqwest cookie jar; the
// crumb is fetched once, cached, and refreshed a single time when a call
// comes back 401 or 429.
// =============================================================================

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::REFERER;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::MetricsSource;

const SESSION_URL: &str = "https://fc.yahoo.com";
const FINANCE_REFERER: &str = "https://finance.yahoo.com/";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Modules requested from quoteSummary. Earlier modules win when two report
/// the same field.
pub const MODULES: [&str; 4] = [
    "summaryDetail",
    "defaultKeyStatistics",
    "financialData",
    "price",
];

pub struct YahooClient {
    base_url: String,
    session_url: String,
    client: reqwest::Client,
    crumb: Mutex<Option<String>>,
}

impl YahooClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a client for the quote API rooted at `base_url`
    /// (e.g. `https://query1.finance.yahoo.com`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self {
            base_url,
            session_url: SESSION_URL.to_string(),
            client,
            crumb: Mutex::new(None),
        })
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// Cached crumb, fetching a fresh one when none is held.
    async fn crumb(&self) -> Result<String> {
        let cached = self.crumb.lock().clone();
        match cached {
            Some(crumb) => Ok(crumb),
            None => self.refresh_crumb().await,
        }
    }

    #[instrument(skip(self), name = "yahoo::refresh_crumb")]
    async fn refresh_crumb(&self) -> Result<String> {
        // The session endpoint answers 404 but still sets the cookie we need.
        if let Err(e) = self
            .client
            .get(&self.session_url)
            .header(REFERER, FINANCE_REFERER)
            .send()
            .await
        {
            warn!(error = %e, "Yahoo session cookie request failed");
        }

        let url = format!("{}/v1/test/getcrumb", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header(REFERER, FINANCE_REFERER)
            .send()
            .await
            .context("GET /v1/test/getcrumb request failed")?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read crumb response")?;
        let crumb = parse_crumb(status, &body)?;

        *self.crumb.lock() = Some(crumb.clone());
        debug!("Yahoo crumb refreshed");
        Ok(crumb)
    }

    // -------------------------------------------------------------------------
    // quoteSummary
    // -------------------------------------------------------------------------

    /// GET /v10/finance/quoteSummary/{symbol} with the [`MODULES`] set.
    #[instrument(skip(self), name = "yahoo::quote_summary")]
    pub async fn quote_summary(&self, symbol: &str) -> Result<Value> {
        let crumb = self.crumb().await?;
        let resp = self.send_quote_summary(symbol, &crumb).await?;

        let resp = if needs_crumb_refresh(resp.status()) {
            warn!(symbol, status = %resp.status(), "Yahoo rejected crumb, refreshing once");
            self.crumb.lock().take();
            let crumb = self.refresh_crumb().await?;
            self.send_quote_summary(symbol, &crumb).await?
        } else {
            resp
        };

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read quoteSummary response")?;
        let body = parse_quote_summary(symbol, status, &body)?;

        debug!(symbol, "quoteSummary retrieved");
        Ok(body)
    }

    async fn send_quote_summary(&self, symbol: &str, crumb: &str) -> Result<reqwest::Response> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            self.base_url,
            urlencoding::encode(symbol),
            MODULES.join(","),
            urlencoding::encode(crumb)
        );

        self.client
            .get(&url)
            .header(REFERER, FINANCE_REFERER)
            .send()
            .await
            .context("GET /v10/finance/quoteSummary request failed")
    }
}

#[async_trait]
impl MetricsSource for YahooClient {
    async fn info(&self, symbol: &str) -> Result<HashMap<String, f64>> {
        let body = self.quote_summary(symbol).await?;
        flatten_quote_summary(&body)
    }
}

impl std::fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooClient")
            .field("base_url", &self.base_url)
            .field("crumb", &"<redacted>")
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Response handling
// -----------------------------------------------------------------------------

/// A quoteSummary call answered with one of these statuses gets one retry
/// with a fresh crumb.
fn needs_crumb_refresh(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::TOO_MANY_REQUESTS
    )
}

fn parse_crumb(status: StatusCode, body: &str) -> Result<String> {
    let crumb = body.trim();
    if !status.is_success() {
        anyhow::bail!("Yahoo GET /v1/test/getcrumb returned {}: {}", status, crumb);
    }
    if crumb.is_empty() || crumb.len() >= 100 || crumb.contains(char::is_whitespace) {
        anyhow::bail!("Yahoo returned an unusable crumb");
    }
    Ok(crumb.to_string())
}

/// Status is checked before the body is decoded: Yahoo answers failures with
/// plain text.
fn parse_quote_summary(symbol: &str, status: StatusCode, body: &str) -> Result<Value> {
    if !status.is_success() {
        anyhow::bail!(
            "Yahoo GET /v10/finance/quoteSummary/{} returned {}: {}",
            symbol,
            status,
            body.trim()
        );
    }
    serde_json::from_str(body).context("failed to parse quoteSummary response")
}

/// Collapse a quoteSummary response into a `field -> number` bag.
///
/// Yahoo wraps most figures as `{"raw": 1.23, "fmt": "1.23"}`; bare numbers
/// are accepted too. Empty objects and `null` mean "not reported" and are
/// left out.
pub fn flatten_quote_summary(body: &Value) -> Result<HashMap<String, f64>> {
    let summary = body
        .get("quoteSummary")
        .context("response missing 'quoteSummary'")?;

    if let Some(error) = summary.get("error").filter(|e| !e.is_null()) {
        let description = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        anyhow::bail!("Yahoo quoteSummary error: {description}");
    }

    let result = summary
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .context("quoteSummary response has no result")?;

    let mut info = HashMap::new();
    for module in MODULES {
        let Some(fields) = result.get(module).and_then(Value::as_object) else {
            continue;
        };
        for (key, value) in fields {
            if let Some(number) = numeric(value) {
                info.entry(key.clone()).or_insert(number);
            }
        }
    }

    Ok(info)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(o) => o.get("raw").and_then(Value::as_f64),
        _ => None,
    }
}
