//! Yahoo Finance chart API history adapter.
//!
//! Uses the public `v8/finance/chart` endpoint with daily interval. Null
//! cells in the quote arrays map to missing values. Unknown tickers (HTTP
//! 404 or a "Not Found" chart error) yield an empty history.

use crate::domain::bar::RawBar;
use crate::domain::error::GapscreenError;
use crate::ports::history_port::{FetchWindow, HistoryPort, HistoryRequest};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; gapscreen)";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct YahooSettings {
    pub base_url: String,
    pub timeout: Duration,
    /// Level for the adapter's own request diagnostics.
    pub diagnostics: log::Level,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            diagnostics: log::Level::Debug,
        }
    }
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    diagnostics: log::Level,
}

impl YahooAdapter {
    pub fn new(settings: YahooSettings) -> Result<Self, GapscreenError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GapscreenError::ConfigInvalid {
                section: "fetch".into(),
                key: "base_url".into(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            diagnostics: settings.diagnostics,
        })
    }

    fn query(request: &HistoryRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![("interval", request.interval.as_str().to_string())];
        match request.window {
            FetchWindow::Period { days } => params.push(("range", format!("{}d", days))),
            FetchWindow::Range { start, end } => {
                params.push(("period1", unix_midnight(start).to_string()));
                params.push(("period2", unix_midnight(end).to_string()));
            }
        }
        params
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn fetch_error(ticker: &str, reason: impl Into<String>) -> GapscreenError {
    GapscreenError::Fetch {
        ticker: ticker.to_string(),
        reason: reason.into(),
    }
}

fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

/// Decode a chart API body into bars ordered by date.
fn parse_chart(ticker: &str, body: &str) -> Result<Vec<RawBar>, GapscreenError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| fetch_error(ticker, format!("failed to parse response: {e}")))?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Ok(Vec::new());
        }
        return Err(fetch_error(
            ticker,
            format!("Yahoo API error: {} - {}", error.code, error.description),
        ));
    }

    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let offset = data.meta.map(|m| m.gmtoffset).unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let Some(moment) = DateTime::from_timestamp(ts + offset, 0) else {
            continue;
        };
        bars.push(RawBar {
            date: moment.date_naive(),
            open: cell(&quote.open, i),
            high: cell(&quote.high, i),
            low: cell(&quote.low, i),
            close: cell(&quote.close, i),
            volume: cell(&quote.volume, i),
        });
    }

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    Ok(bars)
}

impl HistoryPort for YahooAdapter {
    fn fetch_history(
        &self,
        ticker: &str,
        request: &HistoryRequest,
    ) -> Result<Vec<RawBar>, GapscreenError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        log::log!(self.diagnostics, "fetching {} {:?}", url, request.window);

        let response = self
            .client
            .get(&url)
            .query(&Self::query(request))
            .send()
            .map_err(|e| fetch_error(ticker, format!("request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            log::log!(self.diagnostics, "{}: not found on data source", ticker);
            return Ok(Vec::new());
        }
        let body = response
            .text()
            .map_err(|e| fetch_error(ticker, format!("failed to read response: {e}")))?;
        if !status.is_success() {
            log::log!(self.diagnostics, "{}: HTTP {} body {}", ticker, status, body);
            return Err(fetch_error(ticker, format!("HTTP {status}")));
        }

        let bars = parse_chart(ticker, &body)?;
        log::log!(self.diagnostics, "{}: {} bars", ticker, bars.len());
        Ok(bars)
    }
}
