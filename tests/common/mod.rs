#![allow(dead_code)]

use chrono::NaiveDate;
use gapscreen::domain::bar::RawBar;
use gapscreen::domain::error::GapscreenError;
use gapscreen::domain::screen::ScreenConfig;
use gapscreen::ports::history_port::{HistoryPort, HistoryRequest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct MockHistoryPort {
    pub data: HashMap<String, Vec<RawBar>>,
    pub errors: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MockHistoryPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<RawBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HistoryPort for MockHistoryPort {
    fn fetch_history(
        &self,
        ticker: &str,
        _request: &HistoryRequest,
    ) -> Result<Vec<RawBar>, GapscreenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(ticker) {
            return Err(GapscreenError::Fetch {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, open: f64, high: f64, close: f64, volume: f64) -> RawBar {
    RawBar::complete(
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open,
        high,
        open.min(close),
        close,
        volume,
    )
}

/// A bar whose high/open ratio is 1.2 and whose euro volume clears the floor.
pub fn gap_bar(date: &str, close: f64) -> RawBar {
    make_bar(date, close, close * 1.2, close, 2_000_000.0 / close)
}

/// A bar that fails the high/open criterion.
pub fn flat_bar(date: &str, close: f64) -> RawBar {
    make_bar(date, close, close * 1.01, close, 2_000_000.0 / close)
}

pub fn sample_config() -> ScreenConfig {
    let mut config = ScreenConfig::new(date(2024, 6, 10));
    config.workers = 2;
    config
}

pub fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}
