//! Screening pipeline: fetch, transform and filter each ticker, then aggregate.
//!
//! Tickers are independent units run on a bounded worker pool. A unit never
//! fails the batch: fetch errors and empty histories become
//! [`TickerStatus::FetchEmpty`]. Aggregation only starts once every unit has
//! produced its outcome.

use crate::domain::aggregate::{AggregateTable, SummaryStatistics};
use crate::domain::bar::TransformedBar;
use crate::domain::error::GapscreenError;
use crate::domain::filter::{filter_series, NearMiss, Thresholds};
use crate::domain::series::transform;
use crate::ports::history_port::{HistoryPort, HistoryRequest};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;
pub const DEFAULT_WORKERS: usize = 4;
/// Upper bound on the lookback window, in calendar days.
pub const MAX_LOOKBACK_DAYS: u32 = 3650;
/// Extra calendar days fetched so the last in-window bar can get a next open.
pub const LOOKAHEAD_PADDING_DAYS: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenConfig {
    pub lookback_days: u32,
    pub thresholds: Thresholds,
    pub workers: usize,
    pub as_of: NaiveDate,
}

impl ScreenConfig {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            thresholds: Thresholds::default(),
            workers: DEFAULT_WORKERS,
            as_of,
        }
    }

    pub fn history_request(&self) -> HistoryRequest {
        HistoryRequest::period(self.lookback_days.saturating_add(LOOKAHEAD_PADDING_DAYS))
    }

    pub fn start_date(&self) -> NaiveDate {
        self.as_of
            .checked_sub_days(chrono::Days::new(u64::from(self.lookback_days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickerStatus {
    /// At least one row passed the filter.
    Filtered(Vec<TransformedBar>),
    /// Data was available but no row passed.
    NoEligibleRows,
    /// Nothing usable came back from the history source.
    FetchEmpty,
    /// The batch was stopped before this unit started.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerOutcome {
    pub ticker: String,
    pub status: TickerStatus,
    pub near_miss: Option<NearMiss>,
}

/// Fetch, transform and filter a single ticker.
pub fn screen_ticker(
    port: &dyn HistoryPort,
    ticker: &str,
    request: &HistoryRequest,
    thresholds: &Thresholds,
) -> TickerOutcome {
    let bars = match port.fetch_history(ticker, request) {
        Ok(bars) => bars,
        Err(e) => {
            log::warn!("skipping {ticker} ({e})");
            Vec::new()
        }
    };

    let rows = transform(ticker, &bars);
    if rows.is_empty() {
        log::debug!("{ticker}: no usable bars");
        return TickerOutcome {
            ticker: ticker.to_string(),
            status: TickerStatus::FetchEmpty,
            near_miss: None,
        };
    }

    let outcome = filter_series(rows, thresholds);

    let near_miss = if outcome.near_misses.is_empty() {
        None
    } else {
        let miss = NearMiss {
            ticker: ticker.to_string(),
            dates: outcome.near_misses,
        };
        log::warn!(
            "next open missing for {} on {:?}",
            ticker,
            miss.display_dates()
        );
        Some(miss)
    };

    let status = if outcome.passed.is_empty() {
        TickerStatus::NoEligibleRows
    } else {
        log::debug!("{ticker}: {} eligible rows", outcome.passed.len());
        TickerStatus::Filtered(outcome.passed)
    };

    TickerOutcome {
        ticker: ticker.to_string(),
        status,
        near_miss,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenReport {
    pub tickers_detected: usize,
    pub failed_tickers: Vec<String>,
    pub skipped: usize,
    pub near_misses: Vec<NearMiss>,
    pub table: AggregateTable,
    pub summary: Option<SummaryStatistics>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ScreenReport {
    /// Fold per-ticker outcomes (in ticker processing order) into a report.
    pub fn from_outcomes(
        tickers_detected: usize,
        outcomes: Vec<TickerOutcome>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let mut tables = Vec::new();
        let mut failed_tickers = Vec::new();
        let mut near_misses = Vec::new();
        let mut skipped = 0;

        for outcome in outcomes {
            match outcome.status {
                TickerStatus::Filtered(rows) => tables.push(rows),
                TickerStatus::NoEligibleRows => {}
                TickerStatus::FetchEmpty => failed_tickers.push(outcome.ticker),
                TickerStatus::Skipped => skipped += 1,
            }
            near_misses.extend(outcome.near_miss);
        }

        let table = AggregateTable::from_tables(tables);
        let summary = SummaryStatistics::compute(&table);

        Self {
            tickers_detected,
            failed_tickers,
            skipped,
            near_misses,
            table,
            summary,
            start,
            end,
        }
    }

    pub fn failed_downloads(&self) -> usize {
        self.failed_tickers.len()
    }

    pub fn near_miss_count(&self) -> usize {
        self.near_misses.iter().map(NearMiss::count).sum()
    }
}

/// Screen every ticker and aggregate the results.
///
/// `stop` is polled before each unit; once raised, remaining units are
/// recorded as skipped.
pub fn run_screen(
    port: &dyn HistoryPort,
    tickers: &[String],
    config: &ScreenConfig,
    stop: &AtomicBool,
) -> Result<ScreenReport, GapscreenError> {
    let request = config.history_request();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.max(1))
        .build()
        .map_err(|e| GapscreenError::ConfigInvalid {
            section: "fetch".into(),
            key: "workers".into(),
            reason: e.to_string(),
        })?;

    log::info!(
        "screening {} tickers over {} days with {} workers",
        tickers.len(),
        config.lookback_days,
        config.workers.max(1)
    );

    let outcomes: Vec<TickerOutcome> = pool.install(|| {
        tickers
            .par_iter()
            .map(|ticker| {
                if stop.load(Ordering::Relaxed) {
                    return TickerOutcome {
                        ticker: ticker.clone(),
                        status: TickerStatus::Skipped,
                        near_miss: None,
                    };
                }
                screen_ticker(port, ticker, &request, &config.thresholds)
            })
            .collect()
    });

    let report = ScreenReport::from_outcomes(
        tickers.len(),
        outcomes,
        config.start_date(),
        config.as_of,
    );

    log::info!(
        "{} eligible rows, {} failed downloads, {} near-misses",
        report.table.len(),
        report.failed_downloads(),
        report.near_miss_count()
    );
    if report.skipped > 0 {
        log::warn!("screening stopped early, {} tickers skipped", report.skipped);
    }

    Ok(report)
}
