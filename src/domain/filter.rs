//! Eligibility filter for transformed rows.
//!
//! A row is eligible when the close clears the price floor, the notional
//! volume clears the liquidity floor, the intraday high/open ratio clears the
//! ratio floor and the next open is known. Rows that clear the first three
//! but have no next open are reported as near-misses; they are never part of
//! the filter result.

use crate::domain::bar::TransformedBar;
use chrono::NaiveDate;

/// Dates shown in a near-miss alert before truncating with `...`.
pub const NEAR_MISS_DISPLAY_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub price_floor: f64,
    pub volume_floor: f64,
    pub ratio_floor: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            price_floor: 0.1,
            volume_floor: 1_000_000.0,
            ratio_floor: 1.1,
        }
    }
}

impl Thresholds {
    /// Price, liquidity and high/open criteria, ignoring look-ahead.
    pub fn passes_base_criteria(&self, bar: &TransformedBar) -> bool {
        bar.close > self.price_floor
            && bar.volume_euros > self.volume_floor
            && bar
                .high_open_ratio
                .is_some_and(|ratio| ratio > self.ratio_floor)
    }

    pub fn is_eligible(&self, bar: &TransformedBar) -> bool {
        self.passes_base_criteria(bar) && bar.next_open.is_some()
    }

    pub fn is_near_miss(&self, bar: &TransformedBar) -> bool {
        self.passes_base_criteria(bar) && bar.next_open.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub passed: Vec<TransformedBar>,
    /// Dates of rows that failed only because the next open is missing.
    pub near_misses: Vec<NaiveDate>,
}

pub fn filter_series(bars: Vec<TransformedBar>, thresholds: &Thresholds) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for bar in bars {
        if thresholds.is_eligible(&bar) {
            outcome.passed.push(bar);
        } else if thresholds.is_near_miss(&bar) {
            outcome.near_misses.push(bar.date);
        }
    }
    outcome
}

/// Near-miss diagnostic for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct NearMiss {
    pub ticker: String,
    pub dates: Vec<NaiveDate>,
}

impl NearMiss {
    pub fn count(&self) -> usize {
        self.dates.len()
    }

    /// Up to [`NEAR_MISS_DISPLAY_LIMIT`] dates, followed by `...` when more exist.
    pub fn display_dates(&self) -> Vec<String> {
        let mut shown: Vec<String> = self
            .dates
            .iter()
            .take(NEAR_MISS_DISPLAY_LIMIT)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect();
        if self.dates.len() > NEAR_MISS_DISPLAY_LIMIT {
            shown.push("...".to_string());
        }
        shown
    }
}
