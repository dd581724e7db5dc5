//! Per-ticker series transform.
//!
//! Turns a ticker's raw daily bars into analysis rows: next-day open,
//! high/open ratio, close-to-next-open delta and notional volume.

use crate::domain::bar::{RawBar, TransformedBar};

/// Derive the analysis schema for one ticker.
///
/// Bars are ordered by date (stable) and any bar missing open, high, close or
/// volume is dropped before the next-open shift, so `next_open` always refers
/// to the following complete bar. Divisions by zero yield `None`.
pub fn transform(ticker: &str, bars: &[RawBar]) -> Vec<TransformedBar> {
    let mut complete: Vec<&RawBar> = bars.iter().filter(|b| b.has_prerequisites()).collect();
    complete.sort_by_key(|b| b.date);

    let opens: Vec<Option<f64>> = complete.iter().map(|b| b.open).collect();

    complete
        .iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            let open = bar.open?;
            let high = bar.high?;
            let close = bar.close?;
            let volume = bar.volume?;
            let next_open = opens.get(i + 1).copied().flatten();

            Some(TransformedBar {
                ticker: ticker.to_string(),
                date: bar.date,
                open,
                high,
                low: bar.low,
                close,
                volume,
                next_open,
                delta_pct: next_open.and_then(|next| delta_pct(close, next)),
                high_open_ratio: ratio(high, open),
                volume_euros: volume * close,
            })
        })
        .collect()
}

/// 100 * (next_open - close) / close
pub fn delta_pct(close: f64, next_open: f64) -> Option<f64> {
    ratio(next_open - close, close).map(|r| 100.0 * r)
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}
