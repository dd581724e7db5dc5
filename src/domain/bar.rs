//! Daily bar representations.
//!
//! [`RawBar`] is what a history source hands back: any numeric field may be
//! missing when the source has delayed or partial data. [`TransformedBar`] is
//! the analysis row derived from it by [`crate::domain::series::transform`].

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl RawBar {
    /// Bar with every field present.
    pub fn complete(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }

    /// True when open, high, close and volume are all present and finite.
    ///
    /// Low is not required by any derived column.
    pub fn has_prerequisites(&self) -> bool {
        [self.open, self.high, self.close, self.volume]
            .iter()
            .all(|v| v.is_some_and(f64::is_finite))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformedBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: f64,
    /// Open of the following bar in the same series.
    pub next_open: Option<f64>,
    /// 100 * (next_open - close) / close
    pub delta_pct: Option<f64>,
    /// high / open
    pub high_open_ratio: Option<f64>,
    /// volume * close
    pub volume_euros: f64,
}
