//! Daily history retrieval port.

use crate::domain::bar::RawBar;
use crate::domain::error::GapscreenError;
use chrono::NaiveDate;

/// Calendar window requested from a history source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchWindow {
    /// Inclusive start, exclusive end.
    Range { start: NaiveDate, end: NaiveDate },
    /// The last `days` calendar days up to the source's notion of today.
    Period { days: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interval {
    #[default]
    Daily,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    pub window: FetchWindow,
    pub interval: Interval,
}

impl HistoryRequest {
    pub fn period(days: u32) -> Self {
        Self {
            window: FetchWindow::Period { days },
            interval: Interval::Daily,
        }
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            window: FetchWindow::Range { start, end },
            interval: Interval::Daily,
        }
    }

    /// Resolve the window to concrete dates relative to `as_of`.
    pub fn bounds(&self, as_of: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self.window {
            FetchWindow::Range { start, end } => (start, end),
            FetchWindow::Period { days } => {
                let start = as_of
                    .checked_sub_days(chrono::Days::new(u64::from(days)))
                    .unwrap_or(NaiveDate::MIN);
                (start, as_of.succ_opt().unwrap_or(NaiveDate::MAX))
            }
        }
    }
}

/// Source of daily bars for one ticker.
///
/// Implementations return bars in ascending date order, or an empty vector
/// when the ticker is unknown or has no coverage for the window. Errors are
/// reserved for transport or decoding failures; callers treat both the same.
pub trait HistoryPort: Sync {
    fn fetch_history(
        &self,
        ticker: &str,
        request: &HistoryRequest,
    ) -> Result<Vec<RawBar>, GapscreenError>;
}
