//! CSV file history adapter.
//!
//! Reads `<TICKER>.csv` files with a `date,open,high,low,close,volume` header
//! from a base directory. Blank cells are missing values. A ticker without a
//! file has no coverage and yields an empty history.

use crate::domain::bar::RawBar;
use crate::domain::error::GapscreenError;
use crate::ports::history_port::{HistoryPort, HistoryRequest};
use chrono::NaiveDate;
use std::path::PathBuf;

pub struct CsvHistoryAdapter {
    base_path: PathBuf,
    as_of: NaiveDate,
}

impl CsvHistoryAdapter {
    /// `as_of` anchors relative (period) windows.
    pub fn new(base_path: PathBuf, as_of: NaiveDate) -> Self {
        Self { base_path, as_of }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn fetch_error(ticker: &str, reason: String) -> GapscreenError {
    GapscreenError::Fetch {
        ticker: ticker.to_string(),
        reason,
    }
}

fn parse_value(
    ticker: &str,
    column: &str,
    raw: Option<&str>,
) -> Result<Option<f64>, GapscreenError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<f64>()
            .map(|n| n.is_finite().then_some(n))
            .map_err(|e| fetch_error(ticker, format!("invalid {} value '{}': {}", column, v, e))),
    }
}

impl HistoryPort for CsvHistoryAdapter {
    fn fetch_history(
        &self,
        ticker: &str,
        request: &HistoryRequest,
    ) -> Result<Vec<RawBar>, GapscreenError> {
        let path = self.csv_path(ticker);
        if !path.exists() {
            log::debug!("{}: no history file at {}", ticker, path.display());
            return Ok(Vec::new());
        }

        let (start_date, end_date) = request.bounds(self.as_of);
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| fetch_error(ticker, format!("failed to read {}: {}", path.display(), e)))?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record =
                result.map_err(|e| fetch_error(ticker, format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| fetch_error(ticker, "missing date column".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| fetch_error(ticker, format!("invalid date '{}': {}", date_str, e)))?;

            if date < start_date || date >= end_date {
                continue;
            }

            bars.push(RawBar {
                date,
                open: parse_value(ticker, "open", record.get(1))?,
                high: parse_value(ticker, "high", record.get(2))?,
                low: parse_value(ticker, "low", record.get(3))?,
                close: parse_value(ticker, "close", record.get(4))?,
                volume: parse_value(ticker, "volume", record.get(5))?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,,60000\n";

        fs::write(path.join("AI.PA.csv"), csv_content).unwrap();
        fs::write(path.join("MC.PA.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(
            path.join("BAD.PA.csv"),
            "date,open,high,low,close,volume\n2024-01-15,abc,1,1,1,1\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_returns_sorted_bars_with_missing_cells() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvHistoryAdapter::new(path, date(17));

        let bars = adapter
            .fetch_history("AI.PA", &HistoryRequest::range(date(15), date(18)))
            .unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, date(15));
        assert_eq!(bars[0].open, Some(100.0));
        assert_eq!(bars[0].volume, Some(50_000.0));
        assert_eq!(bars[1].close, None);
        assert_eq!(bars[2].date, date(17));
    }

    #[test]
    fn range_end_is_exclusive() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvHistoryAdapter::new(path, date(17));

        let bars = adapter
            .fetch_history("AI.PA", &HistoryRequest::range(date(16), date(17)))
            .unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date(16));
    }

    #[test]
    fn period_is_anchored_on_as_of() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvHistoryAdapter::new(path, date(17));

        let bars = adapter
            .fetch_history("AI.PA", &HistoryRequest::period(1))
            .unwrap();

        let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(16), date(17)]);
    }

    #[test]
    fn missing_file_is_empty_history() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvHistoryAdapter::new(path, date(17));
        let bars = adapter
            .fetch_history("XYZ.PA", &HistoryRequest::period(9))
            .unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn header_only_file_is_empty_history() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvHistoryAdapter::new(path, date(17));
        let bars = adapter
            .fetch_history("MC.PA", &HistoryRequest::period(9))
            .unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn non_finite_cells_are_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("NAN.PA.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-15,NaN,110.0,90.0,inf,50000\n",
        )
        .unwrap();
        let adapter = CsvHistoryAdapter::new(dir.path().to_path_buf(), date(17));

        let bars = adapter
            .fetch_history("NAN.PA", &HistoryRequest::period(9))
            .unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open, None);
        assert_eq!(bars[0].close, None);
        assert_eq!(bars[0].high, Some(110.0));
        assert!(!bars[0].has_prerequisites());
    }

    #[test]
    fn malformed_number_is_an_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvHistoryAdapter::new(path, date(17));
        let err = adapter
            .fetch_history("BAD.PA", &HistoryRequest::period(9))
            .unwrap_err();
        assert!(matches!(err, GapscreenError::Fetch { ticker, .. } if ticker == "BAD.PA"));
    }
}
