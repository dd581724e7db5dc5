//! Delimited instrument list adapter.
//!
//! Reads an exchange export with at least `Symbol`, `Market` and `Currency`
//! columns (header names matched case-insensitively, other columns ignored).

use crate::domain::error::GapscreenError;
use crate::domain::universe::InstrumentRow;
use crate::ports::universe_port::UniversePort;
use std::path::PathBuf;

const REQUIRED_COLUMNS: [&str; 3] = ["symbol", "market", "currency"];

pub struct UniverseCsvAdapter {
    path: PathBuf,
    delimiter: u8,
}

impl UniverseCsvAdapter {
    pub fn new(path: PathBuf, delimiter: u8) -> Self {
        Self { path, delimiter }
    }

    fn error(&self, reason: impl Into<String>) -> GapscreenError {
        GapscreenError::UniverseRead {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
    }
}

impl UniversePort for UniverseCsvAdapter {
    fn load_instruments(&self) -> Result<Vec<InstrumentRow>, GapscreenError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.error(e.to_string()))?;

        let headers = rdr.headers().map_err(|e| self.error(e.to_string()))?.clone();
        let mut columns = [0usize; 3];
        for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
                .ok_or_else(|| self.error(format!("missing column '{name}'")))?;
        }
        let [symbol, market, currency] = columns;

        let mut rows = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    log::debug!("universe line {}: {e}", line + 2);
                    continue;
                }
            };
            let field = |i: usize| {
                record
                    .get(i)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };
            rows.push(InstrumentRow {
                symbol: field(symbol),
                market: field(market),
                currency: field(currency),
            });
        }

        log::debug!("{} instrument rows read from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}
