//! Delimited-file export of the aggregate table.

use crate::domain::error::GapscreenError;
use crate::domain::screen::ScreenReport;
use crate::ports::report_port::ReportPort;
use std::path::PathBuf;

const HEADER: [&str; 8] = [
    "ticker",
    "date",
    "close",
    "next_open",
    "delta_pct",
    "high_open_ratio",
    "volume_euros",
    "volume",
];

pub struct CsvReportAdapter {
    path: PathBuf,
    delimiter: u8,
}

impl CsvReportAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn error(&self, e: impl std::fmt::Display) -> GapscreenError {
        GapscreenError::Report {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        }
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &ScreenReport) -> Result<(), GapscreenError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(&self.path)
            .map_err(|e| self.error(e))?;

        wtr.write_record(HEADER).map_err(|e| self.error(e))?;
        for row in report.table.rows() {
            wtr.write_record([
                row.ticker.clone(),
                row.date.format("%Y-%m-%d").to_string(),
                row.close.to_string(),
                cell(row.next_open),
                cell(row.delta_pct),
                cell(row.high_open_ratio),
                row.volume_euros.to_string(),
                row.volume.to_string(),
            ])
            .map_err(|e| self.error(e))?;
        }
        wtr.flush().map_err(|e| self.error(e))?;

        log::info!(
            "{} rows exported to {}",
            report.table.len(),
            self.path.display()
        );
        Ok(())
    }
}
