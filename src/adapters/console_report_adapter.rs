//! Console report adapter.
//!
//! Prints the chronological trade table followed by the summary block. The
//! summary is omitted when no ticker produced an eligible row.

use crate::domain::error::GapscreenError;
use crate::domain::screen::ScreenReport;
use crate::ports::report_port::ReportPort;
use std::fmt::Write as _;
use std::io::Write as _;

#[derive(Debug, Default)]
pub struct ConsoleReportAdapter;

impl ConsoleReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

/// Render the full console report.
pub fn render(report: &ScreenReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} tickers detected", report.tickers_detected);

    if !report.table.is_empty() {
        let _ = writeln!(
            out,
            "\n{:<12} {:<10} {:>10} {:>10} {:>9}",
            "Ticker", "Date", "Close", "Next_Open", "Delta"
        );
        for row in report.table.rows() {
            let _ = writeln!(
                out,
                "{:<12} {:<10} {:>10.2} {:>10} {:>9}",
                row.ticker,
                row.date,
                row.close,
                fmt_opt(row.next_open),
                fmt_opt(row.delta_pct)
            );
        }
    }

    match &report.summary {
        Some(s) => {
            let _ = writeln!(
                out,
                "\nMean delta: {:.2} % over {} transactions from {} to {}.",
                s.mean_delta, s.transaction_count, report.start, report.end
            );
            let _ = writeln!(
                out,
                "Winner: {} ({:.2} %), best trade on {}",
                s.best_ticker.ticker, s.best_ticker.mean_delta, s.best_ticker.extreme_date
            );
            let _ = writeln!(
                out,
                "Loser: {} ({:.2} %), worst trade on {}",
                s.worst_ticker.ticker, s.worst_ticker.mean_delta, s.worst_ticker.extreme_date
            );
            let _ = writeln!(
                out,
                "Top trade: {} ({:.2} %) on {}",
                s.best_trade.ticker, s.best_trade.delta_pct, s.best_trade.date
            );
            let _ = writeln!(
                out,
                "Worst trade: {} ({:.2} %) on {}",
                s.worst_trade.ticker, s.worst_trade.delta_pct, s.worst_trade.date
            );
        }
        None => {
            let _ = writeln!(out, "\nNo eligible rows between {} and {}.", report.start, report.end);
        }
    }

    if !report.near_misses.is_empty() {
        let _ = writeln!(out);
        for miss in &report.near_misses {
            let _ = writeln!(
                out,
                "Alert: next open missing for {} on [{}]",
                miss.ticker,
                miss.display_dates().join(", ")
            );
        }
    }

    if report.failed_downloads() > 0 {
        let _ = writeln!(
            out,
            "\nData not downloaded for {} tickers.",
            report.failed_downloads()
        );
    }
    if report.skipped > 0 {
        let _ = writeln!(out, "Interrupted: {} tickers not processed.", report.skipped);
    }

    out
}

impl ReportPort for ConsoleReportAdapter {
    fn write(&self, report: &ScreenReport) -> Result<(), GapscreenError> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(render(report).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
