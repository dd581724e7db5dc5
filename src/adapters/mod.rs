//! Concrete adapter implementations for ports.

pub mod console_report_adapter;
pub mod csv_history_adapter;
pub mod csv_report_adapter;
pub mod file_config_adapter;
pub mod universe_csv_adapter;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
