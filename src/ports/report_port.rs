//! Screening report output port.

use crate::domain::error::GapscreenError;
use crate::domain::screen::ScreenReport;

/// Port for rendering or persisting a screening report.
pub trait ReportPort {
    fn write(&self, report: &ScreenReport) -> Result<(), GapscreenError>;
}
