//! Instrument universe source port.

use crate::domain::error::GapscreenError;
use crate::domain::universe::InstrumentRow;

pub trait UniversePort {
    /// Load every instrument row. Failure to read the source at all is fatal.
    fn load_instruments(&self) -> Result<Vec<InstrumentRow>, GapscreenError>;
}
