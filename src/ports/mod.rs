//! Port traits between the screening core and its collaborators.

pub mod config_port;
pub mod history_port;
pub mod report_port;
pub mod universe_port;
