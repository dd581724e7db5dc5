//! Core domain types and logic.

pub mod aggregate;
pub mod bar;
pub mod config_validation;
pub mod error;
pub mod filter;
pub mod screen;
pub mod series;
pub mod universe;
