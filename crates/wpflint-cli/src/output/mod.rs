//! Output formatters for diagnostics

pub mod json;
pub mod pretty;
pub mod sarif;
