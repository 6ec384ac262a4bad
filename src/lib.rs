//! TSE Fetcher Library
//!
//! Downloads the nationwide CSV files of the Brazilian Superior Electoral
//! Court (TSE) open-data archive, skipping transfers when the remote archive
//! has not changed since the last successful download.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
