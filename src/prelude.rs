//! Prelude module for TSE Fetcher Library
//!
//! Re-exports the items needed for typical usage with a single
//! `use tse_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tse_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let (client_config, fetch_config) = AppConfig::load(None).await?.to_runtime_config()?;
//!     let fetcher = Fetcher::from_config(client_config, fetch_config)?;
//!     let outcome = fetcher.fetch(&FetchRequest::new("bens", 2020, "data/raw")).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, FetchError, Result};

pub use crate::app::{
    CacheKey, CacheStore, ClientConfig, DatasetCatalog, FetchConfig, FetchOutcome, FetchRequest,
    Fetcher, TseClient, ValidationHeaders,
};

pub use crate::config::AppConfig;

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};

pub use tokio;
