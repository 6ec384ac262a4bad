//! Core application logic for TSE Fetcher
//!
//! This module contains the dataset catalog, the HTTP client, the cache
//! record with its freshness rules, the transfer/extraction pipeline and the
//! orchestrator tying them together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tse_fetcher::app::{FetchConfig, FetchRequest, Fetcher, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::from_config(ClientConfig::default(), FetchConfig::default())?;
//!
//! let outcome = fetcher
//!     .fetch(&FetchRequest::new("cand", 2022, "data/raw"))
//!     .await?;
//!
//! match outcome.path() {
//!     Some(path) => println!("Stored {}", path.display()),
//!     None => println!("Already up to date"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod datasets;
pub mod fetcher;
pub mod headers;
pub mod transfer;

// Re-export main public API
pub use cache::{CacheEntry, CacheKey, CacheStore, CacheTable, Decision, LoadStatus};
pub use client::{ClientConfig, TseClient};
pub use datasets::{DatasetCatalog, DatasetSpec, FetchRequest, MemberPattern, ResourceDescriptor};
pub use fetcher::{FetchConfig, FetchOutcome, Fetcher};
pub use headers::ValidationHeaders;
pub use transfer::{ArchiveSource, ExtractedFile, TransferExecutor};
