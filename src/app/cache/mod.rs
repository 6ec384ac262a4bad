//! Cache metadata used to skip redundant downloads
//!
//! The cache does not hold dataset content. It records, per dataset and year,
//! the ETag and Last-Modified values that accompanied the last stored
//! transfer, plus where the artifact was written.
//!
//! # Module Organization
//!
//! - [`store`] - Cache key, entry and table types and the JSON-backed store
//! - [`validator`] - Pure decision of whether a resource must be re-fetched
//!
//! # Examples
//!
//! ```rust,no_run
//! use tse_fetcher::app::cache::{needs_fetch, CacheKey, CacheStore};
//! use tse_fetcher::app::ValidationHeaders;
//!
//! # async fn example() {
//! let store = CacheStore::new("data/raw/.tse_fetcher/cache_metadata.json");
//! let table = store.load().await;
//!
//! let probe = ValidationHeaders::from_pairs([("ETag", "\"v1\"")]);
//! if needs_fetch(&table, &CacheKey::new("cand", 2022), &probe) {
//!     println!("download required");
//! }
//! # }
//! ```

pub mod store;
pub mod validator;

// Re-export main public API
pub use store::{CacheEntry, CacheKey, CacheStore, CacheTable, LoadStatus};
pub use validator::{evaluate, needs_fetch, Decision};
