//! Cache-aware fetch orchestration
//!
//! One call to [`Fetcher::fetch`] runs the whole protocol for a dataset/year:
//!
//! 1. resolve the request against the catalog (no I/O on unknown datasets)
//! 2. load the cache table
//! 3. probe the remote archive; a failed probe aborts the call
//! 4. compare validators; skip when the stored copy is current
//! 5. transfer and extract into scratch storage
//! 6. copy the member to its dated destination path
//! 7. merge the transfer validators into the current table and save it
//!
//! The cache table is only written after the artifact is in place, and a
//! failure to write it is logged without failing the call.

use std::path::{Component, Path, PathBuf};

use chrono::{Local, NaiveDate};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::app::cache::{evaluate, CacheEntry, CacheKey, CacheStore, Decision};
use crate::app::client::{ClientConfig, TseClient};
use crate::app::datasets::{DatasetCatalog, FetchRequest};
use crate::app::transfer::{ArchiveSource, TransferExecutor};
use crate::constants::{storage, tse};
use crate::errors::{DownloadResult, FetchError, FetchResult};

/// Settings shared by all fetch calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Archive base URL
    pub base_url: String,
    /// Cache record location; relative paths are resolved against the
    /// request's base path
    pub metadata_file: PathBuf,
    /// Parent directory for scratch storage (system temp dir if None)
    pub scratch_root: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: tse::BASE_URL.to_string(),
            metadata_file: PathBuf::from(storage::METADATA_FILE),
            scratch_root: None,
        }
    }
}

impl FetchConfig {
    /// Cache record path for a given destination base path
    pub fn metadata_path(&self, base_path: &Path) -> PathBuf {
        if self.metadata_file.is_absolute() {
            self.metadata_file.clone()
        } else {
            base_path.join(&self.metadata_file)
        }
    }
}

/// Successful result of a fetch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A new artifact was written
    Downloaded {
        /// Absolute path of the stored file
        path: PathBuf,
        /// Whether the cache record was saved
        cache_updated: bool,
    },
    /// The stored copy is current; nothing was written
    Skipped {
        key: CacheKey,
        decision: Decision,
        /// Path recorded for the current copy, if any
        recorded_path: Option<String>,
    },
}

impl FetchOutcome {
    /// Path of the newly written artifact
    pub fn path(&self) -> Option<&Path> {
        match self {
            FetchOutcome::Downloaded { path, .. } => Some(path),
            FetchOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FetchOutcome::Skipped { .. })
    }
}

/// Fetch orchestrator
#[derive(Debug)]
pub struct Fetcher<S> {
    executor: TransferExecutor<S>,
    catalog: DatasetCatalog,
    config: FetchConfig,
    ingestion_date: Option<NaiveDate>,
}

impl Fetcher<TseClient> {
    /// Build a fetcher backed by the HTTP client
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the HTTP client cannot be built
    pub fn from_config(client_config: ClientConfig, config: FetchConfig) -> DownloadResult<Self> {
        let probe_attempts = client_config.probe_attempts;
        let client = TseClient::with_config(client_config)?;
        Ok(Self::new(client, probe_attempts, config))
    }
}

impl<S: ArchiveSource> Fetcher<S> {
    pub fn new(source: S, probe_attempts: u32, config: FetchConfig) -> Self {
        let mut executor = TransferExecutor::new(source, probe_attempts);
        if let Some(root) = &config.scratch_root {
            executor = executor.with_scratch_root(root);
        }
        Self {
            executor,
            catalog: DatasetCatalog::builtin(),
            config,
            ingestion_date: None,
        }
    }

    /// Replace the dataset catalog
    pub fn with_catalog(mut self, catalog: DatasetCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Pin the date stamped into file names instead of using today's date
    pub fn with_ingestion_date(mut self, date: NaiveDate) -> Self {
        self.ingestion_date = Some(date);
        self
    }

    pub fn catalog(&self) -> &DatasetCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn executor(&self) -> &TransferExecutor<S> {
        &self.executor
    }

    /// Cache store used for requests under `base_path`
    pub fn cache_store(&self, base_path: &Path) -> CacheStore {
        CacheStore::new(self.config.metadata_path(base_path))
    }

    /// Fetch one dataset/year unless the stored copy is current
    ///
    /// # Errors
    ///
    /// Returns `FetchError` for invalid input, an unavailable cache check, a
    /// failed transfer, a corrupt or incomplete archive, or a failed write of
    /// the artifact. A failed cache record write is not an error.
    pub async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchOutcome> {
        let descriptor = self.catalog.descriptor(request, &self.config.base_url)?;
        let key = request.cache_key();
        let url = &descriptor.remote_archive_url;

        let store = self.cache_store(&request.base_path);
        let table = store.load().await;

        let probe_headers = self.executor.probe(url).await?;

        let decision = evaluate(&table, &key, &probe_headers);
        if decision.requires_fetch() {
            info!("Download needed for {}: {}", key, decision);
        } else if request.force {
            info!("Cache valid for {} ({}), download forced", key, decision);
        } else {
            info!("Cache valid for {} ({}). Download not needed", key, decision);
            return Ok(FetchOutcome::Skipped {
                recorded_path: table.get(&key).and_then(|e| e.file_path.clone()),
                key,
                decision,
            });
        }

        let extracted = self
            .executor
            .fetch_and_extract(url, &descriptor.member)
            .await?;

        let ingestion_date = self
            .ingestion_date
            .unwrap_or_else(|| Local::now().date_naive());
        let destination_dir = descriptor.destination_dir(&request.base_path);
        let final_path = destination_dir.join(descriptor.final_file_name(ingestion_date));

        fs::create_dir_all(&destination_dir)
            .await
            .map_err(|source| FetchError::Storage {
                path: destination_dir.clone(),
                source,
            })?;
        fs::copy(extracted.path(), &final_path)
            .await
            .map_err(|source| FetchError::Storage {
                path: final_path.clone(),
                source,
            })?;

        let transfer_headers = extracted.headers().clone();
        drop(extracted);

        let final_path = fs::canonicalize(&final_path)
            .await
            .unwrap_or_else(|_| final_path.clone());
        info!("File stored at: {}", final_path.display());

        let base_path = fs::canonicalize(&request.base_path)
            .await
            .unwrap_or_else(|_| request.base_path.clone());
        let entry = CacheEntry {
            etag: transfer_headers.etag().map(String::from),
            last_modified: transfer_headers.last_modified().map(String::from),
            file_path: Some(relative_cache_path(&final_path, &base_path)),
        };
        debug!("New cache entry for {}: {:?}", key, entry);

        // Merge into the record as it is now, not as it was before the transfer
        let mut current = store.load().await;
        current.insert(&key, entry);

        let cache_updated = match store.save(&current).await {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", FetchError::CacheWrite(e));
                false
            }
        };

        Ok(FetchOutcome::Downloaded {
            path: final_path,
            cache_updated,
        })
    }
}

/// Path recorded in the cache: relative to `base` with `/` separators, or
/// the full path when `path` is not under `base`
pub fn relative_cache_path(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(relative) => relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => {
            warn!(
                "{} is not under {}; recording absolute path",
                path.display(),
                base.display()
            );
            path.display().to_string()
        }
    }
}
