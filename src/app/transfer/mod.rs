//! Existence probe and archive transfer
//!
//! The executor drives an [`ArchiveSource`] (the HTTP client in production)
//! through the two network steps of a fetch:
//!
//! - [`TransferExecutor::probe`]: HEAD request, retried a fixed number of
//!   times with no delay between attempts
//! - [`TransferExecutor::fetch_and_extract`]: full transfer into a scratch
//!   directory followed by extraction of the expected archive member
//!
//! Scratch space is a [`tempfile::TempDir`] owned by the returned
//! [`ExtractedFile`], or by the in-flight future until then, so it is removed
//! on success, on error, and when the future is dropped.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::app::datasets::MemberPattern;
use crate::app::headers::ValidationHeaders;
use crate::constants::storage;
use crate::errors::{DownloadResult, FetchError, FetchResult};

pub mod extract;

#[cfg(test)]
pub(crate) mod testing;

pub use extract::ExtractedMember;

/// Network operations a fetch needs from the remote archive
///
/// Each call is a single attempt; retry policy belongs to the executor.
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Header-only request returning the response headers
    async fn head(&self, url: &Url) -> DownloadResult<ValidationHeaders>;

    /// Full transfer of `url` into `destination`, returning the headers of
    /// the response that carried the body
    async fn download_to(
        &self,
        url: &Url,
        destination: &Path,
    ) -> DownloadResult<ValidationHeaders>;
}

/// Archive member extracted into scratch storage
///
/// Dropping this value deletes the scratch directory and everything in it.
#[derive(Debug)]
pub struct ExtractedFile {
    scratch: TempDir,
    path: PathBuf,
    member_name: String,
    headers: ValidationHeaders,
}

impl ExtractedFile {
    /// Extracted content on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the member inside the archive
    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    /// Validators of the full-transfer response
    pub fn headers(&self) -> &ValidationHeaders {
        &self.headers
    }

    /// Root of the scratch directory
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }
}

/// Runs probes and transfers against an archive source
#[derive(Debug)]
pub struct TransferExecutor<S> {
    source: S,
    probe_attempts: u32,
    scratch_root: Option<PathBuf>,
}

impl<S: ArchiveSource> TransferExecutor<S> {
    /// Create an executor; `probe_attempts` is raised to at least one
    pub fn new(source: S, probe_attempts: u32) -> Self {
        Self {
            source,
            probe_attempts: probe_attempts.max(1),
            scratch_root: None,
        }
    }

    /// Create scratch directories under `root` instead of the system temp dir
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn probe_attempts(&self) -> u32 {
        self.probe_attempts
    }

    /// Check that `url` exists and collect its validators
    ///
    /// # Errors
    ///
    /// Returns `FetchError::CacheCheckUnavailable` carrying the last failure
    /// once every attempt has failed.
    pub async fn probe(&self, url: &Url) -> FetchResult<ValidationHeaders> {
        let mut attempt = 1;
        loop {
            match self.source.head(url).await {
                Ok(headers) => {
                    debug!("Probe succeeded for {} (attempt {})", url, attempt);
                    return Ok(headers);
                }
                Err(e) if attempt < self.probe_attempts => {
                    warn!(
                        "Probe failed (attempt {}/{}): {}. Retrying",
                        attempt, self.probe_attempts, e
                    );
                    attempt += 1;
                }
                Err(e) => {
                    error!("Probe failed after {} attempts: {}", attempt, e);
                    return Err(FetchError::CacheCheckUnavailable {
                        url: url.to_string(),
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }

    /// Transfer the archive at `url` and extract the member matching `member`
    ///
    /// # Errors
    ///
    /// - `FetchError::Transfer` if the download fails
    /// - `FetchError::CorruptArchive` if the archive cannot be read
    /// - `FetchError::MemberNotFound` if no member matches
    /// - `FetchError::Storage` if scratch storage cannot be used
    pub async fn fetch_and_extract(
        &self,
        url: &Url,
        member: &MemberPattern,
    ) -> FetchResult<ExtractedFile> {
        let scratch = self.acquire_scratch()?;
        let archive_path = scratch.path().join(archive_file_name(url));

        info!("Starting download of: {}", url);
        let headers = self
            .source
            .download_to(url, &archive_path)
            .await
            .map_err(|source| {
                error!("Archive download failed: {}", source);
                FetchError::Transfer {
                    url: url.to_string(),
                    source,
                }
            })?;

        let output_dir = scratch.path().join("extracted");
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| FetchError::Storage {
                path: output_dir.clone(),
                source,
            })?;

        let pattern = member.clone();
        let task_archive_path = archive_path.clone();
        let extracted = tokio::task::spawn_blocking(move || {
            extract::extract_member(&task_archive_path, &pattern, &output_dir)
        })
        .await
        .map_err(|e| FetchError::CorruptArchive {
            path: archive_path.clone(),
            reason: format!("extraction task failed: {}", e),
        })??;

        Ok(ExtractedFile {
            scratch,
            path: extracted.path,
            member_name: extracted.member_name,
            headers,
        })
    }

    fn acquire_scratch(&self) -> FetchResult<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(storage::SCRATCH_PREFIX);

        let result = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };

        result.map_err(|source| FetchError::Storage {
            path: self
                .scratch_root
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            source,
        })
    }
}

/// Local file name for the downloaded archive
fn archive_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("archive.zip")
        .to_string()
}
