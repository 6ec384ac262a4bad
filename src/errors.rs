//! Error types for TSE Fetcher
//!
//! This module defines the error types for all components of the application.
//! Network failures of a single HTTP attempt are `DownloadError`s, failures of
//! the cache record are `CacheError`s, and the orchestration taxonomy that
//! callers act on lives in `FetchError`. Everything composes into `AppError`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a single HTTP attempt against the remote archive
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error while writing the response body
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request timed out
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Server returned an error status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Remote resource does not exist
    #[error("Resource not found: {url}")]
    NotFound { url: String },
}

impl DownloadError {
    /// Map a reqwest failure, keeping timeouts distinguishable
    pub fn from_reqwest(error: reqwest::Error, timeout_secs: u64) -> Self {
        if error.is_timeout() {
            DownloadError::Timeout {
                seconds: timeout_secs,
            }
        } else {
            DownloadError::Http(error)
        }
    }
}

/// Cache record errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache directory could not be created
    #[error("Cache directory not accessible: {path}")]
    DirectoryNotAccessible { path: PathBuf },

    /// Writing the cache record failed
    #[error("Failed to write cache record {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the cache table failed
    #[error("Failed to serialize cache table: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Background write task did not complete
    #[error("Cache write task failed: {reason}")]
    Task { reason: String },
}

/// Errors of one fetch orchestration call
#[derive(Error, Debug)]
pub enum FetchError {
    /// Dataset type is not in the catalog
    #[error("Unknown dataset type '{dataset_type}'. Valid options: {}", known.join(", "))]
    UnknownDataset {
        dataset_type: String,
        known: Vec<String>,
    },

    /// Remote URL could not be built
    #[error("Invalid archive URL {url}: {error}")]
    InvalidUrl { url: String, error: String },

    /// Existence probe exhausted its attempts
    #[error("Cache check unavailable for {url} after {attempts} attempts: {source}")]
    CacheCheckUnavailable {
        url: String,
        attempts: u32,
        #[source]
        source: DownloadError,
    },

    /// Full transfer failed
    #[error("Could not download archive from {url}: {source}")]
    Transfer {
        url: String,
        #[source]
        source: DownloadError,
    },

    /// Archive is structurally invalid
    #[error("Corrupt archive {path}: {reason}")]
    CorruptArchive { path: PathBuf, reason: String },

    /// Archive does not contain the expected member
    #[error("No member ending in '{expected}' found in archive. Available members: {members:?}")]
    MemberNotFound {
        expected: String,
        members: Vec<String>,
    },

    /// Directory creation or file write failed
    #[error("Could not write {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache record could not be saved after the artifact was stored
    #[error("Cache metadata not updated: {0}")]
    CacheWrite(#[from] CacheError),
}

impl FetchError {
    /// Get error category for logging and exit status
    pub fn category(&self) -> &'static str {
        match self {
            FetchError::UnknownDataset { .. } | FetchError::InvalidUrl { .. } => "invalid_input",
            FetchError::CacheCheckUnavailable { .. } => "cache_check",
            FetchError::Transfer { .. } => "transfer",
            FetchError::CorruptArchive { .. } => "corrupt_archive",
            FetchError::MemberNotFound { .. } => "member_not_found",
            FetchError::Storage { .. } => "storage",
            FetchError::CacheWrite(_) => "cache_write",
        }
    }

    /// Check if retrying the same call later may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FetchError::CacheCheckUnavailable { .. } | FetchError::Transfer { .. }
        )
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// User configuration directory is unknown on this platform
    #[error("Could not determine user config directory")]
    NoConfigDir,
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Fetch orchestration error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Cache error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Command-line input rejected before any I/O
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Create an invalid input error with a message
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Fetch(e) => e.is_recoverable(),
            AppError::Download(DownloadError::Timeout { .. })
            | AppError::Download(DownloadError::Http(_))
            | AppError::Download(DownloadError::ServerError { .. }) => true,
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Fetch(e) => e.category(),
            AppError::Download(_) => "download",
            AppError::Cache(_) => "cache",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::InvalidInput { .. } => "invalid_input",
            AppError::Generic { .. } => "generic",
        }
    }

    /// Process exit status for the CLI
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            "invalid_input" | "config" => 2,
            _ => 1,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Cache result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
