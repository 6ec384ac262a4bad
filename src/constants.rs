//! Application constants for TSE Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names for configuration overrides
pub mod env {
    /// Overrides the remote archive base URL
    pub const BASE_URL: &str = "TSE_FETCHER_BASE_URL";

    /// Overrides the destination base path
    pub const BASE_PATH: &str = "TSE_FETCHER_BASE_PATH";

    /// Overrides the cache metadata file location
    pub const METADATA_FILE: &str = "TSE_FETCHER_METADATA_FILE";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("TSE-Fetcher/", env!("CARGO_PKG_VERSION"));

    /// Timeout for the header-only existence probe
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for the full archive transfer
    pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(300);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// TCP keep-alive interval
    pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
}

/// Retry configuration
pub mod limits {
    /// Attempts made by the existence probe before giving up.
    /// Retries are immediate; there is no backoff.
    pub const PROBE_ATTEMPTS: u32 = 3;
}

/// Remote archive layout
pub mod tse {
    /// Open-data archive base URL
    pub const BASE_URL: &str = "https://cdn.tse.jus.br/estatistica/sead/odsele";

    /// Suffix of the nationwide member inside each archive
    pub const MEMBER_SUFFIX: &str = "_BRASIL.csv";

    /// Marker inserted in final file names before the ingestion date
    pub const NATIONWIDE_MARKER: &str = "BRASIL";

    /// Extension of extracted data files
    pub const DATA_EXTENSION: &str = "csv";

    /// First election year accepted by the interactive prompt
    pub const FIRST_YEAR: u16 = 1994;
}

/// Local storage layout
pub mod storage {
    /// Default destination base path, relative to the working directory
    pub const DEFAULT_BASE_PATH: &str = "data/raw";

    /// Cache record location, relative to the destination base path
    pub const METADATA_FILE: &str = ".tse_fetcher/cache_metadata.json";

    /// Prefix for scratch directories
    pub const SCRATCH_PREFIX: &str = "tse-fetcher-";

    /// Date format appended to final file names
    pub const INGESTION_DATE_FORMAT: &str = "%Y%m%d";
}

/// Configuration file locations
pub mod config {
    /// Project-local configuration file
    pub const LOCAL_FILE: &str = "tse-fetcher.toml";

    /// Application directory name under the user config directory
    pub const APP_DIR: &str = "tse-fetcher";

    /// Configuration file name inside the application directory
    pub const FILE_NAME: &str = "config.toml";
}
