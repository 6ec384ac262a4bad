//! Configuration management for TSE Fetcher
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! environment variables, then command-line flags (applied by the CLI).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::app::{ClientConfig, FetchConfig};
use crate::constants::{config as config_files, env, http, limits, storage, tse};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Remote archive and local storage settings
    pub storage: StorageConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// File the settings were read from
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Bound on a single existence probe
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,
    /// Bound on the full archive transfer
    #[serde(with = "humantime_serde")]
    pub transfer_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Probe attempts before giving up
    pub probe_attempts: u32,
    /// TCP keep-alive (None = disabled)
    #[serde(with = "humantime_serde")]
    pub tcp_keepalive: Option<Duration>,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout (None = no timeout)
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Option<Duration>,
    /// User agent override
    pub user_agent: Option<String>,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            probe_timeout: http::PROBE_TIMEOUT,
            transfer_timeout: http::TRANSFER_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            probe_attempts: limits::PROBE_ATTEMPTS,
            tcp_keepalive: Some(http::TCP_KEEPALIVE),
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            user_agent: None,
        }
    }
}

/// TOML-friendly storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfigToml {
    /// Archive base URL
    pub base_url: String,
    /// Destination base directory
    pub base_path: PathBuf,
    /// Cache record path, relative to `base_path` unless absolute
    pub metadata_file: PathBuf,
    /// Parent directory for scratch storage (system temp dir if unset)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for StorageConfigToml {
    fn default() -> Self {
        Self {
            base_url: tse::BASE_URL.to_string(),
            base_path: PathBuf::from(storage::DEFAULT_BASE_PATH),
            metadata_file: PathBuf::from(storage::METADATA_FILE),
            scratch_dir: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    ///
    /// CLI flags are applied afterwards by the command handlers.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(path) => {
                let mut config = Self::load_from_file(&path).await?;
                config.source = Some(path);
                config
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(config_files::LOCAL_FILE)];
        if let Ok(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        search_paths.into_iter().find(|path| {
            let found = path.exists();
            if found {
                debug!("Found config file: {}", path.display());
            }
            found
        })
    }

    /// Default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir
            .join(config_files::APP_DIR)
            .join(config_files::FILE_NAME))
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Config file the settings came from, if any
    pub fn loaded_from(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Report where the settings came from
    pub fn log_source(&self) {
        match self.loaded_from() {
            Some(path) => info!("Loaded configuration from: {}", path.display()),
            None => debug!("No config file found in standard locations, using defaults"),
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = lookup(env::BASE_URL) {
            debug!("{} overrides base URL", env::BASE_URL);
            self.storage.base_url = base_url;
        }
        if let Some(base_path) = lookup(env::BASE_PATH) {
            debug!("{} overrides base path", env::BASE_PATH);
            self.storage.base_path = PathBuf::from(base_path);
        }
        if let Some(metadata_file) = lookup(env::METADATA_FILE) {
            debug!("{} overrides cache record path", env::METADATA_FILE);
            self.storage.metadata_file = PathBuf::from(metadata_file);
        }
    }

    /// Reject settings the fetcher cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.client.probe_attempts == 0 {
            return Err(invalid("client.probe_attempts", "0", "At least one attempt is required"));
        }

        let timeouts = [
            ("client.probe_timeout", self.client.probe_timeout),
            ("client.transfer_timeout", self.client.transfer_timeout),
            ("client.connect_timeout", self.client.connect_timeout),
        ];
        for (field, value) in timeouts {
            if value.is_zero() {
                return Err(invalid(field, "0s", "Timeouts must be greater than zero"));
            }
        }

        if let Err(e) = Url::parse(&self.storage.base_url) {
            return Err(invalid(
                "storage.base_url",
                &self.storage.base_url,
                &format!("Not a valid URL: {}", e),
            ));
        }

        if self.storage.metadata_file.as_os_str().is_empty() {
            return Err(invalid(
                "storage.metadata_file",
                "",
                "A cache record path is required",
            ));
        }

        Ok(())
    }

    /// Convert TOML-friendly configuration to runtime configuration
    pub fn to_runtime_config(&self) -> ConfigResult<(ClientConfig, FetchConfig)> {
        self.validate()?;
        Ok((
            self.client.to_runtime_config(),
            self.storage.to_runtime_config(),
        ))
    }

    /// Destination base directory
    pub fn base_path(&self) -> &Path {
        &self.storage.base_path
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            probe_timeout: self.probe_timeout,
            transfer_timeout: self.transfer_timeout,
            connect_timeout: self.connect_timeout,
            probe_attempts: self.probe_attempts,
            tcp_keepalive: self.tcp_keepalive,
            tcp_nodelay: self.tcp_nodelay,
            pool_idle_timeout: self.pool_idle_timeout,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| http::USER_AGENT.to_string()),
        }
    }
}

impl StorageConfigToml {
    /// Convert to runtime FetchConfig
    pub fn to_runtime_config(&self) -> FetchConfig {
        FetchConfig {
            base_url: self.base_url.clone(),
            metadata_file: self.metadata_file.clone(),
            scratch_root: self.scratch_dir.clone(),
        }
    }
}
