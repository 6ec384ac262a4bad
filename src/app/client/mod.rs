//! HTTP client implementation for the TSE open-data archive
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: single-attempt HEAD/GET with timeouts and status mapping
//! - `download`: streamed archive transfer to a local file

use std::path::Path;

use async_trait::async_trait;
use url::Url;

use crate::app::headers::ValidationHeaders;
use crate::app::transfer::ArchiveSource;
use crate::errors::DownloadResult;

// Module declarations
pub mod config;
pub mod download;
pub mod http;

pub use config::ClientConfig;

use download::DownloadHandler;
use http::HttpHandler;

/// HTTP client for the remote archive
#[derive(Debug, Clone)]
pub struct TseClient {
    http_handler: HttpHandler,
    config: ClientConfig,
}

impl TseClient {
    /// Creates a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the HTTP client cannot be built
    pub fn new() -> DownloadResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the HTTP client cannot be built
    pub fn with_config(config: ClientConfig) -> DownloadResult<Self> {
        let client = config.build_http_client()?;
        tracing::debug!(
            "Created archive client (probe timeout {:?}, transfer timeout {:?})",
            config.probe_timeout,
            config.transfer_timeout
        );
        Ok(Self {
            http_handler: HttpHandler::new(client),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl ArchiveSource for TseClient {
    async fn head(&self, url: &Url) -> DownloadResult<ValidationHeaders> {
        self.http_handler.head(url, self.config.probe_timeout).await
    }

    async fn download_to(
        &self,
        url: &Url,
        destination: &Path,
    ) -> DownloadResult<ValidationHeaders> {
        DownloadHandler::new(&self.http_handler)
            .download_to(url, destination, self.config.transfer_timeout)
            .await
    }
}
