//! Core HTTP operations
//!
//! Single-attempt requests against the archive with per-request timeouts and
//! status mapping. Retry policy is not applied here; the transfer executor
//! decides which operations are retried.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::app::headers::ValidationHeaders;
use crate::errors::{DownloadError, DownloadResult};

/// HTTP operations handler
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Issue one HEAD request and return the response headers
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` on timeout, connection failure or a non-2xx
    /// status.
    pub async fn head(&self, url: &Url, timeout: Duration) -> DownloadResult<ValidationHeaders> {
        let response = self
            .client
            .head(url.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(e, timeout.as_secs()))?;

        let response = Self::check_status(url, response)?;
        let headers = ValidationHeaders::from_header_map(response.headers());
        debug!(
            "HEAD {} -> ETag: {:?}, Last-Modified: {:?}",
            url,
            headers.etag(),
            headers.last_modified()
        );
        Ok(headers)
    }

    /// Issue one GET request; the body is left unread for streaming
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` on timeout, connection failure or a non-2xx
    /// status.
    pub async fn get(&self, url: &Url, timeout: Duration) -> DownloadResult<Response> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(e, timeout.as_secs()))?;

        debug!("GET {} -> {}", url, response.status());
        Self::check_status(url, response)
    }

    /// Map non-success statuses to errors
    fn check_status(url: &Url, response: Response) -> DownloadResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::NOT_FOUND => Err(DownloadError::NotFound {
                url: url.to_string(),
            }),
            status => Err(DownloadError::ServerError {
                status: status.as_u16(),
            }),
        }
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
