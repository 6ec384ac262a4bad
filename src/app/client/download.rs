//! Archive transfer to a local file
//!
//! Streams the response body to disk chunk by chunk so large archives are
//! never held in memory, and returns the validators of the response that
//! delivered the bytes.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::app::client::http::HttpHandler;
use crate::app::headers::ValidationHeaders;
use crate::errors::{DownloadError, DownloadResult};

/// File download operations handler
pub struct DownloadHandler<'a> {
    http_handler: &'a HttpHandler,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler with the given HTTP handler
    pub fn new(http_handler: &'a HttpHandler) -> Self {
        Self { http_handler }
    }

    /// Download `url` into `destination`, overwriting it
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the request fails, the status is not 2xx,
    /// the body stream breaks, or the file cannot be written.
    pub async fn download_to(
        &self,
        url: &Url,
        destination: &Path,
        timeout: Duration,
    ) -> DownloadResult<ValidationHeaders> {
        let response = self.http_handler.get(url, timeout).await?;
        let headers = ValidationHeaders::from_header_map(response.headers());

        let mut file = File::create(destination).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| DownloadError::from_reqwest(e, timeout.as_secs()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("Wrote {} bytes to {}", written, destination.display());
        info!("Download complete: {} ({} bytes)", url, written);
        Ok(headers)
    }
}
