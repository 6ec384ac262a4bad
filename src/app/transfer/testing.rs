//! In-memory archive source and archive builder for unit tests

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use url::Url;

use crate::app::headers::ValidationHeaders;
use crate::errors::{DownloadError, DownloadResult};

use super::ArchiveSource;

/// Build a ZIP archive in memory from `(name, content)` pairs
pub(crate) fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in members {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[derive(Debug, Default)]
struct FakeState {
    probe_headers: ValidationHeaders,
    probe_failures: u32,
    archive: Option<Vec<u8>>,
    transfer_headers: ValidationHeaders,
    probed: Option<Arc<Notify>>,
    transfer_gate: Option<Arc<Notify>>,
    stall_after_write: bool,
}

/// Scripted archive source that counts calls
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    state: Mutex<FakeState>,
    head_calls: AtomicU32,
    download_calls: AtomicU32,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_probe_headers<const N: usize>(
        self,
        pairs: [(&str, &str); N],
    ) -> Self {
        self.set_probe_headers(pairs);
        self
    }

    /// Fail the next `count` probes with HTTP 503
    pub(crate) fn with_probe_failures(self, count: u32) -> Self {
        self.state.lock().unwrap().probe_failures = count;
        self
    }

    pub(crate) fn with_archive(self, bytes: Vec<u8>) -> Self {
        self.state.lock().unwrap().archive = Some(bytes);
        self
    }

    pub(crate) fn with_transfer_headers<const N: usize>(
        self,
        pairs: [(&str, &str); N],
    ) -> Self {
        self.set_transfer_headers(pairs);
        self
    }

    /// Notify `signal` after every probe
    pub(crate) fn with_probe_signal(self, signal: Arc<Notify>) -> Self {
        self.state.lock().unwrap().probed = Some(signal);
        self
    }

    /// Hold each transfer until `gate` is notified
    pub(crate) fn with_transfer_gate(self, gate: Arc<Notify>) -> Self {
        self.state.lock().unwrap().transfer_gate = Some(gate);
        self
    }

    /// Write the archive, then never complete the transfer
    pub(crate) fn with_stalled_transfer(self) -> Self {
        self.state.lock().unwrap().stall_after_write = true;
        self
    }

    pub(crate) fn set_probe_headers<const N: usize>(&self, pairs: [(&str, &str); N]) {
        self.state.lock().unwrap().probe_headers = ValidationHeaders::from_pairs(pairs);
    }

    pub(crate) fn set_transfer_headers<const N: usize>(&self, pairs: [(&str, &str); N]) {
        self.state.lock().unwrap().transfer_headers = ValidationHeaders::from_pairs(pairs);
    }

    pub(crate) fn head_calls(&self) -> u32 {
        self.head_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn download_calls(&self) -> u32 {
        self.download_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArchiveSource for FakeSource {
    async fn head(&self, _url: &Url) -> DownloadResult<ValidationHeaders> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if let Some(signal) = &state.probed {
            signal.notify_one();
        }
        if state.probe_failures > 0 {
            state.probe_failures -= 1;
            return Err(DownloadError::ServerError { status: 503 });
        }
        Ok(state.probe_headers.clone())
    }

    async fn download_to(
        &self,
        url: &Url,
        destination: &Path,
    ) -> DownloadResult<ValidationHeaders> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.state.lock().unwrap().transfer_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let (archive, headers, stall) = {
            let state = self.state.lock().unwrap();
            (
                state.archive.clone(),
                state.transfer_headers.clone(),
                state.stall_after_write,
            )
        };
        let bytes = archive.ok_or_else(|| DownloadError::NotFound {
            url: url.to_string(),
        })?;
        std::fs::write(destination, bytes)?;

        if stall {
            std::future::pending::<()>().await;
        }
        Ok(headers)
    }
}
