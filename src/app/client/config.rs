//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! used for archive probes and transfers.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{http, limits};
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for the archive HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Bound on a single existence probe
    pub probe_timeout: Duration,
    /// Bound on the full archive transfer
    pub transfer_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Probe attempts before the cache check is declared unavailable
    pub probe_attempts: u32,
    /// TCP keep-alive settings
    pub tcp_keepalive: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            probe_timeout: http::PROBE_TIMEOUT,
            transfer_timeout: http::TRANSFER_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            probe_attempts: limits::PROBE_ATTEMPTS,
            tcp_keepalive: Some(http::TCP_KEEPALIVE),
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            user_agent: http::USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Set the probe and transfer timeouts
    pub fn with_timeouts(mut self, probe: Duration, transfer: Duration) -> Self {
        self.probe_timeout = probe;
        self.transfer_timeout = transfer;
        self
    }

    /// Set the number of probe attempts
    pub fn with_probe_attempts(mut self, attempts: u32) -> Self {
        self.probe_attempts = attempts;
        self
    }

    /// Builds the HTTP client with the specified configuration
    ///
    /// Per-request timeouts are applied by the caller, so the client itself
    /// only bounds connection establishment.
    pub fn build_http_client(&self) -> DownloadResult<Client> {
        let mut client_builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .tcp_nodelay(self.tcp_nodelay);

        if let Some(keepalive) = self.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(keepalive);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(DownloadError::Http)
    }
}
