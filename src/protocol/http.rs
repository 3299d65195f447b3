// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for Prana devices.

use std::net::Ipv6Addr;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::protocol::CommandResponse;

// ============================================================================
// HttpConfig
// ============================================================================

/// Connection parameters for a Prana device.
///
/// The device speaks plain HTTP without authentication; each request is
/// independent.
///
/// # Examples
///
/// ```
/// use prana_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.1.40")
///     .with_port(8080)
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "http://192.168.1.40:8080");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    port: u16,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the specified host.
    ///
    /// `host` may be a bare host, `host:port`, or a full `http://` URL.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    ///
    /// A host that already carries a scheme is used as is. Bare IPv6
    /// literals are bracketed; a port given in the host wins over
    /// [`with_port`](Self::with_port).
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            return host.to_string();
        }

        let (host, has_port) = if host.parse::<Ipv6Addr>().is_ok() {
            (format!("[{host}]"), false)
        } else if host.starts_with('[') {
            (host.to_string(), host.contains("]:"))
        } else {
            (host.to_string(), host.contains(':'))
        };

        if has_port || self.port == Self::DEFAULT_PORT {
            format!("http://{host}")
        } else {
            format!("http://{host}:{}", self.port)
        }
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be
    /// created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }

        let base_url = self.base_url();

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            base_url,
            client,
            timeout: self.timeout,
        })
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// HTTP client for a single Prana device.
///
/// Reads are `GET /<endpoint>`, writes are `POST /<endpoint>` with a JSON
/// body. Failures are classified into [`ProtocolError`] variants; the client
/// never retries.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a client for the specified host with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(host: impl Into<String>) -> Result<Self, ProtocolError> {
        HttpConfig::new(host).into_client()
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Sends `GET /<endpoint>`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on connection failure, timeout or non-success
    /// status.
    pub async fn get(&self, endpoint: &str) -> Result<CommandResponse, ProtocolError> {
        let url = self.url(endpoint);
        tracing::debug!(url = %url, "Sending HTTP GET");
        self.execute(self.client.get(&url)).await
    }

    /// Sends `POST /<endpoint>` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on connection failure, timeout or non-success
    /// status.
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<CommandResponse, ProtocolError> {
        let url = self.url(endpoint);
        tracing::debug!(url = %url, body = %body, "Sending HTTP POST");
        self.execute(self.client.post(&url).json(body)).await
    }

    async fn execute(&self, request: RequestBuilder) -> Result<CommandResponse, ProtocolError> {
        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProtocolError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;

        tracing::debug!(body = %body, "Received HTTP response");

        Ok(CommandResponse::new(body))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn classify(&self, err: reqwest::Error) -> ProtocolError {
        if err.is_timeout() {
            // Safe: request timeouts are seconds, far below u64::MAX ms
            ProtocolError::Timeout(self.timeout.as_millis() as u64)
        } else if err.is_connect() {
            ProtocolError::ConnectionFailed(err.to_string())
        } else {
            ProtocolError::Http(err)
        }
    }
}
