// Shared transport configuration for building reqwest::Client instances.
//
// The initialization path needs a cookie store (Jellyseerr tracks the
// setup session in a cookie) while normal API-key requests do not, so
// both variants share TLS and timeout settings through this module.

use std::time::Duration;

use crate::error::ApiError;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout applied to every call.
    pub timeout: Duration,
    /// Accept invalid TLS certificates (self-hosted instances often
    /// run behind self-signed HTTPS).
    pub danger_accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            danger_accept_invalid_certs: false,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` with the given default headers.
    ///
    /// Used to inject the `X-Api-Key` header on every request. The
    /// cookie store is always enabled so the one-time initialization
    /// flow can carry its setup session.
    pub fn build_client(
        &self,
        headers: reqwest::header::HeaderMap,
    ) -> Result<reqwest::Client, ApiError> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("seerrsync/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .default_headers(headers);

        if self.danger_accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| ApiError::Tls(format!("failed to build HTTP client: {e}")))
    }
}
