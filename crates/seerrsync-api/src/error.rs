use thiserror::Error;

/// Top-level error type for the `seerrsync-api` crate.
///
/// Covers every failure mode of the Jellyseerr HTTP surface: transport,
/// authentication, API-level errors, and response decoding.
/// `seerrsync-core` maps these into per-instance reconciliation errors.
#[derive(Debug, Error)]
pub enum ApiError {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Authentication ──────────────────────────────────────────────
    /// API key rejected by the instance (401/403).
    #[error("Invalid API key")]
    InvalidApiKey,

    // ── API ─────────────────────────────────────────────────────────
    /// Structured error reported by the Jellyseerr API.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    ///
    /// Usually indicates an incompatible remote version whose response
    /// shape this client does not understand.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl ApiError {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates rejected credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::InvalidApiKey)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}
