use thiserror::Error;

use seerrsync_api::ApiError;

/// Reconciliation error taxonomy.
///
/// One `CoreError` is fatal for the instance it occurred on, never for
/// independent instances. The pipeline attaches the instance name when
/// reporting; errors here carry the field or resource implicated.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Transient network failure that survived the bounded retries.
    #[error("connection failed after {attempts} attempts: {source}")]
    Connection {
        attempts: u32,
        #[source]
        source: ApiError,
    },

    /// Credentials rejected by the instance. Never retried.
    #[error("authentication rejected (check the configured API key)")]
    Auth,

    /// The remote response could not be understood — usually an
    /// unsupported remote version. Never retried.
    #[error("incompatible remote: {message}")]
    IncompatibleRemote { message: String },

    /// The remote reported a version other than the one the
    /// configuration pinned.
    #[error("remote version {actual} does not match expected {expected}")]
    VersionMismatch { expected: String, actual: String },

    /// Malformed desired configuration, with the offending field path.
    #[error("invalid configuration at `{field}`: {reason}")]
    Validation { field: String, reason: String },

    /// Non-transient API failure outside the apply path.
    #[error("API error: {source}")]
    Api {
        #[source]
        source: ApiError,
    },

    /// A later apply step failed after earlier steps committed.
    ///
    /// Enumerates what committed so the caller knows a re-run will
    /// re-diff and only emit the remaining deltas.
    #[error("apply failed at `{failed}` after {} committed change(s)", committed.len())]
    PartialApply {
        committed: Vec<String>,
        failed: String,
        #[source]
        source: ApiError,
    },

    /// This instance was skipped because a prerequisite instance failed.
    #[error("prerequisite instance '{dependency}' failed")]
    DependencyFailed { dependency: String },

    /// The run was cancelled between pipeline stages.
    #[error("cancelled")]
    Cancelled,
}

impl CoreError {
    /// Classify an API error outside the retry loop.
    pub fn from_api(err: ApiError) -> Self {
        if err.is_auth() {
            Self::Auth
        } else if let ApiError::Deserialization { message, .. } = &err {
            Self::IncompatibleRemote {
                message: message.clone(),
            }
        } else {
            Self::Api { source: err }
        }
    }
}
