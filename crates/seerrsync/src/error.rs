//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use seerrsync_config::ConfigError;
use seerrsync_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const VALIDATION: i32 = 4;
    pub const PARTIAL_APPLY: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(
        code(seerrsync::config),
        help("Check the configuration file; `seerrsync dump-config` prints a working template.")
    )]
    Config(#[from] ConfigError),

    /// A single-instance operation (dump-config) failed.
    #[error("instance at {url} could not be processed")]
    #[diagnostic(code(seerrsync::instance))]
    Instance {
        url: String,
        #[source]
        source: CoreError,
    },

    #[error("invalid instance URL: {url}")]
    #[diagnostic(
        code(seerrsync::invalid_url),
        help("Expected something like http://jellyseerr:5055 or https://host/jellyseerr.")
    )]
    InvalidUrl { url: String },

    #[error("instance at {url} has not completed first-time setup")]
    #[diagnostic(
        code(seerrsync::not_initialized),
        help(
            "There is nothing to dump yet. Declare the instance with media_server\n\
             credentials and run `seerrsync apply` to initialize it."
        )
    )]
    NotInitialized { url: String },

    /// One or more instances failed during a plan/apply run. The
    /// per-instance reports were already printed; this carries the
    /// exit code of the most severe failure.
    #[error("{failed} of {total} instance(s) failed")]
    #[diagnostic(code(seerrsync::run_failed))]
    RunFailed {
        failed: usize,
        total: usize,
        exit: i32,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Exit code for one instance failure.
pub fn core_exit_code(err: &CoreError) -> i32 {
    match err {
        CoreError::Connection { .. } => exit_code::CONNECTION,
        CoreError::Auth => exit_code::AUTH,
        CoreError::Validation { .. } => exit_code::VALIDATION,
        CoreError::PartialApply { .. } => exit_code::PARTIAL_APPLY,
        _ => exit_code::GENERAL,
    }
}

impl CliError {
    /// Map this error to a process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::InvalidUrl { .. } => exit_code::USAGE,
            Self::Instance { source, .. } => core_exit_code(source),
            Self::RunFailed { exit, .. } => *exit,
            Self::NotInitialized { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

/// Per-instance failure wrapper so reports name the instance.
#[derive(Debug, Error, Diagnostic)]
#[error("instance '{name}' failed")]
#[diagnostic(code(seerrsync::instance_failed))]
pub struct InstanceFailure {
    pub name: String,
    #[source]
    pub source: CoreError,
}
