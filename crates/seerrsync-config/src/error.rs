use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("the configuration declares no instances")]
    NoInstances,

    #[error("instance '{instance}' depends on unknown instance '{dependency}'")]
    UnknownDependency { instance: String, dependency: String },

    #[error("instance '{instance}' is part of a dependency cycle")]
    DependencyCycle { instance: String },

    #[error("failed to write connection cache to {path}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
