//! Connection-cache persistence.
//!
//! The cache lives as JSON under the per-user state directory. It only
//! holds probe hints, so a missing or unreadable file degrades to an
//! empty cache instead of failing the run.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, warn};

use seerrsync_core::SecretsCache;

use crate::error::ConfigError;

const CACHE_FILE: &str = "connections.json";

/// Default cache location under the user's state directory.
pub fn default_cache_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "seerrsync")?;
    let base = dirs
        .state_dir()
        .map_or_else(|| dirs.cache_dir().to_path_buf(), Path::to_path_buf);
    Some(base.join(CACHE_FILE))
}

/// Load the cache, falling back to an empty one when the file is
/// missing or unreadable.
pub fn load_cache(path: &Path) -> SecretsCache {
    match std::fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(cache) => cache,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "discarding unreadable connection cache");
                SecretsCache::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => SecretsCache::default(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "discarding unreadable connection cache");
            SecretsCache::default()
        }
    }
}

/// Persist the cache, creating parent directories as needed.
pub fn save_cache(path: &Path, cache: &SecretsCache) -> Result<(), ConfigError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(cache)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, raw)
    };
    write().map_err(|source| ConfigError::CacheWrite {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "connection cache saved");
    Ok(())
}
