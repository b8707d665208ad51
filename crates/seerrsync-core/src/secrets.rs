//! Cached connection details.
//!
//! The cache remembers the last connection that worked for each
//! instance, keyed by instance name. Entries are hints, never trusted:
//! a cached entry is only reused after its host URL and API key still
//! match the configuration and a status probe succeeds. The cache is
//! fully regenerable; losing it only costs a re-probe.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One validated connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedConnection {
    pub host_url: String,
    pub api_key: String,
    /// Remote version reported when the entry was validated.
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsCache {
    #[serde(default)]
    pub connections: BTreeMap<String, CachedConnection>,
}

impl SecretsCache {
    /// Cached entry for an instance, only if it still matches the
    /// configured connection details.
    pub fn matching(&self, instance: &str, host_url: &str, api_key: &str) -> Option<&CachedConnection> {
        self.connections
            .get(instance)
            .filter(|c| c.host_url == host_url && c.api_key == api_key)
    }

    pub fn store(&mut self, instance: &str, entry: CachedConnection) {
        self.connections.insert(instance.to_owned(), entry);
    }

    pub fn invalidate(&mut self, instance: &str) {
        self.connections.remove(instance);
    }
}
