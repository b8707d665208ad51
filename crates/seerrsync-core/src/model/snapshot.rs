//! Point-in-time remote state, fetched before diffing and again after
//! applying (the pruner works from the post-apply snapshot).

use std::collections::BTreeMap;

use seerrsync_api::types::{
    ArrService, MainSettings, MediaServerSettings, NotificationConfig, ServiceKind,
};

use crate::model::desired::ChannelKind;

/// Everything the differ and pruner need to know about the remote.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub initialized: bool,
    pub version: String,
    pub main: MainSettings,
    pub media_server: MediaServerSettings,
    pub sonarr: Vec<ArrService>,
    pub radarr: Vec<ArrService>,
    pub notifications: BTreeMap<ChannelKind, NotificationConfig>,
}

impl Snapshot {
    pub fn services(&self, kind: ServiceKind) -> &[ArrService] {
        match kind {
            ServiceKind::Sonarr => &self.sonarr,
            ServiceKind::Radarr => &self.radarr,
        }
    }

    /// Look up a remote service link by name within one collection.
    pub fn service_by_name(&self, kind: ServiceKind, name: &str) -> Option<&ArrService> {
        self.services(kind).iter().find(|s| s.name == name)
    }

    /// Map a configured library name to its remote id.
    pub fn library_id(&self, name: &str) -> Option<&str> {
        self.media_server
            .libraries
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.id.as_str())
    }
}
