//! Turn a remote snapshot back into a desired-state tree.
//!
//! Used by config dumping: the emitted tree, fed back in as desired
//! state, diffs clean against the same remote.

use indexmap::IndexMap;

use crate::convert;
use crate::model::{InstanceSettings, ServiceCollection, Snapshot};

/// Express the full remote configuration as a desired-state tree.
pub fn snapshot_to_settings(snapshot: &Snapshot) -> InstanceSettings {
    let sonarr = ServiceCollection {
        delete_unmanaged: false,
        definitions: snapshot
            .sonarr
            .iter()
            .map(|s| (s.name.clone(), convert::decode_sonarr(s)))
            .collect::<IndexMap<_, _>>(),
    };
    let radarr = ServiceCollection {
        delete_unmanaged: false,
        definitions: snapshot
            .radarr
            .iter()
            .map(|s| (s.name.clone(), convert::decode_radarr(s)))
            .collect::<IndexMap<_, _>>(),
    };

    InstanceSettings {
        general: Some(convert::decode_general(&snapshot.main)),
        users: Some(convert::decode_users(&snapshot.main)),
        media_server: Some(convert::decode_media_server(&snapshot.media_server)),
        sonarr: Some(sonarr),
        radarr: Some(radarr),
        notifications: Some(convert::decode_channels(&snapshot.notifications)),
    }
}
