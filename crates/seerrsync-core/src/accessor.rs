//! Remote state acquisition.
//!
//! Fetching starts with the unauthenticated public settings so a fresh
//! instance awaiting first-time setup is recognized before any
//! authenticated endpoint is touched.

use std::collections::BTreeMap;

use tracing::debug;

use seerrsync_api::SeerrClient;
use seerrsync_api::types::ServiceKind;

use crate::error::CoreError;
use crate::model::{ChannelKind, Snapshot};
use crate::retry::RetryPolicy;

/// What the remote looks like right now.
#[derive(Debug)]
pub enum RemoteState {
    /// Initialized and ready to be reconciled.
    Ready(Box<Snapshot>),
    /// First-time setup has not run; only initialization is possible.
    Uninitialized,
}

/// Fetch a full configuration snapshot from an instance. Each read is
/// retried per `retry` on transient failure.
pub async fn fetch_state(
    client: &SeerrClient,
    retry: &RetryPolicy,
) -> Result<RemoteState, CoreError> {
    let public = retry.call(|| client.public_settings()).await?;
    if !public.initialized {
        debug!("remote reports first-time setup has not run");
        return Ok(RemoteState::Uninitialized);
    }

    let status = retry.call(|| client.status()).await?;
    let main = retry.call(|| client.main_settings()).await?;
    let media_server = retry.call(|| client.media_server_settings()).await?;
    let sonarr = retry
        .call(|| client.list_services(ServiceKind::Sonarr))
        .await?;
    let radarr = retry
        .call(|| client.list_services(ServiceKind::Radarr))
        .await?;

    let mut notifications = BTreeMap::new();
    for kind in ChannelKind::ALL {
        let config = retry.call(|| client.notification(kind.tag())).await?;
        notifications.insert(kind, config);
    }

    debug!(
        version = %status.version,
        sonarr = sonarr.len(),
        radarr = radarr.len(),
        "fetched remote snapshot"
    );

    Ok(RemoteState::Ready(Box::new(Snapshot {
        initialized: true,
        version: status.version,
        main,
        media_server,
        sonarr,
        radarr,
        notifications,
    })))
}
