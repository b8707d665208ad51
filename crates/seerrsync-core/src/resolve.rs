//! Remote-reference resolution.
//!
//! Linked-service definitions refer to quality profiles, language
//! profiles and tags by name. Those names only have meaning on the
//! linked Sonarr/Radarr server, so each definition is resolved through
//! the service test endpoint (which proxies the server's metadata)
//! into a wire-ready shape before diffing. Everything after this stage
//! is pure.

use tracing::debug;

use seerrsync_api::SeerrClient;
use seerrsync_api::types::{ArrService, ServiceKind, ServiceTestRequest};

use crate::convert;
use crate::error::CoreError;
use crate::retry::{RetryFailure, RetryPolicy};
use crate::model::{
    GeneralSettings, InstanceSettings, MediaServerConfig, NotificationSettings,
    RadarrDefinition, ServiceCollection, SonarrDefinition, UserSettings,
};

/// One service collection with every definition resolved to its wire
/// shape, sorted by definition name for deterministic plans.
#[derive(Debug)]
pub struct ResolvedCollection {
    pub delete_unmanaged: bool,
    pub services: Vec<(String, ArrService)>,
}

impl ResolvedCollection {
    pub fn contains(&self, name: &str) -> bool {
        self.services.iter().any(|(n, _)| n == name)
    }
}

/// Desired state with all remote references resolved. Groups that need
/// no resolution pass through unchanged.
#[derive(Debug)]
pub struct ResolvedInstance {
    pub general: Option<GeneralSettings>,
    pub users: Option<UserSettings>,
    pub media_server: Option<MediaServerConfig>,
    pub sonarr: Option<ResolvedCollection>,
    pub radarr: Option<ResolvedCollection>,
    pub notifications: Option<NotificationSettings>,
}

/// Resolve every name reference in the desired tree against the
/// remote, producing wire-ready service bodies.
pub async fn resolve(
    client: &SeerrClient,
    settings: &InstanceSettings,
    retry: &RetryPolicy,
) -> Result<ResolvedInstance, CoreError> {
    let sonarr = match &settings.sonarr {
        Some(collection) => Some(
            resolve_collection(
                client,
                ServiceKind::Sonarr,
                collection,
                retry,
                |name, def, meta, tree| convert::encode_sonarr(name, def, meta, tree),
            )
            .await?,
        ),
        None => None,
    };
    let radarr = match &settings.radarr {
        Some(collection) => Some(
            resolve_collection(
                client,
                ServiceKind::Radarr,
                collection,
                retry,
                |name, def, meta, tree| convert::encode_radarr(name, def, meta, tree),
            )
            .await?,
        ),
        None => None,
    };

    Ok(ResolvedInstance {
        general: settings.general.clone(),
        users: settings.users.clone(),
        media_server: settings.media_server.clone(),
        sonarr,
        radarr,
        notifications: settings.notifications.clone(),
    })
}

trait ServiceDefinition {
    fn test_request(&self) -> ServiceTestRequest;
}

impl ServiceDefinition for SonarrDefinition {
    fn test_request(&self) -> ServiceTestRequest {
        ServiceTestRequest {
            hostname: self.hostname.clone(),
            port: self.port,
            use_ssl: self.use_ssl,
            api_key: self.api_key.clone(),
            base_url: self.url_base.clone(),
        }
    }
}

impl ServiceDefinition for RadarrDefinition {
    fn test_request(&self) -> ServiceTestRequest {
        ServiceTestRequest {
            hostname: self.hostname.clone(),
            port: self.port,
            use_ssl: self.use_ssl,
            api_key: self.api_key.clone(),
            base_url: self.url_base.clone(),
        }
    }
}

async fn resolve_collection<D, E>(
    client: &SeerrClient,
    kind: ServiceKind,
    collection: &ServiceCollection<D>,
    retry: &RetryPolicy,
    encode: E,
) -> Result<ResolvedCollection, CoreError>
where
    D: ServiceDefinition,
    E: Fn(
        &str,
        &D,
        &seerrsync_api::types::ServiceMetadata,
        &str,
    ) -> Result<ArrService, CoreError>,
{
    let mut names: Vec<&String> = collection.definitions.keys().collect();
    names.sort();

    let mut services = Vec::with_capacity(names.len());
    for name in names {
        let def = &collection.definitions[name];
        let tree = format!("settings.{kind}.definitions[\"{name}\"]");
        debug!(service = %kind, name = %name, "probing linked service");
        let request = def.test_request();
        let meta = retry
            .run(|| client.test_service(kind, &request))
            .await
            .map_err(|failure| test_failure(&tree, failure))?;
        services.push((name.clone(), encode(name, def, &meta, &tree)?));
    }

    Ok(ResolvedCollection {
        delete_unmanaged: collection.delete_unmanaged,
        services,
    })
}

fn test_failure(tree: &str, failure: RetryFailure) -> CoreError {
    if failure.source.is_auth() || failure.source.is_transient() {
        failure.into_core()
    } else {
        CoreError::Validation {
            field: tree.to_owned(),
            reason: format!("service connection test failed: {}", failure.source),
        }
    }
}
