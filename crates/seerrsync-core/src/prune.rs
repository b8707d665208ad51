//! The pruner: delete remote service links that exist remotely but are
//! not declared in desired state.
//!
//! Deletion is destructive, so it is gated per collection behind the
//! explicit `delete_unmanaged` opt-in, works from the post-apply
//! snapshot (so just-created links are never candidates), and is
//! best-effort: one failed delete is logged and the rest proceed.

use tracing::{info, warn};

use seerrsync_api::types::ServiceKind;
use seerrsync_api::{ApiError, SeerrClient};

use crate::model::Snapshot;
use crate::resolve::{ResolvedCollection, ResolvedInstance};
use crate::retry::RetryPolicy;

#[derive(Debug, Default)]
pub struct PruneReport {
    /// Deleted service links, as `kind["name"]` labels.
    pub deleted: Vec<String>,
    /// Links that failed to delete; the run still counts as complete.
    pub failed: Vec<(String, ApiError)>,
    /// Unmanaged links left in place because the collection keeps the
    /// default opt-out.
    pub skipped: Vec<String>,
}

/// Report what [`prune`] would do, without deleting anything.
///
/// Unmanaged links land in `deleted` when the collection opted in and
/// in `skipped` otherwise; `failed` stays empty.
pub fn plan(snapshot: &Snapshot, desired: &ResolvedInstance) -> PruneReport {
    let mut report = PruneReport::default();

    let collections = [
        (ServiceKind::Sonarr, desired.sonarr.as_ref()),
        (ServiceKind::Radarr, desired.radarr.as_ref()),
    ];
    for (kind, collection) in collections {
        let Some(collection) = collection else {
            continue;
        };
        for remote in snapshot.services(kind) {
            if collection.contains(&remote.name) {
                continue;
            }
            let label = format!("{kind}[\"{}\"]", remote.name);
            if collection.delete_unmanaged {
                report.deleted.push(label);
            } else {
                report.skipped.push(label);
            }
        }
    }

    report
}

/// Remove unmanaged service links, per collection opt-in. Deletes are
/// id-addressed, so each one is retried per `retry` on transient
/// failure.
pub async fn prune(
    client: &SeerrClient,
    post_apply: &Snapshot,
    desired: &ResolvedInstance,
    retry: &RetryPolicy,
) -> PruneReport {
    let mut report = PruneReport::default();

    let collections = [
        (ServiceKind::Sonarr, desired.sonarr.as_ref()),
        (ServiceKind::Radarr, desired.radarr.as_ref()),
    ];
    for (kind, collection) in collections {
        // An unmanaged collection is never pruned.
        let Some(collection) = collection else {
            continue;
        };
        prune_collection(client, kind, collection, post_apply, retry, &mut report).await;
    }

    report
}

async fn prune_collection(
    client: &SeerrClient,
    kind: ServiceKind,
    collection: &ResolvedCollection,
    post_apply: &Snapshot,
    retry: &RetryPolicy,
    report: &mut PruneReport,
) {
    for remote in post_apply.services(kind) {
        if collection.contains(&remote.name) {
            continue;
        }
        let label = format!("{kind}[\"{}\"]", remote.name);
        if !collection.delete_unmanaged {
            report.skipped.push(label);
            continue;
        }
        let Some(id) = remote.id else {
            continue;
        };
        match retry.run(|| client.delete_service(kind, id)).await {
            Ok(()) => {
                info!(service = %label, "deleted unmanaged service link");
                report.deleted.push(label);
            }
            Err(failure) => {
                warn!(service = %label, error = %failure.source, "failed to delete unmanaged service link");
                report.failed.push((label, failure.source));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use seerrsync_api::types::ArrService;

    use super::*;

    fn snapshot_with_sonarr(names: &[&str]) -> Snapshot {
        Snapshot {
            initialized: true,
            sonarr: names
                .iter()
                .enumerate()
                .map(|(i, name)| ArrService {
                    id: Some(i64::try_from(i).unwrap() + 1),
                    name: (*name).to_owned(),
                    ..ArrService::default()
                })
                .collect(),
            ..Snapshot::default()
        }
    }

    fn desired_sonarr(names: &[&str], delete_unmanaged: bool) -> ResolvedInstance {
        ResolvedInstance {
            general: None,
            users: None,
            media_server: None,
            sonarr: Some(ResolvedCollection {
                delete_unmanaged,
                services: names
                    .iter()
                    .map(|name| ((*name).to_owned(), ArrService::default()))
                    .collect(),
            }),
            radarr: None,
            notifications: None,
        }
    }

    #[test]
    fn plan_splits_unmanaged_links_by_opt_in() {
        let snapshot = snapshot_with_sonarr(&["Sonarr", "Anime"]);

        let report = plan(&snapshot, &desired_sonarr(&["Sonarr"], true));
        assert_eq!(report.deleted, vec!["sonarr[\"Anime\"]"]);
        assert!(report.skipped.is_empty());

        let report = plan(&snapshot, &desired_sonarr(&["Sonarr"], false));
        assert!(report.deleted.is_empty());
        assert_eq!(report.skipped, vec!["sonarr[\"Anime\"]"]);
    }

    #[test]
    fn plan_ignores_unmanaged_collections() {
        let snapshot = snapshot_with_sonarr(&["Sonarr"]);
        let desired = ResolvedInstance {
            general: None,
            users: None,
            media_server: None,
            sonarr: None,
            radarr: None,
            notifications: None,
        };

        let report = plan(&snapshot, &desired);
        assert!(report.deleted.is_empty());
        assert!(report.skipped.is_empty());
    }
}
