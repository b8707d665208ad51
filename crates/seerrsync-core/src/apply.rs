//! The applicator: execute a change set against the remote, in plan
//! order.
//!
//! Ordering: settings-group writes first, then notification channels,
//! then service creates, then id-addressed service updates. Validation
//! happens before the first write; once anything commits, any later
//! failure enumerates what did so the caller knows a re-run will pick
//! up from a fresh diff.

use tracing::info;

use seerrsync_api::SeerrClient;
use seerrsync_api::types::{MediaServerSettings, ServiceKind};

use crate::changeset::{ChangeSet, GroupChange, ServiceChange};
use crate::error::CoreError;
use crate::model::Snapshot;
use crate::retry::{RetryFailure, RetryPolicy};

/// What a successful (or partially successful) apply did.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Labels of committed changes, in execution order.
    pub committed: Vec<String>,
    /// Remote ids assigned to newly created service links.
    pub created: Vec<(ServiceKind, String, i64)>,
}

/// Execute `plan` against the remote. `snapshot` is the pre-apply
/// snapshot the plan was computed from; the media-server step uses it
/// to map library names to ids and to carry unmanaged fields through
/// full-body writes. Full-body replaces and id-addressed updates are
/// retried per `retry` on transient failure; creates are not.
pub async fn apply(
    client: &SeerrClient,
    snapshot: &Snapshot,
    plan: &ChangeSet,
    retry: &RetryPolicy,
) -> Result<ApplyReport, CoreError> {
    // Resolve library names before the first write so a typo fails
    // while nothing has committed yet.
    let library_ids = resolve_libraries(snapshot, plan)?;

    let mut report = ApplyReport::default();

    for change in &plan.group_changes {
        let label = change.label().to_owned();
        match change {
            GroupChange::Main { settings, .. } => {
                retry
                    .run(|| client.set_main_settings(settings))
                    .await
                    .map_err(|f| fail(&report, &label, f))?;
            }
            GroupChange::MediaServer {
                external_hostname, ..
            } => {
                if let Some(hostname) = external_hostname.as_deref() {
                    let body = MediaServerSettings {
                        external_hostname: hostname.to_owned(),
                        ..snapshot.media_server.clone()
                    };
                    retry
                        .run(|| client.set_media_server_settings(&body))
                        .await
                        .map_err(|f| fail(&report, &label, f))?;
                }
                if let Some(ids) = &library_ids {
                    retry
                        .run(|| client.enable_libraries(ids))
                        .await
                        .map_err(|f| fail(&report, &label, f))?;
                }
            }
        }
        info!(change = %label, fields = change.fields().len(), "applied");
        report.committed.push(label);
    }

    for change in &plan.notification_changes {
        let label = change.label();
        retry
            .run(|| client.set_notification(change.kind.tag(), &change.config))
            .await
            .map_err(|f| fail(&report, &label, f))?;
        info!(change = %label, fields = change.fields.len(), "applied");
        report.committed.push(label);
    }

    for change in &plan.service_changes {
        let label = change.label();
        match change {
            ServiceChange::Create { kind, name, service } => {
                // A create is not idempotent (a lost response would
                // duplicate the link on retry), so it gets one attempt.
                let created = client
                    .create_service(*kind, service)
                    .await
                    .map_err(|source| {
                        fail(&report, &label, RetryFailure { attempts: 1, source })
                    })?;
                if let Some(id) = created.id {
                    report.created.push((*kind, name.clone(), id));
                }
                info!(change = %label, "created");
            }
            ServiceChange::Update {
                kind, id, service, ..
            } => {
                retry
                    .run(|| client.update_service(*kind, *id, service))
                    .await
                    .map_err(|f| fail(&report, &label, f))?;
                info!(change = %label, "updated");
            }
        }
        report.committed.push(label);
    }

    Ok(report)
}

/// Map every configured library name in the plan to its remote id.
fn resolve_libraries(
    snapshot: &Snapshot,
    plan: &ChangeSet,
) -> Result<Option<Vec<String>>, CoreError> {
    for change in &plan.group_changes {
        let GroupChange::MediaServer {
            libraries: Some(names),
            ..
        } = change
        else {
            continue;
        };
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let id = snapshot
                .library_id(name)
                .ok_or_else(|| CoreError::Validation {
                    field: "settings.media_server.libraries".into(),
                    reason: format!("the media server has no library named \"{name}\""),
                })?;
            ids.push(id.to_owned());
        }
        return Ok(Some(ids));
    }
    Ok(None)
}

fn fail(report: &ApplyReport, label: &str, failure: RetryFailure) -> CoreError {
    if report.committed.is_empty() {
        failure.into_core()
    } else {
        CoreError::PartialApply {
            committed: report.committed.clone(),
            failed: label.to_owned(),
            source: failure.source,
        }
    }
}
