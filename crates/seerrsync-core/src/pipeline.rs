//! The per-instance reconcile pipeline and the multi-instance
//! scheduler.
//!
//! Pipeline stages per instance: connect (probe-validated), fetch,
//! first-time setup if needed, resolve, diff, then in apply mode
//! apply, refetch and prune. One [`RetryPolicy`] covers every remote
//! call in those stages. Cancellation is observed between stages; an
//! in-flight HTTP request is never interrupted mid-write.
//!
//! Instances reconcile concurrently under a semaphore. `depends_on`
//! establishes a partial order: an instance starts only after its
//! prerequisites succeed, and inherits a `DependencyFailed` error when
//! one of them fails.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use secrecy::ExposeSecret;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use seerrsync_api::{SeerrClient, TransportConfig};

use crate::accessor::{RemoteState, fetch_state};
use crate::apply::{ApplyReport, apply};
use crate::changeset::ChangeSet;
use crate::diff::diff;
use crate::error::CoreError;
use crate::init::{InitOutcome, initialize};
use crate::model::{InstanceConfig, Snapshot};
use crate::prune::{self, PruneReport, prune};
use crate::resolve::resolve;
use crate::retry::RetryPolicy;
use crate::secrets::{CachedConnection, SecretsCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Compute and report changes without writing anything.
    Plan,
    /// Apply the computed changes.
    Apply,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the initial attempt, transient failures only.
    pub retries: u32,
    /// Initial retry delay; doubles per attempt.
    pub retry_backoff: Duration,
    /// Maximum instances reconciling at once.
    pub concurrency: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 3,
            retry_backoff: Duration::from_millis(500),
            concurrency: 4,
        }
    }
}

impl PipelineOptions {
    /// The retry policy every remote call in the pipeline runs under.
    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            backoff: self.retry_backoff,
        }
    }
}

/// Result of one instance's pipeline run.
#[derive(Debug)]
pub struct InstanceOutcome {
    pub name: String,
    /// Remote version reported by the status probe.
    pub version: String,
    /// Plan mode only: the instance needs first-time setup before it
    /// can be diffed.
    pub needs_initialization: bool,
    /// First-time setup ran during this invocation.
    pub initialized: bool,
    pub plan: ChangeSet,
    pub applied: Option<ApplyReport>,
    pub pruned: Option<PruneReport>,
}

// ── Connection ──────────────────────────────────────────────────────

/// Establish a probed connection, consulting the cache first. A cached
/// entry is reused only after a successful status probe; a failed
/// probe invalidates it and falls back to a fresh, retried connect.
async fn connect(
    name: &str,
    config: &InstanceConfig,
    transport: &TransportConfig,
    options: &PipelineOptions,
    cache: &Mutex<SecretsCache>,
) -> Result<(SeerrClient, String), CoreError> {
    let host_url = config.host_url();
    let api_key = config.api_key.expose_secret().to_owned();

    let cached = {
        let cache = cache.lock().await;
        cache.matching(name, &host_url, &api_key).cloned()
    };
    if cached.is_some() {
        let client = SeerrClient::from_api_key(&host_url, &config.api_key, transport)
            .map_err(CoreError::from_api)?;
        match client.status().await {
            Ok(status) => {
                debug!(instance = name, version = %status.version, "cached connection validated");
                return Ok((client, status.version));
            }
            Err(err) => {
                warn!(instance = name, error = %err, "cached connection failed probe");
                cache.lock().await.invalidate(name);
            }
        }
    }

    let client = SeerrClient::from_api_key(&host_url, &config.api_key, transport)
        .map_err(CoreError::from_api)?;
    let status = options.retry().call(|| client.status()).await?;
    cache.lock().await.store(
        name,
        CachedConnection {
            host_url,
            api_key,
            version: status.version.clone(),
        },
    );
    Ok((client, status.version))
}

fn check_cancel(cancel: &CancellationToken) -> Result<(), CoreError> {
    if cancel.is_cancelled() {
        Err(CoreError::Cancelled)
    } else {
        Ok(())
    }
}

// ── Per-instance pipeline ───────────────────────────────────────────

/// Run the full pipeline for one instance.
pub async fn run_instance(
    name: &str,
    config: &InstanceConfig,
    mode: RunMode,
    options: &PipelineOptions,
    cache: &Mutex<SecretsCache>,
    cancel: &CancellationToken,
) -> Result<InstanceOutcome, CoreError> {
    config.validate()?;

    let transport = TransportConfig {
        timeout: options.timeout,
        danger_accept_invalid_certs: config.danger_accept_invalid_certs,
    };
    let (client, version) = connect(name, config, &transport, options, cache).await?;
    if let Some(expected) = &config.expect_version {
        if *expected != version {
            return Err(CoreError::VersionMismatch {
                expected: expected.clone(),
                actual: version,
            });
        }
    }
    check_cancel(cancel)?;

    let retry = options.retry();
    let mut ran_setup = false;
    let snapshot = match fetch_state(&client, &retry).await? {
        RemoteState::Ready(snapshot) => *snapshot,
        RemoteState::Uninitialized => {
            if mode == RunMode::Plan {
                info!(instance = name, "first-time setup pending; nothing to plan yet");
                return Ok(InstanceOutcome {
                    name: name.to_owned(),
                    version,
                    needs_initialization: true,
                    initialized: false,
                    plan: ChangeSet::default(),
                    applied: None,
                    pruned: None,
                });
            }
            if initialize(&client, config).await? == InitOutcome::Initialized {
                ran_setup = true;
            }
            check_cancel(cancel)?;
            refetch(&client, &retry).await?
        }
    };
    check_cancel(cancel)?;

    let resolved = resolve(&client, &config.settings, &retry).await?;
    let plan = diff(&resolved, &snapshot);
    for warning in &plan.warnings {
        warn!(instance = name, "{warning}");
    }
    info!(instance = name, changes = plan.len(), "planned");

    if mode == RunMode::Plan {
        let pruned = if resolved.sonarr.is_some() || resolved.radarr.is_some() {
            Some(prune::plan(&snapshot, &resolved))
        } else {
            None
        };
        return Ok(InstanceOutcome {
            name: name.to_owned(),
            version,
            needs_initialization: false,
            initialized: ran_setup,
            plan,
            applied: None,
            pruned,
        });
    }
    check_cancel(cancel)?;

    let applied = if plan.is_empty() {
        None
    } else {
        Some(apply(&client, &snapshot, &plan, &retry).await?)
    };
    check_cancel(cancel)?;

    // The pruner works from post-apply state so links created a moment
    // ago are never deletion candidates.
    let post_apply = if applied.is_some() {
        refetch(&client, &retry).await?
    } else {
        snapshot.clone()
    };
    let pruned = if resolved.sonarr.is_some() || resolved.radarr.is_some() {
        Some(prune(&client, &post_apply, &resolved, &retry).await)
    } else {
        None
    };

    Ok(InstanceOutcome {
        name: name.to_owned(),
        version,
        needs_initialization: false,
        initialized: ran_setup,
        plan,
        applied,
        pruned,
    })
}

async fn refetch(client: &SeerrClient, retry: &RetryPolicy) -> Result<Snapshot, CoreError> {
    match fetch_state(client, retry).await? {
        RemoteState::Ready(snapshot) => Ok(*snapshot),
        RemoteState::Uninitialized => Err(CoreError::IncompatibleRemote {
            message: "instance reports uninitialized after setup completed".into(),
        }),
    }
}

// ── Multi-instance scheduler ────────────────────────────────────────

/// Reconcile every instance, respecting `depends_on` ordering and the
/// concurrency limit. Failures never stop independent instances;
/// dependents of a failed instance are skipped with `DependencyFailed`.
/// Results come back in configuration order.
pub async fn run(
    instances: &IndexMap<String, InstanceConfig>,
    mode: RunMode,
    options: &PipelineOptions,
    cache: Arc<Mutex<SecretsCache>>,
    cancel: CancellationToken,
) -> IndexMap<String, Result<InstanceOutcome, CoreError>> {
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut results: HashMap<String, Result<InstanceOutcome, CoreError>> = HashMap::new();
    let mut remaining: Vec<String> = instances.keys().cloned().collect();
    let mut tasks: JoinSet<(String, Result<InstanceOutcome, CoreError>)> = JoinSet::new();

    loop {
        let mut progressed = false;
        remaining.retain(|name| {
            let deps = &instances[name].depends_on;
            if let Some(failed) = deps
                .iter()
                .find(|d| matches!(results.get(d.as_str()), Some(Err(_))))
            {
                results.insert(
                    name.clone(),
                    Err(CoreError::DependencyFailed {
                        dependency: failed.clone(),
                    }),
                );
                progressed = true;
                return false;
            }
            if !deps
                .iter()
                .all(|d| matches!(results.get(d.as_str()), Some(Ok(_))))
            {
                return true;
            }

            let name = name.clone();
            let config = instances[&name].clone();
            let options = options.clone();
            let cache = Arc::clone(&cache);
            let cancel = cancel.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (name, Err(CoreError::Cancelled));
                };
                if cancel.is_cancelled() {
                    return (name, Err(CoreError::Cancelled));
                }
                let result = run_instance(&name, &config, mode, &options, &cache, &cancel).await;
                (name, result)
            });
            progressed = true;
            false
        });

        match tasks.join_next().await {
            Some(Ok((name, result))) => {
                results.insert(name, result);
            }
            Some(Err(err)) => {
                if err.is_cancelled() {
                    continue;
                }
                std::panic::resume_unwind(err.into_panic());
            }
            None => {
                if remaining.is_empty() {
                    break;
                }
                if progressed {
                    continue;
                }
                // Nothing running and nothing schedulable: a dependency
                // name that never resolves (unknown or cyclic).
                for name in remaining.drain(..) {
                    let dependency = instances[&name]
                        .depends_on
                        .iter()
                        .find(|d| !matches!(results.get(d.as_str()), Some(Ok(_))))
                        .cloned()
                        .unwrap_or_default();
                    results.insert(name, Err(CoreError::DependencyFailed { dependency }));
                }
                break;
            }
        }
    }

    instances
        .keys()
        .map(|name| {
            let result = results
                .remove(name)
                .unwrap_or(Err(CoreError::Cancelled));
            (name.clone(), result)
        })
        .collect()
}
