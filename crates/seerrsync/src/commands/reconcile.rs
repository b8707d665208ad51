//! Shared handler for `plan` and `apply`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use seerrsync_config::{ConfigDocument, default_cache_path, load_cache, save_cache};
use seerrsync_core::{PipelineOptions, RunMode, SecretsCache, pipeline};

use crate::cli::GlobalOpts;
use crate::error::{CliError, InstanceFailure, core_exit_code};
use crate::output;

pub async fn handle(
    mode: RunMode,
    global: &GlobalOpts,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let document = ConfigDocument::load(&global.config)?;

    let options = PipelineOptions {
        timeout: Duration::from_secs(global.timeout),
        retries: global.retries,
        concurrency: global.concurrency,
        ..PipelineOptions::default()
    };

    let cache_path = cache_path(global);
    let cache = match &cache_path {
        Some(path) => load_cache(path),
        None => SecretsCache::default(),
    };
    let cache = Arc::new(Mutex::new(cache));

    let results = pipeline::run(
        &document.instances,
        mode,
        &options,
        Arc::clone(&cache),
        cancel,
    )
    .await;

    if let Some(path) = &cache_path {
        let cache = cache.lock().await;
        if let Err(err) = save_cache(path, &cache) {
            tracing::warn!(error = %err, "could not persist the connection cache");
        }
    }

    let total = results.len();
    let mut failures = Vec::new();
    for (name, result) in results {
        match result {
            Ok(outcome) => output::render(&outcome, mode),
            Err(source) => {
                failures.push(core_exit_code(&source));
                eprintln!("{:?}", miette::Report::new(InstanceFailure { name, source }));
            }
        }
    }

    match failures.first() {
        None => Ok(()),
        Some(&exit) => Err(CliError::RunFailed {
            failed: failures.len(),
            total,
            exit,
        }),
    }
}

fn cache_path(global: &GlobalOpts) -> Option<PathBuf> {
    if global.no_cache {
        return None;
    }
    global.cache_file.clone().or_else(default_cache_path)
}
