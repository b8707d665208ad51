//! Reconciliation engine for declarative Jellyseerr configuration
//! management.
//!
//! The engine drives one instance through a fixed pipeline: fetch the
//! remote state (running first-time setup when needed), resolve name
//! references, diff desired state against the snapshot into a minimal
//! ordered change set, apply it, and finally prune unmanaged service
//! links where explicitly opted in. Multiple instances reconcile
//! concurrently under a dependency-aware scheduler.

pub mod accessor;
pub mod apply;
pub mod changeset;
mod convert;
pub mod diff;
pub mod dump;
pub mod error;
pub mod init;
pub mod model;
pub mod pipeline;
pub mod prune;
pub mod resolve;
pub mod retry;
pub mod secrets;

pub use accessor::{RemoteState, fetch_state};
pub use apply::{ApplyReport, apply};
pub use changeset::{
    ChangeSet, FieldChange, GroupChange, ImmutableFieldWarning, NotificationChange, ServiceChange,
};
pub use diff::diff;
pub use dump::snapshot_to_settings;
pub use error::CoreError;
pub use init::{InitOutcome, initialize};
pub use model::{InstanceConfig, InstanceSettings, Snapshot};
pub use pipeline::{InstanceOutcome, PipelineOptions, RunMode, run, run_instance};
pub use prune::{PruneReport, prune};
pub use resolve::{ResolvedInstance, resolve};
pub use retry::RetryPolicy;
pub use secrets::{CachedConnection, SecretsCache};
