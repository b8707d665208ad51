//! The minimal set of remote mutations needed to make a remote match
//! its desired state, as computed by the differ.

use serde_json::Value;

use seerrsync_api::types::{ArrService, MainSettings, NotificationConfig, ServiceKind};

use crate::model::ChannelKind;

/// Ordered plan of remote mutations for one instance.
///
/// An empty change set means the remote already matches; applying it
/// performs no remote writes.
#[derive(Debug, Default)]
pub struct ChangeSet {
    pub group_changes: Vec<GroupChange>,
    pub notification_changes: Vec<NotificationChange>,
    pub service_changes: Vec<ServiceChange>,
    /// Non-fatal findings surfaced to the user, never applied.
    pub warnings: Vec<ImmutableFieldWarning>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.group_changes.is_empty()
            && self.notification_changes.is_empty()
            && self.service_changes.is_empty()
    }

    /// Total number of remote writes this plan will perform.
    pub fn len(&self) -> usize {
        self.group_changes.len() + self.notification_changes.len() + self.service_changes.len()
    }
}

/// One changed field, for plan output. `old`/`new` are rendered from
/// the wire values.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Dotted path in desired-state terms, e.g. `general.application_title`.
    pub field: String,
    pub old: Value,
    pub new: Value,
}

impl FieldChange {
    pub fn new(field: impl Into<String>, old: impl Into<Value>, new: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            old: old.into(),
            new: new.into(),
        }
    }
}

impl std::fmt::Display for FieldChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.old, self.new)
    }
}

/// A settings-group update: one full-body write to a settings endpoint,
/// with the individual deltas that motivated it.
#[derive(Debug)]
pub enum GroupChange {
    /// `POST /settings/main`, covering both general and user policy.
    Main {
        fields: Vec<FieldChange>,
        settings: Box<MainSettings>,
    },
    /// `POST /settings/jellyfin` and library enablement.
    MediaServer {
        fields: Vec<FieldChange>,
        external_hostname: Option<String>,
        /// Library names to enable; resolved to ids at apply time.
        libraries: Option<Vec<String>>,
    },
}

impl GroupChange {
    /// Stable label used in reports and partial-apply errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Main { .. } => "settings.main",
            Self::MediaServer { .. } => "settings.media_server",
        }
    }

    pub fn fields(&self) -> &[FieldChange] {
        match self {
            Self::Main { fields, .. } | Self::MediaServer { fields, .. } => fields,
        }
    }
}

/// One notification-channel update (full-body write per channel).
#[derive(Debug)]
pub struct NotificationChange {
    pub kind: ChannelKind,
    pub fields: Vec<FieldChange>,
    pub config: NotificationConfig,
}

impl NotificationChange {
    pub fn label(&self) -> String {
        format!("notifications.{}", self.kind)
    }
}

/// One linked-service mutation.
#[derive(Debug)]
pub enum ServiceChange {
    /// The definition exists in desired state only.
    Create {
        kind: ServiceKind,
        name: String,
        service: ArrService,
    },
    /// The definition exists on both sides and differs; addressed by
    /// the remote id captured in the snapshot.
    Update {
        kind: ServiceKind,
        name: String,
        id: i64,
        fields: Vec<FieldChange>,
        service: ArrService,
    },
}

impl ServiceChange {
    pub fn label(&self) -> String {
        match self {
            Self::Create { kind, name, .. } => format!("{kind}[\"{name}\"] (create)"),
            Self::Update { kind, name, .. } => format!("{kind}[\"{name}\"]"),
        }
    }
}

/// A desired value for a field that can only be applied during
/// first-time setup, reported against an already-initialized remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmutableFieldWarning {
    pub field: String,
}

impl std::fmt::Display for ImmutableFieldWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "`{}` is only applied during first-time setup; ignored on an initialized instance",
            self.field
        )
    }
}
