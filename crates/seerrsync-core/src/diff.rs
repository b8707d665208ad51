//! The differ: resolved desired state vs a remote snapshot, producing
//! the minimal ordered change set.
//!
//! Pure and deterministic; the same inputs always produce the same
//! plan. Comparison is normalized so representational differences
//! (empty string vs unset, tag order, redundant permission flags,
//! case of remote enum strings) never produce a write.

use serde_json::Value;

use seerrsync_api::types::{ArrService, NotificationConfig, ServiceKind};

use crate::changeset::{
    ChangeSet, FieldChange, GroupChange, ImmutableFieldWarning, NotificationChange, ServiceChange,
};
use crate::convert;
use crate::model::{ChannelKind, MinimumAvailability, Snapshot};
use crate::resolve::ResolvedInstance;

/// Compute the change set that makes `snapshot` match `desired`.
pub fn diff(desired: &ResolvedInstance, snapshot: &Snapshot) -> ChangeSet {
    let mut plan = ChangeSet::default();

    diff_main(desired, snapshot, &mut plan);
    diff_media_server(desired, snapshot, &mut plan);
    diff_notifications(desired, snapshot, &mut plan);
    diff_services(desired, snapshot, &mut plan);

    plan
}

// ── Main settings (general + user policy) ───────────────────────────

/// Both groups share one settings endpoint, so their deltas merge into
/// a single write.
fn diff_main(desired: &ResolvedInstance, snapshot: &Snapshot, plan: &mut ChangeSet) {
    if desired.general.is_none() && desired.users.is_none() {
        return;
    }

    let mut main = snapshot.main.clone();
    let mut fields = Vec::new();
    if let Some(general) = &desired.general {
        fields.extend(convert::overlay_general(general, &mut main));
    }
    if let Some(users) = &desired.users {
        fields.extend(convert::overlay_users(users, &mut main));
    }

    if !fields.is_empty() {
        plan.group_changes.push(GroupChange::Main {
            fields,
            settings: Box::new(main),
        });
    }
}

// ── Media server settings ───────────────────────────────────────────

fn diff_media_server(desired: &ResolvedInstance, snapshot: &Snapshot, plan: &mut ChangeSet) {
    let Some(media_server) = &desired.media_server else {
        return;
    };

    // Setup-only fields on an initialized remote cannot be applied.
    let init_only = [
        ("server_url", media_server.server_url.is_some()),
        ("username", media_server.username.is_some()),
        ("password", media_server.password.is_some()),
        ("email_address", media_server.email_address.is_some()),
    ];
    for (field, set) in init_only {
        if set {
            plan.warnings.push(ImmutableFieldWarning {
                field: format!("media_server.{field}"),
            });
        }
    }

    let mut fields = Vec::new();

    let current_external = convert::wire_to_opt(&snapshot.media_server.external_hostname);
    let desired_external = media_server
        .external_url
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_owned);
    let external_hostname = if desired_external == current_external {
        None
    } else {
        fields.push(FieldChange::new(
            "media_server.external_url",
            opt_value(current_external.as_deref()),
            opt_value(desired_external.as_deref()),
        ));
        Some(convert::opt_to_wire(desired_external.as_deref()))
    };

    let current_libraries = convert::enabled_library_names(&snapshot.media_server);
    let mut desired_libraries = media_server.libraries.clone();
    desired_libraries.sort();
    let libraries = if desired_libraries == current_libraries {
        None
    } else {
        fields.push(FieldChange::new(
            "media_server.libraries",
            current_libraries.clone(),
            desired_libraries.clone(),
        ));
        Some(desired_libraries)
    };

    if !fields.is_empty() {
        plan.group_changes.push(GroupChange::MediaServer {
            fields,
            external_hostname,
            libraries,
        });
    }
}

// ── Notification channels ───────────────────────────────────────────

fn diff_notifications(desired: &ResolvedInstance, snapshot: &Snapshot, plan: &mut ChangeSet) {
    let Some(notifications) = &desired.notifications else {
        return;
    };

    for kind in ChannelKind::ALL {
        let current = snapshot
            .notifications
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        let Some(target) = convert::desired_channel_config(kind, notifications, &current) else {
            continue;
        };

        let mut fields = Vec::new();
        if target.enabled != current.enabled {
            fields.push(FieldChange::new(
                format!("notifications.{kind}.enable"),
                current.enabled,
                target.enabled,
            ));
        }
        // A missing type filter and an empty one are the same thing.
        if target.types.unwrap_or_default() != current.types.unwrap_or_default() {
            fields.push(FieldChange::new(
                format!("notifications.{kind}.notification_types"),
                convert::flag_set_value(&crate::model::NotificationType::set_decode(
                    current.types.unwrap_or_default(),
                )),
                convert::flag_set_value(&crate::model::NotificationType::set_decode(
                    target.types.unwrap_or_default(),
                )),
            ));
        }
        diff_channel_options(kind, &current, &target, &mut fields);

        if !fields.is_empty() {
            plan.notification_changes.push(NotificationChange {
                kind,
                fields,
                config: target,
            });
        }
    }
}

fn diff_channel_options(
    kind: ChannelKind,
    current: &NotificationConfig,
    target: &NotificationConfig,
    fields: &mut Vec<FieldChange>,
) {
    // The encryption method is stored as three flags; compare it as
    // the one field it maps back to.
    if kind == ChannelKind::Email {
        let current_enc = convert::decode_encryption(&current.options);
        let target_enc = convert::decode_encryption(&target.options);
        if current_enc != target_enc {
            fields.push(FieldChange::new(
                format!("notifications.{kind}.encryption_method"),
                convert::flag_set_value(&current_enc),
                convert::flag_set_value(&target_enc),
            ));
        }
    }

    for (key, value) in &target.options {
        if kind == ChannelKind::Email && matches!(key.as_str(), "secure" | "ignoreTls" | "requireTls")
        {
            continue;
        }
        if current.options.get(key) != Some(value) {
            let name = option_field_name(kind, key).unwrap_or(key.as_str());
            fields.push(FieldChange {
                field: format!("notifications.{kind}.{name}"),
                old: current.options.get(key).cloned().unwrap_or(Value::Null),
                new: value.clone(),
            });
        }
    }
}

/// Map a remote option key back to its configuration field name.
fn option_field_name(kind: ChannelKind, key: &str) -> Option<&'static str> {
    let table: &[(&str, &str)] = match kind {
        ChannelKind::Discord => &[
            ("webhookUrl", "webhook_url"),
            ("botUsername", "username"),
            ("botAvatarUrl", "avatar_url"),
            ("enableMentions", "enable_mentions"),
        ],
        ChannelKind::Email => &[
            ("userEmailRequired", "require_user_email"),
            ("senderName", "sender_name"),
            ("emailFrom", "sender_address"),
            ("smtpHost", "smtp_host"),
            ("smtpPort", "smtp_port"),
            ("allowSelfSigned", "allow_selfsigned_certificates"),
            ("authUser", "smtp_username"),
            ("authPass", "smtp_password"),
            ("pgpPrivateKey", "pgp_private_key"),
            ("pgpPassword", "pgp_password"),
        ],
        ChannelKind::Gotify => &[("url", "server_url"), ("token", "access_token")],
        ChannelKind::Pushbullet => &[
            ("accessToken", "access_token"),
            ("channelTag", "channel_tag"),
        ],
        ChannelKind::Pushover => &[("accessToken", "api_key"), ("userToken", "user_key")],
        ChannelKind::Slack => &[("webhookUrl", "webhook_url")],
        ChannelKind::Telegram => &[
            ("botAPI", "access_token"),
            ("botUsername", "username"),
            ("chatId", "chat_id"),
            ("sendSilently", "send_silently"),
        ],
        ChannelKind::Webhook => &[
            ("webhookUrl", "webhook_url"),
            ("authHeader", "authorization_header"),
            ("jsonPayload", "payload_template"),
        ],
        ChannelKind::Webpush => &[],
    };
    table.iter().find(|(k, _)| *k == key).map(|(_, name)| *name)
}

// ── Linked automation services ──────────────────────────────────────

fn diff_services(desired: &ResolvedInstance, snapshot: &Snapshot, plan: &mut ChangeSet) {
    let mut creates = Vec::new();
    let mut updates = Vec::new();

    let collections = [
        (ServiceKind::Sonarr, desired.sonarr.as_ref()),
        (ServiceKind::Radarr, desired.radarr.as_ref()),
    ];
    for (kind, collection) in collections {
        let Some(collection) = collection else {
            continue;
        };
        for (name, service) in &collection.services {
            let remote = snapshot
                .service_by_name(kind, name)
                .and_then(|r| r.id.map(|id| (r, id)));
            match remote {
                Some((remote, id)) => {
                    let fields = service_fields(kind, service, remote);
                    if !fields.is_empty() {
                        let mut body = service.clone();
                        body.id = Some(id);
                        updates.push(ServiceChange::Update {
                            kind,
                            name: name.clone(),
                            id,
                            fields,
                            service: body,
                        });
                    }
                }
                None => creates.push(ServiceChange::Create {
                    kind,
                    name: name.clone(),
                    service: service.clone(),
                }),
            }
        }
    }

    // Creates run before updates so newly-created defaults exist when
    // sibling updates land.
    plan.service_changes.extend(creates);
    plan.service_changes.extend(updates);
}

fn service_fields(kind: ServiceKind, desired: &ArrService, remote: &ArrService) -> Vec<FieldChange> {
    let mut fields = Vec::new();
    let mut cmp = |field: &str, old: Value, new: Value| {
        if old != new {
            fields.push(FieldChange {
                field: field.to_owned(),
                old,
                new,
            });
        }
    };

    cmp(
        "hostname",
        remote.hostname.clone().into(),
        desired.hostname.clone().into(),
    );
    cmp("port", remote.port.into(), desired.port.into());
    cmp("use_ssl", remote.use_ssl.into(), desired.use_ssl.into());
    cmp(
        "url_base",
        opt_value(norm_str(&remote.base_url)),
        opt_value(norm_str(&desired.base_url)),
    );
    cmp(
        "external_url",
        opt_value(norm_opt(remote.external_url.as_deref())),
        opt_value(norm_opt(desired.external_url.as_deref())),
    );
    cmp(
        "is_default_server",
        remote.is_default.into(),
        desired.is_default.into(),
    );
    cmp("is_4k_server", remote.is_4k.into(), desired.is_4k.into());
    cmp(
        "enable_scan",
        remote.sync_enabled.into(),
        desired.sync_enabled.into(),
    );
    cmp(
        "enable_automatic_search",
        (!remote.prevent_search).into(),
        (!desired.prevent_search).into(),
    );
    cmp(
        "api_key",
        remote.api_key.clone().into(),
        desired.api_key.clone().into(),
    );
    cmp(
        "root_folder",
        remote.active_directory.clone().into(),
        desired.active_directory.clone().into(),
    );
    if remote.active_profile_id != desired.active_profile_id {
        cmp(
            "quality_profile",
            profile_value(remote.active_profile_id, &remote.active_profile_name),
            profile_value(desired.active_profile_id, &desired.active_profile_name),
        );
    }
    cmp(
        "tags",
        sorted_tags(&remote.tags),
        sorted_tags(&desired.tags),
    );

    match kind {
        ServiceKind::Sonarr => {
            cmp(
                "language_profile",
                remote.active_language_profile_id.unwrap_or_default().into(),
                desired
                    .active_language_profile_id
                    .unwrap_or_default()
                    .into(),
            );
            cmp(
                "anime_root_folder",
                opt_value(norm_str(&remote.active_anime_directory)),
                opt_value(norm_str(&desired.active_anime_directory)),
            );
            cmp(
                "anime_quality_profile",
                opt_i64_value(remote.active_anime_profile_id),
                opt_i64_value(desired.active_anime_profile_id),
            );
            cmp(
                "anime_language_profile",
                opt_i64_value(remote.active_anime_language_profile_id),
                opt_i64_value(desired.active_anime_language_profile_id),
            );
            cmp(
                "anime_tags",
                sorted_tags(&remote.anime_tags),
                sorted_tags(&desired.anime_tags),
            );
            cmp(
                "enable_season_folders",
                remote.enable_season_folders.unwrap_or_default().into(),
                desired.enable_season_folders.unwrap_or_default().into(),
            );
        }
        ServiceKind::Radarr => {
            let remote_avail = remote
                .minimum_availability
                .as_deref()
                .and_then(MinimumAvailability::from_wire)
                .unwrap_or_default();
            let desired_avail = desired
                .minimum_availability
                .as_deref()
                .and_then(MinimumAvailability::from_wire)
                .unwrap_or_default();
            if remote_avail != desired_avail {
                cmp(
                    "minimum_availability",
                    remote_avail.as_wire().into(),
                    desired_avail.as_wire().into(),
                );
            }
        }
    }

    fields
}

// ── Normalization helpers ───────────────────────────────────────────

fn norm_str(raw: &str) -> Option<&str> {
    if raw.is_empty() { None } else { Some(raw) }
}

fn norm_opt(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}

fn opt_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |s| Value::String(s.to_owned()))
}

fn opt_i64_value(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::from)
}

fn profile_value(id: i64, name: &str) -> Value {
    if name.is_empty() {
        Value::from(id)
    } else {
        Value::String(name.to_owned())
    }
}

fn sorted_tags(tags: &[i64]) -> Value {
    let mut sorted = tags.to_vec();
    sorted.sort_unstable();
    Value::from(sorted)
}
