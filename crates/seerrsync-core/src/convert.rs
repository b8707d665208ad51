//! Conversions between the desired-state model and the remote wire
//! shapes.
//!
//! Conventions on the remote side: optional strings are empty strings,
//! discovery languages are one pipe-joined string, flag sets are
//! bitfields, and the search toggle is stored negated
//! (`preventSearch`). Everything here is pure; resolution that needs
//! the network (profile and tag names to ids) takes the already-fetched
//! service metadata as input.

use serde_json::{Map, Value};

use seerrsync_api::types::{
    ArrService, IdName, MainSettings, MediaServerSettings, NotificationConfig, ServiceMetadata,
    ServiceTag,
};

use crate::changeset::FieldChange;
use crate::error::CoreError;
use crate::model::{
    ChannelKind, DiscordChannel, EmailChannel, EmailEncryptionMethod, GeneralSettings,
    GotifyChannel, MediaServerConfig, MinimumAvailability, NotificationSettings, NotificationType,
    Permission, PushbulletChannel, PushoverChannel, RadarrDefinition, ResourceRef, SlackChannel,
    SonarrDefinition, TelegramChannel, UserSettings, WebhookChannel, WebpushChannel,
};

// ── Scalar conventions ──────────────────────────────────────────────

pub(crate) fn join_languages(codes: &[String]) -> String {
    codes.join("|")
}

pub(crate) fn split_languages(raw: &str) -> Vec<String> {
    raw.split('|')
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect()
}

pub(crate) fn opt_to_wire(value: Option<&str>) -> String {
    value.unwrap_or_default().to_owned()
}

pub(crate) fn wire_to_opt(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_owned())
    }
}

pub(crate) fn flag_set_value<T: serde::Serialize>(set: &T) -> Value {
    serde_json::to_value(set).unwrap_or_default()
}

/// Overlay `new` onto `slot`, recording a change if the value differs.
fn set_field<T>(changes: &mut Vec<FieldChange>, field: &str, slot: &mut T, new: T)
where
    T: PartialEq + Clone + Into<Value>,
{
    if *slot != new {
        changes.push(FieldChange::new(field, slot.clone(), new.clone()));
        *slot = new;
    }
}

// ── Main settings (general + user policy) ───────────────────────────

/// Overlay the managed general options onto a fetched settings body,
/// returning the deltas.
pub(crate) fn overlay_general(
    desired: &GeneralSettings,
    main: &mut MainSettings,
) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    set_field(
        &mut changes,
        "general.application_title",
        &mut main.application_title,
        desired.application_title.clone(),
    );
    set_field(
        &mut changes,
        "general.application_url",
        &mut main.application_url,
        opt_to_wire(desired.application_url.as_deref()),
    );
    set_field(
        &mut changes,
        "general.enable_proxy_support",
        &mut main.trust_proxy,
        desired.enable_proxy_support,
    );
    set_field(
        &mut changes,
        "general.enable_csrf_protection",
        &mut main.csrf_protection,
        desired.enable_csrf_protection,
    );
    set_field(
        &mut changes,
        "general.enable_image_caching",
        &mut main.cache_images,
        desired.enable_image_caching,
    );
    set_field(
        &mut changes,
        "general.display_language",
        &mut main.locale,
        desired.display_language.clone(),
    );
    set_field(
        &mut changes,
        "general.discover_region",
        &mut main.region,
        opt_to_wire(desired.discover_region.as_deref()),
    );
    set_field(
        &mut changes,
        "general.discover_languages",
        &mut main.original_language,
        join_languages(&desired.discover_languages),
    );
    set_field(
        &mut changes,
        "general.hide_available_media",
        &mut main.hide_available,
        desired.hide_available_media,
    );
    set_field(
        &mut changes,
        "general.allow_partial_series_requests",
        &mut main.partial_requests_enabled,
        desired.allow_partial_series_requests,
    );
    changes
}

/// Overlay the managed user-policy options onto a fetched settings
/// body, returning the deltas.
pub(crate) fn overlay_users(desired: &UserSettings, main: &mut MainSettings) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    set_field(
        &mut changes,
        "users.enable_local_signin",
        &mut main.local_login,
        desired.enable_local_signin,
    );
    set_field(
        &mut changes,
        "users.enable_new_media_server_signin",
        &mut main.new_plex_login,
        desired.enable_new_media_server_signin,
    );
    set_field(
        &mut changes,
        "users.movie_request_limit",
        &mut main.default_quotas.movie.quota_limit,
        desired.movie_request_limit,
    );
    set_field(
        &mut changes,
        "users.movie_request_days",
        &mut main.default_quotas.movie.quota_days,
        desired.movie_request_days,
    );
    set_field(
        &mut changes,
        "users.series_request_limit",
        &mut main.default_quotas.tv.quota_limit,
        desired.series_request_limit,
    );
    set_field(
        &mut changes,
        "users.series_request_days",
        &mut main.default_quotas.tv.quota_days,
        desired.series_request_days,
    );

    // Redundant child flags collapse before comparing, so equivalent
    // permission sets never produce a write.
    let desired_set = Permission::set_reduce(&desired.default_permissions);
    let current_set = Permission::set_decode(main.default_permissions);
    if desired_set != current_set {
        changes.push(FieldChange::new(
            "users.default_permissions",
            flag_set_value(&current_set),
            flag_set_value(&desired_set),
        ));
        main.default_permissions = Permission::set_encode(&desired_set);
    }
    changes
}

pub(crate) fn decode_general(main: &MainSettings) -> GeneralSettings {
    GeneralSettings {
        application_title: main.application_title.clone(),
        application_url: wire_to_opt(&main.application_url),
        enable_proxy_support: main.trust_proxy,
        enable_csrf_protection: main.csrf_protection,
        enable_image_caching: main.cache_images,
        display_language: main.locale.clone(),
        discover_region: wire_to_opt(&main.region),
        discover_languages: split_languages(&main.original_language),
        hide_available_media: main.hide_available,
        allow_partial_series_requests: main.partial_requests_enabled,
    }
}

pub(crate) fn decode_users(main: &MainSettings) -> UserSettings {
    UserSettings {
        enable_local_signin: main.local_login,
        enable_new_media_server_signin: main.new_plex_login,
        movie_request_limit: main.default_quotas.movie.quota_limit,
        movie_request_days: main.default_quotas.movie.quota_days,
        series_request_limit: main.default_quotas.tv.quota_limit,
        series_request_days: main.default_quotas.tv.quota_days,
        default_permissions: Permission::set_decode(main.default_permissions),
    }
}

// ── Media server settings ───────────────────────────────────────────

/// Names of the libraries currently enabled for scanning, sorted.
pub(crate) fn enabled_library_names(settings: &MediaServerSettings) -> Vec<String> {
    let mut names: Vec<String> = settings
        .libraries
        .iter()
        .filter(|l| l.enabled)
        .map(|l| l.name.clone())
        .collect();
    names.sort();
    names
}

pub(crate) fn decode_media_server(settings: &MediaServerSettings) -> MediaServerConfig {
    MediaServerConfig {
        server_url: None,
        username: None,
        password: None,
        email_address: None,
        external_url: wire_to_opt(&settings.external_hostname),
        libraries: enabled_library_names(settings),
    }
}

// ── Linked automation services ──────────────────────────────────────

fn resolve_profile(
    reference: &ResourceRef,
    profiles: &[IdName],
    field: &str,
) -> Result<(i64, String), CoreError> {
    match reference {
        ResourceRef::Name(name) => profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| (p.id, p.name.clone()))
            .ok_or_else(|| CoreError::Validation {
                field: field.to_owned(),
                reason: format!("the remote service has no profile named \"{name}\""),
            }),
        ResourceRef::Id(id) => profiles
            .iter()
            .find(|p| p.id == *id)
            .map(|p| (p.id, p.name.clone()))
            .ok_or_else(|| CoreError::Validation {
                field: field.to_owned(),
                reason: format!("the remote service has no profile with id {id}"),
            }),
    }
}

fn resolve_tags(
    references: &[ResourceRef],
    tags: &[ServiceTag],
    field: &str,
) -> Result<Vec<i64>, CoreError> {
    let mut resolved = Vec::with_capacity(references.len());
    for reference in references {
        let id = match reference {
            ResourceRef::Name(name) => tags
                .iter()
                .find(|t| t.label.eq_ignore_ascii_case(name))
                .map(|t| t.id)
                .ok_or_else(|| CoreError::Validation {
                    field: field.to_owned(),
                    reason: format!("the remote service has no tag labelled \"{name}\""),
                })?,
            ResourceRef::Id(id) => {
                if !tags.iter().any(|t| t.id == *id) {
                    return Err(CoreError::Validation {
                        field: field.to_owned(),
                        reason: format!("the remote service has no tag with id {id}"),
                    });
                }
                *id
            }
        };
        resolved.push(id);
    }
    resolved.sort_unstable();
    resolved.dedup();
    Ok(resolved)
}

fn language_profiles<'m>(
    meta: &'m ServiceMetadata,
    field: &str,
) -> Result<&'m [IdName], CoreError> {
    meta.language_profiles
        .as_deref()
        .ok_or_else(|| CoreError::Validation {
            field: field.to_owned(),
            reason: "the remote service does not expose language profiles".into(),
        })
}

/// Build the wire shape for one Sonarr link, resolving profile and tag
/// references against the service test metadata. `tree` is the
/// configuration path used in error messages.
pub(crate) fn encode_sonarr(
    name: &str,
    def: &SonarrDefinition,
    meta: &ServiceMetadata,
    tree: &str,
) -> Result<ArrService, CoreError> {
    let (profile_id, profile_name) = resolve_profile(
        &def.quality_profile,
        &meta.profiles,
        &format!("{tree}.quality_profile"),
    )?;
    let lang_field = format!("{tree}.language_profile");
    let (language_id, _) = resolve_profile(
        &def.language_profile,
        language_profiles(meta, &lang_field)?,
        &lang_field,
    )?;
    let tags = resolve_tags(&def.tags, &meta.tags, &format!("{tree}.tags"))?;

    let (anime_profile_id, anime_profile_name) = match &def.anime_quality_profile {
        Some(reference) => {
            let (id, profile_name) = resolve_profile(
                reference,
                &meta.profiles,
                &format!("{tree}.anime_quality_profile"),
            )?;
            (Some(id), Some(profile_name))
        }
        None => (None, None),
    };
    let anime_language_id = match &def.anime_language_profile {
        Some(reference) => {
            let field = format!("{tree}.anime_language_profile");
            let (id, _) = resolve_profile(reference, language_profiles(meta, &field)?, &field)?;
            Some(id)
        }
        None => None,
    };
    let anime_tags = resolve_tags(&def.anime_tags, &meta.tags, &format!("{tree}.anime_tags"))?;

    Ok(ArrService {
        id: None,
        name: name.to_owned(),
        hostname: def.hostname.clone(),
        port: def.port,
        api_key: def.api_key.clone(),
        use_ssl: def.use_ssl,
        base_url: opt_to_wire(def.url_base.as_deref()),
        external_url: def.external_url.clone(),
        is_default: def.is_default_server,
        is_4k: def.is_4k_server,
        sync_enabled: def.enable_scan,
        prevent_search: !def.enable_automatic_search,
        active_directory: def.root_folder.clone(),
        active_profile_id: profile_id,
        active_profile_name: profile_name,
        tags,
        active_language_profile_id: Some(language_id),
        active_anime_directory: opt_to_wire(def.anime_root_folder.as_deref()),
        active_anime_profile_id: anime_profile_id,
        active_anime_profile_name: anime_profile_name,
        active_anime_language_profile_id: anime_language_id,
        anime_tags,
        enable_season_folders: Some(def.enable_season_folders),
        minimum_availability: None,
    })
}

/// Build the wire shape for one Radarr link.
pub(crate) fn encode_radarr(
    name: &str,
    def: &RadarrDefinition,
    meta: &ServiceMetadata,
    tree: &str,
) -> Result<ArrService, CoreError> {
    let (profile_id, profile_name) = resolve_profile(
        &def.quality_profile,
        &meta.profiles,
        &format!("{tree}.quality_profile"),
    )?;
    let tags = resolve_tags(&def.tags, &meta.tags, &format!("{tree}.tags"))?;

    Ok(ArrService {
        id: None,
        name: name.to_owned(),
        hostname: def.hostname.clone(),
        port: def.port,
        api_key: def.api_key.clone(),
        use_ssl: def.use_ssl,
        base_url: opt_to_wire(def.url_base.as_deref()),
        external_url: def.external_url.clone(),
        is_default: def.is_default_server,
        is_4k: def.is_4k_server,
        sync_enabled: def.enable_scan,
        prevent_search: !def.enable_automatic_search,
        active_directory: def.root_folder.clone(),
        active_profile_id: profile_id,
        active_profile_name: profile_name,
        tags,
        active_language_profile_id: None,
        active_anime_directory: String::new(),
        active_anime_profile_id: None,
        active_anime_profile_name: None,
        active_anime_language_profile_id: None,
        anime_tags: Vec::new(),
        enable_season_folders: None,
        minimum_availability: Some(def.minimum_availability.as_wire().to_owned()),
    })
}

fn profile_ref(id: i64, name: &str) -> ResourceRef {
    if name.is_empty() {
        ResourceRef::Id(id)
    } else {
        ResourceRef::Name(name.to_owned())
    }
}

pub(crate) fn decode_sonarr(service: &ArrService) -> SonarrDefinition {
    SonarrDefinition {
        is_default_server: service.is_default,
        is_4k_server: service.is_4k,
        hostname: service.hostname.clone(),
        port: service.port,
        use_ssl: service.use_ssl,
        url_base: wire_to_opt(&service.base_url),
        external_url: service.external_url.clone(),
        enable_scan: service.sync_enabled,
        enable_automatic_search: !service.prevent_search,
        api_key: service.api_key.clone(),
        root_folder: service.active_directory.clone(),
        quality_profile: profile_ref(service.active_profile_id, &service.active_profile_name),
        language_profile: ResourceRef::Id(service.active_language_profile_id.unwrap_or_default()),
        tags: service.tags.iter().map(|&id| ResourceRef::Id(id)).collect(),
        anime_root_folder: wire_to_opt(&service.active_anime_directory),
        anime_quality_profile: service.active_anime_profile_id.map(|id| {
            profile_ref(id, service.active_anime_profile_name.as_deref().unwrap_or(""))
        }),
        anime_language_profile: service
            .active_anime_language_profile_id
            .map(ResourceRef::Id),
        anime_tags: service
            .anime_tags
            .iter()
            .map(|&id| ResourceRef::Id(id))
            .collect(),
        enable_season_folders: service.enable_season_folders.unwrap_or_default(),
    }
}

pub(crate) fn decode_radarr(service: &ArrService) -> RadarrDefinition {
    RadarrDefinition {
        is_default_server: service.is_default,
        is_4k_server: service.is_4k,
        hostname: service.hostname.clone(),
        port: service.port,
        use_ssl: service.use_ssl,
        url_base: wire_to_opt(&service.base_url),
        external_url: service.external_url.clone(),
        enable_scan: service.sync_enabled,
        enable_automatic_search: !service.prevent_search,
        api_key: service.api_key.clone(),
        root_folder: service.active_directory.clone(),
        quality_profile: profile_ref(service.active_profile_id, &service.active_profile_name),
        minimum_availability: service
            .minimum_availability
            .as_deref()
            .and_then(MinimumAvailability::from_wire)
            .unwrap_or_default(),
        tags: service.tags.iter().map(|&id| ResourceRef::Id(id)).collect(),
    }
}

// ── Notification channels ───────────────────────────────────────────

fn opt_value(value: Option<&str>) -> Value {
    Value::String(opt_to_wire(value))
}

/// The desired wire configuration for one managed channel, or `None`
/// when the channel is not declared in desired state.
///
/// Channel options are overlaid onto the currently-stored options so a
/// write never clobbers remote-side option keys this client does not
/// manage.
pub(crate) fn desired_channel_config(
    kind: ChannelKind,
    desired: &NotificationSettings,
    current: &NotificationConfig,
) -> Option<NotificationConfig> {
    let mut options = current.options.clone();
    let (enabled, types): (bool, Option<u32>) = match kind {
        ChannelKind::Discord => {
            let c = desired.discord.as_ref()?;
            options.insert("webhookUrl".into(), opt_value(c.webhook_url.as_deref()));
            options.insert("botUsername".into(), opt_value(c.username.as_deref()));
            options.insert("botAvatarUrl".into(), opt_value(c.avatar_url.as_deref()));
            options.insert("enableMentions".into(), Value::Bool(c.enable_mentions));
            (c.enable, Some(NotificationType::set_encode(&c.notification_types)))
        }
        ChannelKind::Email => {
            let c = desired.email.as_ref()?;
            options.insert("userEmailRequired".into(), Value::Bool(c.require_user_email));
            options.insert("senderName".into(), opt_value(c.sender_name.as_deref()));
            options.insert("emailFrom".into(), opt_value(c.sender_address.as_deref()));
            options.insert("smtpHost".into(), opt_value(c.smtp_host.as_deref()));
            options.insert("smtpPort".into(), Value::from(c.smtp_port));
            options.insert(
                "secure".into(),
                Value::Bool(c.encryption_method == EmailEncryptionMethod::Smtps),
            );
            options.insert(
                "ignoreTls".into(),
                Value::Bool(c.encryption_method == EmailEncryptionMethod::None),
            );
            options.insert(
                "requireTls".into(),
                Value::Bool(c.encryption_method == EmailEncryptionMethod::StarttlsStrict),
            );
            options.insert(
                "allowSelfSigned".into(),
                Value::Bool(c.allow_selfsigned_certificates),
            );
            options.insert("authUser".into(), opt_value(c.smtp_username.as_deref()));
            options.insert("authPass".into(), opt_value(c.smtp_password.as_deref()));
            options.insert(
                "pgpPrivateKey".into(),
                opt_value(c.pgp_private_key.as_deref()),
            );
            options.insert("pgpPassword".into(), opt_value(c.pgp_password.as_deref()));
            (c.enable, Some(NotificationType::set_encode(&c.notification_types)))
        }
        ChannelKind::Gotify => {
            let c = desired.gotify.as_ref()?;
            options.insert("url".into(), opt_value(c.server_url.as_deref()));
            options.insert("token".into(), opt_value(c.access_token.as_deref()));
            (c.enable, Some(NotificationType::set_encode(&c.notification_types)))
        }
        ChannelKind::Pushbullet => {
            let c = desired.pushbullet.as_ref()?;
            options.insert("accessToken".into(), opt_value(c.access_token.as_deref()));
            options.insert("channelTag".into(), opt_value(c.channel_tag.as_deref()));
            (c.enable, Some(NotificationType::set_encode(&c.notification_types)))
        }
        ChannelKind::Pushover => {
            let c = desired.pushover.as_ref()?;
            options.insert("accessToken".into(), opt_value(c.api_key.as_deref()));
            options.insert("userToken".into(), opt_value(c.user_key.as_deref()));
            (c.enable, Some(NotificationType::set_encode(&c.notification_types)))
        }
        ChannelKind::Slack => {
            let c = desired.slack.as_ref()?;
            options.insert("webhookUrl".into(), opt_value(c.webhook_url.as_deref()));
            (c.enable, Some(NotificationType::set_encode(&c.notification_types)))
        }
        ChannelKind::Telegram => {
            let c = desired.telegram.as_ref()?;
            options.insert("botAPI".into(), opt_value(c.access_token.as_deref()));
            options.insert("botUsername".into(), opt_value(c.username.as_deref()));
            options.insert("chatId".into(), opt_value(c.chat_id.as_deref()));
            options.insert("sendSilently".into(), Value::Bool(c.send_silently));
            (c.enable, Some(NotificationType::set_encode(&c.notification_types)))
        }
        ChannelKind::Webhook => {
            let c = desired.webhook.as_ref()?;
            options.insert("webhookUrl".into(), opt_value(c.webhook_url.as_deref()));
            options.insert(
                "authHeader".into(),
                opt_value(c.authorization_header.as_deref()),
            );
            options.insert(
                "jsonPayload".into(),
                opt_value(c.payload_template.as_deref()),
            );
            (c.enable, Some(NotificationType::set_encode(&c.notification_types)))
        }
        // Browser push carries no options and no type filter.
        ChannelKind::Webpush => {
            let c = desired.webpush.as_ref()?;
            (c.enable, None)
        }
    };
    Some(NotificationConfig {
        enabled,
        types,
        options,
    })
}

fn opt_str(options: &Map<String, Value>, key: &str) -> Option<String> {
    options
        .get(key)
        .and_then(Value::as_str)
        .and_then(wire_to_opt)
}

fn opt_bool(options: &Map<String, Value>, key: &str) -> bool {
    options.get(key).and_then(Value::as_bool).unwrap_or_default()
}

fn opt_u16(options: &Map<String, Value>, key: &str, fallback: u16) -> u16 {
    options
        .get(key)
        .and_then(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .and_then(|n| u16::try_from(n).ok())
        .unwrap_or(fallback)
}

/// Recover the SMTP encryption method from the three remote flags.
pub(crate) fn decode_encryption(options: &Map<String, Value>) -> EmailEncryptionMethod {
    if opt_bool(options, "secure") {
        EmailEncryptionMethod::Smtps
    } else if opt_bool(options, "requireTls") {
        EmailEncryptionMethod::StarttlsStrict
    } else if opt_bool(options, "ignoreTls") {
        EmailEncryptionMethod::None
    } else {
        EmailEncryptionMethod::StarttlsPrefer
    }
}

fn decode_types(config: &NotificationConfig) -> std::collections::BTreeSet<NotificationType> {
    NotificationType::set_decode(config.types.unwrap_or_default())
}

/// Rebuild the per-channel desired tree from fetched channel state.
pub(crate) fn decode_channels(
    channels: &std::collections::BTreeMap<ChannelKind, NotificationConfig>,
) -> NotificationSettings {
    let mut settings = NotificationSettings::default();
    for (&kind, config) in channels {
        let o = &config.options;
        match kind {
            ChannelKind::Discord => {
                settings.discord = Some(DiscordChannel {
                    enable: config.enabled,
                    notification_types: decode_types(config),
                    webhook_url: opt_str(o, "webhookUrl"),
                    username: opt_str(o, "botUsername"),
                    avatar_url: opt_str(o, "botAvatarUrl"),
                    enable_mentions: opt_bool(o, "enableMentions"),
                });
            }
            ChannelKind::Email => {
                settings.email = Some(EmailChannel {
                    enable: config.enabled,
                    notification_types: decode_types(config),
                    require_user_email: opt_bool(o, "userEmailRequired"),
                    sender_name: opt_str(o, "senderName"),
                    sender_address: opt_str(o, "emailFrom"),
                    smtp_host: opt_str(o, "smtpHost"),
                    smtp_port: opt_u16(o, "smtpPort", 587),
                    encryption_method: decode_encryption(o),
                    allow_selfsigned_certificates: opt_bool(o, "allowSelfSigned"),
                    smtp_username: opt_str(o, "authUser"),
                    smtp_password: opt_str(o, "authPass"),
                    pgp_private_key: opt_str(o, "pgpPrivateKey"),
                    pgp_password: opt_str(o, "pgpPassword"),
                });
            }
            ChannelKind::Gotify => {
                settings.gotify = Some(GotifyChannel {
                    enable: config.enabled,
                    notification_types: decode_types(config),
                    server_url: opt_str(o, "url"),
                    access_token: opt_str(o, "token"),
                });
            }
            ChannelKind::Pushbullet => {
                settings.pushbullet = Some(PushbulletChannel {
                    enable: config.enabled,
                    notification_types: decode_types(config),
                    access_token: opt_str(o, "accessToken"),
                    channel_tag: opt_str(o, "channelTag"),
                });
            }
            ChannelKind::Pushover => {
                settings.pushover = Some(PushoverChannel {
                    enable: config.enabled,
                    notification_types: decode_types(config),
                    api_key: opt_str(o, "accessToken"),
                    user_key: opt_str(o, "userToken"),
                });
            }
            ChannelKind::Slack => {
                settings.slack = Some(SlackChannel {
                    enable: config.enabled,
                    notification_types: decode_types(config),
                    webhook_url: opt_str(o, "webhookUrl"),
                });
            }
            ChannelKind::Telegram => {
                settings.telegram = Some(TelegramChannel {
                    enable: config.enabled,
                    notification_types: decode_types(config),
                    access_token: opt_str(o, "botAPI"),
                    username: opt_str(o, "botUsername"),
                    chat_id: opt_str(o, "chatId"),
                    send_silently: opt_bool(o, "sendSilently"),
                });
            }
            ChannelKind::Webhook => {
                settings.webhook = Some(WebhookChannel {
                    enable: config.enabled,
                    notification_types: decode_types(config),
                    webhook_url: opt_str(o, "webhookUrl"),
                    authorization_header: opt_str(o, "authHeader"),
                    payload_template: opt_str(o, "jsonPayload"),
                });
            }
            ChannelKind::Webpush => {
                settings.webpush = Some(WebpushChannel {
                    enable: config.enabled,
                });
            }
        }
    }
    settings
}
