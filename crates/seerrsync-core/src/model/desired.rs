//! Desired-state configuration tree for one managed instance.
//!
//! Shapes mirror the YAML document the user writes. Unknown keys are
//! rejected everywhere (`deny_unknown_fields`) so a typo fails fast
//! instead of silently leaving an option unmanaged. Every settings
//! group is optional; an omitted group is left untouched on the remote.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::notification_types::NotificationType;
use crate::model::permissions::Permission;

// ── Connection ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Https => f.write_str("https"),
        }
    }
}

/// Full desired state for one remote deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceConfig {
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub protocol: Protocol,
    /// Optional path prefix the instance is served under.
    #[serde(default)]
    pub url_base: Option<String>,
    /// API key, as shown under Settings → General on the instance.
    pub api_key: SecretString,
    /// Fail early if the remote reports a different version.
    #[serde(default)]
    pub expect_version: Option<String>,
    /// Accept invalid TLS certificates when connecting.
    #[serde(default)]
    pub danger_accept_invalid_certs: bool,
    /// Instances that must finish reconciling before this one starts.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub settings: InstanceSettings,
}

fn default_port() -> u16 {
    5055
}

impl InstanceConfig {
    /// Base URL for the instance, including any path prefix.
    pub fn host_url(&self) -> String {
        let base = match &self.url_base {
            Some(b) if !b.trim_matches('/').is_empty() => format!("/{}", b.trim_matches('/')),
            _ => String::new(),
        };
        format!("{}://{}:{}{}", self.protocol, self.hostname, self.port, base)
    }

    /// Validate the whole desired tree, reporting the first offending
    /// field path.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.settings.validate()
    }
}

// ── Settings tree ───────────────────────────────────────────────────

/// Nested settings tree grouped by subsystem. `None` means unmanaged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general: Option<GeneralSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<UserSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_server: Option<MediaServerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sonarr: Option<ServiceCollection<SonarrDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radarr: Option<ServiceCollection<RadarrDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationSettings>,
}

impl InstanceSettings {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(sonarr) = &self.sonarr {
            validate_default_servers("settings.sonarr", sonarr.definitions.iter())?;
        }
        if let Some(radarr) = &self.radarr {
            validate_default_servers("settings.radarr", radarr.definitions.iter())?;
        }
        if let Some(notifications) = &self.notifications {
            notifications.validate()?;
        }
        Ok(())
    }
}

/// At most one default server per (collection, 4k) pair.
fn validate_default_servers<'a, D: ServerFlags + 'a>(
    tree: &str,
    definitions: impl Iterator<Item = (&'a String, &'a D)>,
) -> Result<(), CoreError> {
    let mut default_non4k: Option<&str> = None;
    let mut default_4k: Option<&str> = None;
    for (name, def) in definitions {
        if !def.is_default_server() {
            continue;
        }
        let slot = if def.is_4k_server() {
            &mut default_4k
        } else {
            &mut default_non4k
        };
        if let Some(prev) = slot {
            let kind = if def.is_4k_server() { "4K" } else { "non-4K" };
            return Err(CoreError::Validation {
                field: format!("{tree}.definitions[\"{name}\"].is_default_server"),
                reason: format!("more than one {kind} default server (also set on \"{prev}\")"),
            });
        }
        *slot = Some(name);
    }
    Ok(())
}

pub(crate) trait ServerFlags {
    fn is_default_server(&self) -> bool;
    fn is_4k_server(&self) -> bool;
}

// ── General settings ────────────────────────────────────────────────

/// General behaviour: naming, discovery, caching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GeneralSettings {
    /// Instance name shown in the browser title.
    pub application_title: String,
    /// URL used when generating links; `None` keeps the browser URL.
    pub application_url: Option<String>,
    pub enable_proxy_support: bool,
    pub enable_csrf_protection: bool,
    pub enable_image_caching: bool,
    /// ISO 639-1 UI language code.
    pub display_language: String,
    /// ISO 3166-1 region filter; `None` discovers all regions.
    pub discover_region: Option<String>,
    /// ISO 639-1 original-language filters; empty discovers all.
    pub discover_languages: Vec<String>,
    pub hide_available_media: bool,
    pub allow_partial_series_requests: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            application_title: "Jellyseerr".into(),
            application_url: None,
            enable_proxy_support: false,
            enable_csrf_protection: false,
            enable_image_caching: false,
            display_language: "en".into(),
            discover_region: None,
            discover_languages: Vec::new(),
            hide_available_media: false,
            allow_partial_series_requests: true,
        }
    }
}

// ── User policy settings ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct UserSettings {
    pub enable_local_signin: bool,
    pub enable_new_media_server_signin: bool,
    /// Request quotas; 0 means unlimited.
    pub movie_request_limit: u32,
    pub movie_request_days: u32,
    pub series_request_limit: u32,
    pub series_request_days: u32,
    pub default_permissions: BTreeSet<Permission>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            enable_local_signin: true,
            enable_new_media_server_signin: true,
            movie_request_limit: 0,
            movie_request_days: 7,
            series_request_limit: 0,
            series_request_days: 7,
            default_permissions: BTreeSet::from([Permission::Request, Permission::Request4k]),
        }
    }
}

// ── Media server settings ───────────────────────────────────────────

/// Linked media-server options.
///
/// `server_url`, `username`, `password` and `email_address` are only
/// applied during first-time setup; once the instance is initialized
/// they are read-only and a differing value is surfaced as a warning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MediaServerConfig {
    pub server_url: Option<String>,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<SecretString>,
    pub email_address: Option<String>,
    /// Externally-reachable media server URL, mutable at any time.
    pub external_url: Option<String>,
    /// Library names to enable for scanning.
    pub libraries: Vec<String>,
}

impl PartialEq for MediaServerConfig {
    fn eq(&self, other: &Self) -> bool {
        use secrecy::ExposeSecret;
        self.server_url == other.server_url
            && self.username == other.username
            && self.password.as_ref().map(ExposeSecret::expose_secret)
                == other.password.as_ref().map(ExposeSecret::expose_secret)
            && self.email_address == other.email_address
            && self.external_url == other.external_url
            && self.libraries == other.libraries
    }
}

// ── Linked automation services ──────────────────────────────────────

/// A named collection of linked service definitions, with the
/// destructive unmanaged-cleanup gated behind an explicit opt-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServiceCollection<D> {
    /// Delete remote definitions not declared here. Off by default.
    pub delete_unmanaged: bool,
    pub definitions: IndexMap<String, D>,
}

impl<D> Default for ServiceCollection<D> {
    fn default() -> Self {
        Self {
            delete_unmanaged: false,
            definitions: IndexMap::new(),
        }
    }
}

/// A reference to a remote-side resource, by name or by remote id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceRef {
    Id(i64),
    Name(String),
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

/// One Sonarr server link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SonarrDefinition {
    #[serde(default)]
    pub is_default_server: bool,
    #[serde(default)]
    pub is_4k_server: bool,
    pub hostname: String,
    #[serde(default = "SonarrDefinition::default_port")]
    pub port: u16,
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default)]
    pub url_base: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    /// Scan the server for existing media/request status.
    #[serde(default)]
    pub enable_scan: bool,
    /// Search automatically upon request approval.
    #[serde(default = "default_true")]
    pub enable_automatic_search: bool,
    pub api_key: String,
    pub root_folder: String,
    pub quality_profile: ResourceRef,
    pub language_profile: ResourceRef,
    #[serde(default)]
    pub tags: Vec<ResourceRef>,
    #[serde(default)]
    pub anime_root_folder: Option<String>,
    #[serde(default)]
    pub anime_quality_profile: Option<ResourceRef>,
    #[serde(default)]
    pub anime_language_profile: Option<ResourceRef>,
    #[serde(default)]
    pub anime_tags: Vec<ResourceRef>,
    #[serde(default)]
    pub enable_season_folders: bool,
}

impl SonarrDefinition {
    fn default_port() -> u16 {
        8989
    }
}

impl ServerFlags for SonarrDefinition {
    fn is_default_server(&self) -> bool {
        self.is_default_server
    }
    fn is_4k_server(&self) -> bool {
        self.is_4k_server
    }
}

/// The release stage at which requested movies are added to Radarr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MinimumAvailability {
    Announced,
    InCinemas,
    #[default]
    Released,
}

impl MinimumAvailability {
    /// Remote representation (camelCase string).
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Announced => "announced",
            Self::InCinemas => "inCinemas",
            Self::Released => "released",
        }
    }

    /// Parse the remote representation, case-insensitively.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "announced" => Some(Self::Announced),
            "incinemas" => Some(Self::InCinemas),
            "released" => Some(Self::Released),
            _ => None,
        }
    }
}

/// One Radarr server link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RadarrDefinition {
    #[serde(default)]
    pub is_default_server: bool,
    #[serde(default)]
    pub is_4k_server: bool,
    pub hostname: String,
    #[serde(default = "RadarrDefinition::default_port")]
    pub port: u16,
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default)]
    pub url_base: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub enable_scan: bool,
    #[serde(default = "default_true")]
    pub enable_automatic_search: bool,
    pub api_key: String,
    pub root_folder: String,
    pub quality_profile: ResourceRef,
    #[serde(default)]
    pub minimum_availability: MinimumAvailability,
    #[serde(default)]
    pub tags: Vec<ResourceRef>,
}

impl RadarrDefinition {
    fn default_port() -> u16 {
        7878
    }
}

impl ServerFlags for RadarrDefinition {
    fn is_default_server(&self) -> bool {
        self.is_default_server
    }
    fn is_4k_server(&self) -> bool {
        self.is_4k_server
    }
}

fn default_true() -> bool {
    true
}

// ── Notification channels ───────────────────────────────────────────

/// The fixed set of notification channel types the remote exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Discord,
    Email,
    Gotify,
    Pushbullet,
    Pushover,
    Slack,
    Telegram,
    Webhook,
    Webpush,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 9] = [
        Self::Discord,
        Self::Email,
        Self::Gotify,
        Self::Pushbullet,
        Self::Pushover,
        Self::Slack,
        Self::Telegram,
        Self::Webhook,
        Self::Webpush,
    ];

    /// URL path segment under `/api/v1/settings/notifications/`.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::Email => "email",
            Self::Gotify => "gotify",
            Self::Pushbullet => "pushbullet",
            Self::Pushover => "pushover",
            Self::Slack => "slack",
            Self::Telegram => "telegram",
            Self::Webhook => "webhook",
            Self::Webpush => "webpush",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Per-channel notification configuration. Each slot is optional;
/// omitted channels are left unmanaged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NotificationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gotify: Option<GotifyChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushbullet: Option<PushbulletChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushover: Option<PushoverChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack: Option<SlackChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webpush: Option<WebpushChannel>,
}

impl NotificationSettings {
    /// Check that options required when a channel is enabled are set.
    pub fn validate(&self) -> Result<(), CoreError> {
        fn required(
            channel: ChannelKind,
            field: &str,
            value: Option<&str>,
        ) -> Result<(), CoreError> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(()),
                _ => Err(CoreError::Validation {
                    field: format!("settings.notifications.{channel}.{field}"),
                    reason: "required when the channel is enabled".into(),
                }),
            }
        }

        if let Some(c) = self.discord.as_ref().filter(|c| c.enable) {
            required(ChannelKind::Discord, "webhook_url", c.webhook_url.as_deref())?;
        }
        if let Some(c) = self.email.as_ref().filter(|c| c.enable) {
            required(ChannelKind::Email, "sender_name", c.sender_name.as_deref())?;
            required(
                ChannelKind::Email,
                "sender_address",
                c.sender_address.as_deref(),
            )?;
            required(ChannelKind::Email, "smtp_host", c.smtp_host.as_deref())?;
        }
        if let Some(c) = self.gotify.as_ref().filter(|c| c.enable) {
            required(ChannelKind::Gotify, "server_url", c.server_url.as_deref())?;
            required(ChannelKind::Gotify, "access_token", c.access_token.as_deref())?;
        }
        if let Some(c) = self.pushbullet.as_ref().filter(|c| c.enable) {
            required(
                ChannelKind::Pushbullet,
                "access_token",
                c.access_token.as_deref(),
            )?;
        }
        if let Some(c) = self.pushover.as_ref().filter(|c| c.enable) {
            required(ChannelKind::Pushover, "api_key", c.api_key.as_deref())?;
            required(ChannelKind::Pushover, "user_key", c.user_key.as_deref())?;
        }
        if let Some(c) = self.slack.as_ref().filter(|c| c.enable) {
            required(ChannelKind::Slack, "webhook_url", c.webhook_url.as_deref())?;
        }
        if let Some(c) = self.telegram.as_ref().filter(|c| c.enable) {
            required(
                ChannelKind::Telegram,
                "access_token",
                c.access_token.as_deref(),
            )?;
            required(ChannelKind::Telegram, "chat_id", c.chat_id.as_deref())?;
        }
        if let Some(c) = self.webhook.as_ref().filter(|c| c.enable) {
            required(ChannelKind::Webhook, "webhook_url", c.webhook_url.as_deref())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DiscordChannel {
    pub enable: bool,
    pub notification_types: BTreeSet<NotificationType>,
    pub webhook_url: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default = "default_true")]
    pub enable_mentions: bool,
}

/// SMTP transport security, encoded on the remote as the three flags
/// `secure`, `ignoreTls` and `requireTls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailEncryptionMethod {
    /// Plain SMTP, no transport security attempted.
    None,
    /// Implicit TLS on connect (usually port 465).
    Smtps,
    /// Use STARTTLS when the server offers it.
    #[default]
    StarttlsPrefer,
    /// Require STARTTLS, fail otherwise.
    StarttlsStrict,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EmailChannel {
    pub enable: bool,
    pub notification_types: BTreeSet<NotificationType>,
    pub require_user_email: bool,
    pub sender_name: Option<String>,
    pub sender_address: Option<String>,
    pub smtp_host: Option<String>,
    #[serde(default = "EmailChannel::default_smtp_port")]
    pub smtp_port: u16,
    pub encryption_method: EmailEncryptionMethod,
    pub allow_selfsigned_certificates: bool,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub pgp_private_key: Option<String>,
    pub pgp_password: Option<String>,
}

impl EmailChannel {
    fn default_smtp_port() -> u16 {
        587
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GotifyChannel {
    pub enable: bool,
    pub notification_types: BTreeSet<NotificationType>,
    pub server_url: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PushbulletChannel {
    pub enable: bool,
    pub notification_types: BTreeSet<NotificationType>,
    pub access_token: Option<String>,
    pub channel_tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PushoverChannel {
    pub enable: bool,
    pub notification_types: BTreeSet<NotificationType>,
    pub api_key: Option<String>,
    pub user_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SlackChannel {
    pub enable: bool,
    pub notification_types: BTreeSet<NotificationType>,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TelegramChannel {
    pub enable: bool,
    pub notification_types: BTreeSet<NotificationType>,
    pub access_token: Option<String>,
    pub username: Option<String>,
    pub chat_id: Option<String>,
    pub send_silently: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WebhookChannel {
    pub enable: bool,
    pub notification_types: BTreeSet<NotificationType>,
    pub webhook_url: Option<String>,
    pub authorization_header: Option<String>,
    pub payload_template: Option<String>,
}

/// Browser push notifications carry no channel-specific options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WebpushChannel {
    pub enable: bool,
}
