//! Wire types for the Jellyseerr REST API (`/api/v1/`).
//!
//! Field names mirror the remote camelCase JSON exactly. Settings-group
//! types carry a flattened `extra` map so a full-body replace round-trips
//! fields this client does not model (newer remote versions add fields
//! without notice).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Status & public settings ─────────────────────────────────────────

/// `GET /api/v1/status`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub version: String,
    #[serde(default)]
    pub update_available: bool,
}

/// `GET /api/v1/settings/public`
///
/// Available without an API key; `initialized` distinguishes a fresh
/// instance awaiting first-time setup from a configured one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSettings {
    pub initialized: bool,
}

// ── Main settings (general + user policy) ────────────────────────────

/// `GET`/`POST /api/v1/settings/main`
///
/// One endpoint backs both the general options and the user-policy
/// options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainSettings {
    #[serde(default)]
    pub application_title: String,
    #[serde(default)]
    pub application_url: String,
    #[serde(default)]
    pub trust_proxy: bool,
    #[serde(default)]
    pub csrf_protection: bool,
    #[serde(default)]
    pub cache_images: bool,
    #[serde(default)]
    pub locale: String,
    /// Pipe-joined ISO 639-1 codes, e.g. `"en|ja"`. Empty means all.
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub hide_available: bool,
    #[serde(default)]
    pub partial_requests_enabled: bool,
    #[serde(default)]
    pub local_login: bool,
    #[serde(default)]
    pub new_plex_login: bool,
    /// Permission bitfield granted to newly created users.
    #[serde(default)]
    pub default_permissions: u32,
    #[serde(default)]
    pub default_quotas: DefaultQuotas,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultQuotas {
    #[serde(default)]
    pub movie: Quota,
    #[serde(default)]
    pub tv: Quota,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    #[serde(default)]
    pub quota_limit: u32,
    #[serde(default)]
    pub quota_days: u32,
}

// ── Media server settings ────────────────────────────────────────────

/// `GET`/`POST /api/v1/settings/jellyfin`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaServerSettings {
    #[serde(default)]
    pub external_hostname: String,
    #[serde(default)]
    pub libraries: Vec<Library>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One media library as reported by the linked media server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
}

/// `POST /api/v1/auth/jellyfin` — first-time setup authentication.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaServerAuth {
    pub username: String,
    pub password: String,
    /// Media server URL, `hostname` on the wire.
    pub hostname: String,
    pub email: String,
}

// ── Linked automation services (Sonarr / Radarr) ─────────────────────

/// Which automation-service collection an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Sonarr,
    Radarr,
}

impl ServiceKind {
    /// URL path segment under `/api/v1/settings/`.
    pub fn path(self) -> &'static str {
        match self {
            Self::Sonarr => "sonarr",
            Self::Radarr => "radarr",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// One Sonarr/Radarr service link.
///
/// Shared wire shape for both collections; Sonarr-only fields
/// (language profiles, anime variants, season folders) and the
/// Radarr-only `minimumAvailability` are optional and omitted when
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrService {
    /// Remote-assigned identity. Absent in create requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub api_key: String,
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default)]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, rename = "is4k")]
    pub is_4k: bool,
    #[serde(default)]
    pub sync_enabled: bool,
    #[serde(default)]
    pub prevent_search: bool,
    #[serde(default)]
    pub active_directory: String,
    #[serde(default)]
    pub active_profile_id: i64,
    #[serde(default)]
    pub active_profile_name: String,
    #[serde(default)]
    pub tags: Vec<i64>,

    // Sonarr only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_language_profile_id: Option<i64>,
    #[serde(default)]
    pub active_anime_directory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_anime_profile_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_anime_profile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_anime_language_profile_id: Option<i64>,
    #[serde(default)]
    pub anime_tags: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_season_folders: Option<bool>,

    // Radarr only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_availability: Option<String>,
}

/// `POST /api/v1/settings/{sonarr,radarr}/test` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTestRequest {
    pub hostname: String,
    pub port: u16,
    pub use_ssl: bool,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Metadata returned by the service test endpoint: the remote-side
/// resources (folders, profiles, tags) a service link may reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
    #[serde(default)]
    pub root_folders: Vec<RootFolder>,
    #[serde(default)]
    pub profiles: Vec<IdName>,
    #[serde(default)]
    pub language_profiles: Option<Vec<IdName>>,
    #[serde(default)]
    pub tags: Vec<ServiceTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RootFolder {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdName {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceTag {
    pub id: i64,
    pub label: String,
}

// ── Notification channels ────────────────────────────────────────────

/// `GET`/`POST /api/v1/settings/notifications/{type}`
///
/// Every channel shares this envelope; `options` is channel-specific
/// and interpreted by `seerrsync-core`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Notification-event bitfield. Channels without configurable
    /// types omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<u32>,
    #[serde(default)]
    pub options: Map<String, Value>,
}
