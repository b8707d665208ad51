// Hand-crafted async HTTP client for the Jellyseerr API (v1).
//
// Base path: /api/v1/
// Auth: X-Api-Key header

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::transport::TransportConfig;
use crate::types::{
    ArrService, MainSettings, MediaServerAuth, MediaServerSettings, Library, NotificationConfig,
    PublicSettings, ServiceKind, ServiceMetadata, ServiceTestRequest, StatusResponse,
};

// ── Error response shape from the Jellyseerr API ─────────────────────

/// Jellyseerr reports errors under either `message` or `error`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for one Jellyseerr instance.
///
/// Uses API-key authentication and communicates via JSON REST endpoints
/// under `/api/v1/`.
pub struct SeerrClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SeerrClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, API key, and transport config.
    ///
    /// Injects `X-Api-Key` as a default header on every request.
    /// `base_url` may carry a path prefix (`url_base`); `/api/v1/` is
    /// appended to it.
    pub fn from_api_key(
        base_url: &str,
        api_key: &secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| ApiError::Api {
                status: 0,
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("X-Api-Key", key_value);

        let http = transport.build_client(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, ApiError> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/api/v1/`, preserving any
    /// configured path prefix.
    fn normalize_base_url(raw: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api/v1") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/v1/"));
        }

        Ok(url)
    }

    /// Join a relative path (e.g. `"settings/main"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        // base_url always ends with `/api/v1/`, so joining works.
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).send().await?;
        Self::handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                ApiError::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), ApiError> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> ApiError {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return ApiError::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            if let Some(message) = err.message.or(err.error) {
                return ApiError::Api {
                    status: status.as_u16(),
                    message,
                };
            }
        }

        ApiError::Api {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
        }
    }

    // ── Status & public settings ─────────────────────────────────────

    /// `GET /status` — version probe, also used as the connectivity check.
    pub async fn status(&self) -> Result<StatusResponse, ApiError> {
        self.get("status").await
    }

    /// `GET /settings/public` — reports whether first-time setup has run.
    pub async fn public_settings(&self) -> Result<PublicSettings, ApiError> {
        self.get("settings/public").await
    }

    // ── Main settings ────────────────────────────────────────────────

    pub async fn main_settings(&self) -> Result<MainSettings, ApiError> {
        self.get("settings/main").await
    }

    /// Full-body replace of the main settings group.
    pub async fn set_main_settings(
        &self,
        settings: &MainSettings,
    ) -> Result<MainSettings, ApiError> {
        self.post("settings/main", settings).await
    }

    // ── Media server settings ────────────────────────────────────────

    pub async fn media_server_settings(&self) -> Result<MediaServerSettings, ApiError> {
        self.get("settings/jellyfin").await
    }

    pub async fn set_media_server_settings(
        &self,
        settings: &MediaServerSettings,
    ) -> Result<MediaServerSettings, ApiError> {
        self.post("settings/jellyfin", settings).await
    }

    /// Trigger a library sync on the media server and return the
    /// refreshed library list.
    pub async fn sync_libraries(&self) -> Result<Vec<Library>, ApiError> {
        self.get_with_params("settings/jellyfin/library", &[("sync", "true".into())])
            .await
    }

    /// Enable exactly the given library ids.
    pub async fn enable_libraries(&self, ids: &[String]) -> Result<Vec<Library>, ApiError> {
        self.get_with_params("settings/jellyfin/library", &[("enable", ids.join(","))])
            .await
    }

    // ── First-time setup ─────────────────────────────────────────────

    /// Authenticate the media server during first-time setup. The setup
    /// session is carried in a cookie on this client.
    pub async fn auth_media_server(&self, auth: &MediaServerAuth) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post("auth/jellyfin", auth).await?;
        Ok(())
    }

    /// Finalize first-time setup.
    pub async fn finalize_initialization(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post_empty("settings/initialize").await?;
        Ok(())
    }

    // ── Linked automation services ───────────────────────────────────

    pub async fn list_services(&self, kind: ServiceKind) -> Result<Vec<ArrService>, ApiError> {
        self.get(&format!("settings/{kind}")).await
    }

    /// Create a service link; the response carries the remote-assigned id.
    pub async fn create_service(
        &self,
        kind: ServiceKind,
        service: &ArrService,
    ) -> Result<ArrService, ApiError> {
        self.post(&format!("settings/{kind}"), service).await
    }

    /// Update a service link, addressed by remote id.
    pub async fn update_service(
        &self,
        kind: ServiceKind,
        id: i64,
        service: &ArrService,
    ) -> Result<ArrService, ApiError> {
        self.put(&format!("settings/{kind}/{id}"), service).await
    }

    pub async fn delete_service(&self, kind: ServiceKind, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("settings/{kind}/{id}")).await
    }

    /// Probe a Sonarr/Radarr server and fetch its resource metadata
    /// (root folders, profiles, tags) for reference resolution.
    pub async fn test_service(
        &self,
        kind: ServiceKind,
        req: &ServiceTestRequest,
    ) -> Result<ServiceMetadata, ApiError> {
        self.post(&format!("settings/{kind}/test"), req).await
    }

    // ── Notification channels ────────────────────────────────────────

    pub async fn notification(&self, channel: &str) -> Result<NotificationConfig, ApiError> {
        self.get(&format!("settings/notifications/{channel}")).await
    }

    /// Full-body replace of one notification channel's settings.
    pub async fn set_notification(
        &self,
        channel: &str,
        config: &NotificationConfig,
    ) -> Result<NotificationConfig, ApiError> {
        self.post(&format!("settings/notifications/{channel}"), config)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_appends_api_path() {
        let url = SeerrClient::normalize_base_url("http://jellyseerr:5055").unwrap();
        assert_eq!(url.as_str(), "http://jellyseerr:5055/api/v1/");
    }

    #[test]
    fn normalize_preserves_url_base() {
        let url = SeerrClient::normalize_base_url("https://media.example.com/jellyseerr/").unwrap();
        assert_eq!(url.as_str(), "https://media.example.com/jellyseerr/api/v1/");
    }

    #[test]
    fn normalize_idempotent_on_full_path() {
        let url = SeerrClient::normalize_base_url("http://jellyseerr:5055/api/v1").unwrap();
        assert_eq!(url.as_str(), "http://jellyseerr:5055/api/v1/");
    }
}
