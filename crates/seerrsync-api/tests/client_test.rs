// Integration tests for `SeerrClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use seerrsync_api::types::{ArrService, ServiceKind};
use seerrsync_api::{ApiError, SeerrClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SeerrClient) {
    let server = MockServer::start().await;
    let client = SeerrClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.7.0",
            "updateAvailable": false
        })))
        .mount(&server)
        .await;

    let status = client.status().await.unwrap();
    assert_eq!(status.version, "1.7.0");
    assert!(!status.update_available);
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let server = MockServer::start().await;
    let client = SeerrClient::from_api_key(
        &server.uri(),
        &secrecy::SecretString::from("seerrsync-test-key"),
        &TransportConfig::default(),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .and(header("X-Api-Key", "seerrsync-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "1.7.0" })))
        .expect(1)
        .mount(&server)
        .await;

    client.status().await.unwrap();
}

#[tokio::test]
async fn test_public_settings_uninitialized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/settings/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "initialized": false })))
        .mount(&server)
        .await;

    let public = client.public_settings().await.unwrap();
    assert!(!public.initialized);
}

#[tokio::test]
async fn test_main_settings_roundtrip_preserves_unknown_fields() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/settings/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "applicationTitle": "Jellyseerr",
            "locale": "en",
            "originalLanguage": "en|ja",
            "somethingNew": { "nested": true }
        })))
        .mount(&server)
        .await;

    let settings = client.main_settings().await.unwrap();
    assert_eq!(settings.application_title, "Jellyseerr");
    assert_eq!(settings.original_language, "en|ja");
    // Unknown fields survive for the full-body replace.
    assert_eq!(settings.extra["somethingNew"], json!({ "nested": true }));

    Mock::given(method("POST"))
        .and(path("/api/v1/settings/main"))
        .and(body_partial_json(json!({ "somethingNew": { "nested": true } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "applicationTitle": "Jellyseerr"
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.set_main_settings(&settings).await.unwrap();
}

#[tokio::test]
async fn test_create_service_returns_remote_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/settings/sonarr"))
        .and(body_partial_json(json!({
            "name": "Sonarr",
            "activeDirectory": "/data/tv"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 7,
            "name": "Sonarr",
            "hostname": "sonarr",
            "port": 8989,
            "apiKey": "0123456789abcdef0123456789abcdef",
            "activeDirectory": "/data/tv",
            "activeProfileId": 1,
            "activeProfileName": "HD",
            "tags": []
        })))
        .mount(&server)
        .await;

    let service = ArrService {
        name: "Sonarr".into(),
        hostname: "sonarr".into(),
        port: 8989,
        api_key: "0123456789abcdef0123456789abcdef".into(),
        active_directory: "/data/tv".into(),
        active_profile_id: 1,
        active_profile_name: "HD".into(),
        ..ArrService::default()
    };

    let created = client
        .create_service(ServiceKind::Sonarr, &service)
        .await
        .unwrap();
    assert_eq!(created.id, Some(7));
}

#[tokio::test]
async fn test_delete_service() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/settings/radarr/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .delete_service(ServiceKind::Radarr, 3)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_enable_libraries_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/settings/jellyfin/library"))
        .and(query_param("enable", "a1,b2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a1", "name": "Movies", "enabled": true },
            { "id": "b2", "name": "Shows", "enabled": true }
        ])))
        .mount(&server)
        .await;

    let libraries = client
        .enable_libraries(&["a1".into(), "b2".into()])
        .await
        .unwrap();
    assert_eq!(libraries.len(), 2);
    assert!(libraries.iter().all(|l| l.enabled));
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.status().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidApiKey));
    assert!(err.is_auth());
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_api_error_message_extraction() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/settings/sonarr"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "connection refused" })),
        )
        .mount(&server)
        .await;

    let err = client
        .create_service(ServiceKind::Sonarr, &ArrService::default())
        .await
        .unwrap_err();
    match &err {
        ApiError::Api { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "connection refused");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // 5xx responses are retryable.
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_json_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client.status().await.unwrap_err();
    assert!(matches!(err, ApiError::Deserialization { .. }));
    assert!(!err.is_transient());
}
