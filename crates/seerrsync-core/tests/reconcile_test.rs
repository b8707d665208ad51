//! End-to-end pipeline tests against a mocked remote.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde_json::json;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use seerrsync_api::types::ServiceKind;
use seerrsync_core::model::{
    InstanceConfig, InstanceSettings, MediaServerConfig, Protocol, ResourceRef, ServiceCollection,
    SonarrDefinition,
};
use seerrsync_core::pipeline::{PipelineOptions, RunMode, run, run_instance};
use seerrsync_core::{CoreError, SecretsCache};

fn instance(server: &MockServer) -> InstanceConfig {
    let addr = server.address();
    InstanceConfig {
        hostname: addr.ip().to_string(),
        port: addr.port(),
        protocol: Protocol::Http,
        url_base: None,
        api_key: SecretString::from("test-key".to_owned()),
        expect_version: None,
        danger_accept_invalid_certs: false,
        depends_on: Vec::new(),
        settings: InstanceSettings::default(),
    }
}

fn options() -> PipelineOptions {
    PipelineOptions {
        timeout: Duration::from_secs(5),
        retries: 0,
        retry_backoff: Duration::from_millis(1),
        concurrency: 4,
    }
}

fn sonarr_definition() -> SonarrDefinition {
    SonarrDefinition {
        is_default_server: true,
        is_4k_server: false,
        hostname: "sonarr".into(),
        port: 8989,
        use_ssl: false,
        url_base: None,
        external_url: None,
        enable_scan: false,
        enable_automatic_search: true,
        api_key: "k".into(),
        root_folder: "/data/tv".into(),
        quality_profile: ResourceRef::Name("HD".into()),
        language_profile: ResourceRef::Name("English".into()),
        tags: Vec::new(),
        anime_root_folder: None,
        anime_quality_profile: None,
        anime_language_profile: None,
        anime_tags: Vec::new(),
        enable_season_folders: true,
    }
}

async fn mount_baseline(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "2.7.3"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/settings/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"initialized": true})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/settings/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "applicationTitle": "Jellyseerr",
            "locale": "en",
            "partialRequestsEnabled": true,
            "localLogin": true,
            "newPlexLogin": true,
            "defaultPermissions": 1056,
            "defaultQuotas": {
                "movie": {"quotaLimit": 0, "quotaDays": 7},
                "tv": {"quotaLimit": 0, "quotaDays": 7}
            }
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/settings/jellyfin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/settings/sonarr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/settings/radarr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/v1/settings/notifications/[a-z]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enabled": false,
            "types": 0,
            "options": {}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn missing_service_is_created_and_assigned_a_remote_id() {
    let server = MockServer::start().await;
    mount_baseline(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/settings/sonarr/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rootFolders": [{"path": "/data/tv"}],
            "profiles": [{"id": 4, "name": "HD"}],
            "languageProfiles": [{"id": 1, "name": "English"}],
            "tags": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/settings/sonarr"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 5,
            "name": "Sonarr",
            "hostname": "sonarr",
            "port": 8989,
            "apiKey": "k",
            "activeDirectory": "/data/tv",
            "activeProfileId": 4,
            "activeProfileName": "HD",
            "activeLanguageProfileId": 1,
            "enableSeasonFolders": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = instance(&server);
    let mut collection = ServiceCollection::default();
    collection
        .definitions
        .insert("Sonarr".into(), sonarr_definition());
    config.settings.sonarr = Some(collection);

    let cache = Mutex::new(SecretsCache::default());
    let outcome = run_instance(
        "main",
        &config,
        RunMode::Apply,
        &options(),
        &cache,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.plan.service_changes.len(), 1);
    let applied = outcome.applied.unwrap();
    assert_eq!(applied.committed, vec!["sonarr[\"Sonarr\"] (create)"]);
    assert_eq!(
        applied.created,
        vec![(ServiceKind::Sonarr, "Sonarr".to_owned(), 5)]
    );
}

#[tokio::test]
async fn unmanaged_service_is_pruned_only_with_the_opt_in() {
    for delete_unmanaged in [true, false] {
        let server = MockServer::start().await;

        // Mount before the baseline: earlier mocks win, and the
        // baseline also answers this path (with an empty list).
        Mock::given(method("GET"))
            .and(path("/api/v1/settings/sonarr"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 7,
                "name": "Anime",
                "hostname": "sonarr-anime",
                "port": 8989,
                "apiKey": "k"
            }])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/settings/sonarr/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(u64::from(delete_unmanaged))
            .mount(&server)
            .await;
        mount_baseline(&server).await;

        let mut config = instance(&server);
        config.settings.sonarr = Some(ServiceCollection {
            delete_unmanaged,
            definitions: IndexMap::new(),
        });

        let cache = Mutex::new(SecretsCache::default());
        let outcome = run_instance(
            "main",
            &config,
            RunMode::Apply,
            &options(),
            &cache,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(outcome.plan.is_empty());
        let pruned = outcome.pruned.unwrap();
        if delete_unmanaged {
            assert_eq!(pruned.deleted, vec!["sonarr[\"Anime\"]"]);
            assert!(pruned.skipped.is_empty());
        } else {
            assert!(pruned.deleted.is_empty());
            assert_eq!(pruned.skipped, vec!["sonarr[\"Anime\"]"]);
        }
        assert!(pruned.failed.is_empty());
    }
}

#[tokio::test]
async fn uninitialized_instance_runs_first_time_setup_once() {
    let server = MockServer::start().await;

    // The first two public-settings reads see an uninitialized
    // instance (initial fetch, then the setup re-check); afterwards
    // the baseline mock reports initialized.
    Mock::given(method("GET"))
        .and(path("/api/v1/settings/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"initialized": false})))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/settings/jellyfin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "libraries": [{"id": "lib1", "name": "Shows", "enabled": true}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/jellyfin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/settings/jellyfin/library"))
        .and(query_param("sync", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "lib1", "name": "Shows", "enabled": false}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/settings/jellyfin/library"))
        .and(query_param("enable", "lib1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "lib1", "name": "Shows", "enabled": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/settings/initialize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    mount_baseline(&server).await;

    let mut config = instance(&server);
    config.settings.media_server = Some(MediaServerConfig {
        server_url: Some("http://jellyfin:8096".into()),
        username: Some("admin".into()),
        password: Some(SecretString::from("hunter2".to_owned())),
        email_address: Some("admin@example.com".into()),
        external_url: None,
        libraries: vec!["Shows".into()],
    });

    let cache = Mutex::new(SecretsCache::default());
    let outcome = run_instance(
        "main",
        &config,
        RunMode::Apply,
        &options(),
        &cache,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(outcome.initialized);
    // Post-setup state already matches; the setup-only fields surface
    // as warnings instead of changes.
    assert!(outcome.plan.is_empty());
    assert_eq!(outcome.plan.warnings.len(), 4);
    assert!(outcome.applied.is_none());
}

#[tokio::test]
async fn clean_state_performs_no_writes() {
    let server = MockServer::start().await;
    mount_baseline(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/settings/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = instance(&server);
    config.settings.general = Some(Default::default());
    config.settings.users = Some(Default::default());

    let cache = Mutex::new(SecretsCache::default());
    let outcome = run_instance(
        "main",
        &config,
        RunMode::Apply,
        &options(),
        &cache,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(outcome.plan.is_empty());
    assert!(outcome.applied.is_none());
}

#[tokio::test]
async fn plan_mode_never_writes() {
    let server = MockServer::start().await;
    mount_baseline(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/settings/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = instance(&server);
    config.settings.general = Some(seerrsync_core::model::GeneralSettings {
        application_title: "Requests".into(),
        ..Default::default()
    });

    let cache = Mutex::new(SecretsCache::default());
    let outcome = run_instance(
        "main",
        &config,
        RunMode::Plan,
        &options(),
        &cache,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.plan.group_changes.len(), 1);
    assert!(outcome.applied.is_none());
    assert!(outcome.pruned.is_none());
}

#[tokio::test]
async fn version_pin_mismatch_fails_before_fetching() {
    let server = MockServer::start().await;
    mount_baseline(&server).await;

    let mut config = instance(&server);
    config.expect_version = Some("3.0.0".into());

    let cache = Mutex::new(SecretsCache::default());
    let err = run_instance(
        "main",
        &config,
        RunMode::Plan,
        &options(),
        &cache,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        CoreError::VersionMismatch { expected, actual } => {
            assert_eq!(expected, "3.0.0");
            assert_eq!(actual, "2.7.3");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn failure_after_a_committed_change_reports_partial_apply() {
    let server = MockServer::start().await;
    mount_baseline(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/settings/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/settings/sonarr/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rootFolders": [{"path": "/data/tv"}],
            "profiles": [{"id": 4, "name": "HD"}],
            "languageProfiles": [{"id": 1, "name": "English"}],
            "tags": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/settings/sonarr"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = instance(&server);
    config.settings.general = Some(seerrsync_core::model::GeneralSettings {
        application_title: "Requests".into(),
        ..Default::default()
    });
    let mut collection = ServiceCollection::default();
    collection
        .definitions
        .insert("Sonarr".into(), sonarr_definition());
    config.settings.sonarr = Some(collection);

    let cache = Mutex::new(SecretsCache::default());
    let err = run_instance(
        "main",
        &config,
        RunMode::Apply,
        &options(),
        &cache,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        CoreError::PartialApply {
            committed, failed, ..
        } => {
            assert_eq!(committed, vec!["settings.main"]);
            assert_eq!(failed, "sonarr[\"Sonarr\"] (create)");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unknown_library_fails_before_any_write() {
    let server = MockServer::start().await;
    mount_baseline(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/settings/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/settings/jellyfin/library"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = instance(&server);
    config.settings.general = Some(seerrsync_core::model::GeneralSettings {
        application_title: "Requests".into(),
        ..Default::default()
    });
    config.settings.media_server = Some(MediaServerConfig {
        libraries: vec!["Nope".into()],
        ..Default::default()
    });

    let cache = Mutex::new(SecretsCache::default());
    let err = run_instance(
        "main",
        &config,
        RunMode::Apply,
        &options(),
        &cache,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        CoreError::Validation { field, .. } => {
            assert_eq!(field, "settings.media_server.libraries");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn transient_write_failures_are_retried() {
    let server = MockServer::start().await;

    // Mount before the 200: earlier mocks win, and this one expires
    // after serving the first request.
    Mock::given(method("POST"))
        .and(path("/api/v1/settings/main"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/settings/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    mount_baseline(&server).await;

    let mut config = instance(&server);
    config.settings.general = Some(seerrsync_core::model::GeneralSettings {
        application_title: "Requests".into(),
        ..Default::default()
    });

    let cache = Mutex::new(SecretsCache::default());
    let outcome = run_instance(
        "main",
        &config,
        RunMode::Apply,
        &PipelineOptions {
            retries: 1,
            ..options()
        },
        &cache,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.applied.unwrap().committed, vec!["settings.main"]);
}

#[tokio::test]
async fn transient_fetch_failures_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/settings/main"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_baseline(&server).await;

    let config = instance(&server);
    let cache = Mutex::new(SecretsCache::default());
    let outcome = run_instance(
        "main",
        &config,
        RunMode::Plan,
        &PipelineOptions {
            retries: 1,
            ..options()
        },
        &cache,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(outcome.plan.is_empty());
}

#[tokio::test]
async fn a_failed_delete_does_not_stop_pruning() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/settings/sonarr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "name": "Anime", "hostname": "sonarr-anime", "port": 8989, "apiKey": "k"},
            {"id": 9, "name": "Extra", "hostname": "sonarr-extra", "port": 8989, "apiKey": "k"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/settings/sonarr/7"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/settings/sonarr/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    mount_baseline(&server).await;

    let mut config = instance(&server);
    config.settings.sonarr = Some(ServiceCollection {
        delete_unmanaged: true,
        definitions: IndexMap::new(),
    });

    let cache = Mutex::new(SecretsCache::default());
    let outcome = run_instance(
        "main",
        &config,
        RunMode::Apply,
        &options(),
        &cache,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let pruned = outcome.pruned.unwrap();
    assert_eq!(pruned.deleted, vec!["sonarr[\"Extra\"]"]);
    assert_eq!(pruned.failed.len(), 1);
    assert_eq!(pruned.failed[0].0, "sonarr[\"Anime\"]");
    assert!(pruned.skipped.is_empty());
}

#[tokio::test]
async fn dependent_instances_skip_when_a_prerequisite_fails() {
    let server = MockServer::start().await;
    mount_baseline(&server).await;

    // Nothing listens on port 1; the connect attempt fails fast.
    let mut broken = instance(&server);
    broken.hostname = "127.0.0.1".into();
    broken.port = 1;

    let mut dependent = instance(&server);
    dependent.depends_on = vec!["broken".into()];

    let instances = IndexMap::from([
        ("broken".to_owned(), broken),
        ("dependent".to_owned(), dependent),
    ]);

    let cache = Arc::new(Mutex::new(SecretsCache::default()));
    let results = run(
        &instances,
        RunMode::Plan,
        &options(),
        cache,
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(
        results["broken"],
        Err(CoreError::Connection { .. })
    ));
    assert!(matches!(
        results["dependent"],
        Err(CoreError::DependencyFailed { ref dependency }) if dependency == "broken"
    ));
}
