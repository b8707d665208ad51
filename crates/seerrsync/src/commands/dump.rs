//! `dump-config`: capture a running instance's settings as a
//! ready-to-edit configuration document.

use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Serialize;

use seerrsync_api::{SeerrClient, TransportConfig};
use seerrsync_core::model::Protocol;
use seerrsync_core::{
    CoreError, InstanceSettings, RemoteState, RetryPolicy, fetch_state, snapshot_to_settings,
};

use crate::cli::{DumpArgs, GlobalOpts};
use crate::error::CliError;

/// Emitted document; mirrors the on-disk configuration layout.
#[derive(Debug, Serialize)]
struct DumpDocument {
    instances: IndexMap<String, DumpedInstance>,
}

#[derive(Debug, Serialize)]
struct DumpedInstance {
    hostname: String,
    port: u16,
    protocol: Protocol,
    #[serde(skip_serializing_if = "Option::is_none")]
    url_base: Option<String>,
    api_key: String,
    settings: InstanceSettings,
}

pub async fn handle(args: &DumpArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (hostname, port, protocol, url_base) = split_url(&args.url)?;

    let transport = TransportConfig {
        timeout: Duration::from_secs(global.timeout),
        danger_accept_invalid_certs: args.insecure,
    };
    let api_key = SecretString::from(args.api_key.clone());
    let client =
        SeerrClient::from_api_key(&args.url, &api_key, &transport).map_err(|err| {
            CliError::Instance {
                url: args.url.clone(),
                source: CoreError::from_api(err),
            }
        })?;

    let retry = RetryPolicy {
        retries: global.retries,
        ..RetryPolicy::default()
    };
    let snapshot = match fetch_state(&client, &retry)
        .await
        .map_err(|source| CliError::Instance {
            url: args.url.clone(),
            source,
        })? {
        RemoteState::Ready(snapshot) => snapshot,
        RemoteState::Uninitialized => {
            return Err(CliError::NotInitialized {
                url: args.url.clone(),
            });
        }
    };

    let document = DumpDocument {
        instances: IndexMap::from([(
            args.name.clone(),
            DumpedInstance {
                hostname,
                port,
                protocol,
                url_base,
                api_key: args.api_key.clone(),
                settings: snapshot_to_settings(&snapshot),
            },
        )]),
    };

    let yaml = serde_yaml::to_string(&document)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
    print!("{yaml}");

    Ok(())
}

/// Break an instance URL into the configuration fields it maps to.
fn split_url(raw: &str) -> Result<(String, u16, Protocol, Option<String>), CliError> {
    let invalid = || CliError::InvalidUrl {
        url: raw.to_owned(),
    };

    let parsed = url::Url::parse(raw).map_err(|_| invalid())?;
    let protocol = match parsed.scheme() {
        "http" => Protocol::Http,
        "https" => Protocol::Https,
        _ => return Err(invalid()),
    };
    let hostname = parsed.host_str().ok_or_else(invalid)?.to_owned();
    let port = parsed.port_or_known_default().ok_or_else(invalid)?;
    let url_base = match parsed.path().trim_matches('/') {
        "" => None,
        path => Some(format!("/{path}")),
    };

    Ok((hostname, port, protocol, url_base))
}
