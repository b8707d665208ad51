//! First-time setup.
//!
//! A fresh instance exposes nothing but the public settings until the
//! setup wizard has run. The driver performs the same steps the wizard
//! does: authenticate the media server (the setup session rides on a
//! cookie), sync and enable libraries, then finalize. Finalization
//! flips `initialized`; the leading re-check makes the whole operation
//! a no-op on an instance that is already initialized.

use secrecy::ExposeSecret;
use tracing::info;

use seerrsync_api::SeerrClient;
use seerrsync_api::types::MediaServerAuth;

use crate::error::CoreError;
use crate::model::InstanceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// First-time setup ran to completion.
    Initialized,
    /// The instance was already initialized; nothing was done.
    AlreadyInitialized,
}

/// Run first-time setup if the instance still needs it.
pub async fn initialize(
    client: &SeerrClient,
    config: &InstanceConfig,
) -> Result<InitOutcome, CoreError> {
    let public = client
        .public_settings()
        .await
        .map_err(CoreError::from_api)?;
    if public.initialized {
        return Ok(InitOutcome::AlreadyInitialized);
    }

    let media_server = config
        .settings
        .media_server
        .as_ref()
        .ok_or_else(|| missing("settings.media_server"))?;
    let server_url = media_server
        .server_url
        .as_deref()
        .ok_or_else(|| missing("settings.media_server.server_url"))?;
    let username = media_server
        .username
        .as_deref()
        .ok_or_else(|| missing("settings.media_server.username"))?;
    let password = media_server
        .password
        .as_ref()
        .ok_or_else(|| missing("settings.media_server.password"))?;
    let email = media_server
        .email_address
        .as_deref()
        .ok_or_else(|| missing("settings.media_server.email_address"))?;

    info!(server = %server_url, "running first-time setup");
    client
        .auth_media_server(&MediaServerAuth {
            username: username.to_owned(),
            password: password.expose_secret().to_owned(),
            hostname: server_url.to_owned(),
            email: email.to_owned(),
        })
        .await
        .map_err(CoreError::from_api)?;

    let libraries = client.sync_libraries().await.map_err(CoreError::from_api)?;
    if !media_server.libraries.is_empty() {
        let mut ids = Vec::with_capacity(media_server.libraries.len());
        for name in &media_server.libraries {
            let id = libraries
                .iter()
                .find(|l| &l.name == name)
                .map(|l| l.id.clone())
                .ok_or_else(|| CoreError::Validation {
                    field: "settings.media_server.libraries".into(),
                    reason: format!("the media server has no library named \"{name}\""),
                })?;
            ids.push(id);
        }
        client
            .enable_libraries(&ids)
            .await
            .map_err(CoreError::from_api)?;
    }

    client
        .finalize_initialization()
        .await
        .map_err(CoreError::from_api)?;
    info!("first-time setup complete");

    Ok(InitOutcome::Initialized)
}

fn missing(field: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_owned(),
        reason: "required for first-time setup of an uninitialized instance".into(),
    }
}
