//! Async HTTP client for the Jellyseerr REST API.
//!
//! Thin, typed wrapper over `/api/v1/`: status and public-settings
//! probes, settings-group fetch/replace, the first-time-setup flow, and
//! list/create/update/delete for the linked Sonarr/Radarr service
//! collections. All higher-level reconciliation logic lives in
//! `seerrsync-core`; this crate only speaks the wire protocol.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::SeerrClient;
pub use error::ApiError;
pub use transport::TransportConfig;
