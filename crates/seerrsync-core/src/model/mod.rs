//! Domain model: the desired-state tree, remote snapshots, and the
//! flag sets both sides encode as bitfields.

pub mod desired;
pub mod notification_types;
pub mod permissions;
pub mod snapshot;

pub use desired::{
    ChannelKind, DiscordChannel, EmailChannel, EmailEncryptionMethod, GeneralSettings,
    GotifyChannel, InstanceConfig, InstanceSettings, MediaServerConfig, MinimumAvailability,
    NotificationSettings, Protocol, PushbulletChannel, PushoverChannel, RadarrDefinition,
    ResourceRef, ServiceCollection, SlackChannel, SonarrDefinition, TelegramChannel, UserSettings,
    WebhookChannel, WebpushChannel,
};
pub use notification_types::NotificationType;
pub use permissions::Permission;
pub use snapshot::Snapshot;
