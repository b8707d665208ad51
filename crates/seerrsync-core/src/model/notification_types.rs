//! Notification-event flag set, stored as a bitfield on the remote.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// One notification-event type a channel can subscribe to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    MediaPending,
    MediaApproved,
    MediaAvailable,
    MediaFailed,
    TestNotification,
    MediaDeclined,
    MediaAutoApproved,
    IssueCreated,
    IssueComment,
    IssueResolved,
    IssueReopened,
    MediaAutoRequested,
}

impl NotificationType {
    pub fn bit(self) -> u32 {
        match self {
            Self::MediaPending => 2,
            Self::MediaApproved => 4,
            Self::MediaAvailable => 8,
            Self::MediaFailed => 16,
            Self::TestNotification => 32,
            Self::MediaDeclined => 64,
            Self::MediaAutoApproved => 128,
            Self::IssueCreated => 256,
            Self::IssueComment => 512,
            Self::IssueResolved => 1024,
            Self::IssueReopened => 2048,
            Self::MediaAutoRequested => 4096,
        }
    }

    /// Decode a remote bitfield into an event set.
    pub fn set_decode(encoded: u32) -> BTreeSet<NotificationType> {
        use strum::IntoEnumIterator;
        NotificationType::iter()
            .filter(|t| encoded & t.bit() != 0)
            .collect()
    }

    /// Encode an event set into the remote bitfield.
    pub fn set_encode<'a, I: IntoIterator<Item = &'a NotificationType>>(types: I) -> u32 {
        types.into_iter().fold(0, |acc, t| acc | t.bit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let set = BTreeSet::from([
            NotificationType::MediaApproved,
            NotificationType::IssueCreated,
        ]);
        let encoded = NotificationType::set_encode(&set);
        assert_eq!(encoded, 4 | 256);
        assert_eq!(NotificationType::set_decode(encoded), set);
    }
}
