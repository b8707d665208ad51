//! User-permission flag set.
//!
//! The remote stores default user permissions as a single bitfield;
//! desired state names them individually. Some permissions are group
//! permissions that imply their children (e.g. `request` implies
//! `request-movie` and `request-series`), so decoding collapses child
//! flags into the group flag when the group bit is set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    Admin,
    ManageSettings,
    ManageUsers,
    ManageRequests,
    Request,
    Vote,
    AutoApprove,
    AutoApproveMovie,
    AutoApproveSeries,
    // kebab-case keeps digits attached to the preceding word; the
    // documented names hyphenate `4k`.
    #[serde(rename = "request-4k")]
    Request4k,
    #[serde(rename = "request-4k-movie")]
    Request4kMovie,
    #[serde(rename = "request-4k-series")]
    Request4kSeries,
    RequestAdvanced,
    RequestView,
    #[serde(rename = "auto-approve-4k")]
    AutoApprove4k,
    #[serde(rename = "auto-approve-4k-movie")]
    AutoApprove4kMovie,
    #[serde(rename = "auto-approve-4k-series")]
    AutoApprove4kSeries,
    RequestMovie,
    RequestSeries,
    ManageIssues,
    ViewIssues,
    CreateIssues,
    AutoRequest,
    AutoRequestMovie,
    AutoRequestSeries,
    RecentView,
    WatchlistView,
}

impl Permission {
    /// The remote bit value for this permission.
    pub fn bit(self) -> u32 {
        match self {
            Self::Admin => 2,
            Self::ManageSettings => 4,
            Self::ManageUsers => 8,
            Self::ManageRequests => 16,
            Self::Request => 32,
            Self::Vote => 64,
            Self::AutoApprove => 128,
            Self::AutoApproveMovie => 256,
            Self::AutoApproveSeries => 512,
            Self::Request4k => 1024,
            Self::Request4kMovie => 2048,
            Self::Request4kSeries => 4096,
            Self::RequestAdvanced => 8192,
            Self::RequestView => 16384,
            Self::AutoApprove4k => 32768,
            Self::AutoApprove4kMovie => 65536,
            Self::AutoApprove4kSeries => 131_072,
            Self::RequestMovie => 262_144,
            Self::RequestSeries => 524_288,
            Self::ManageIssues => 1_048_576,
            Self::ViewIssues => 2_097_152,
            Self::CreateIssues => 4_194_304,
            Self::AutoRequest => 8_388_608,
            Self::AutoRequestMovie => 16_777_216,
            Self::AutoRequestSeries => 33_554_432,
            Self::RecentView => 67_108_864,
            Self::WatchlistView => 134_217_728,
        }
    }

    fn is_set(self, encoded: u32) -> bool {
        encoded & self.bit() != 0
    }

    /// Group permissions and the child permissions they imply.
    const GROUPS: &'static [(Permission, &'static [Permission])] = &[
        (
            Self::ManageRequests,
            &[
                Self::RequestAdvanced,
                Self::RequestView,
                Self::RecentView,
                Self::WatchlistView,
            ],
        ),
        (
            Self::ManageIssues,
            &[Self::CreateIssues, Self::ViewIssues],
        ),
        (Self::Request, &[Self::RequestMovie, Self::RequestSeries]),
        (
            Self::Request4k,
            &[Self::Request4kMovie, Self::Request4kSeries],
        ),
        (
            Self::AutoApprove,
            &[Self::AutoApproveMovie, Self::AutoApproveSeries],
        ),
        (
            Self::AutoApprove4k,
            &[Self::AutoApprove4kMovie, Self::AutoApprove4kSeries],
        ),
        (
            Self::AutoRequest,
            &[Self::AutoRequestMovie, Self::AutoRequestSeries],
        ),
    ];

    /// Decode a remote bitfield into a canonical permission set.
    ///
    /// `admin` subsumes everything; a set group flag subsumes its
    /// children.
    pub fn set_decode(encoded: u32) -> BTreeSet<Permission> {
        let mut set = BTreeSet::new();
        if encoded == 0 {
            return set;
        }
        if Self::Admin.is_set(encoded) {
            set.insert(Self::Admin);
            return set;
        }

        for flat in [Self::ManageSettings, Self::ManageUsers, Self::Vote] {
            if flat.is_set(encoded) {
                set.insert(flat);
            }
        }

        for &(group, children) in Self::GROUPS {
            if group.is_set(encoded) {
                set.insert(group);
            } else {
                for &child in children {
                    if child.is_set(encoded) {
                        set.insert(child);
                    }
                }
            }
        }

        set
    }

    /// Encode a permission set into the remote bitfield.
    pub fn set_encode<'a, I: IntoIterator<Item = &'a Permission>>(permissions: I) -> u32 {
        permissions.into_iter().fold(0, |acc, p| acc | p.bit())
    }

    /// Canonicalize a set: encode then decode, collapsing redundant
    /// child flags so equivalent configurations compare equal.
    pub fn set_reduce<'a, I: IntoIterator<Item = &'a Permission>>(
        permissions: I,
    ) -> BTreeSet<Permission> {
        Self::set_decode(Self::set_encode(permissions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn admin_subsumes_everything() {
        let encoded = Permission::Admin.bit() | Permission::Request.bit();
        assert_eq!(
            Permission::set_decode(encoded),
            BTreeSet::from([Permission::Admin])
        );
    }

    #[test]
    fn group_flag_collapses_children() {
        let encoded = Permission::Request.bit()
            | Permission::RequestMovie.bit()
            | Permission::RequestSeries.bit();
        assert_eq!(
            Permission::set_decode(encoded),
            BTreeSet::from([Permission::Request])
        );
    }

    #[test]
    fn children_survive_without_group() {
        let encoded = Permission::RequestMovie.bit() | Permission::ViewIssues.bit();
        assert_eq!(
            Permission::set_decode(encoded),
            BTreeSet::from([Permission::ViewIssues, Permission::RequestMovie])
        );
    }

    #[test]
    fn encode_decode_is_stable() {
        let set = BTreeSet::from([Permission::Request, Permission::Request4k]);
        let reduced = Permission::set_reduce(&set);
        assert_eq!(set, reduced);
        assert_eq!(
            Permission::set_encode(&reduced),
            Permission::Request.bit() | Permission::Request4k.bit()
        );
    }

    #[test]
    fn zero_decodes_to_empty() {
        assert!(Permission::set_decode(0).is_empty());
    }

    #[test]
    fn four_k_names_are_hyphenated() {
        for (permission, name) in [
            (Permission::Request4k, "request-4k"),
            (Permission::Request4kMovie, "request-4k-movie"),
            (Permission::Request4kSeries, "request-4k-series"),
            (Permission::AutoApprove4k, "auto-approve-4k"),
            (Permission::AutoApprove4kMovie, "auto-approve-4k-movie"),
            (Permission::AutoApprove4kSeries, "auto-approve-4k-series"),
        ] {
            assert_eq!(serde_json::to_value(permission).unwrap(), name);
            assert_eq!(
                serde_json::from_value::<Permission>(name.into()).unwrap(),
                permission
            );
        }
    }
}
