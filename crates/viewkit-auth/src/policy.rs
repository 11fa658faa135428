//! Access policies for guarded views.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// Who may access a guarded view.
///
/// Inactive users satisfy no policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// Superusers only.
    SuperuserOnly,
    /// Staff members and superusers.
    StaffOnly,
    /// Any logged-in user.
    AuthenticatedOnly,
}

impl AccessPolicy {
    /// Returns `true` if `user` may access the view.
    pub const fn is_authorized(self, user: &User) -> bool {
        if !user.is_authenticated || !user.is_active {
            return false;
        }
        match self {
            Self::SuperuserOnly => user.is_superuser,
            Self::StaffOnly => user.is_staff || user.is_superuser,
            Self::AuthenticatedOnly => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AccessPolicy; 3] = [
        AccessPolicy::SuperuserOnly,
        AccessPolicy::StaffOnly,
        AccessPolicy::AuthenticatedOnly,
    ];

    #[test]
    fn test_superuser_passes_every_policy() {
        let user = User::authenticated("root").superuser();
        assert!(ALL.iter().all(|policy| policy.is_authorized(&user)));
    }

    #[test]
    fn test_anonymous_fails_every_policy() {
        let user = User::anonymous();
        assert!(!ALL.iter().any(|policy| policy.is_authorized(&user)));
    }

    #[test]
    fn test_inactive_fails_every_policy() {
        let user = User::authenticated("root").superuser().staff().inactive();
        assert!(!ALL.iter().any(|policy| policy.is_authorized(&user)));
    }

    #[test]
    fn test_staff() {
        let staff = User::authenticated("sam").staff();
        assert!(AccessPolicy::StaffOnly.is_authorized(&staff));
        assert!(!AccessPolicy::SuperuserOnly.is_authorized(&staff));

        let plain = User::authenticated("pat");
        assert!(!AccessPolicy::StaffOnly.is_authorized(&plain));
        assert!(AccessPolicy::AuthenticatedOnly.is_authorized(&plain));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&AccessPolicy::StaffOnly).unwrap(),
            "\"staff_only\""
        );
    }
}
