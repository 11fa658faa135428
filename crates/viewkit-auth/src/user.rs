//! The current user, as recorded in request META.
//!
//! An upstream authentication layer describes the user with these META
//! keys; absent keys read as `false` (and `USER_IS_ACTIVE` as `true`):
//!
//! | key                  | meaning                              |
//! |----------------------|--------------------------------------|
//! | `USER_AUTHENTICATED` | the request carries a logged-in user |
//! | `USER_IS_ACTIVE`     | the account is enabled               |
//! | `USER_IS_STAFF`      | the user may access staff areas      |
//! | `USER_IS_SUPERUSER`  | the user has every permission        |
//! | `USER_USERNAME`      | the login name                       |

use serde::Serialize;
use viewkit_http::{HttpRequest, HttpRequestBuilder};

pub const META_USER_AUTHENTICATED: &str = "USER_AUTHENTICATED";
pub const META_USER_IS_ACTIVE: &str = "USER_IS_ACTIVE";
pub const META_USER_IS_STAFF: &str = "USER_IS_STAFF";
pub const META_USER_IS_SUPERUSER: &str = "USER_IS_SUPERUSER";
pub const META_USER_USERNAME: &str = "USER_USERNAME";

/// The user a request was made by.
///
/// # Examples
///
/// ```
/// use viewkit_auth::User;
/// use viewkit_http::HttpRequest;
///
/// let request = User::authenticated("alice")
///     .staff()
///     .apply(HttpRequest::builder())
///     .build();
///
/// let user = User::from_request(&request);
/// assert!(user.is_authenticated);
/// assert!(user.is_staff);
/// assert!(!user.is_superuser);
/// assert_eq!(user.username, "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub is_authenticated: bool,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Default for User {
    fn default() -> Self {
        Self::anonymous()
    }
}

fn flag(request: &HttpRequest, key: &str, default: bool) -> bool {
    request
        .meta()
        .get(key)
        .map_or(default, |v| matches!(v.as_str(), "true" | "True" | "1"))
}

impl User {
    /// Returns the anonymous user.
    pub const fn anonymous() -> Self {
        Self {
            username: String::new(),
            is_authenticated: false,
            is_active: false,
            is_staff: false,
            is_superuser: false,
        }
    }

    /// Returns an active, logged-in user with no elevated flags.
    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_authenticated: true,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    /// Marks the user as a staff member.
    #[must_use]
    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// Marks the user as a superuser.
    #[must_use]
    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }

    /// Marks the account as deactivated.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Reads the user from request META. A request without an
    /// authenticated user yields [`User::anonymous`].
    pub fn from_request(request: &HttpRequest) -> Self {
        if !flag(request, META_USER_AUTHENTICATED, false) {
            return Self::anonymous();
        }
        Self {
            username: request
                .meta()
                .get(META_USER_USERNAME)
                .cloned()
                .unwrap_or_default(),
            is_authenticated: true,
            is_active: flag(request, META_USER_IS_ACTIVE, true),
            is_staff: flag(request, META_USER_IS_STAFF, false),
            is_superuser: flag(request, META_USER_IS_SUPERUSER, false),
        }
    }

    /// Returns `true` for the anonymous user.
    pub const fn is_anonymous(&self) -> bool {
        !self.is_authenticated
    }

    /// Records this user in a request under construction.
    pub fn apply(&self, builder: HttpRequestBuilder) -> HttpRequestBuilder {
        builder
            .meta(META_USER_AUTHENTICATED, bool_str(self.is_authenticated))
            .meta(META_USER_IS_ACTIVE, bool_str(self.is_active))
            .meta(META_USER_IS_STAFF, bool_str(self.is_staff))
            .meta(META_USER_IS_SUPERUSER, bool_str(self.is_superuser))
            .meta(META_USER_USERNAME, &self.username)
    }

    /// Records this user in an existing request.
    pub fn login(&self, request: &mut HttpRequest) {
        let meta = request.meta_mut();
        for (key, value) in [
            (META_USER_AUTHENTICATED, bool_str(self.is_authenticated)),
            (META_USER_IS_ACTIVE, bool_str(self.is_active)),
            (META_USER_IS_STAFF, bool_str(self.is_staff)),
            (META_USER_IS_SUPERUSER, bool_str(self.is_superuser)),
        ] {
            meta.insert(key.to_string(), value.to_string());
        }
        meta.insert(META_USER_USERNAME.to_string(), self.username.clone());
    }
}

const fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_meta_is_anonymous() {
        let request = HttpRequest::builder().build();
        let user = User::from_request(&request);
        assert_eq!(user, User::anonymous());
        assert!(user.is_anonymous());
    }

    #[test]
    fn test_flags_read() {
        let request = HttpRequest::builder()
            .meta("USER_AUTHENTICATED", "true")
            .meta("USER_IS_SUPERUSER", "1")
            .meta("USER_USERNAME", "root")
            .build();
        let user = User::from_request(&request);
        assert!(user.is_authenticated);
        assert!(user.is_active);
        assert!(user.is_superuser);
        assert!(!user.is_staff);
        assert_eq!(user.username, "root");
    }

    #[test]
    fn test_flags_ignored_without_authentication() {
        let request = HttpRequest::builder()
            .meta("USER_AUTHENTICATED", "false")
            .meta("USER_IS_STAFF", "true")
            .build();
        assert!(!User::from_request(&request).is_staff);
    }

    #[test]
    fn test_login_round_trips() {
        let mut request = HttpRequest::builder().build();
        let user = User::authenticated("bob").staff().inactive();
        user.login(&mut request);
        assert_eq!(User::from_request(&request), user);
    }
}
