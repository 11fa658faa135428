//! The access guard mixin.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use viewkit_core::Settings;
use viewkit_http::{HttpRequest, HttpResponse, HttpResponseRedirect};
use viewkit_views::ViewMixin;

use crate::policy::AccessPolicy;
use crate::user::User;

/// Characters left unescaped in the redirect target.
const REDIRECT_TARGET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Rejects requests whose user does not satisfy a policy.
///
/// Anonymous users are redirected to the login page with the requested
/// path in the redirect field; authenticated users who fail the policy get
/// `403 Forbidden`. With [`raise_exception`](Self::raise_exception) set,
/// anonymous users get `403` too.
///
/// # Examples
///
/// ```
/// use viewkit_auth::{AccessGuard, AccessPolicy, User};
/// use viewkit_http::HttpRequest;
///
/// let guard = AccessGuard::new(AccessPolicy::StaffOnly);
///
/// let request = HttpRequest::builder().path("/reports/").build();
/// assert_eq!(
///     guard.login_redirect_url(&request),
///     "/accounts/login/?next=/reports/"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct AccessGuard {
    policy: AccessPolicy,
    login_url: String,
    redirect_field_name: String,
    raise_exception: bool,
}

impl AccessGuard {
    /// Creates a guard using the default login URL.
    pub fn new(policy: AccessPolicy) -> Self {
        Self::from_settings(policy, &Settings::default())
    }

    /// Creates a guard using the configured login URL and redirect field.
    pub fn from_settings(policy: AccessPolicy, settings: &Settings) -> Self {
        Self {
            policy,
            login_url: settings.login_url.clone(),
            redirect_field_name: settings.redirect_field_name.clone(),
            raise_exception: false,
        }
    }

    /// A guard admitting superusers only.
    pub fn superuser_only() -> Self {
        Self::new(AccessPolicy::SuperuserOnly)
    }

    /// A guard admitting staff members and superusers.
    pub fn staff_only() -> Self {
        Self::new(AccessPolicy::StaffOnly)
    }

    /// A guard admitting any logged-in user.
    pub fn login_required() -> Self {
        Self::new(AccessPolicy::AuthenticatedOnly)
    }

    /// Answers anonymous users with `403` instead of a login redirect.
    #[must_use]
    pub const fn raise_exception(mut self) -> Self {
        self.raise_exception = true;
        self
    }

    /// Returns the policy this guard enforces.
    pub const fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Returns the login URL carrying the request's full path.
    pub fn login_redirect_url(&self, request: &HttpRequest) -> String {
        let target = request.get_full_path();
        let separator = if self.login_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{separator}{}={}",
            self.login_url,
            self.redirect_field_name,
            utf8_percent_encode(&target, REDIRECT_TARGET)
        )
    }

    /// Returns the response rejecting `user`, or `None` if the user may
    /// proceed.
    pub fn check(&self, request: &HttpRequest, user: &User) -> Option<HttpResponse> {
        if self.policy.is_authorized(user) {
            tracing::debug!(policy = ?self.policy, user = %user.username, "access granted");
            return None;
        }
        if user.is_authenticated || self.raise_exception {
            tracing::debug!(
                policy = ?self.policy,
                user = %user.username,
                path = request.path(),
                "access denied"
            );
            return Some(HttpResponse::forbidden("Forbidden"));
        }
        tracing::debug!(policy = ?self.policy, path = request.path(), "redirecting to login");
        Some(HttpResponseRedirect::new(&self.login_redirect_url(request)))
    }
}

#[async_trait]
impl ViewMixin for AccessGuard {
    fn name(&self) -> &'static str {
        "AccessGuard"
    }

    async fn before_dispatch(&self, request: &HttpRequest) -> Option<HttpResponse> {
        self.check(request, &User::from_request(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn request_as(user: &User) -> HttpRequest {
        user.apply(HttpRequest::builder().path("/admin/").query_string("page=2"))
            .build()
    }

    #[test]
    fn test_anonymous_redirected_with_next() {
        let guard = AccessGuard::login_required();
        let response = guard.check(&request_as(&User::anonymous()), &User::anonymous()).unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(http::header::LOCATION).unwrap(),
            "/accounts/login/?next=/admin/%3Fpage%3D2"
        );
    }

    #[test]
    fn test_authenticated_without_rights_forbidden() {
        let user = User::authenticated("pat");
        let response = AccessGuard::staff_only().check(&request_as(&user), &user).unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_raise_exception_forbids_anonymous() {
        let guard = AccessGuard::superuser_only().raise_exception();
        let user = User::anonymous();
        let response = guard.check(&request_as(&user), &user).unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_configured_login_url() {
        let settings = Settings {
            login_url: "/sso/start?realm=staff".into(),
            redirect_field_name: "return_to".into(),
            ..Settings::default()
        };
        let guard = AccessGuard::from_settings(AccessPolicy::StaffOnly, &settings);
        let request = HttpRequest::builder().path("/reports/").build();
        assert_eq!(
            guard.login_redirect_url(&request),
            "/sso/start?realm=staff&return_to=/reports/"
        );
    }

    #[tokio::test]
    async fn test_hook_reads_request_user() {
        let guard = AccessGuard::superuser_only();
        let admin = User::authenticated("root").superuser();
        assert!(guard.before_dispatch(&request_as(&admin)).await.is_none());

        let staff = User::authenticated("sam").staff();
        let response = guard.before_dispatch(&request_as(&staff)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
