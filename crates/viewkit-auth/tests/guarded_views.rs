//! Access guards in front of real views.

use std::sync::Arc;

use http::StatusCode;
use viewkit_auth::{AccessGuard, AccessPolicy, User};
use viewkit_core::Settings;
use viewkit_db::{FieldDef, FieldType, InMemoryStore, ModelMeta, Record};
use viewkit_http::HttpRequest;
use viewkit_views::{ListView, NeverCache, View};

async fn report_view(guard: AccessGuard) -> ListView {
    let store = Arc::new(InMemoryStore::new());
    store
        .register(
            ModelMeta::new("Report")
                .field(FieldDef::new("id", FieldType::AutoField).primary_key())
                .field(FieldDef::new("title", FieldType::CharField)),
        )
        .await;
    store
        .insert("report", Record::new().with("id", 1_i64).with("title", "Q3"))
        .await
        .unwrap();
    ListView::for_model(store, "report")
        .await
        .unwrap()
        .with_mixin(NeverCache)
        .with_mixin(guard)
}

fn request_as(user: &User) -> HttpRequest {
    user.apply(HttpRequest::builder().path("/reports/")).build()
}

#[tokio::test]
async fn anonymous_is_redirected_to_login() {
    let view = report_view(AccessGuard::login_required()).await;
    let response = view.dispatch(request_as(&User::anonymous())).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(http::header::LOCATION).unwrap(),
        "/accounts/login/?next=/reports/"
    );
}

#[tokio::test]
async fn non_staff_is_forbidden_from_staff_view() {
    let view = report_view(AccessGuard::staff_only()).await;
    let response = view.dispatch(request_as(&User::authenticated("pat"))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn superuser_passes_every_policy() {
    let admin = User::authenticated("root").superuser();
    for policy in [
        AccessPolicy::SuperuserOnly,
        AccessPolicy::StaffOnly,
        AccessPolicy::AuthenticatedOnly,
    ] {
        let view = report_view(AccessGuard::new(policy)).await;
        let response = view.dispatch(request_as(&admin)).await;
        assert_eq!(response.status(), StatusCode::OK, "{policy:?}");
        assert!(response.text().contains("Q3"));
    }
}

#[tokio::test]
async fn inactive_superuser_is_forbidden() {
    let view = report_view(AccessGuard::superuser_only()).await;
    let user = User::authenticated("root").superuser().inactive();
    let response = view.dispatch(request_as(&user)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn never_cache_covers_guarded_and_unguarded_responses() {
    let view = report_view(AccessGuard::staff_only()).await;
    let staff = User::authenticated("sam").staff();
    for user in [User::anonymous(), User::authenticated("pat"), staff] {
        let response = view.dispatch(request_as(&user)).await;
        assert_eq!(
            response.headers().get(http::header::CACHE_CONTROL).unwrap(),
            "max-age=0, no-cache, no-store, must-revalidate, private",
            "status {}",
            response.status()
        );
        assert!(response.headers().contains_key(http::header::EXPIRES));
    }
}

#[tokio::test]
async fn configured_login_url() {
    let settings = Settings {
        login_url: "/sso/".into(),
        ..Settings::default()
    };
    let view = report_view(AccessGuard::from_settings(AccessPolicy::AuthenticatedOnly, &settings)).await;
    let response = view.dispatch(request_as(&User::anonymous())).await;
    assert_eq!(
        response.headers().get(http::header::LOCATION).unwrap(),
        "/sso/?next=/reports/"
    );
}
