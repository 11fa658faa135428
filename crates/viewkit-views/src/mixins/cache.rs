//! Cache disabling.

use async_trait::async_trait;
use http::header::{CACHE_CONTROL, EXPIRES};
use http::HeaderValue;

use viewkit_http::{HttpRequest, HttpResponse};

use crate::mixin::ViewMixin;

/// The `Cache-Control` value of an uncacheable response.
pub const NEVER_CACHE_CONTROL: &str = "max-age=0, no-cache, no-store, must-revalidate, private";

/// Marks every response leaving the view as uncacheable.
///
/// Place it before access guards in the stack so short-circuited responses
/// are covered too.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCache;

/// Formats the current time as an HTTP date.
fn http_date_now() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[async_trait]
impl ViewMixin for NeverCache {
    fn name(&self) -> &'static str {
        "NeverCache"
    }

    async fn after_dispatch(&self, _request: &HttpRequest, mut response: HttpResponse) -> HttpResponse {
        let headers = response.headers_mut();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(NEVER_CACHE_CONTROL));
        if !headers.contains_key(EXPIRES) {
            if let Ok(value) = HeaderValue::from_str(&http_date_now()) {
                headers.insert(EXPIRES, value);
            }
        }
        response
    }
}
