//! Views.
//!
//! - [`class_based`] - The [`View`] trait: method dispatch and `as_view`
//! - [`list`] - [`ListView`], a queryset-backed list of objects
//! - [`form`] - [`FormView`], a validated form submission

pub mod class_based;
pub mod form;
pub mod list;

pub use class_based::{View, ViewFunction};
pub use form::{FormErrors, FormView, Validator};
pub use list::ListView;

use viewkit_core::ViewError;
use viewkit_http::HttpResponse;

use crate::mixin::Context;

/// Turns an error propagated out of a view's hooks into its response.
pub(crate) fn error_response(view: &str, error: &ViewError) -> HttpResponse {
    tracing::error!(view, status = error.status_code(), error = %error, "request failed");
    HttpResponse::from_error(error)
}

/// Renders a template name and its context as an HTML page. There is no
/// template engine; the context is dumped as JSON under a comment naming
/// the template.
pub(crate) fn render_fallback(template: &str, context: &Context) -> HttpResponse {
    let body = serde_json::to_string_pretty(context).unwrap_or_default();
    let html = format!("<!-- Template: {template} -->\n<html><body><pre>{body}</pre></body></html>");
    let mut response = HttpResponse::ok(html);
    response.set_content_type("text/html");
    response
}
