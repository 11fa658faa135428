//! JSON responses for form submissions made with `XMLHttpRequest`.

use async_trait::async_trait;
use http::StatusCode;

use viewkit_db::{ModelMeta, Record, Value};
use viewkit_http::{HttpRequest, HttpResponse, JsonResponse};

use crate::mixin::ViewMixin;
use crate::views::FormErrors;

/// Answers AJAX form submissions with JSON.
///
/// A valid AJAX submission gets `200` with `{"id": <pk>}`; an invalid one
/// gets `400` with the field error mapping. Requests without the
/// `X-Requested-With: XMLHttpRequest` header fall through to the form
/// view's normal responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct AjaxForm;

#[async_trait]
impl ViewMixin for AjaxForm {
    fn name(&self) -> &'static str {
        "AjaxForm"
    }

    async fn form_valid(
        &self,
        request: &HttpRequest,
        model: &ModelMeta,
        object: &Record,
    ) -> Option<HttpResponse> {
        if !request.is_ajax() {
            return None;
        }
        let pk = object.pk(model).cloned().unwrap_or(Value::Null);
        Some(JsonResponse::new(&serde_json::json!({ "id": pk })))
    }

    async fn form_invalid(&self, request: &HttpRequest, errors: &FormErrors) -> Option<HttpResponse> {
        request
            .is_ajax()
            .then(|| JsonResponse::with_status(StatusCode::BAD_REQUEST, errors))
    }
}
