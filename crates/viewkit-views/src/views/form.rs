//! A view that validates a submitted form.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use viewkit_core::logging::request_span;
use viewkit_core::ViewResult;
use viewkit_db::{ModelMeta, Record};
use viewkit_http::{HttpRequest, HttpResponse, HttpResponseRedirect, QueryDict};

use super::class_based::View;
use super::{error_response, render_fallback};
use crate::mixin::{Context, MixinStack, ViewMixin};

/// Validation errors keyed by field name. Errors not tied to a field use
/// the `__all__` key.
pub type FormErrors = BTreeMap<String, Vec<String>>;

/// Validates submitted data into the object it describes.
pub type Validator = Box<dyn Fn(&QueryDict) -> Result<Record, FormErrors> + Send + Sync>;

/// Displays and processes a form. Equivalent to Django's `FormView`.
///
/// `GET` renders the empty form. `POST` runs the validator over the
/// submitted data; a valid submission goes through the `form_valid` hooks
/// and otherwise redirects to the success URL, an invalid one goes through
/// the `form_invalid` hooks and otherwise re-renders the form with its
/// errors.
pub struct FormView {
    model: Arc<ModelMeta>,
    validator: Validator,
    success_url: String,
    template_name: String,
    mixins: MixinStack,
}

impl FormView {
    /// Creates a form view for `model`.
    pub fn new(
        model: Arc<ModelMeta>,
        success_url: impl Into<String>,
        validator: impl Fn(&QueryDict) -> Result<Record, FormErrors> + Send + Sync + 'static,
    ) -> Self {
        let template_name = format!("{}_form.html", model.model_name());
        Self {
            model,
            validator: Box::new(validator),
            success_url: success_url.into(),
            template_name,
            mixins: MixinStack::new(),
        }
    }

    /// Appends a mixin stage.
    #[must_use]
    pub fn with_mixin(mut self, stage: impl ViewMixin + 'static) -> Self {
        self.mixins.push(stage);
        self
    }

    /// Overrides the template name.
    #[must_use]
    pub fn with_template(mut self, template_name: impl Into<String>) -> Self {
        self.template_name = template_name.into();
        self
    }

    /// Returns the bound model.
    pub fn model(&self) -> &ModelMeta {
        &self.model
    }

    /// Returns the URL a valid submission redirects to.
    pub fn success_url(&self) -> &str {
        &self.success_url
    }

    /// Returns the template name.
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Returns the template context for the form.
    pub async fn get_context_data(
        &self,
        request: &HttpRequest,
        data: &QueryDict,
        errors: &FormErrors,
    ) -> ViewResult<Context> {
        let data: BTreeMap<&str, &str> = data.iter().collect();
        let mut context = Context::new();
        context.insert(
            "form".to_string(),
            serde_json::json!({
                "fields": self.model.field_names(),
                "data": data,
                "errors": errors,
            }),
        );
        context.insert(
            "model_name".to_string(),
            serde_json::Value::String(self.model.model_name().to_string()),
        );
        self.mixins.get_context_data(request, context, None).await
    }

    async fn render_form(&self, request: &HttpRequest, data: &QueryDict, errors: &FormErrors) -> HttpResponse {
        match self.get_context_data(request, data, errors).await {
            Ok(context) => render_fallback(&self.template_name, &context),
            Err(error) => error_response("FormView", &error),
        }
    }

    /// Handles a valid submission.
    pub async fn form_valid(&self, request: &HttpRequest, object: &Record) -> HttpResponse {
        if let Some(response) = self.mixins.form_valid(request, &self.model, object).await {
            return response;
        }
        HttpResponseRedirect::new(&self.success_url)
    }

    /// Handles an invalid submission.
    pub async fn form_invalid(&self, request: &HttpRequest, errors: &FormErrors) -> HttpResponse {
        if let Some(response) = self.mixins.form_invalid(request, errors).await {
            return response;
        }
        self.render_form(request, request.post(), errors).await
    }

    async fn process(&self, request: &HttpRequest) -> HttpResponse {
        match (self.validator)(request.post()) {
            Ok(object) => {
                tracing::debug!(model = self.model.model_name(), "form valid");
                self.form_valid(request, &object).await
            }
            Err(errors) => {
                tracing::debug!(
                    model = self.model.model_name(),
                    fields = errors.len(),
                    "form invalid"
                );
                self.form_invalid(request, &errors).await
            }
        }
    }
}

#[async_trait]
impl View for FormView {
    fn allowed_methods(&self) -> Vec<http::Method> {
        vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::HEAD,
            http::Method::OPTIONS,
        ]
    }

    async fn get(&self, request: HttpRequest) -> HttpResponse {
        let span = request_span("FormView", request.path());
        let (data, errors) = (QueryDict::new(), FormErrors::new());
        async {
            self.mixins
                .dispatch(&request, || self.render_form(&request, &data, &errors))
                .await
        }
        .instrument(span)
        .await
    }

    async fn post(&self, request: HttpRequest) -> HttpResponse {
        let span = request_span("FormView", request.path());
        async { self.mixins.dispatch(&request, || self.process(&request)).await }
            .instrument(span)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use viewkit_db::{FieldDef, FieldType};

    fn author_view() -> FormView {
        let model = Arc::new(
            ModelMeta::new("Author")
                .field(FieldDef::new("id", FieldType::AutoField).primary_key())
                .field(FieldDef::new("name", FieldType::CharField)),
        );
        FormView::new(model, "/authors/", |data: &QueryDict| {
            match data.get("name").filter(|name| !name.is_empty()) {
                Some(name) => Ok(Record::new().with("id", 7_i64).with("name", name)),
                None => Err(FormErrors::from([(
                    "name".to_string(),
                    vec!["This field is required.".to_string()],
                )])),
            }
        })
    }

    #[tokio::test]
    async fn test_get_renders_empty_form() {
        let response = author_view().dispatch(HttpRequest::builder().build()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.text().starts_with("<!-- Template: author_form.html -->"));
    }

    #[tokio::test]
    async fn test_valid_post_redirects() {
        let request = HttpRequest::builder()
            .method(http::Method::POST)
            .form("name=Bob")
            .build();
        let response = author_view().dispatch(request).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(http::header::LOCATION).unwrap(),
            "/authors/"
        );
    }

    #[tokio::test]
    async fn test_invalid_post_rerenders_with_errors() {
        let request = HttpRequest::builder()
            .method(http::Method::POST)
            .form("name=")
            .build();
        let response = author_view().dispatch(request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.text().contains("This field is required."));
    }

    #[tokio::test]
    async fn test_put_not_allowed() {
        let request = HttpRequest::builder().method(http::Method::PUT).build();
        let response = author_view().dispatch(request).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(http::header::ALLOW).unwrap(),
            "GET, POST, HEAD, OPTIONS"
        );
    }
}
