//! The mixin pipeline.
//!
//! A [`ViewMixin`] is one stage of a view's behavior. Every hook has a
//! pass-through default, so a stage only overrides what it changes. A
//! [`MixinStack`] runs the stages of one view in declared order:
//!
//! - `before_dispatch` runs forward; the first stage returning a response
//!   short-circuits the view. `after_dispatch` then runs in reverse over the
//!   stages whose `before_dispatch` ran (the same onion model as middleware).
//! - `get_queryset` and `get_context_data` are folded forward, each stage
//!   receiving the result of the previous one.
//! - `render_to_response`, `form_valid` and `form_invalid` are answered by
//!   the first stage that returns a response; otherwise the view's base
//!   behavior runs.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use viewkit_core::ViewResult;
use viewkit_db::{ModelMeta, QuerySet, Record};
use viewkit_http::{HttpRequest, HttpResponse};

use crate::views::FormErrors;

/// Template context passed between stages.
pub type Context = HashMap<String, serde_json::Value>;

/// A composable stage of view behavior.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use viewkit_http::{HttpRequest, HttpResponse};
/// use viewkit_views::ViewMixin;
///
/// struct PoweredBy;
///
/// #[async_trait]
/// impl ViewMixin for PoweredBy {
///     async fn after_dispatch(&self, _request: &HttpRequest, response: HttpResponse) -> HttpResponse {
///         response.set_header(
///             http::header::HeaderName::from_static("x-powered-by"),
///             http::HeaderValue::from_static("viewkit"),
///         )
///     }
/// }
/// ```
#[async_trait]
pub trait ViewMixin: Send + Sync {
    /// A short name used in log records.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Runs before the view handles the request. Returning a response skips
    /// the view and the remaining stages.
    async fn before_dispatch(&self, _request: &HttpRequest) -> Option<HttpResponse> {
        None
    }

    /// Post-processes the response leaving the view.
    async fn after_dispatch(&self, _request: &HttpRequest, response: HttpResponse) -> HttpResponse {
        response
    }

    /// Refines the queryset a list view evaluates.
    async fn get_queryset(&self, _request: &HttpRequest, queryset: QuerySet) -> ViewResult<QuerySet> {
        Ok(queryset)
    }

    /// Adds to the template context. `queryset` is the refined queryset for
    /// list views and `None` for form views.
    async fn get_context_data(
        &self,
        _request: &HttpRequest,
        context: Context,
        _queryset: Option<&QuerySet>,
    ) -> ViewResult<Context> {
        Ok(context)
    }

    /// Optionally replaces the rendered response of a list view.
    async fn render_to_response(
        &self,
        _request: &HttpRequest,
        _model: &ModelMeta,
        _objects: &[Record],
        _context: &Context,
    ) -> ViewResult<Option<HttpResponse>> {
        Ok(None)
    }

    /// Optionally replaces the response to a valid form submission.
    async fn form_valid(
        &self,
        _request: &HttpRequest,
        _model: &ModelMeta,
        _object: &Record,
    ) -> Option<HttpResponse> {
        None
    }

    /// Optionally replaces the response to an invalid form submission.
    async fn form_invalid(&self, _request: &HttpRequest, _errors: &FormErrors) -> Option<HttpResponse> {
        None
    }
}

/// The ordered stages of one view.
#[derive(Clone, Default)]
pub struct MixinStack {
    stages: Vec<Arc<dyn ViewMixin>>,
}

impl std::fmt::Debug for MixinStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl MixinStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    pub fn push(&mut self, stage: impl ViewMixin + 'static) {
        self.stages.push(Arc::new(stage));
    }

    /// Appends a stage, returning the stack for chaining.
    #[must_use]
    pub fn with(mut self, stage: impl ViewMixin + 'static) -> Self {
        self.push(stage);
        self
    }

    /// Returns the number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the stack has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the stage names in declared order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs the dispatch hooks around `handler`.
    pub async fn dispatch<F, Fut>(&self, request: &HttpRequest, handler: F) -> HttpResponse
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = HttpResponse> + Send,
    {
        let mut ran = 0;
        let mut short_circuit = None;
        for stage in &self.stages {
            ran += 1;
            if let Some(response) = stage.before_dispatch(request).await {
                tracing::debug!(stage = stage.name(), "dispatch short-circuited");
                short_circuit = Some(response);
                break;
            }
        }

        let mut response = match short_circuit {
            Some(response) => response,
            None => handler().await,
        };
        for stage in self.stages[..ran].iter().rev() {
            response = stage.after_dispatch(request, response).await;
        }
        response
    }

    /// Folds the queryset hooks.
    pub async fn get_queryset(&self, request: &HttpRequest, mut queryset: QuerySet) -> ViewResult<QuerySet> {
        for stage in &self.stages {
            queryset = stage.get_queryset(request, queryset).await?;
        }
        Ok(queryset)
    }

    /// Folds the context hooks.
    pub async fn get_context_data(
        &self,
        request: &HttpRequest,
        mut context: Context,
        queryset: Option<&QuerySet>,
    ) -> ViewResult<Context> {
        for stage in &self.stages {
            context = stage.get_context_data(request, context, queryset).await?;
        }
        Ok(context)
    }

    /// Returns the first response a stage renders, if any.
    pub async fn render_to_response(
        &self,
        request: &HttpRequest,
        model: &ModelMeta,
        objects: &[Record],
        context: &Context,
    ) -> ViewResult<Option<HttpResponse>> {
        for stage in &self.stages {
            if let Some(response) = stage.render_to_response(request, model, objects, context).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }

    /// Returns the first response a stage gives for a valid form.
    pub async fn form_valid(
        &self,
        request: &HttpRequest,
        model: &ModelMeta,
        object: &Record,
    ) -> Option<HttpResponse> {
        for stage in &self.stages {
            if let Some(response) = stage.form_valid(request, model, object).await {
                return Some(response);
            }
        }
        None
    }

    /// Returns the first response a stage gives for an invalid form.
    pub async fn form_invalid(&self, request: &HttpRequest, errors: &FormErrors) -> Option<HttpResponse> {
        for stage in &self.stages {
            if let Some(response) = stage.form_invalid(request, errors).await {
                return Some(response);
            }
        }
        None
    }
}
