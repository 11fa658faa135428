//! A view listing the objects of a queryset.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use viewkit_core::logging::request_span;
use viewkit_core::{ViewError, ViewResult};
use viewkit_db::{ModelMeta, ObjectStore, QuerySet, Record};
use viewkit_http::{HttpRequest, HttpResponse};

use super::class_based::View;
use super::{error_response, render_fallback};
use crate::mixin::{Context, MixinStack, ViewMixin};

/// Displays the objects of a queryset. Equivalent to Django's `ListView`.
///
/// A `GET` runs the dispatch hooks around: the queryset hooks, evaluation,
/// the context hooks (seeded with `object_list` and `model_name`), then the
/// render hooks. When no stage renders, the template fallback does.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use viewkit_db::{FieldDef, FieldType, InMemoryStore, ModelMeta, QuerySet};
/// use viewkit_views::{ExtraContext, ListView};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = Arc::new(InMemoryStore::new());
/// store.register(
///     ModelMeta::new("Book").field(FieldDef::new("id", FieldType::AutoField).primary_key()),
/// ).await;
///
/// let view = ListView::for_model(store, "book")
///     .await
///     .unwrap()
///     .with_mixin(ExtraContext::new().with("title", "All books"));
/// assert_eq!(view.template_name(), "book_list.html");
/// # }
/// ```
pub struct ListView {
    model: Arc<ModelMeta>,
    queryset: QuerySet,
    template_name: String,
    mixins: MixinStack,
}

impl ListView {
    /// Creates a list view over `queryset`.
    pub fn new(queryset: QuerySet) -> Self {
        let model = queryset.model_arc();
        let template_name = format!("{}_list.html", model.model_name());
        Self {
            model,
            queryset,
            template_name,
            mixins: MixinStack::new(),
        }
    }

    /// Creates a list view over every object of a registered model.
    pub async fn for_model(store: Arc<dyn ObjectStore>, model_name: &str) -> ViewResult<Self> {
        Ok(Self::new(QuerySet::for_model(store, model_name).await?))
    }

    /// Appends a mixin stage.
    #[must_use]
    pub fn with_mixin(mut self, stage: impl ViewMixin + 'static) -> Self {
        self.mixins.push(stage);
        self
    }

    /// Replaces the mixin stack.
    #[must_use]
    pub fn with_mixins(mut self, mixins: MixinStack) -> Self {
        self.mixins = mixins;
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

    /// Returns the template name.
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Returns the mixin stack.
    pub const fn mixins(&self) -> &MixinStack {
        &self.mixins
    }

    /// Returns the queryset for this request after every stage refined it.
    pub async fn get_queryset(&self, request: &HttpRequest) -> ViewResult<QuerySet> {
        self.mixins.get_queryset(request, self.queryset.all()).await
    }

    /// Returns the template context for this request.
    pub async fn get_context_data(
        &self,
        request: &HttpRequest,
        queryset: &QuerySet,
        objects: &[Record],
    ) -> ViewResult<Context> {
        let mut context = Context::new();
        context.insert(
            "object_list".to_string(),
            serde_json::to_value(objects).map_err(ViewError::from)?,
        );
        context.insert(
            "model_name".to_string(),
            serde_json::Value::String(self.model.model_name().to_string()),
        );
        self.mixins
            .get_context_data(request, context, Some(queryset))
            .await
    }

    async fn list(&self, request: &HttpRequest) -> ViewResult<HttpResponse> {
        let queryset = self.get_queryset(request).await?;
        let objects = queryset.evaluate().await?;
        tracing::debug!(count = objects.len(), "evaluated object list");
        let context = self.get_context_data(request, &queryset, &objects).await?;
        if let Some(response) = self
            .mixins
            .render_to_response(request, &self.model, &objects, &context)
            .await?
        {
            return Ok(response);
        }
        Ok(render_fallback(&self.template_name, &context))
    }
}

#[async_trait]
impl View for ListView {
    async fn get(&self, request: HttpRequest) -> HttpResponse {
        let span = request_span("ListView", request.path());
        async {
            self.mixins
                .dispatch(&request, || async {
                    self.list(&request)
                        .await
                        .unwrap_or_else(|error| error_response("ListView", &error))
                })
                .await
        }
        .instrument(span)
        .await
    }
}
