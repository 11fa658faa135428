//! Fixed extra template context.

use async_trait::async_trait;

use viewkit_core::ViewResult;
use viewkit_db::QuerySet;
use viewkit_http::HttpRequest;

use crate::mixin::{Context, ViewMixin};

/// Overlays a fixed mapping onto the template context. Keys already set by
/// earlier stages are overwritten.
#[derive(Debug, Clone, Default)]
pub struct ExtraContext {
    extra: Context,
}

impl ExtraContext {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry to the overlay.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns the overlay entries.
    pub const fn extra(&self) -> &Context {
        &self.extra
    }
}

impl From<Context> for ExtraContext {
    fn from(extra: Context) -> Self {
        Self { extra }
    }
}

#[async_trait]
impl ViewMixin for ExtraContext {
    fn name(&self) -> &'static str {
        "ExtraContext"
    }

    async fn get_context_data(
        &self,
        _request: &HttpRequest,
        mut context: Context,
        _queryset: Option<&QuerySet>,
    ) -> ViewResult<Context> {
        context.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_overlay_wins() {
        let stage = ExtraContext::new().with("title", "Books").with("count", 3);
        let mut context = Context::new();
        context.insert("title".into(), json!("Default"));
        context.insert("object_list".into(), json!([]));

        let request = HttpRequest::builder().build();
        let context = stage.get_context_data(&request, context, None).await.unwrap();
        assert_eq!(context["title"], json!("Books"));
        assert_eq!(context["count"], json!(3));
        assert_eq!(context["object_list"], json!([]));
    }

    #[tokio::test]
    async fn test_empty_overlay_is_identity() {
        let mut context = Context::new();
        context.insert("a".into(), json!(1));
        let request = HttpRequest::builder().build();
        let out = ExtraContext::new()
            .get_context_data(&request, context.clone(), None)
            .await
            .unwrap();
        assert_eq!(out, context);
    }
}
