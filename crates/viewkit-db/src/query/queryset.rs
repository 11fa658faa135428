//! Lazy, composable querysets.
//!
//! A [`QuerySet`] accumulates lookups without touching the store. It only
//! runs when a terminal method is awaited ([`evaluate`](QuerySet::evaluate),
//! [`count`](QuerySet::count), [`values_distinct`](QuerySet::values_distinct)).
//! Filtering consumes `self` and returns the refined queryset, so querysets
//! chain and can be cloned freely between pipeline stages.

use std::sync::Arc;

use viewkit_core::{ViewError, ViewResult};

use super::{Lookup, Query};
use crate::model::ModelMeta;
use crate::record::Record;
use crate::store::ObjectStore;
use crate::value::Value;

/// A lazy query against one model in an [`ObjectStore`].
#[derive(Clone)]
pub struct QuerySet {
    store: Arc<dyn ObjectStore>,
    model: Arc<ModelMeta>,
    query: Query,
}

impl std::fmt::Debug for QuerySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySet")
            .field("model", &self.model.model_name())
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl QuerySet {
    /// Creates a queryset returning every object of `model`.
    pub fn new(store: Arc<dyn ObjectStore>, model: Arc<ModelMeta>) -> Self {
        Self {
            store,
            model,
            query: Query::new(),
        }
    }

    /// Creates a queryset for a model registered in the store by name.
    pub async fn for_model(store: Arc<dyn ObjectStore>, model_name: &str) -> ViewResult<Self> {
        let model = store
            .model(model_name)
            .await
            .ok_or_else(|| ViewError::UnknownModel(model_name.to_string()))?;
        Ok(Self::new(store, model))
    }

    /// Returns the model this queryset runs against.
    pub fn model(&self) -> &ModelMeta {
        &self.model
    }

    /// Returns the shared model descriptor.
    pub fn model_arc(&self) -> Arc<ModelMeta> {
        Arc::clone(&self.model)
    }

    /// Returns the store this queryset runs against.
    pub fn store(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    /// Returns the accumulated query.
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Returns a copy of this queryset.
    #[must_use]
    pub fn all(&self) -> Self {
        self.clone()
    }

    /// Returns an unfiltered queryset over the same model.
    #[must_use]
    pub fn base(&self) -> Self {
        Self::new(self.store(), self.model_arc())
    }

    /// Returns a queryset narrowed by an additional lookup.
    #[must_use]
    pub fn filter(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.add(Lookup::new(path, value));
        self
    }

    /// Returns a queryset that matches nothing.
    #[must_use]
    pub fn none(mut self) -> Self {
        self.query.set_empty();
        self
    }

    /// Returns an unfiltered queryset over another model in the same store.
    pub async fn related(&self, model_name: &str) -> ViewResult<Self> {
        Self::for_model(self.store(), model_name).await
    }

    /// Returns `true` if `path` names a field of this model, following
    /// foreign keys through the store. A trailing comparison suffix
    /// (`__iexact`, `__isnull`) is allowed.
    pub async fn resolves(&self, path: &str) -> bool {
        let lookup = Lookup::new(path, Value::Null);
        let (segments, _) = lookup.parts();
        let mut meta = self.model_arc();
        let mut segments = segments.into_iter().peekable();
        while let Some(segment) = segments.next() {
            let Some(field) = meta.get_field(segment) else {
                return false;
            };
            if segments.peek().is_none() {
                return true;
            }
            let Some(to) = field.field_type.related_model().map(str::to_string) else {
                return false;
            };
            let Some(related) = self.store.model(&to).await else {
                return false;
            };
            meta = related;
        }
        false
    }

    /// Runs the query and returns the matching records.
    pub async fn evaluate(&self) -> ViewResult<Vec<Record>> {
        if self.query.is_empty() {
            return Ok(Vec::new());
        }
        self.store.fetch(&self.model, &self.query).await
    }

    /// Returns the number of matching records.
    pub async fn count(&self) -> ViewResult<usize> {
        Ok(self.evaluate().await?.len())
    }

    /// Returns the distinct non-null values of `field` across the matching
    /// records, in first-seen order.
    pub async fn values_distinct(&self, field: &str) -> ViewResult<Vec<Value>> {
        if !self.model.has_field(field) {
            return Err(ViewError::FieldError(field.to_string()));
        }
        let mut distinct: Vec<Value> = Vec::new();
        for record in self.evaluate().await? {
            match record.get(field) {
                Some(value) if !value.is_null() && !distinct.contains(value) => {
                    distinct.push(value.clone());
                }
                _ => {}
            }
        }
        Ok(distinct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldDef, FieldType};
    use crate::store::InMemoryStore;

    async fn ticket_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .register(
                ModelMeta::new("Ticket")
                    .field(FieldDef::new("id", FieldType::AutoField).primary_key())
                    .field(FieldDef::new("status", FieldType::CharField).nullable()),
            )
            .await;
        for (id, status) in [(1_i64, Some("open")), (2, Some("closed")), (3, Some("open")), (4, None)] {
            store
                .insert(
                    "ticket",
                    Record::new().with("id", id).with("status", status),
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_filter_is_lazy_and_chainable() {
        let store = ticket_store().await;
        let qs = QuerySet::for_model(store, "ticket").await.unwrap();
        let open = qs.clone().filter("status", "open");
        assert_eq!(qs.query().lookups().len(), 0);
        assert_eq!(open.query().lookups().len(), 1);
        assert_eq!(open.count().await.unwrap(), 2);
        assert_eq!(open.filter("id", 3_i64).count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_none_matches_nothing() {
        let store = ticket_store().await;
        let qs = QuerySet::for_model(store, "ticket").await.unwrap().none();
        assert!(qs.evaluate().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_values_distinct_skips_nulls() {
        let store = ticket_store().await;
        let qs = QuerySet::for_model(store, "ticket").await.unwrap();
        let values = qs.values_distinct("status").await.unwrap();
        assert_eq!(
            values,
            vec![Value::String("open".into()), Value::String("closed".into())]
        );
    }

    #[tokio::test]
    async fn test_values_distinct_unknown_field() {
        let store = ticket_store().await;
        let qs = QuerySet::for_model(store, "ticket").await.unwrap();
        assert!(matches!(
            qs.values_distinct("priority").await,
            Err(ViewError::FieldError(_))
        ));
    }

    #[tokio::test]
    async fn test_resolves_paths_across_foreign_keys() {
        let store = Arc::new(InMemoryStore::new());
        store
            .register(
                ModelMeta::new("Owner")
                    .field(FieldDef::new("id", FieldType::AutoField).primary_key())
                    .field(FieldDef::new("name", FieldType::CharField)),
            )
            .await;
        store
            .register(
                ModelMeta::new("Pet")
                    .field(FieldDef::new("id", FieldType::AutoField).primary_key())
                    .field(FieldDef::new("species", FieldType::CharField))
                    .field(FieldDef::new("owner", FieldType::foreign_key("Owner"))),
            )
            .await;
        let qs = QuerySet::for_model(store, "pet").await.unwrap();

        assert!(qs.resolves("species").await);
        assert!(qs.resolves("species__iexact").await);
        assert!(qs.resolves("owner__name").await);
        assert!(qs.resolves("owner__name__iexact").await);
        assert!(qs.resolves("owner__isnull").await);
        assert!(qs.resolves("pk").await);
        assert!(!qs.resolves("species__bogus").await);
        assert!(!qs.resolves("owner__nickname").await);
        assert!(!qs.resolves("colour").await);
    }

    #[tokio::test]
    async fn test_for_model_unknown() {
        let store = ticket_store().await;
        let err = QuerySet::for_model(store, "invoice").await.unwrap_err();
        assert!(matches!(err, ViewError::UnknownModel(_)));
    }

    #[tokio::test]
    async fn test_base_drops_filters() {
        let store = ticket_store().await;
        let qs = QuerySet::for_model(store, "ticket")
            .await
            .unwrap()
            .filter("status", "closed");
        assert_eq!(qs.count().await.unwrap(), 1);
        assert_eq!(qs.base().count().await.unwrap(), 4);
    }
}
