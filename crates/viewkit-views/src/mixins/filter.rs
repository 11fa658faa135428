//! Default and request-driven queryset filtering.
//!
//! [`DefaultFilter`] narrows a list view's queryset in two ways: default
//! lookups applied when the request does not say otherwise, and lookups
//! taken from the request's query parameters. Only *safe* filter keys reach
//! the queryset: declared filter fields whose root segment names a field of
//! the bound model. A request parameter applies when its root segment is one
//! of them, so `owner__name` and `status__iexact` pass when `owner` and
//! `status` are declared. Any other parameter is ignored.
//!
//! For templates it also computes the options of every safe filter (the
//! available values and their labels) and the filters active on the current
//! request.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use viewkit_core::{Settings, ViewError, ViewResult};
use viewkit_db::query::{root_segment, LOOKUP_SEP};
use viewkit_db::{ModelMeta, QuerySet, Value};
use viewkit_http::HttpRequest;

use crate::mixin::{Context, ViewMixin};

/// The options of one filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableFilter {
    /// The filter key, used as the form field name.
    pub select_name: String,
    /// The label shown for the filter.
    pub display_name: String,
    /// Raw filter value to the label shown for it.
    pub values: BTreeMap<String, String>,
}

/// The options of one filter, or a marker that they could not be computed.
///
/// The marker serializes as the string `"Error"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOptions {
    Available(AvailableFilter),
    Error,
}

impl Serialize for FilterOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Available(filter) => filter.serialize(serializer),
            Self::Error => serializer.serialize_str("Error"),
        }
    }
}

/// Applies default and request-supplied filters to a list view.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use viewkit_db::{FieldDef, FieldType, ModelMeta};
/// use viewkit_views::DefaultFilter;
///
/// let model = Arc::new(
///     ModelMeta::new("Ticket")
///         .field(FieldDef::new("id", FieldType::AutoField).primary_key())
///         .field(FieldDef::new("status", FieldType::CharField))
///         .field(FieldDef::new("owner", FieldType::foreign_key("user"))),
/// );
/// let stage = DefaultFilter::new(model)
///     .with_default("status", "open")
///     .with_filter_fields(["status", "owner__username", "priority"]);
///
/// assert_eq!(stage.safe_filters(), vec!["status", "owner__username"]);
/// ```
#[derive(Debug, Clone)]
pub struct DefaultFilter {
    model: Arc<ModelMeta>,
    default_filter: BTreeMap<String, Value>,
    filter_fields: Vec<String>,
    show_all_param: String,
}

impl DefaultFilter {
    /// Creates a stage with no defaults and no filter fields.
    pub fn new(model: Arc<ModelMeta>) -> Self {
        Self::from_settings(model, &Settings::default())
    }

    /// Creates a stage using the configured show-all parameter.
    pub fn from_settings(model: Arc<ModelMeta>, settings: &Settings) -> Self {
        Self {
            model,
            default_filter: BTreeMap::new(),
            filter_fields: Vec::new(),
            show_all_param: settings.show_all_param.clone(),
        }
    }

    /// Adds a default lookup.
    #[must_use]
    pub fn with_default(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_filter.insert(path.into(), value.into());
        self
    }

    /// Declares the filter fields, in display order. Duplicates are dropped.
    #[must_use]
    pub fn with_filter_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.filter_fields.contains(&field) {
                self.filter_fields.push(field);
            }
        }
        self
    }

    /// Returns the bound model.
    pub fn model(&self) -> &ModelMeta {
        &self.model
    }

    /// Returns the default lookups. They are never modified by requests.
    pub const fn default_filter(&self) -> &BTreeMap<String, Value> {
        &self.default_filter
    }

    /// Returns the declared filter fields whose root segment is a field of
    /// the model, unmodified and in declared order.
    pub fn safe_filters(&self) -> Vec<&str> {
        self.filter_fields
            .iter()
            .map(String::as_str)
            .filter(|path| self.model.has_field(root_segment(path)))
            .collect()
    }

    /// Narrows `queryset` for `request`.
    ///
    /// Without query parameters every default applies. Otherwise each
    /// parameter whose root segment is a safe filter applies and displaces
    /// the default stored under the same key; the remaining defaults apply
    /// unless the show-all parameter is present. A parameter with a safe root
    /// but a path the model cannot resolve (`status__bogus`) is skipped.
    pub async fn apply_filters(&self, request: &HttpRequest, mut queryset: QuerySet) -> QuerySet {
        let params = request.get();
        if params.is_empty() {
            for (path, value) in &self.default_filter {
                tracing::debug!(path = %path, value = %value, "applying default filter");
                queryset = queryset.filter(path.as_str(), value.clone());
            }
            return queryset;
        }

        let safe = self.safe_filters();
        let mut defaults = self.default_filter.clone();
        for (key, value) in params.iter() {
            if safe.contains(&root_segment(key)) {
                if !queryset.resolves(key).await {
                    tracing::warn!(path = key, model = self.model.model_name(), "skipped unresolvable filter key");
                    continue;
                }
                tracing::debug!(path = key, value, "applying request filter");
                queryset = queryset.filter(key, value);
                defaults.remove(key);
            } else if self.is_declared(key) {
                tracing::warn!(path = key, model = self.model.model_name(), "excluded unsafe filter key");
            }
        }

        if params.contains_key(&self.show_all_param) {
            tracing::debug!("show-all requested; skipping default filters");
        } else {
            for (path, value) in defaults {
                tracing::debug!(path = %path, value = %value, "applying default filter");
                queryset = queryset.filter(path, value);
            }
        }
        queryset
    }

    /// Returns the request's parameters whose root segment is a safe filter.
    pub fn active_filters(&self, request: &HttpRequest) -> BTreeMap<String, String> {
        let safe = self.safe_filters();
        request
            .get()
            .iter()
            .filter(|(key, _)| safe.contains(&root_segment(key)))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn is_declared(&self, key: &str) -> bool {
        let root = root_segment(key);
        self.filter_fields.iter().any(|f| f == key || root_segment(f) == root)
    }

    /// Computes the options of every safe filter.
    ///
    /// Foreign-key filters list every related object, keyed by its primary
    /// key. The label is the value of the sub-path field when the key names
    /// one on the related model (`owner__username`), and the object's string
    /// representation otherwise. Other filters list the distinct non-null
    /// values of their field across the whole object set. A filter whose
    /// options cannot be computed maps to [`FilterOptions::Error`].
    pub async fn get_available_filter_dict(&self, queryset: &QuerySet) -> BTreeMap<String, FilterOptions> {
        let mut filters = BTreeMap::new();
        for key in self.safe_filters() {
            let root = root_segment(key);
            let related = self
                .model
                .get_field(root)
                .and_then(|field| field.field_type.related_model());
            let options = match related {
                Some(to) => self.related_options(queryset, key, root, to).await,
                None => Self::value_options(queryset, key, root).await,
            };
            let options = options.unwrap_or_else(|error| {
                tracing::warn!(key, error = %error, "could not compute filter options");
                FilterOptions::Error
            });
            filters.insert(key.to_string(), options);
        }
        filters
    }

    async fn related_options(
        &self,
        queryset: &QuerySet,
        key: &str,
        root: &str,
        to: &str,
    ) -> ViewResult<FilterOptions> {
        let related = queryset.related(to).await?;
        let meta = related.model_arc();
        let label_field = key
            .split_once(LOOKUP_SEP)
            .map(|(_, rest)| rest)
            .filter(|rest| meta.has_field(rest));

        let mut values = BTreeMap::new();
        for object in related.evaluate().await? {
            let pk = object
                .pk(&meta)
                .ok_or_else(|| ViewError::MissingAttribute {
                    model: meta.model_name().to_string(),
                    field: meta.pk_name().to_string(),
                })?
                .to_text();
            let label = label_field
                .and_then(|field| object.get(field))
                .map_or_else(|| object.label(&meta), Value::to_text);
            values.insert(pk, label);
        }
        Ok(FilterOptions::Available(AvailableFilter {
            select_name: key.to_string(),
            display_name: label_field.unwrap_or(root).to_string(),
            values,
        }))
    }

    async fn value_options(queryset: &QuerySet, key: &str, root: &str) -> ViewResult<FilterOptions> {
        let values = queryset
            .base()
            .values_distinct(root)
            .await?
            .iter()
            .map(|value| (value.to_text(), value.to_text()))
            .collect();
        Ok(FilterOptions::Available(AvailableFilter {
            select_name: key.to_string(),
            display_name: capitalize(root),
            values,
        }))
    }
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

#[async_trait]
impl ViewMixin for DefaultFilter {
    fn name(&self) -> &'static str {
        "DefaultFilter"
    }

    async fn get_queryset(&self, request: &HttpRequest, queryset: QuerySet) -> ViewResult<QuerySet> {
        Ok(self.apply_filters(request, queryset).await)
    }

    async fn get_context_data(
        &self,
        request: &HttpRequest,
        mut context: Context,
        queryset: Option<&QuerySet>,
    ) -> ViewResult<Context> {
        if let Some(queryset) = queryset {
            let available = self.get_available_filter_dict(queryset).await;
            context.insert("available_filters".to_string(), serde_json::to_value(available)?);
        }
        context.insert(
            "active_filters".to_string(),
            serde_json::to_value(self.active_filters(request))?,
        );
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewkit_db::{FieldDef, FieldType, InMemoryStore, Record};

    async fn fixture() -> (Arc<InMemoryStore>, Arc<ModelMeta>) {
        let store = Arc::new(InMemoryStore::new());
        store
            .register(
                ModelMeta::new("User")
                    .field(FieldDef::new("id", FieldType::AutoField).primary_key())
                    .field(FieldDef::new("username", FieldType::CharField)),
            )
            .await;
        let ticket = store
            .register(
                ModelMeta::new("Ticket")
                    .field(FieldDef::new("id", FieldType::AutoField).primary_key())
                    .field(FieldDef::new("status", FieldType::CharField))
                    .field(FieldDef::new("owner", FieldType::foreign_key("User")).nullable()),
            )
            .await;
        for (id, username) in [(1_i64, "bob"), (2, "ann")] {
            store
                .insert("user", Record::new().with("id", id).with("username", username))
                .await
                .unwrap();
        }
        for (id, status, owner) in [
            (1_i64, "active", Some(1_i64)),
            (2, "closed", Some(2)),
            (3, "active", None),
            (4, "pending", Some(1)),
        ] {
            store
                .insert(
                    "ticket",
                    Record::new()
                        .with("id", id)
                        .with("status", status)
                        .with("owner", owner),
                )
                .await
                .unwrap();
        }
        (store, ticket)
    }

    fn stage(model: Arc<ModelMeta>) -> DefaultFilter {
        DefaultFilter::new(model)
            .with_default("status", "active")
            .with_filter_fields(["status", "owner", "owner__username", "priority"])
    }

    async fn ids(stage: &DefaultFilter, store: Arc<InMemoryStore>, query: &str) -> Vec<i64> {
        let request = HttpRequest::builder().query_string(query).build();
        let queryset = QuerySet::for_model(store, "ticket").await.unwrap();
        stage
            .apply_filters(&request, queryset)
            .await
            .evaluate()
            .await
            .unwrap()
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_int))
            .collect()
    }

    #[tokio::test]
    async fn test_safe_filters_drop_unknown_roots() {
        let (_, model) = fixture().await;
        assert_eq!(stage(model).safe_filters(), vec!["status", "owner", "owner__username"]);
    }

    #[tokio::test]
    async fn test_defaults_without_params() {
        let (store, model) = fixture().await;
        assert_eq!(ids(&stage(model), store, "").await, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_param_displaces_default() {
        let (store, model) = fixture().await;
        assert_eq!(ids(&stage(model), store, "status=closed").await, vec![2]);
    }

    #[tokio::test]
    async fn test_show_all_skips_defaults() {
        let (store, model) = fixture().await;
        assert_eq!(ids(&stage(model), store, "all=1").await, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_unrelated_param_keeps_defaults() {
        let (store, model) = fixture().await;
        assert_eq!(ids(&stage(model), store, "page=2").await, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_unsafe_key_ignored() {
        let (store, model) = fixture().await;
        assert_eq!(ids(&stage(model), store, "priority=high&all=1").await, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_fk_and_default_combine() {
        let (store, model) = fixture().await;
        assert_eq!(ids(&stage(model), store, "owner__username=bob").await, vec![1]);
    }

    fn roots_only(model: Arc<ModelMeta>) -> DefaultFilter {
        DefaultFilter::new(model)
            .with_default("status", "active")
            .with_filter_fields(["status", "owner"])
    }

    #[tokio::test]
    async fn test_param_with_sub_path_applies_under_declared_root() {
        let (store, model) = fixture().await;
        let stage = roots_only(model);
        assert_eq!(ids(&stage, store.clone(), "owner__username=bob&all=1").await, vec![1, 4]);
        assert_eq!(ids(&stage, store, "owner__username=bob").await, vec![1]);
    }

    #[tokio::test]
    async fn test_param_with_lookup_suffix_applies() {
        let (store, model) = fixture().await;
        assert_eq!(ids(&roots_only(model), store, "status__iexact=ACTIVE&all=1").await, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_unresolvable_path_under_safe_root_is_skipped() {
        let (store, model) = fixture().await;
        let stage = roots_only(model);
        assert_eq!(ids(&stage, store.clone(), "status__bogus=x&all=1").await, vec![1, 2, 3, 4]);
        assert_eq!(ids(&stage, store, "owner__nickname=bob").await, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_active_filters_match_on_root_segment() {
        let (_, model) = fixture().await;
        let request = HttpRequest::builder()
            .query_string("owner__username=bob&status__iexact=ACTIVE&priority__gt=1&page=2")
            .build();
        let active = roots_only(model).active_filters(&request);
        assert_eq!(active.len(), 2);
        assert_eq!(active["owner__username"], "bob");
        assert_eq!(active["status__iexact"], "ACTIVE");
    }

    #[tokio::test]
    async fn test_defaults_not_mutated_across_requests() {
        let (store, model) = fixture().await;
        let stage = stage(model);
        assert_eq!(ids(&stage, store.clone(), "status=closed").await, vec![2]);
        assert_eq!(ids(&stage, store, "").await, vec![1, 3]);
        assert_eq!(stage.default_filter().len(), 1);
    }

    #[tokio::test]
    async fn test_available_filters() {
        let (store, model) = fixture().await;
        let queryset = QuerySet::for_model(store, "ticket").await.unwrap().filter("status", "active");
        let filters = stage(model).get_available_filter_dict(&queryset).await;

        let FilterOptions::Available(status) = &filters["status"] else {
            panic!("status options missing");
        };
        assert_eq!(status.display_name, "Status");
        assert_eq!(status.values.len(), 3);
        assert_eq!(status.values["pending"], "pending");

        let FilterOptions::Available(owner) = &filters["owner__username"] else {
            panic!("owner options missing");
        };
        assert_eq!(owner.select_name, "owner__username");
        assert_eq!(owner.display_name, "username");
        assert_eq!(owner.values["1"], "bob");

        let FilterOptions::Available(owner) = &filters["owner"] else {
            panic!("owner options missing");
        };
        assert_eq!(owner.display_name, "owner");
        assert_eq!(owner.values["2"], "User object (2)");

        assert!(!filters.contains_key("priority"));
    }

    #[tokio::test]
    async fn test_unregistered_relation_is_error() {
        let store = Arc::new(InMemoryStore::new());
        let model = store
            .register(
                ModelMeta::new("Ticket")
                    .field(FieldDef::new("id", FieldType::AutoField).primary_key())
                    .field(FieldDef::new("team", FieldType::foreign_key("Team"))),
            )
            .await;
        let queryset = QuerySet::for_model(store, "ticket").await.unwrap();
        let filters = DefaultFilter::new(model)
            .with_filter_fields(["team"])
            .get_available_filter_dict(&queryset)
            .await;
        assert_eq!(filters["team"], FilterOptions::Error);
        assert_eq!(serde_json::to_value(&filters).unwrap(), serde_json::json!({"team": "Error"}));
    }

    #[tokio::test]
    async fn test_context_keys() {
        let (store, model) = fixture().await;
        let queryset = QuerySet::for_model(store, "ticket").await.unwrap();
        let request = HttpRequest::builder().query_string("status=closed&page=3").build();
        let context = stage(model)
            .get_context_data(&request, Context::new(), Some(&queryset))
            .await
            .unwrap();
        assert_eq!(context["active_filters"], serde_json::json!({"status": "closed"}));
        assert!(context["available_filters"].get("owner").is_some());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("status"), "Status");
        assert_eq!(capitalize("dueDATE"), "Duedate");
        assert_eq!(capitalize(""), "");
    }
}
