//! Object stores.
//!
//! [`ObjectStore`] is the seam between querysets and whatever persists the
//! objects. [`InMemoryStore`] is the bundled implementation: one table of
//! [`Record`]s per registered model, with lookups that follow foreign keys
//! across tables.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use viewkit_core::{ViewError, ViewResult};

use crate::model::{Model, ModelMeta};
use crate::query::{Lookup, LookupOp, Query};
use crate::record::Record;
use crate::value::Value;

/// A source of stored objects that can answer a [`Query`].
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Resolves a model descriptor by (case-insensitive) model name.
    async fn model(&self, model_name: &str) -> Option<Arc<ModelMeta>>;

    /// Returns the records of `model` matching every lookup of `query`.
    async fn fetch(&self, model: &ModelMeta, query: &Query) -> ViewResult<Vec<Record>>;
}

#[derive(Debug)]
struct Table {
    meta: Arc<ModelMeta>,
    rows: Vec<Record>,
}

/// An in-memory [`ObjectStore`].
///
/// Records are kept in insertion order. Lookup values are compared with
/// [`Value::loosely_eq`], so string parameters taken from a request select
/// typed values.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use viewkit_db::{FieldDef, FieldType, InMemoryStore, ModelMeta, QuerySet, Record};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = Arc::new(InMemoryStore::new());
/// store.register(
///     ModelMeta::new("Author")
///         .field(FieldDef::new("id", FieldType::AutoField).primary_key())
///         .field(FieldDef::new("name", FieldType::CharField)),
/// ).await;
/// store.insert("author", Record::new().with("id", 1_i64).with("name", "Bob")).await.unwrap();
///
/// let qs = QuerySet::for_model(store, "author").await.unwrap().filter("name", "Bob");
/// assert_eq!(qs.count().await.unwrap(), 1);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model, creating its (empty) table. Registering a model
    /// that already exists replaces its descriptor and keeps its rows.
    pub async fn register(&self, meta: ModelMeta) -> Arc<ModelMeta> {
        let meta = Arc::new(meta);
        let mut tables = self.tables.write().await;
        tables
            .entry(meta.model_name().to_string())
            .and_modify(|table| table.meta = Arc::clone(&meta))
            .or_insert_with(|| Table {
                meta: Arc::clone(&meta),
                rows: Vec::new(),
            });
        meta
    }

    /// Appends a record to a registered model's table.
    pub async fn insert(&self, model_name: &str, record: Record) -> ViewResult<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(&model_name.to_lowercase())
            .ok_or_else(|| ViewError::UnknownModel(model_name.to_string()))?;
        table.rows.push(record);
        Ok(())
    }

    /// Stores a typed model instance, registering its model on first use.
    pub async fn insert_model<M: Model>(&self, instance: &M) -> ViewResult<()> {
        let meta = M::meta();
        if self.model(meta.model_name()).await.is_none() {
            self.register(meta.clone()).await;
        }
        self.insert(meta.model_name(), instance.to_record()).await
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn model(&self, model_name: &str) -> Option<Arc<ModelMeta>> {
        let tables = self.tables.read().await;
        tables
            .get(&model_name.to_lowercase())
            .map(|table| Arc::clone(&table.meta))
    }

    async fn fetch(&self, model: &ModelMeta, query: &Query) -> ViewResult<Vec<Record>> {
        let tables = self.tables.read().await;
        let table = tables
            .get(model.model_name())
            .ok_or_else(|| ViewError::UnknownModel(model.model_name().to_string()))?;

        let mut matched = Vec::new();
        for record in &table.rows {
            let mut keep = true;
            for lookup in query.lookups() {
                if !lookup_matches(&tables, &table.meta, record, lookup)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                matched.push(record.clone());
            }
        }
        tracing::trace!(
            model = model.model_name(),
            lookups = query.lookups().len(),
            matched = matched.len(),
            "in-memory fetch"
        );
        Ok(matched)
    }
}

fn lookup_matches(
    tables: &HashMap<String, Table>,
    meta: &ModelMeta,
    record: &Record,
    lookup: &Lookup,
) -> ViewResult<bool> {
    let (segments, op) = lookup.parts();
    let value = resolve(tables, meta, record, &segments, &lookup.path)?;
    Ok(match op {
        LookupOp::Exact => value.loosely_eq(&lookup.value),
        LookupOp::IExact => value.to_text().to_lowercase() == lookup.value.to_text().to_lowercase(),
        LookupOp::IsNull => value.is_null() == is_truthy(&lookup.value),
    })
}

/// Walks a lookup path from `record`, following foreign keys into their
/// tables. A dangling or null relation resolves to `Null`.
fn resolve(
    tables: &HashMap<String, Table>,
    meta: &ModelMeta,
    record: &Record,
    segments: &[&str],
    path: &str,
) -> ViewResult<Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Err(ViewError::FieldError(path.to_string()));
    };
    let field = meta
        .get_field(first)
        .ok_or_else(|| ViewError::FieldError(path.to_string()))?;
    let value = record.get(field.name).cloned().unwrap_or(Value::Null);
    if rest.is_empty() {
        return Ok(value);
    }

    let Some(to) = field.field_type.related_model() else {
        return Err(ViewError::FieldError(path.to_string()));
    };
    if value.is_null() {
        return Ok(Value::Null);
    }
    let related = tables
        .get(&to.to_lowercase())
        .ok_or_else(|| ViewError::UnknownModel(to.to_string()))?;
    match related
        .rows
        .iter()
        .find(|row| row.pk(&related.meta).is_some_and(|pk| pk.loosely_eq(&value)))
    {
        Some(row) => resolve(tables, &related.meta, row, rest, path),
        None => Ok(Value::Null),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::String(s) => matches!(s.as_str(), "true" | "True" | "1"),
        _ => false,
    }
}
