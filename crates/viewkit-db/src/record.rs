//! Stored objects.

use std::collections::BTreeMap;

use viewkit_core::{ViewError, ViewResult};

use crate::model::ModelMeta;
use crate::value::Value;

/// One stored object: field name to value.
///
/// Serializes as a plain JSON object so it can sit in a template context.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the record for chaining.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets a field.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.values.insert(field.to_string(), value.into());
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Returns the value of a field or a [`ViewError::MissingAttribute`].
    pub fn attr(&self, meta: &ModelMeta, field: &str) -> ViewResult<&Value> {
        self.values
            .get(field)
            .ok_or_else(|| ViewError::MissingAttribute {
                model: meta.model_name().to_string(),
                field: field.to_string(),
            })
    }

    /// Returns the primary key value, if present.
    pub fn pk(&self, meta: &ModelMeta) -> Option<&Value> {
        self.values.get(meta.pk_name())
    }

    /// Returns the default string representation of this object: the
    /// display field's value, else `"<model_name> object (<pk>)"`.
    pub fn label(&self, meta: &ModelMeta) -> String {
        if let Some(value) = meta.get_display_field().and_then(|f| self.values.get(f)) {
            return value.to_text();
        }
        let pk = self.pk(meta).map_or_else(|| "None".to_string(), Value::to_text);
        format!("{} object ({pk})", meta.object_name())
    }

    /// Returns the number of fields set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
