//! Model descriptors.
//!
//! [`ModelMeta`] is the statically declared table a view consults instead of
//! runtime introspection: the model's name, its primary key, an optional
//! display field used as the object's string representation, and the ordered
//! field list. The [`Model`] trait connects typed structs to a descriptor so
//! they can be stored as [`Record`]s.

use crate::fields::FieldDef;
use crate::record::Record;

/// Metadata about a model, equivalent to Django's `_meta`.
///
/// # Examples
///
/// ```
/// use viewkit_db::{FieldDef, FieldType, ModelMeta};
///
/// let meta = ModelMeta::new("Book")
///     .field(FieldDef::new("id", FieldType::AutoField).primary_key())
///     .field(FieldDef::new("title", FieldType::CharField))
///     .field(FieldDef::new("author", FieldType::foreign_key("author")))
///     .display_field("title");
///
/// assert_eq!(meta.model_name(), "book");
/// assert_eq!(meta.pk_name(), "id");
/// assert_eq!(meta.field_names(), vec!["id", "title", "author"]);
/// assert!(meta.get_field("author").unwrap().field_type.is_relation());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMeta {
    object_name: &'static str,
    model_name: String,
    display_field: Option<&'static str>,
    fields: Vec<FieldDef>,
}

impl ModelMeta {
    /// Creates a descriptor with no fields. `object_name` is the class-style
    /// name (`"Book"`); the model name is its lowercase form.
    pub fn new(object_name: &'static str) -> Self {
        Self {
            object_name,
            model_name: object_name.to_lowercase(),
            display_field: None,
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the field whose value is the object's string representation.
    #[must_use]
    pub const fn display_field(mut self, name: &'static str) -> Self {
        self.display_field = Some(name);
        self
    }

    /// Returns the class-style name (e.g. `"Book"`).
    pub const fn object_name(&self) -> &'static str {
        self.object_name
    }

    /// Returns the lowercase model name (e.g. `"book"`).
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the field used as string representation, if any.
    pub const fn get_display_field(&self) -> Option<&'static str> {
        self.display_field
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Returns the field names in declaration order.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Looks up a field by name. `pk` resolves to the primary key field.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        if name == "pk" {
            return self.pk_field();
        }
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` if the model declares a field with this name.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Returns the primary key field, if one is declared.
    pub fn pk_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Returns the primary key field name, defaulting to `"id"`.
    pub fn pk_name(&self) -> &'static str {
        self.pk_field().map_or("id", |f| f.name)
    }
}

/// A typed model that can be stored as a [`Record`].
///
/// ```
/// use std::sync::LazyLock;
/// use viewkit_db::{FieldDef, FieldType, Model, ModelMeta, Record};
///
/// struct Author {
///     id: i64,
///     name: String,
/// }
///
/// impl Model for Author {
///     fn meta() -> &'static ModelMeta {
///         static META: LazyLock<ModelMeta> = LazyLock::new(|| {
///             ModelMeta::new("Author")
///                 .field(FieldDef::new("id", FieldType::AutoField).primary_key())
///                 .field(FieldDef::new("name", FieldType::CharField))
///                 .display_field("name")
///         });
///         &META
///     }
///
///     fn to_record(&self) -> Record {
///         Record::new().with("id", self.id).with("name", self.name.as_str())
///     }
/// }
///
/// let record = Author { id: 1, name: "Bob".into() }.to_record();
/// assert_eq!(record.label(Author::meta()), "Bob");
/// ```
pub trait Model: Send + Sync + 'static {
    /// Returns the static metadata for this model type.
    fn meta() -> &'static ModelMeta;

    /// Converts this instance into a stored record.
    fn to_record(&self) -> Record;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;

    fn book_meta() -> ModelMeta {
        ModelMeta::new("Book")
            .field(FieldDef::new("isbn", FieldType::CharField).primary_key())
            .field(FieldDef::new("title", FieldType::CharField))
    }

    #[test]
    fn test_names() {
        let meta = book_meta();
        assert_eq!(meta.object_name(), "Book");
        assert_eq!(meta.model_name(), "book");
    }

    #[test]
    fn test_custom_pk() {
        let meta = book_meta();
        assert_eq!(meta.pk_name(), "isbn");
        assert_eq!(meta.get_field("pk").unwrap().name, "isbn");
    }

    #[test]
    fn test_default_pk_name() {
        let meta = ModelMeta::new("Tag").field(FieldDef::new("label", FieldType::CharField));
        assert_eq!(meta.pk_name(), "id");
        assert!(meta.get_field("pk").is_none());
    }

    #[test]
    fn test_has_field() {
        let meta = book_meta();
        assert!(meta.has_field("title"));
        assert!(!meta.has_field("pk"));
        assert!(!meta.has_field("author"));
    }

    #[test]
    fn test_display_field() {
        assert_eq!(book_meta().get_display_field(), None);
        assert_eq!(
            book_meta().display_field("title").get_display_field(),
            Some("title")
        );
    }
}
