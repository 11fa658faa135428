//! Field descriptors.
//!
//! A [`FieldDef`] declares one field of a model: its name, a human-readable
//! name, and a [`FieldType`] tag. Views never reflect over stored objects;
//! they read these tables instead.

/// The type tag of a model field.
///
/// Only the distinctions view mixins act on are modeled: relations are
/// resolved through their target model, the date/time family is kept apart
/// from plain scalars, and everything else is a plain field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Auto-incrementing integer primary key.
    AutoField,
    /// Variable-length string.
    CharField,
    /// Unlimited-length text.
    TextField,
    /// Signed integer.
    IntegerField,
    /// Floating-point number.
    FloatField,
    /// Boolean.
    BooleanField,
    /// Date without time.
    DateField,
    /// Date and time.
    DateTimeField,
    /// Many-to-one relationship.
    ForeignKey {
        /// The target model name (e.g. `"author"`).
        to: String,
    },
}

impl FieldType {
    /// Creates a foreign key to the named model.
    pub fn foreign_key(to: impl Into<String>) -> Self {
        Self::ForeignKey { to: to.into() }
    }

    /// Returns `true` for relation fields.
    pub const fn is_relation(&self) -> bool {
        matches!(self, Self::ForeignKey { .. })
    }

    /// Returns `true` for the date/time family.
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::DateField | Self::DateTimeField)
    }

    /// Returns the related model name for relation fields.
    pub fn related_model(&self) -> Option<&str> {
        match self {
            Self::ForeignKey { to } => Some(to),
            _ => None,
        }
    }
}

/// Definition of a single model field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// The attribute name of this field.
    pub name: &'static str,
    /// The type of this field.
    pub field_type: FieldType,
    /// Human-readable name for the field.
    pub verbose_name: String,
    /// Whether this field is the primary key.
    pub primary_key: bool,
    /// Whether NULL is allowed.
    pub null: bool,
}

impl FieldDef {
    /// Creates a new `FieldDef`. The verbose name defaults to the field name
    /// with underscores replaced by spaces.
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            verbose_name: name.replace('_', " "),
            primary_key: false,
            null: false,
        }
    }

    /// Marks this field as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Allows NULL values.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    /// Sets the verbose (human-readable) name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_def_defaults() {
        let field = FieldDef::new("published_on", FieldType::DateField);
        assert_eq!(field.verbose_name, "published on");
        assert!(!field.primary_key);
        assert!(!field.null);
    }

    #[test]
    fn test_field_def_builders() {
        let field = FieldDef::new("id", FieldType::AutoField)
            .primary_key()
            .verbose_name("ID");
        assert!(field.primary_key);
        assert_eq!(field.verbose_name, "ID");
        assert!(FieldDef::new("x", FieldType::CharField).nullable().null);
    }

    #[test]
    fn test_field_type_classification() {
        let fk = FieldType::foreign_key("author");
        assert!(fk.is_relation());
        assert!(!fk.is_temporal());
        assert_eq!(fk.related_model(), Some("author"));

        assert!(FieldType::DateTimeField.is_temporal());
        assert!(FieldType::DateField.is_temporal());
        assert!(!FieldType::CharField.is_relation());
        assert_eq!(FieldType::CharField.related_model(), None);
    }
}
