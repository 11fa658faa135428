//! Query building.
//!
//! A [`Query`] is the backend-agnostic description of a filtered object set:
//! a conjunction of [`Lookup`]s, each a double-underscore field path compared
//! against a value. [`QuerySet`] wraps a query with the store and model it
//! runs against.

pub mod queryset;

pub use queryset::QuerySet;

use crate::value::Value;

/// Separator between segments of a lookup path (`owner__name`).
pub const LOOKUP_SEP: &str = "__";

/// The comparison applied at the end of a lookup path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOp {
    /// Equality (the default when no suffix is given).
    Exact,
    /// Case-insensitive equality.
    IExact,
    /// Tests for NULL; the lookup value says which way.
    IsNull,
}

impl LookupOp {
    fn from_suffix(segment: &str) -> Option<Self> {
        match segment {
            "exact" => Some(Self::Exact),
            "iexact" => Some(Self::IExact),
            "isnull" => Some(Self::IsNull),
            _ => None,
        }
    }
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    /// The full lookup path as supplied, e.g. `owner__name__iexact`.
    pub path: String,
    /// The value compared against.
    pub value: Value,
}

impl Lookup {
    /// Creates a lookup.
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Splits the path into field segments and the trailing comparison.
    ///
    /// ```
    /// use viewkit_db::query::{Lookup, LookupOp};
    ///
    /// let lookup = Lookup::new("owner__name__iexact", "bob");
    /// assert_eq!(lookup.parts(), (vec!["owner", "name"], LookupOp::IExact));
    ///
    /// let lookup = Lookup::new("status", "open");
    /// assert_eq!(lookup.parts(), (vec!["status"], LookupOp::Exact));
    /// ```
    pub fn parts(&self) -> (Vec<&str>, LookupOp) {
        let mut segments: Vec<&str> = self.path.split(LOOKUP_SEP).collect();
        let op = match segments.last().copied().and_then(LookupOp::from_suffix) {
            Some(op) if segments.len() > 1 => {
                segments.pop();
                op
            }
            _ => LookupOp::Exact,
        };
        (segments, op)
    }

    /// Returns the first segment of the path.
    pub fn root(&self) -> &str {
        root_segment(&self.path)
    }
}

/// Returns the first segment of a lookup path.
///
/// ```
/// use viewkit_db::query::root_segment;
///
/// assert_eq!(root_segment("owner__name"), "owner");
/// assert_eq!(root_segment("status"), "status");
/// ```
pub fn root_segment(path: &str) -> &str {
    path.split(LOOKUP_SEP).next().unwrap_or(path)
}

/// A conjunction of lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    lookups: Vec<Lookup>,
    empty: bool,
}

impl Query {
    /// Creates a query matching every object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a lookup.
    pub fn add(&mut self, lookup: Lookup) {
        self.lookups.push(lookup);
    }

    /// Marks the query as matching nothing.
    pub fn set_empty(&mut self) {
        self.empty = true;
    }

    /// Returns `true` if the query can match nothing.
    pub const fn is_empty(&self) -> bool {
        self.empty
    }

    /// Returns the lookups in the order they were added.
    pub fn lookups(&self) -> &[Lookup] {
        &self.lookups
    }
}
