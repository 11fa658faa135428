//! Backend-agnostic field values.
//!
//! [`Value`] represents a single field of a stored object. Query parameters
//! arrive as strings, so lookups compare values through
//! [`Value::matches_str`], which follows the string conversions a Django
//! form field would apply.

use std::fmt;

/// A backend-agnostic representation of a stored value.
///
/// Serializes untagged, so a record renders into a template context as plain
/// JSON (`null`, `true`, `42`, `"2024-03-01"`).
///
/// # Examples
///
/// ```
/// use viewkit_db::value::Value;
///
/// let v = Value::from(42_i64);
/// assert_eq!(v, Value::Int(42));
/// assert!(v.matches_str("42"));
///
/// let v = Value::from("hello");
/// assert_eq!(v.to_string(), "hello");
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// A date without time.
    Date(chrono::NaiveDate),
    /// A date and time without timezone.
    DateTime(chrono::NaiveDateTime),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to extract an integer value.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the text written for this value in an export or a filter
    /// option key. `Null` becomes the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Returns `true` if this value equals another value.
    ///
    /// String values on either side are compared through
    /// [`matches_str`](Self::matches_str), so `Int(1)` equals `String("1")`.
    pub fn loosely_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(s), v) | (v, Self::String(s)) => v.matches_str(s),
            (a, b) => a == b,
        }
    }

    /// Returns `true` if the raw query-string value `raw` selects this value.
    ///
    /// Booleans accept `true`/`false`, `True`/`False`, and `1`/`0`; `Null`
    /// matches `None`, `null`, or the empty string; numbers are parsed before
    /// comparing so `1.0` selects `Float(1.0)` and `Int(1)`.
    #[allow(clippy::cast_precision_loss)]
    pub fn matches_str(&self, raw: &str) -> bool {
        match self {
            Self::Null => matches!(raw, "" | "None" | "null"),
            Self::Bool(b) => match raw {
                "true" | "True" | "1" => *b,
                "false" | "False" | "0" => !*b,
                _ => false,
            },
            Self::Int(i) => raw
                .parse::<i64>()
                .map(|parsed| parsed == *i)
                .or_else(|_| raw.parse::<f64>().map(|parsed| (parsed - *i as f64).abs() < f64::EPSILON))
                .unwrap_or(false),
            Self::Float(v) => raw
                .parse::<f64>()
                .is_ok_and(|parsed| (parsed - v).abs() < f64::EPSILON),
            Self::String(s) => s == raw,
            Self::Date(d) => d.to_string() == raw,
            Self::DateTime(dt) => {
                dt.to_string() == raw || dt.format("%Y-%m-%dT%H:%M:%S").to_string() == raw
            }
        }
    }
}
