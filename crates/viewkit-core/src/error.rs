//! Error types for viewkit.
//!
//! [`ViewError`] covers the failures a view pipeline can surface: HTTP-level
//! rejections, lookup failures against the object store, missing attributes
//! while exporting, and configuration problems. Each variant maps to an HTTP
//! status code via [`ViewError::status_code`] so the view boundary can turn a
//! propagated error into a response.

use thiserror::Error;

/// The primary error type for viewkit.
#[derive(Error, Debug)]
pub enum ViewError {
    // ── HTTP errors ──────────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 403 Forbidden.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    // ── Object access ────────────────────────────────────────────────

    /// An object has no value for a field its model declares.
    #[error("'{model}' object has no attribute '{field}'")]
    MissingAttribute {
        /// The model the object belongs to.
        model: String,
        /// The field that could not be read.
        field: String,
    },

    /// A model name does not resolve to any registered model.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// A field name or lookup path does not resolve on a model.
    #[error("Cannot resolve keyword '{0}' into field")]
    FieldError(String),

    /// A generic object store error.
    #[error("Database error: {0}")]
    Database(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ViewError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest` -> 400
    /// - `PermissionDenied` -> 403
    /// - `NotFound` -> 404
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::PermissionDenied(_) => 403,
            Self::NotFound(_) => 404,
            Self::MissingAttribute { .. }
            | Self::UnknownModel(_)
            | Self::FieldError(_)
            | Self::Database(_)
            | Self::Serialization(_)
            | Self::Configuration(_)
            | Self::Io(_) => 500,
        }
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A convenience type alias for `Result<T, ViewError>`.
pub type ViewResult<T> = Result<T, ViewError>;
