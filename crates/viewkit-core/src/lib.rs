//! # viewkit-core
//!
//! Core types shared by every viewkit crate: the error type, settings and
//! their loaders, and tracing-based logging setup.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Settings consumed by the view mixins
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{ViewError, ViewResult};
pub use settings::Settings;
