//! # viewkit
//!
//! Composable view and form mixins for Django-style Rust web applications.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on
//! `viewkit` for everything, or on individual crates for finer-grained
//! control.
//!
//! ```
//! use std::sync::Arc;
//! use viewkit::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(InMemoryStore::new());
//! let ticket = store
//!     .register(
//!         ModelMeta::new("Ticket")
//!             .field(FieldDef::new("id", FieldType::AutoField).primary_key())
//!             .field(FieldDef::new("status", FieldType::CharField)),
//!     )
//!     .await;
//!
//! let view = ListView::for_model(store, "ticket")
//!     .await
//!     .unwrap()
//!     .with_mixin(NeverCache)
//!     .with_mixin(AccessGuard::login_required())
//!     .with_mixin(
//!         DefaultFilter::new(ticket)
//!             .with_default("status", "open")
//!             .with_filter_fields(["status"]),
//!     )
//!     .with_mixin(CsvExport::new());
//!
//! let response = view.dispatch(HttpRequest::builder().path("/tickets/").build()).await;
//! assert_eq!(response.status().as_u16(), 302);
//! assert!(response.headers().contains_key("cache-control"));
//! # }
//! ```

/// Errors, settings, and logging.
pub use viewkit_core as core;

/// Request, response, and query parameters.
pub use viewkit_http as http;

/// Values, model descriptors, querysets, and object stores.
pub use viewkit_db as db;

/// Class-based views and the mixin pipeline.
#[cfg(feature = "views")]
pub use viewkit_views as views;

/// Access policies and the access guard mixin.
#[cfg(feature = "auth")]
pub use viewkit_auth as auth;

// Third-party crates the public API is built on.
pub use async_trait;
pub use axum;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// The types most applications need.
pub mod prelude {
    pub use viewkit_core::{Settings, ViewError, ViewResult};
    pub use viewkit_db::{FieldDef, FieldType, InMemoryStore, Model, ModelMeta, ObjectStore, QuerySet, Record, Value};
    pub use viewkit_http::{HttpRequest, HttpResponse, HttpResponseRedirect, JsonResponse, QueryDict};

    #[cfg(feature = "views")]
    pub use viewkit_views::{
        AjaxForm, Context, CsvExport, DefaultFilter, ExtraContext, FormErrors, FormView, ListView, MixinStack,
        NeverCache, View, ViewMixin,
    };

    #[cfg(feature = "auth")]
    pub use viewkit_auth::{AccessGuard, AccessPolicy, User};
}
