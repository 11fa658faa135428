//! # viewkit-db
//!
//! The persistence-side collaborators of the view mixins: a backend-agnostic
//! [`Value`](value::Value), statically declared model descriptors
//! ([`ModelMeta`](model::ModelMeta), [`FieldDef`](fields::FieldDef)), and a
//! lazy [`QuerySet`](query::QuerySet) evaluated against an
//! [`ObjectStore`](store::ObjectStore).

pub mod fields;
pub mod model;
pub mod query;
pub mod record;
pub mod store;
pub mod value;

pub use fields::{FieldDef, FieldType};
pub use model::{Model, ModelMeta};
pub use query::{Lookup, Query, QuerySet};
pub use record::Record;
pub use store::{InMemoryStore, ObjectStore};
pub use value::Value;
