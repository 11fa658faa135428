//! Bundled mixin stages.

pub mod ajax;
pub mod cache;
pub mod context;
pub mod export;
pub mod filter;

pub use ajax::AjaxForm;
pub use cache::NeverCache;
pub use context::ExtraContext;
pub use export::CsvExport;
pub use filter::{AvailableFilter, DefaultFilter, FilterOptions};
