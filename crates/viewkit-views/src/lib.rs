//! # viewkit-views
//!
//! Class-based views and the mixins layered onto them.
//!
//! A view owns a [`MixinStack`]: an ordered list of [`ViewMixin`] stages that
//! intercept the view's lifecycle hooks (dispatch, queryset, context,
//! rendering, form handling). The bundled stages are:
//!
//! - [`ExtraContext`] - overlays a fixed mapping onto the template context
//! - [`NeverCache`] - marks every response as uncacheable
//! - [`CsvExport`] - answers `?export=csv` with a CSV download of the result set
//! - [`AjaxForm`] - answers AJAX form submissions with JSON
//! - [`DefaultFilter`] - default and request-driven queryset filtering
//!
//! Access guards live in `viewkit-auth`.

pub mod mixin;
pub mod mixins;
pub mod views;

pub use mixin::{Context, MixinStack, ViewMixin};
pub use mixins::{AjaxForm, AvailableFilter, CsvExport, DefaultFilter, ExtraContext, FilterOptions, NeverCache};
pub use views::{FormErrors, FormView, ListView, View, ViewFunction};
