//! # viewkit-http
//!
//! The request and response types view mixins operate on. [`HttpRequest`]
//! exposes query parameters, the AJAX flag, and server metadata;
//! [`HttpResponse`] and its helpers build the responses a view returns.

pub mod querydict;
pub mod request;
pub mod response;

pub use querydict::QueryDict;
pub use request::{HttpRequest, HttpRequestBuilder};
pub use response::{HttpResponse, HttpResponseRedirect, JsonResponse};
