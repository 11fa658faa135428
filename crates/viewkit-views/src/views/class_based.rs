//! The base trait of class-based views.
//!
//! [`View`] dispatches on the HTTP method. Every handler defaults to
//! `405 Method Not Allowed` with an `Allow` header listing
//! [`View::allowed_methods`], so a view only implements the methods it
//! serves. [`View::as_view`] turns a view into a boxed handler function.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use viewkit_http::{HttpRequest, HttpResponse};

/// An async view handler function.
pub type ViewFunction =
    Box<dyn Fn(HttpRequest) -> Pin<Box<dyn Future<Output = HttpResponse> + Send>> + Send + Sync>;

/// A class-based view.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use viewkit_http::{HttpRequest, HttpResponse};
/// use viewkit_views::View;
///
/// struct Ping;
///
/// #[async_trait]
/// impl View for Ping {
///     fn allowed_methods(&self) -> Vec<http::Method> {
///         vec![http::Method::GET]
///     }
///
///     async fn get(&self, _request: HttpRequest) -> HttpResponse {
///         HttpResponse::ok("pong")
///     }
/// }
/// ```
#[async_trait]
pub trait View: Send + Sync {
    /// Returns the HTTP methods this view serves.
    fn allowed_methods(&self) -> Vec<http::Method> {
        vec![http::Method::GET, http::Method::HEAD, http::Method::OPTIONS]
    }

    /// Dispatches the request to the handler for its method.
    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        match *request.method() {
            http::Method::GET => self.get(request).await,
            http::Method::POST => self.post(request).await,
            http::Method::PUT => self.put(request).await,
            http::Method::DELETE => self.delete(request).await,
            http::Method::HEAD => self.head(request).await,
            http::Method::OPTIONS => self.options(request).await,
            _ => self.http_method_not_allowed(request).await,
        }
    }

    /// Handles GET requests. Returns 405 by default.
    async fn get(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    /// Handles POST requests. Returns 405 by default.
    async fn post(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    /// Handles PUT requests. Returns 405 by default.
    async fn put(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    /// Handles DELETE requests. Returns 405 by default.
    async fn delete(&self, request: HttpRequest) -> HttpResponse {
        self.http_method_not_allowed(request).await
    }

    /// Handles HEAD requests. Delegates to `get` with the body dropped.
    async fn head(&self, request: HttpRequest) -> HttpResponse {
        let response = self.get(request).await;
        let mut head = HttpResponse::new(response.status(), "");
        *head.headers_mut() = response.headers().clone();
        head.set_content_type(response.content_type().to_string());
        head
    }

    /// Handles OPTIONS requests with the list of allowed methods.
    async fn options(&self, _request: HttpRequest) -> HttpResponse {
        let methods = self.allowed_methods();
        let method_strs: Vec<&str> = methods.iter().map(http::Method::as_str).collect();
        let mut response = HttpResponse::ok("");
        if let Ok(value) = http::HeaderValue::from_str(&method_strs.join(", ")) {
            response.headers_mut().insert(http::header::ALLOW, value);
        }
        response
    }

    /// Returns 405 Method Not Allowed with the `Allow` header.
    async fn http_method_not_allowed(&self, request: HttpRequest) -> HttpResponse {
        tracing::debug!(method = %request.method(), path = request.path(), "method not allowed");
        let methods = self.allowed_methods();
        let method_strs: Vec<&str> = methods.iter().map(http::Method::as_str).collect();
        HttpResponse::not_allowed(&method_strs)
    }

    /// Converts this view into a handler function.
    #[allow(clippy::wrong_self_convention)]
    fn as_view(self) -> ViewFunction
    where
        Self: Sized + 'static,
    {
        let view = Arc::new(self);
        Box::new(move |request: HttpRequest| -> Pin<Box<dyn Future<Output = HttpResponse> + Send>> {
            let view = Arc::clone(&view);
            Box::pin(async move { view.dispatch(request).await })
        })
    }
}
