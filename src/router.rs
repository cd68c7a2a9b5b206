//! Exact-match request router.
//!
//! Two nested hash lookups: method, then path. No patterns, no wildcards, no
//! trailing-slash normalisation. `/user` and `/user/` are different routes,
//! and so are `GET` and `get`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::handler::{BoxedHandler, Endpoint, Handler};
use crate::middleware::Middleware;
use crate::service::Service;

/// Outcome of a route lookup.
#[derive(Debug)]
pub enum Match {
    /// The handler registered for the exact (method, path) pair.
    Found(Endpoint),
    /// No route of any path exists for the method. Rendered as 405.
    MethodNotRegistered,
    /// The method has routes, but not this path. Rendered as 404.
    PathNotFound,
}

/// The frozen dispatch table: method → path → handler.
#[derive(Default)]
pub(crate) struct RouteTable {
    routes: HashMap<String, HashMap<String, BoxedHandler>>,
}

impl RouteTable {
    /// Inserts or replaces. Returns `true` if a handler was replaced.
    fn insert(&mut self, method: &str, path: &str, handler: BoxedHandler) -> bool {
        self.routes
            .entry(method.to_owned())
            .or_default()
            .insert(path.to_owned(), handler)
            .is_some()
    }

    pub(crate) fn lookup(&self, method: &str, path: &str) -> Match {
        let Some(paths) = self.routes.get(method) else {
            return Match::MethodNotRegistered;
        };
        match paths.get(path) {
            Some(handler) => Match::Found(Endpoint::new(Arc::clone(handler))),
            None => Match::PathNotFound,
        }
    }
}

/// The application router.
///
/// Register routes and middleware during setup, then hand the router to
/// [`Server::serve`](crate::Server::serve) or turn it into a
/// [`Service`] with [`into_service`](Router::into_service). Both consume the
/// router, so the table cannot change once requests are being served.
///
/// ```rust
/// use switchyard::middleware::{Logger, Recover};
/// use switchyard::{HttpError, Method, Request, Response, Router};
///
/// async fn user(_req: Request) -> Response {
///     Response::text("User information")
/// }
///
/// async fn create_user(req: Request) -> Result<Response, HttpError> {
///     if req.body().is_empty() {
///         return Err(HttpError::new(400, "bad input"));
///     }
///     Ok(Response::status(201))
/// }
///
/// let app = Router::new()
///     .layer(Logger)
///     .layer(Recover)
///     .get("/user", user)
///     .on(Method::Post, "/user", create_user)
///     .on("PURGE", "/cache", |_req: Request| async { "purged" });
/// ```
#[derive(Default)]
pub struct Router {
    table: RouteTable,
    layers: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for the exact `method` + `path` pair.
    ///
    /// Registering the same pair again replaces the earlier handler.
    ///
    /// # Panics
    ///
    /// Panics if `method` or `path` is empty.
    pub fn on(mut self, method: impl AsRef<str>, path: &str, handler: impl Handler) -> Self {
        let method = method.as_ref();
        assert!(!method.is_empty(), "route method must not be empty");
        assert!(!path.is_empty(), "route path must not be empty");

        if self.table.insert(method, path, handler.into_boxed_handler()) {
            debug!(%method, %path, "route replaced");
        }
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on("GET", path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on("POST", path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on("PUT", path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on("PATCH", path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on("DELETE", path, handler)
    }

    /// Appends a middleware. The first one added is the outermost.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Resolves a method + path pair without invoking anything.
    pub fn lookup(&self, method: &str, path: &str) -> Match {
        self.table.lookup(method, path)
    }

    /// Freezes the table and composes the middleware chain around it.
    pub fn into_service(self) -> Service {
        Service::new(self.table, &self.layers)
    }
}
