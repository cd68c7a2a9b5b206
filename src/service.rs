//! The per-request entry point.
//!
//! A [`Service`] is a frozen [`Router`](crate::Router): the route table sits
//! at the bottom of the middleware chain as one more handler. A request runs
//! down through the layers, the table resolves it to exactly one of
//!
//! - the matched handler's response (including a returned `HttpError`),
//! - `405 Method Not Allowed` when no route exists for the method,
//! - `404 Not Found` when the method is known but the path is not,
//!
//! and the response unwinds back up through the layers. A panic is turned
//! into a 500 by [`Recover`](crate::middleware::Recover) if it is installed.

use std::sync::Arc;

use tracing::debug;

use crate::error::HttpError;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::{compose_boxed, Middleware};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::{Match, RouteTable};

/// A router with its middleware chain composed, ready to serve.
///
/// Shared read-only across all in-flight requests; wrap it in an `Arc` to
/// hand it to concurrent tasks.
///
/// ```rust
/// use switchyard::{Request, Response, Router};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let service = Router::new()
///     .get("/user", |_req: Request| async { Response::text("User information") })
///     .into_service();
///
/// let res = service.dispatch(Request::new("GET", "/user")).await;
/// assert_eq!(res.code(), 200);
/// assert_eq!(res.body(), b"User information");
/// # }
/// ```
pub struct Service {
    chain: BoxedHandler,
}

impl Service {
    pub(crate) fn new(table: RouteTable, layers: &[Arc<dyn Middleware>]) -> Self {
        let endpoint: BoxedHandler = Arc::new(Routes(table));
        Self { chain: compose_boxed(layers, endpoint) }
    }

    /// Runs one request through middleware, routing and the handler.
    pub async fn dispatch(&self, req: Request) -> Response {
        self.chain.call(req).await
    }
}

/// The innermost handler: resolves the route and either invokes it or
/// renders the routing error directly.
struct Routes(RouteTable);

impl ErasedHandler for Routes {
    fn call(&self, req: Request) -> BoxFuture {
        match self.0.lookup(req.method(), req.path()) {
            Match::Found(endpoint) => Box::pin(async move { endpoint.call(req).await }),
            Match::MethodNotRegistered => {
                debug!(method = %req.method(), path = %req.path(), "method not registered");
                Box::pin(async { HttpError::method_not_allowed().into_response() })
            }
            Match::PathNotFound => {
                debug!(method = %req.method(), path = %req.path(), "path not found");
                Box::pin(async { HttpError::not_found().into_response() })
            }
        }
    }
}
