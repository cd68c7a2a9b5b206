//! Middleware layer.
//!
//! A middleware wraps the rest of the chain. It receives the request and a
//! [`Next`] handle; it may inspect or replace the request, call
//! [`Next::run`] to continue, post-process the response, or return a response
//! without calling `next` at all to short-circuit.
//!
//! Layers registered first are outermost. Given `[A, B]` and handler `H`, a
//! request flows `A → B → H` and the response unwinds `H → B → A`.
//!
//! ```rust
//! use switchyard::middleware::{Logger, Next, Recover};
//! use switchyard::{Request, Response, Router};
//!
//! async fn deny_without_token(req: Request, next: Next) -> Response {
//!     if req.header("authorization").is_none() {
//!         return Response::status(401);
//!     }
//!     next.run(req).await
//! }
//!
//! let app = Router::new()
//!     .layer(Logger)
//!     .layer(Recover)
//!     .layer(deny_without_token)
//!     .get("/user", |_req: Request| async { "User information" });
//! ```
//!
//! Built-ins:
//! - [`Logger`]: one log line per request on the way in and one on the way out
//! - [`Recover`]: turns a panicking handler into a 500

mod logger;
mod recover;

use std::future::Future;
use std::sync::Arc;

pub use logger::Logger;
pub use recover::Recover;

use crate::handler::{BoxFuture, BoxedHandler, Endpoint, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// A request-handler decorator.
///
/// Implemented automatically for any `Fn(Request, Next) -> impl Future<Output = Response>`.
/// Implement it on a struct when the middleware carries configuration.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin((self)(req, next))
    }
}

/// The remainder of the chain below the current middleware.
#[derive(Clone)]
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    /// Runs the remaining layers and the handler.
    pub async fn run(self, req: Request) -> Response {
        self.inner.call(req).await
    }
}

/// Wraps `endpoint` in `layers`, first layer outermost.
///
/// Composition happens once; the returned [`Endpoint`] can be called for any
/// number of requests. Passing the same middleware twice wraps twice.
pub fn compose(layers: &[Arc<dyn Middleware>], endpoint: impl Handler) -> Endpoint {
    Endpoint::new(compose_boxed(layers, endpoint.into_boxed_handler()))
}

pub(crate) fn compose_boxed(layers: &[Arc<dyn Middleware>], endpoint: BoxedHandler) -> BoxedHandler {
    layers.iter().rev().fold(endpoint, |next, middleware| {
        Arc::new(Layer { middleware: Arc::clone(middleware), next })
    })
}

struct Layer {
    middleware: Arc<dyn Middleware>,
    next: BoxedHandler,
}

impl ErasedHandler for Layer {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Next { inner: Arc::clone(&self.next) };
        self.middleware.handle(req, next)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    type Trail = Arc<Mutex<Vec<String>>>;

    fn recorder(name: &'static str, trail: Trail) -> Arc<dyn Middleware> {
        Arc::new(move |req: Request, next: Next| {
            let trail = Arc::clone(&trail);
            async move {
                trail.lock().unwrap().push(format!("{name} in"));
                let res = next.run(req).await;
                trail.lock().unwrap().push(format!("{name} out"));
                res
            }
        })
    }

    #[tokio::test]
    async fn first_layer_is_outermost() {
        let trail = Trail::default();
        let handler_trail = Arc::clone(&trail);
        let handler = move |_req: Request| {
            let trail = Arc::clone(&handler_trail);
            async move {
                trail.lock().unwrap().push("H".to_owned());
                "done"
            }
        };

        let layers = [recorder("A", Arc::clone(&trail)), recorder("B", Arc::clone(&trail))];
        let chain = compose(&layers, handler);
        let res = chain.call(Request::new("GET", "/")).await;

        assert_eq!(res.body(), b"done");
        assert_eq!(*trail.lock().unwrap(), ["A in", "B in", "H", "B out", "A out"]);
    }

    #[tokio::test]
    async fn same_layer_twice_wraps_twice() {
        let trail = Trail::default();
        let a = recorder("A", Arc::clone(&trail));
        let chain = compose(&[Arc::clone(&a), a], |_req: Request| async { "ok" });
        chain.call(Request::new("GET", "/")).await;

        assert_eq!(*trail.lock().unwrap(), ["A in", "A in", "A out", "A out"]);
    }

    #[tokio::test]
    async fn short_circuit_skips_handler() {
        let gate: Arc<dyn Middleware> =
            Arc::new(|_req: Request, _next: Next| async { Response::status(401) });
        let chain = compose(&[gate], |_req: Request| async { "handler ran" });

        let res = chain.call(Request::new("GET", "/")).await;
        assert_eq!(res.code(), 401);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn no_layers_is_the_handler() {
        let chain = compose(&[], |req: Request| async move { req.path().to_owned() });
        assert_eq!(chain.call(Request::new("GET", "/plain")).await.body(), b"/plain");
    }
}
