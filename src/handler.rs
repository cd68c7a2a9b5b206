//! Handler trait and type erasure.
//!
//! The route table holds handlers of different concrete types in one
//! `HashMap<String, HashMap<String, _>>`, and middleware layers wrap them in
//! yet more types. Everything is stored behind one trait object,
//! `dyn ErasedHandler`, so a route's handler and a fully composed middleware
//! chain look the same to the caller.
//!
//! ```text
//! async fn user(req: Request) -> Response { … }    ← user writes this
//!        ↓ router.get("/user", user)
//! user.into_boxed_handler()                        ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(user))                        ← stored as BoxedHandler
//!        ↓
//! handler.call(req) at request time                ← one vtable dispatch
//!        ↓
//! Box::pin(async { user(req).await.into_response() })
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` so tokio can move it across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface shared by route handlers, middleware layers
/// and the routing endpoint.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any function with the shape:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// That includes `-> Result<Response, HttpError>`, which is how handlers
/// signal expected failures. The trait is sealed.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

impl private::Sealed for Endpoint {}

/// A composed chain is itself a handler and can be mounted on a route.
impl Handler for Endpoint {
    fn into_boxed_handler(self) -> BoxedHandler {
        self.inner
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Endpoint ──────────────────────────────────────────────────────────────────

/// A callable, type-erased handler.
///
/// Returned by [`Router::lookup`](crate::Router::lookup) for a matched route
/// and by [`compose`](crate::middleware::compose). Cloning is one `Arc`
/// increment.
#[derive(Clone)]
pub struct Endpoint {
    inner: BoxedHandler,
}

impl Endpoint {
    pub(crate) fn new(inner: BoxedHandler) -> Self {
        Self { inner }
    }

    /// Invokes the handler.
    ///
    /// The handler body first runs when the returned future is polled, so a
    /// panic anywhere in it surfaces from the future and not from this call.
    pub async fn call(&self, req: Request) -> Response {
        self.inner.call(req).await
    }

    /// `true` if both refer to the same registered handler.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint").finish_non_exhaustive()
    }
}
