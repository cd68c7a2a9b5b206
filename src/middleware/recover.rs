use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tracing::error;

use super::{Middleware, Next};
use crate::error::HttpError;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::IntoResponse;

/// Panic recovery.
///
/// Runs the rest of the chain inside `catch_unwind`. A panic anywhere below
/// this layer becomes a plain `500 Internal Server Error`; the panic message
/// is logged and never sent to the client. Everything owned by the unwound
/// future is dropped during unwinding, so nothing held by the handler leaks.
///
/// Without this layer a panicking handler takes down its connection task.
/// Register it early (outermost, or just inside [`Logger`](super::Logger)) so
/// it also covers the other middleware.
#[derive(Clone, Copy, Debug, Default)]
pub struct Recover;

impl Middleware for Recover {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let method = req.method().to_owned();
        let path = req.path().to_owned();

        Box::pin(async move {
            match AssertUnwindSafe(next.run(req)).catch_unwind().await {
                Ok(res) => res,
                Err(panic) => {
                    error!(%method, %path, panic = panic_message(panic.as_ref()), "handler panicked");
                    HttpError::internal().into_response()
                }
            }
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::middleware::compose;
    use crate::Response;

    async fn explode(_req: Request) -> Response {
        panic!("secret detail");
    }

    #[tokio::test]
    async fn panic_becomes_500_without_detail() {
        let layers: [Arc<dyn Middleware>; 1] = [Arc::new(Recover)];
        let chain = compose(&layers, explode);

        let res = chain.call(Request::new("GET", "/boom")).await;
        assert_eq!(res.code(), 500);
        assert_eq!(res.body(), b"Internal Server Error");
    }

    #[tokio::test]
    async fn chain_keeps_serving_after_a_panic() {
        let layers: [Arc<dyn Middleware>; 1] = [Arc::new(Recover)];
        let chain = compose(&layers, |req: Request| async move {
            if req.path() == "/boom" {
                panic!("boom");
            }
            Response::text("fine")
        });

        assert_eq!(chain.call(Request::new("GET", "/boom")).await.code(), 500);
        assert_eq!(chain.call(Request::new("GET", "/ok")).await.code(), 200);
    }

    #[tokio::test]
    async fn ordinary_responses_are_untouched() {
        let layers: [Arc<dyn Middleware>; 1] = [Arc::new(Recover)];
        let chain = compose(&layers, |_req: Request| async {
            Err::<Response, _>(HttpError::new(400, "bad input"))
        });

        let res = chain.call(Request::new("GET", "/err")).await;
        assert_eq!(res.code(), 400);
        assert_eq!(res.body(), b"bad input");
    }

    #[test]
    fn extracts_string_payloads() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(7u8);

        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(other.as_ref()), "<non-string panic payload>");
    }
}
