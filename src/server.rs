//! HTTP transport.
//!
//! Binds a TCP listener and drives a [`Service`] with hyper. Each connection
//! runs on its own tokio task, so requests execute concurrently; within one
//! request everything is sequential. Handlers are async and may await I/O
//! for as long as they need.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{Error, HttpError};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;
use crate::service::Service;

/// The HTTP server.
///
/// ```rust,no_run
/// use switchyard::{Config, Request, Router, Server};
///
/// #[tokio::main]
/// async fn main() -> Result<(), switchyard::Error> {
///     let config = Config::from_env()?;
///     let app = Router::new().get("/user", |_req: Request| async { "User information" });
///
///     Server::bind(config.addr).await?.serve(app).await
/// }
/// ```
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Binds the listening socket. Use port 0 to let the OS pick one.
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// Binds to the address in `config`.
    pub async fn from_config(config: &Config) -> Result<Self, Error> {
        Self::bind(config.addr).await
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections and dispatches every request through `router`.
    ///
    /// Runs until the process exits. Accept errors are logged and skipped.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        // Compose once, then share the frozen chain across every connection
        // task. Each task holds one Arc clone, never a copy of the table.
        let service = Arc::new(router.into_service());
        let addr = self.local_addr()?;

        info!(%addr, "switchyard listening");

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(v) => v,
                Err(e) => {
                    // Usually transient (EMFILE, a reset during handshake).
                    // One bad accept must not stop the server.
                    error!("accept error: {e}");
                    continue;
                }
            };

            let service = Arc::clone(&service);
            // TokioIo adapts tokio's AsyncRead/AsyncWrite to the hyper IO
            // traits.
            let io = TokioIo::new(stream);

            // One task per connection. Requests on different connections run
            // in parallel with no ordering between them.
            tokio::spawn(async move {
                // `service_fn` turns a plain async function into a hyper
                // `Service`. The closure is called once per request on the
                // connection, not once per connection.
                let svc = service_fn(move |req| {
                    let service = Arc::clone(&service);
                    async move { handle(&service, req).await }
                });

                // `auto::Builder` serves HTTP/1.1 and HTTP/2, whichever the
                // client speaks.
                if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                    .serve_connection(io, svc)
                    .await
                {
                    error!(%peer, "connection error: {e}");
                }
            });
        }
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Converts one hyper request, dispatches it and converts the response back.
///
/// The error type is [`Infallible`]: every outcome is already a response by
/// the time it gets here, so hyper never sees an error.
///
/// A body that cannot be read never becomes a [`Request`], so it is answered
/// with 400 here, outside the middleware chain: [`Logger`](crate::middleware::Logger)
/// and any other layer do not see it. [`rejected_body`] logs it instead.
async fn handle(
    service: &Service,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = match Request::from_hyper(req).await {
        Ok(req) => service.dispatch(req).await,
        Err(e) => rejected_body(method.as_str(), &path, &e),
    };
    Ok(response.into_hyper())
}

/// The 400 sent when the request body could not be read off the connection.
fn rejected_body(method: &str, path: &str, err: &dyn std::error::Error) -> Response {
    warn!(%method, %path, "failed to read request body: {err}");
    HttpError::new(400, "Bad Request").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_body_is_a_400_with_a_body() {
        let err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection reset");
        let res = rejected_body("POST", "/upload", &err);

        assert_eq!(res.code(), 400);
        assert_eq!(res.body(), b"Bad Request");
    }
}
