//! # switchyard
//!
//! The request-dispatch core of a small HTTP framework: an exact-match
//! router, an ordered middleware chain, and a typed error for handlers.
//!
//! ## How a request flows
//!
//! ```text
//! transport ─▶ Logger ─▶ Recover ─▶ … ─▶ route table ─▶ handler
//!                                          │
//!                                          ├─ method unknown → 405
//!                                          └─ path unknown   → 404
//! ```
//!
//! The response unwinds back through the same layers in reverse. Handlers
//! signal expected failures by returning [`HttpError`]; unexpected panics are
//! caught by [`middleware::Recover`] and become a 500.
//!
//! What switchyard does not do: path parameters or wildcards, content
//! negotiation, TLS, graceful shutdown.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use switchyard::middleware::{Logger, Recover};
//! use switchyard::{HttpError, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), switchyard::Error> {
//!     let app = Router::new()
//!         .layer(Logger)
//!         .layer(Recover)
//!         .get("/user", user)
//!         .post("/user", create_user);
//!
//!     Server::bind("0.0.0.0:3000".parse().unwrap()).await?.serve(app).await
//! }
//!
//! async fn user(_req: Request) -> Response {
//!     Response::text("User information")
//! }
//!
//! async fn create_user(req: Request) -> Result<Response, HttpError> {
//!     if req.body().is_empty() {
//!         return Err(HttpError::new(400, "bad input"));
//!     }
//!     Ok(Response::status(201))
//! }
//! ```

mod config;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod service;

pub mod middleware;

pub use crate::config::Config;
pub use error::{Error, HttpError};
pub use handler::{BoxFuture, Endpoint, Handler};
pub use http::StatusCode;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, IntoStatus, Response, ResponseBuilder};
pub use router::{Match, Router};
pub use server::Server;
pub use service::Service;
