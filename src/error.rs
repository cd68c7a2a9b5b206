//! Error types.
//!
//! Two kinds of failure live here and they never mix:
//!
//! - [`Error`] is for infrastructure: binding a port, reading configuration.
//!   It is returned from setup calls and never reaches a client.
//! - [`HttpError`] is for handlers: an HTTP status plus a message, rendered
//!   into a [`Response`](crate::Response) on the way out.

use http::StatusCode;

use crate::response::{IntoResponse, IntoStatus, Response};

/// The error type returned by switchyard's fallible setup operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] config::ConfigError),
}

/// An HTTP-level failure signalled by a handler.
///
/// Return it as the `Err` side of a handler result and it becomes a response
/// whose status is [`code`](HttpError::code) and whose body is the message:
///
/// ```rust
/// use switchyard::{HttpError, Request, Response};
///
/// async fn create(req: Request) -> Result<Response, HttpError> {
///     if req.body().is_empty() {
///         return Err(HttpError::new(400, "bad input"));
///     }
///     Ok(Response::text("created"))
/// }
/// ```
///
/// The code is not range-checked at construction. A code outside 200–599 is
/// sent to the client as 500 by the server, with the message kept as the body.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{code} {message}")]
pub struct HttpError {
    code: u16,
    message: String,
}

impl HttpError {
    /// Takes a bare number or an [`http::StatusCode`].
    pub fn new(code: impl IntoStatus, message: impl Into<String>) -> Self {
        Self { code: code.into_status(), message: message.into() }
    }

    /// `404 Not Found`: the method is known but the path is not.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }

    /// `405 Method Not Allowed`: no route exists for the method at all.
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    }

    /// `500 Internal Server Error`. Carries no detail about the cause.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    pub fn code(&self) -> u16 { self.code }
    pub fn message(&self) -> &str { &self.message }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = if self.message.is_empty() {
            StatusCode::from_u16(self.code)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Error")
                .to_owned()
        } else {
            self.message
        };
        Response::builder().status(self.code).text(body)
    }
}
