//! Incoming HTTP request type.

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;

/// An incoming HTTP request.
///
/// The dispatch core only reads [`method`](Request::method) and
/// [`path`](Request::path); headers and body are carried for handlers.
/// Build one directly to drive a [`Service`](crate::Service) without a socket:
///
/// ```rust
/// use switchyard::Request;
///
/// let req = Request::new("POST", "/users")
///     .with_header("content-type", "application/json")
///     .with_body(r#"{"name":"alice"}"#);
/// assert_eq!(req.header("Content-Type"), Some("application/json"));
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Reads a hyper request to completion.
    ///
    /// Header values that are not visible ASCII are skipped.
    pub(crate) async fn from_hyper(req: hyper::Request<Incoming>) -> Result<Self, hyper::Error> {
        let (parts, body) = req.into_parts();
        let body = body.collect().await?.to_bytes();

        let headers = parts.headers.iter()
            .filter_map(|(k, v)| {
                v.to_str().ok().map(|v| (k.as_str().to_owned(), v.to_owned()))
            })
            .collect();

        Ok(Self {
            method: parts.method.as_str().to_owned(),
            path: parts.uri.path().to_owned(),
            headers,
            body,
        })
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
