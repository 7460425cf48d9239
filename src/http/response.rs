//! Responses built by handlers and by the router's own fallbacks.

use std::fmt::Write as _;

use bytes::{BufMut, BytesMut};

use super::{Headers, StatusCode};

const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// An HTTP/1.1 response.
///
/// Built by value with chained setters. `Content-Length` and `Connection`
/// are derived when the response is written, so handlers never set them.
///
/// # Examples
///
/// ```
/// use radixroute::http::{Response, StatusCode};
///
/// let response = Response::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body(r#"{"id":7}"#);
///
/// let wire = response.into_bytes();
/// let text = std::str::from_utf8(&wire).unwrap();
/// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
/// assert!(text.contains("Content-Length: 8\r\n"));
/// assert!(text.ends_with("\r\n\r\n{\"id\":7}"));
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
    keep_alive: bool,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
            keep_alive: true,
        }
    }

    /// A bodiless redirect to `location`.
    ///
    /// ```
    /// use radixroute::http::{Response, StatusCode};
    ///
    /// let response = Response::redirect(StatusCode::TemporaryRedirect, "/users");
    /// assert_eq!(response.status(), StatusCode::TemporaryRedirect);
    /// assert_eq!(response.headers().get("location"), Some("/users"));
    /// ```
    pub fn redirect(status: StatusCode, location: impl Into<String>) -> Self {
        let mut response = Self::new(status);
        response.set_header("Location", location);
        response
    }

    /// `status` with its reason phrase as a plain-text body.
    pub fn status_text(status: StatusCode) -> Self {
        Self::new(status).body(status.canonical_reason())
    }

    /// Adds a header; repeated names are kept.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces every value of `name` on an already built response.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    #[must_use]
    pub fn body(self, body: impl Into<String>) -> Self {
        self.body_bytes(body.into())
    }

    #[must_use]
    pub fn body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Chooses between `Connection: keep-alive` (the default) and `Connection: close`.
    #[must_use]
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body_slice(&self) -> &[u8] {
        &self.body
    }

    /// Writes the status line, headers and body in HTTP/1.1 wire format.
    ///
    /// A non-empty body without a `Content-Type` is labelled as UTF-8 text.
    /// `Content-Length` and `Connection` are computed here and replace any
    /// values a handler set.
    pub fn into_bytes(self) -> BytesMut {
        let Self {
            status,
            mut headers,
            body,
            keep_alive,
        } = self;

        if !body.is_empty() && !headers.contains("content-type") {
            headers.insert("Content-Type", DEFAULT_CONTENT_TYPE);
        }
        headers.set("Content-Length", body.len().to_string());
        headers.set("Connection", if keep_alive { "keep-alive" } else { "close" });

        let mut wire = BytesMut::with_capacity(64 + headers.len() * 32 + body.len());
        // Writing into a growable buffer cannot fail.
        let _ = write!(wire, "HTTP/1.1 {status}\r\n{headers}\r\n");
        wire.put_slice(&body);
        wire
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::Ok)
    }
}
