//! Request parsing on top of [`httparse`].

use bytes::Bytes;
use thiserror::Error;

use super::{Headers, Method};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request headers are incomplete")]
    Incomplete,

    #[error("malformed request: {0}")]
    Parse(#[from] httparse::Error),

    #[error("request line has no {field}")]
    MissingField { field: &'static str },
}

/// A parsed HTTP/1.x request.
///
/// The path is exactly what the client put on the request line up to the
/// first `?`. It is neither percent-decoded nor cleaned; correcting it is
/// the router's job.
///
/// # Examples
///
/// ```
/// use radixroute::http::{Method, request::Request};
///
/// let raw = b"GET /src/lib.rs?plain HTTP/1.1\r\nHost: localhost:8080\r\n\r\n";
/// let (request, body_offset) = Request::parse(raw).unwrap();
///
/// assert_eq!(request.method(), &Method::Get);
/// assert_eq!(request.path(), "/src/lib.rs");
/// assert_eq!(request.query_string(), Some("plain"));
/// assert_eq!(request.host(), Some("localhost:8080"));
/// assert_eq!(body_offset, raw.len());
/// ```
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    minor_version: u8,
    headers: Headers,
    body: Bytes,
}

impl Request {
    const MAX_HEADERS: usize = 64;

    /// Parses one request from the front of `buf`.
    ///
    /// On success returns the request and the offset where its body starts.
    /// The body holds at most `Content-Length` bytes of what is already in
    /// `buf`; anything after it is left for the next pipelined request.
    ///
    /// # Errors
    ///
    /// [`RequestError::Incomplete`] until the header block has fully arrived,
    /// [`RequestError::Parse`] for malformed input and
    /// [`RequestError::MissingField`] if the request line is missing a part.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize), RequestError> {
        let mut slots = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut head = httparse::Request::new(&mut slots);

        let httparse::Status::Complete(body_offset) = head.parse(buf)? else {
            return Err(RequestError::Incomplete);
        };

        let method = head
            .method
            .map(Method::from_token)
            .ok_or(RequestError::MissingField { field: "method" })?;
        let target = head
            .path
            .ok_or(RequestError::MissingField { field: "path" })?;
        let minor_version = head
            .version
            .ok_or(RequestError::MissingField { field: "version" })?;

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (target, None),
        };

        let mut headers = Headers::with_capacity(head.headers.len());
        for field in head.headers.iter() {
            // Non-UTF-8 values are dropped; nothing here routes on them.
            if let Ok(value) = std::str::from_utf8(field.value) {
                headers.insert(field.name, value);
            }
        }

        let declared = headers
            .get("content-length")
            .and_then(|len| len.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let body_end = buf.len().min(body_offset + declared);

        let request = Self {
            method,
            path: path.to_owned(),
            query,
            minor_version,
            headers,
            body: Bytes::copy_from_slice(&buf[body_offset..body_end]),
        };
        Ok((request, body_offset))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path without its query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Everything after the first `?`, if the target had one.
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// First value of query parameter `key`, with `+` left undecoded.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .as_deref()?
            .split('&')
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// `0` for HTTP/1.0, `1` for HTTP/1.1.
    pub fn version(&self) -> u8 {
        self.minor_version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The `Host` header, ignoring an empty one.
    pub fn host(&self) -> Option<&str> {
        self.headers.get("host").filter(|host| !host.is_empty())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn content_length(&self) -> Option<usize> {
        self.headers.get("content-length")?.trim().parse().ok()
    }

    /// Whether the connection stays open after this request.
    ///
    /// An explicit `Connection` token wins; otherwise HTTP/1.1 keeps the
    /// connection and HTTP/1.0 closes it.
    pub fn is_keep_alive(&self) -> bool {
        let tokens = || {
            self.headers
                .get_all("connection")
                .flat_map(|value| value.split(','))
                .map(str::trim)
        };

        if tokens().any(|token| token.eq_ignore_ascii_case("close")) {
            false
        } else if tokens().any(|token| token.eq_ignore_ascii_case("keep-alive")) {
            true
        } else {
            self.minor_version == 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[u8]) -> Request {
        Request::parse(raw).unwrap().0
    }

    #[test]
    fn request_line_and_host() {
        let raw = b"DELETE /users/42 HTTP/1.1\r\nHost: api.example.com\r\n\r\n";
        let (request, body_offset) = Request::parse(raw).unwrap();

        assert_eq!(request.method(), &Method::Delete);
        assert_eq!(request.path(), "/users/42");
        assert_eq!(request.version(), 1);
        assert_eq!(request.host(), Some("api.example.com"));
        assert_eq!(request.query_string(), None);
        assert_eq!(body_offset, raw.len());
    }

    #[test]
    fn query_is_split_off_the_path() {
        let request = parse(b"GET /search?q=radix+tree&page=2&q=again&flag HTTP/1.1\r\n\r\n");

        assert_eq!(request.path(), "/search");
        assert_eq!(request.query_string(), Some("q=radix+tree&page=2&q=again&flag"));
        assert_eq!(request.query_param("q"), Some("radix+tree"));
        assert_eq!(request.query_param("page"), Some("2"));
        assert_eq!(request.query_param("flag"), Some(""));
        assert_eq!(request.query_param("missing"), None);
    }

    #[test]
    fn path_is_kept_raw() {
        let request = parse(b"GET /a//b/../C%20d HTTP/1.1\r\nHost:\r\n\r\n");
        assert_eq!(request.path(), "/a//b/../C%20d");
        assert_eq!(request.host(), None);
    }

    #[test]
    fn asterisk_target() {
        let request = parse(b"OPTIONS * HTTP/1.1\r\n\r\n");
        assert_eq!(request.method(), &Method::Options);
        assert_eq!(request.path(), "*");
    }

    #[test]
    fn extension_method() {
        let request = parse(b"PURGE /cache HTTP/1.1\r\n\r\n");
        assert_eq!(request.method(), &Method::Custom("PURGE".to_owned()));
    }

    #[test]
    fn partial_and_malformed_input() {
        assert!(matches!(
            Request::parse(b"GET / HTTP/1.1\r\nHost:"),
            Err(RequestError::Incomplete)
        ));
        assert!(matches!(
            Request::parse(b"NOT AN HTTP REQUEST\r\n\r\n"),
            Err(RequestError::Parse(_))
        ));
    }

    #[test]
    fn body_stops_at_content_length() {
        let raw = b"POST /echo HTTP/1.1\r\nContent-Length: 4\r\n\r\npingGET / HTTP/1.1\r\n\r\n";
        let (request, body_offset) = Request::parse(raw).unwrap();

        assert_eq!(request.content_length(), Some(4));
        assert_eq!(&request.body()[..], b"ping");
        assert_eq!(&raw[body_offset + 4..body_offset + 9], b"GET /");
    }

    #[test]
    fn no_content_length_means_empty_body() {
        let raw = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";
        let (request, body_offset) = Request::parse(raw).unwrap();

        assert!(request.body().is_empty());
        assert_eq!(&raw[body_offset..body_offset + 6], b"GET /b");
    }

    #[test]
    fn connection_persistence() {
        assert!(parse(b"GET / HTTP/1.1\r\n\r\n").is_keep_alive());
        assert!(!parse(b"GET / HTTP/1.0\r\n\r\n").is_keep_alive());
        assert!(parse(b"GET / HTTP/1.0\r\nConnection: Keep-Alive\r\n\r\n").is_keep_alive());
        assert!(!parse(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n").is_keep_alive());
        assert!(
            !parse(b"GET / HTTP/1.1\r\nConnection: keep-alive, close\r\n\r\n").is_keep_alive()
        );
    }
}
