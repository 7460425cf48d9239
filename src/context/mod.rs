//! Per-request context: the request plus the path parameters a router bound.
//!
//! A [`Context`] owns the incoming [`Request`] together with the [`Parameters`]
//! extracted by the route match. Handlers receive the context by value and
//! answer with a [`Response`](crate::Response).

use std::fmt;

use crate::Request;

/// A single named wildcard value captured from the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub key: String,
    pub value: String,
}

/// Path parameters extracted from the matched route, in root-to-leaf order.
///
/// Keys are unique: inserting an existing key overwrites its value in place,
/// so the order of first insertion is kept.
///
/// # Examples
///
/// ```
/// use radixroute::context::Parameters;
///
/// let mut params = Parameters::new();
/// params.insert("user", "gopher");
/// params.insert("repo", "router");
///
/// assert_eq!(params.get("user"), Some("gopher"));
/// let keys: Vec<_> = params.iter().map(|p| p.key.as_str()).collect();
/// assert_eq!(keys, ["user", "repo"]);
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    inner: Vec<Param>,
}

impl Parameters {
    /// Create a new empty parameters map
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Vec::with_capacity(capacity),
        }
    }

    /// Insert a value, replacing the value of an existing key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.inner.iter_mut().find(|p| p.key == key) {
            Some(param) => param.value = value,
            None => self.inner.push(Param { key, value }),
        }
    }

    /// Get a value from the parameters map
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Get a mutable reference to a value from the parameters map
    pub fn get_mut(&mut self, key: &str) -> Option<&mut String> {
        self.inner
            .iter_mut()
            .find(|p| p.key == key)
            .map(|p| &mut p.value)
    }

    /// Remove a value from the parameters map
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.inner.iter().position(|p| p.key == key)?;
        Some(self.inner.remove(pos).value)
    }

    /// Moves every entry of `other` into `self`, overwriting duplicate keys.
    pub fn extend(&mut self, other: Parameters) {
        for Param { key, value } in other.inner {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Per-request handle passed to every handler.
pub struct Context {
    request: Request,
    params: Parameters,
}

impl Context {
    /// Create a new context from a request, with no parameters bound
    pub fn new(request: Request) -> Self {
        Self {
            request,
            params: Parameters::new(),
        }
    }

    /// Create a context with parameters already bound by a route match
    pub fn with_params(request: Request, params: Parameters) -> Self {
        Self { request, params }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    /// Shorthand for `ctx.params().get(key)`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    /// Give the request back, e.g. to hand it to another router.
    pub fn into_request(self) -> Request {
        self.request
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.request.method())
            .field("path", &self.request.path())
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request(path: &str) -> Request {
        let raw = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let (req, _) = Request::parse(raw.as_bytes()).unwrap();
        req
    }

    #[test]
    fn insert_overwrites_in_place() {
        let mut params = Parameters::new();
        params.insert("a", "1");
        params.insert("b", "2");
        params.insert("a", "3");
        let pairs: Vec<_> = params
            .iter()
            .map(|p| (p.key.as_str(), p.value.as_str()))
            .collect();
        assert_eq!(pairs, [("a", "3"), ("b", "2")]);
    }

    #[test]
    fn remove_and_get_mut() {
        let mut params: Parameters = [("id", "7"), ("slug", "x")].into_iter().collect();
        params.get_mut("id").unwrap().push('0');
        assert_eq!(params.get("id"), Some("70"));
        assert_eq!(params.remove("slug"), Some("x".to_owned()));
        assert_eq!(params.remove("slug"), None);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn context_binds_params() {
        let mut ctx = Context::new(make_request("/user/gopher"));
        assert!(ctx.params().is_empty());
        ctx.params_mut().extend([("name", "gopher")].into_iter().collect());
        assert_eq!(ctx.param("name"), Some("gopher"));
        assert_eq!(ctx.into_request().path(), "/user/gopher");
    }
}
