//! Request routing: map HTTP methods and URL paths to handler functions.
//!
//! Each method gets its own radix [`Tree`]. A path may contain two kinds of
//! wildcards:
//!
//! | Pattern               | Example match              | Captured params                   |
//! |-----------------------|----------------------------|-----------------------------------|
//! | `/users`              | `/users`                   | *(none)*                          |
//! | `/users/:id`          | `/users/42`                | `id → "42"`                       |
//! | `/files/*filepath`    | `/files/docs/readme.txt`   | `filepath → "/docs/readme.txt"`   |
//!
//! Routes never overlap: a request path matches at most one route per
//! method, so registration order does not matter. Conflicting patterns are
//! rejected when they are registered.
//!
//! When nothing matches, the [`Router`] tries, in order: a trailing-slash
//! redirect, a redirect to the cleaned and case-corrected path, an automatic
//! `OPTIONS` reply, a `405 Method Not Allowed`, and finally the not-found
//! handler. [`RouterConfig`] switches each of the first four off.

mod config;
mod error;
mod path;
mod tree;

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, error};

use crate::context::Context;
use crate::fs::ServeDir;
use crate::{Method, Request, Response, StatusCode};

pub use config::RouterConfig;
pub use error::RegistrationError;
pub use path::clean_path;
pub use tree::{Lookup, Tree};

/// Type-erased, heap-allocated async handler that processes a [`Context`] and returns a
/// [`Response`].
///
/// Handlers are stored behind `Arc<dyn Fn(…)>` so they can be cloned and shared across
/// threads without copying the underlying closure. In practice you never construct this
/// type directly; [`Router::get`], [`Router::post`] and the other method helpers erase
/// the closure for you.
pub type Handler =
    Arc<dyn Fn(Context) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync + 'static>;

/// Called with the captured panic when a handler panics. See [`Router::panic_handler`].
pub type PanicHandler = Arc<dyn Fn(HandlerPanic) -> Response + Send + Sync + 'static>;

/// Conversion trait for async handler functions.
///
/// Any `Fn(Context) -> impl Future<Output = Response> + Send` that is also
/// `Send + Sync + 'static` implements this trait automatically via the blanket impl
/// below.
pub trait IntoHandler: Send + Sync + 'static {
    /// Call the handler with the given context, boxing the returned future.
    fn call(&self, ctx: Context) -> Pin<Box<dyn Future<Output = Response> + Send>>;
}

impl<T, F> IntoHandler for T
where
    T: Fn(Context) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    fn call(&self, ctx: Context) -> Pin<Box<dyn Future<Output = Response> + Send>> {
        Box::pin((self)(ctx))
    }
}

fn erase(handler: impl IntoHandler) -> Handler {
    Arc::new(move |ctx| handler.call(ctx))
}

/// A panic caught while a handler was running.
pub struct HandlerPanic {
    method: Method,
    path: String,
    payload: Box<dyn Any + Send>,
}

impl HandlerPanic {
    /// Method of the request whose handler panicked.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path of the request whose handler panicked.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The panic message, if the payload was a string.
    pub fn message(&self) -> Option<&str> {
        self.payload
            .downcast_ref::<&'static str>()
            .copied()
            .or_else(|| self.payload.downcast_ref::<String>().map(String::as_str))
    }

    /// The raw value passed to `panic!`, e.g. for `std::panic::resume_unwind`.
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
    }
}

impl fmt::Debug for HandlerPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerPanic")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("message", &self.message())
            .finish()
    }
}

/// HTTP request router dispatching to handlers stored in per-method radix trees.
///
/// Build the router with `&mut self` registration calls, then share it
/// (for example through [`Server::serve`](crate::Server::serve)). Routing
/// takes `&self`, so any number of requests can be dispatched at once.
///
/// # Examples
///
/// ```rust,no_run
/// use radixroute::{Context, Router, Response, StatusCode};
///
/// let mut router = Router::new();
///
/// router.get("/ping", |_ctx: Context| async { Response::new(StatusCode::Ok) });
///
/// router.get("/users/:id", |ctx: Context| async move {
///     let id = ctx.param("id").unwrap_or("unknown").to_owned();
///     Response::new(StatusCode::Ok).body(id)
/// });
///
/// router.serve_files("/static/*filepath", "./public");
/// ```
pub struct Router {
    // Kept in registration order; `Allow` lists methods in this order.
    trees: Vec<(Method, Tree<Handler>)>,
    routes: usize,
    config: RouterConfig,
    not_found: Option<Handler>,
    method_not_allowed: Option<Handler>,
    panic_handler: Option<PanicHandler>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a new, empty `Router` with every fallback behavior enabled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixroute::Router;
    ///
    /// let router = Router::new();
    /// assert!(router.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create an empty router with the given fallback policy.
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            trees: Vec::new(),
            routes: 0,
            config,
            not_found: None,
            method_not_allowed: None,
            panic_handler: None,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RouterConfig {
        &mut self.config
    }

    /// Register `handler` for `method` requests matching `path`.
    ///
    /// # Panics
    ///
    /// If `path` is rejected; see [`try_handle`](Self::try_handle) for the reasons.
    pub fn handle(&mut self, method: Method, path: &str, handler: impl IntoHandler) {
        if let Err(err) = self.try_handle(method, path, handler) {
            panic!("{err}");
        }
    }

    /// Register `handler` for `method` requests matching `path`.
    ///
    /// On error nothing is registered and the router is left exactly as it
    /// was, so a corrected path can be registered afterwards.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] if `path` does not start with `/`, is
    /// already registered for `method`, has a malformed wildcard, or
    /// conflicts with a wildcard or static route registered before.
    pub fn try_handle(
        &mut self,
        method: Method,
        path: &str,
        handler: impl IntoHandler,
    ) -> Result<(), RegistrationError> {
        self.insert(method, path, erase(handler))
    }

    fn insert(&mut self, method: Method, path: &str, handler: Handler) -> Result<(), RegistrationError> {
        match self.trees.iter_mut().find(|(m, _)| *m == method) {
            Some((_, tree)) => tree.insert(path, handler)?,
            None => {
                let mut tree = Tree::new();
                tree.insert(path, handler)?;
                self.trees.push((method, tree));
            }
        }
        self.routes += 1;
        Ok(())
    }

    /// Register a handler for `GET` requests matching `path`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use radixroute::{Context, Router, Response, StatusCode};
    ///
    /// let mut router = Router::new();
    /// router.get("/hello", |_ctx: Context| async { Response::new(StatusCode::Ok) });
    /// ```
    pub fn get(&mut self, path: &str, handler: impl IntoHandler) {
        self.handle(Method::Get, path, handler);
    }

    /// Register a handler for `HEAD` requests matching `path`.
    pub fn head(&mut self, path: &str, handler: impl IntoHandler) {
        self.handle(Method::Head, path, handler);
    }

    /// Register a handler for `OPTIONS` requests matching `path`.
    ///
    /// A registered `OPTIONS` handler replaces the automatic reply for its path.
    pub fn options(&mut self, path: &str, handler: impl IntoHandler) {
        self.handle(Method::Options, path, handler);
    }

    /// Register a handler for `POST` requests matching `path`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use radixroute::{Context, Router, Response, StatusCode};
    ///
    /// let mut router = Router::new();
    /// router.post("/users", |_ctx: Context| async { Response::new(StatusCode::Created) });
    /// ```
    pub fn post(&mut self, path: &str, handler: impl IntoHandler) {
        self.handle(Method::Post, path, handler);
    }

    /// Register a handler for `PUT` requests matching `path`.
    pub fn put(&mut self, path: &str, handler: impl IntoHandler) {
        self.handle(Method::Put, path, handler);
    }

    /// Register a handler for `PATCH` requests matching `path`.
    pub fn patch(&mut self, path: &str, handler: impl IntoHandler) {
        self.handle(Method::Patch, path, handler);
    }

    /// Register a handler for `DELETE` requests matching `path`.
    pub fn delete(&mut self, path: &str, handler: impl IntoHandler) {
        self.handle(Method::Delete, path, handler);
    }

    /// Serve files from the `root` directory under `path`.
    ///
    /// `path` must end in `/*filepath`; the captured `filepath` is resolved
    /// inside `root`. A request for `/src/css/site.css` on
    /// `/src/*filepath` reads `root/css/site.css`.
    ///
    /// # Panics
    ///
    /// If `path` does not end in `/*filepath` or cannot be registered.
    pub fn serve_files(&mut self, path: &str, root: impl Into<PathBuf>) {
        if let Err(err) = self.try_serve_files(path, root) {
            panic!("{err}");
        }
    }

    /// Non-panicking form of [`serve_files`](Self::serve_files).
    ///
    /// # Errors
    ///
    /// [`RegistrationError::MissingFilepath`] if `path` does not end in
    /// `/*filepath`, otherwise the same errors as [`try_handle`](Self::try_handle).
    pub fn try_serve_files(&mut self, path: &str, root: impl Into<PathBuf>) -> Result<(), RegistrationError> {
        if !path.ends_with("/*filepath") {
            return Err(RegistrationError::MissingFilepath {
                path: path.to_owned(),
            });
        }

        let dir = Arc::new(ServeDir::new(root));
        self.try_handle(Method::Get, path, move |ctx: Context| {
            let dir = Arc::clone(&dir);
            async move { dir.serve(ctx.param("filepath").unwrap_or("/")).await }
        })
    }

    /// Handler for requests no route matches. Defaults to a plain `404 Not Found`.
    ///
    /// Another router can be installed here with [`into_handler`](Self::into_handler).
    pub fn not_found(&mut self, handler: impl IntoHandler) {
        self.not_found = Some(erase(handler));
    }

    /// Handler for paths that exist only for other methods. Defaults to a
    /// plain `405 Method Not Allowed`. The `Allow` header is set on whatever
    /// it returns.
    pub fn method_not_allowed(&mut self, handler: impl IntoHandler) {
        self.method_not_allowed = Some(erase(handler));
    }

    /// Recover from panicking handlers by answering with `handler`.
    ///
    /// Without a panic handler a panic propagates to the caller of
    /// [`route`](Self::route).
    pub fn panic_handler(&mut self, handler: impl Fn(HandlerPanic) -> Response + Send + Sync + 'static) {
        self.panic_handler = Some(Arc::new(handler));
    }

    /// Return the number of routes registered across all methods.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use radixroute::{Context, Router, Response, StatusCode};
    ///
    /// let mut router = Router::new();
    /// assert_eq!(router.len(), 0);
    /// router.get("/a", |_ctx: Context| async { Response::new(StatusCode::Ok) });
    /// router.post("/a", |_ctx: Context| async { Response::new(StatusCode::Ok) });
    /// assert_eq!(router.len(), 2);
    /// ```
    pub fn len(&self) -> usize {
        self.routes
    }

    /// Return `true` if no routes have been registered.
    pub fn is_empty(&self) -> bool {
        self.routes == 0
    }

    fn tree(&self, method: &Method) -> Option<&Tree<Handler>> {
        self.trees
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, tree)| tree)
    }

    /// Resolve `method` and `path` without running any fallback policy.
    ///
    /// On a match the route's parameters are bound into `ctx` and the handler
    /// is returned. On a miss the second value tells whether the path with
    /// its trailing slash toggled would match.
    pub fn lookup(&self, method: &Method, path: &str, ctx: &mut Context) -> (Option<Handler>, bool) {
        let Some(tree) = self.tree(method) else {
            return (None, false);
        };

        let found = tree.get(path);
        match found.value {
            Some(handler) => {
                ctx.params_mut().extend(found.params);
                (Some(Arc::clone(handler)), false)
            }
            None => (None, found.tsr),
        }
    }

    /// Dispatch `request` to its handler or to the fallback policy.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use radixroute::{Context, Router, Response, StatusCode};
    ///
    /// # async fn example(request: radixroute::Request) {
    /// let mut router = Router::new();
    /// router.get("/ping", |_ctx: Context| async { Response::new(StatusCode::Ok) });
    ///
    /// let response = router.route(request).await;
    /// assert_eq!(response.status(), StatusCode::Ok);
    /// # }
    /// ```
    pub async fn route(&self, request: Request) -> Response {
        let method = request.method();
        let path = match request.path() {
            "" => "/",
            path => path,
        };

        if let Some(tree) = self.tree(method) {
            let found = tree.get(path);
            if let Some(handler) = found.value {
                let ctx = Context::with_params(request, found.params);
                return self.call(handler, ctx).await;
            }

            if *method != Method::Connect && path != "/" {
                if found.tsr && self.config.redirect_trailing_slash {
                    let target = match path.strip_suffix('/') {
                        Some(trimmed) => trimmed.to_owned(),
                        None => format!("{path}/"),
                    };
                    return redirect(&request, target);
                }

                if self.config.redirect_fixed_path {
                    let fixed = tree
                        .find_case_insensitive_path(&clean_path(path), self.config.redirect_trailing_slash)
                        .filter(|fixed| !fixed.is_empty());
                    if let Some(fixed) = fixed {
                        return redirect(&request, fixed);
                    }
                }
            }
        }

        if *method == Method::Options {
            if self.config.handle_options {
                if let Some(allow) = self.allowed(path, method) {
                    debug!(path, allow = %allow, "answering OPTIONS");
                    return Response::new(StatusCode::Ok).header("Allow", allow);
                }
            }
        } else if self.config.handle_method_not_allowed {
            if let Some(allow) = self.allowed(path, method) {
                debug!(method = %method, path, allow = %allow, "method not allowed");
                let mut response = match &self.method_not_allowed {
                    Some(handler) => self.call(handler, Context::new(request)).await,
                    None => Response::status_text(StatusCode::MethodNotAllowed),
                };
                response.set_header("Allow", allow);
                return response;
            }
        }

        debug!(method = %method, path, "no route");
        match &self.not_found {
            Some(handler) => self.call(handler, Context::new(request)).await,
            None => Response::status_text(StatusCode::NotFound),
        }
    }

    // Comma-separated methods that accept `path`, ending in OPTIONS, or
    // `None` if no other method does. `*` and `/*` ask about the whole
    // server.
    fn allowed(&self, path: &str, requested: &Method) -> Option<String> {
        let server_wide = path == "*" || path == "/*";

        let mut allow: Vec<&str> = self
            .trees
            .iter()
            .filter(|(method, tree)| {
                *method != Method::Options
                    && (server_wide || (method != requested && tree.has_route(path)))
            })
            .map(|(method, _)| method.as_str())
            .collect();

        if allow.is_empty() {
            return None;
        }
        allow.push(Method::Options.as_str());
        Some(allow.join(", "))
    }

    async fn call(&self, handler: &Handler, ctx: Context) -> Response {
        let Some(panic_handler) = &self.panic_handler else {
            return handler(ctx).await;
        };

        let method = ctx.request().method().clone();
        let path = ctx.request().path().to_owned();

        // The closure call is inside the future so synchronous panics are caught too.
        match AssertUnwindSafe(async move { handler(ctx).await })
            .catch_unwind()
            .await
        {
            Ok(response) => response,
            Err(payload) => {
                let panic = HandlerPanic {
                    method,
                    path,
                    payload,
                };
                error!(
                    method = %panic.method,
                    path = %panic.path,
                    reason = panic.message().unwrap_or("<non-string payload>"),
                    "handler panicked"
                );
                panic_handler(panic)
            }
        }
    }

    /// Turn the whole router into a handler, e.g. to chain it behind another
    /// router's [`not_found`](Self::not_found).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use radixroute::{Context, Router, Response, StatusCode};
    ///
    /// let mut api = Router::new();
    /// api.get("/api/users", |_ctx: Context| async { Response::new(StatusCode::Ok) });
    ///
    /// let mut site = Router::new();
    /// site.get("/", |_ctx: Context| async { Response::new(StatusCode::Ok) });
    /// site.not_found(api.into_handler());
    /// ```
    pub fn into_handler(self) -> impl IntoHandler {
        let router = Arc::new(self);
        move |ctx: Context| {
            let router = Arc::clone(&router);
            async move { router.route(ctx.into_request()).await }
        }
    }
}

fn redirect(request: &Request, mut target: String) -> Response {
    if let Some(query) = request.query_string().filter(|query| !query.is_empty()) {
        target.push('?');
        target.push_str(query);
    }

    let location = match request.host() {
        Some(host) => format!("http://{host}{target}"),
        None => target,
    };

    let status = request.method().redirect_status();
    debug!(from = %request.path(), location = %location, status = %status, "redirecting");
    Response::redirect(status, location)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::request::Request;

    fn make_request(method: &str, path: &str) -> Request {
        let raw = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let (req, _) = Request::parse(raw.as_bytes()).unwrap();
        req
    }

    fn ok(_ctx: Context) -> impl Future<Output = Response> + Send {
        async { Response::new(StatusCode::Ok) }
    }

    async fn boom(_ctx: Context) -> Response {
        panic!("oops!");
    }

    #[test]
    fn router_starts_empty() {
        let router = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
        assert_eq!(*router.config(), RouterConfig::default());
    }

    #[test]
    fn router_len_counts_every_method() {
        let mut router = Router::new();
        router.get("/a", ok);
        router.post("/a", ok);
        router.get("/b", ok);
        assert_eq!(router.len(), 3);
        assert!(!router.is_empty());
    }

    #[test]
    #[should_panic(expected = "path must begin with '/' in path 'noSlash'")]
    fn registration_without_leading_slash_panics() {
        let mut router = Router::new();
        router.get("noSlash", ok);
    }

    #[test]
    #[should_panic(expected = "a handler is already registered for path '/dup'")]
    fn duplicate_registration_panics() {
        let mut router = Router::new();
        router.get("/dup", ok);
        router.get("/dup", ok);
    }

    #[test]
    fn failed_registration_leaves_router_unchanged() {
        let mut router = Router::new();
        let err = router.try_handle(Method::Put, "bad", ok).unwrap_err();
        assert_eq!(err.path(), "bad");
        assert!(router.is_empty());
        assert!(router.trees.is_empty());

        router.try_handle(Method::Put, "/bad", ok).unwrap();
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn serve_files_requires_filepath_suffix() {
        let mut router = Router::new();
        assert_eq!(
            router.try_serve_files("/noFilepath", "/tmp"),
            Err(RegistrationError::MissingFilepath {
                path: "/noFilepath".to_owned()
            })
        );
        assert!(router.try_serve_files("/files/*filepath", "/tmp").is_ok());
    }

    #[tokio::test]
    async fn router_empty_returns_404() {
        let router = Router::new();
        let res = router.route(make_request("GET", "/")).await;
        assert_eq!(res.status(), StatusCode::NotFound);
        assert_eq!(res.body_slice(), b"Not Found");
    }

    #[tokio::test]
    async fn router_binds_params() {
        let mut router = Router::new();
        router.get("/user/:name", |ctx: Context| async move {
            let name = ctx.param("name").unwrap_or_default().to_owned();
            Response::new(StatusCode::Ok).body(name)
        });

        let res = router.route(make_request("GET", "/user/gopher")).await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.body_slice(), b"gopher");
    }

    #[tokio::test]
    async fn router_method_variants_registered() {
        let mut router = Router::new();
        router.get("/r", |_ctx: Context| async { Response::new(StatusCode::Ok) });
        router.head("/r", |_ctx: Context| async { Response::new(StatusCode::NoContent) });
        router.post("/r", |_ctx: Context| async { Response::new(StatusCode::Created) });
        router.put("/r", |_ctx: Context| async { Response::new(StatusCode::Accepted) });
        router.patch("/r", |_ctx: Context| async { Response::new(StatusCode::PartialContent) });
        router.delete("/r", |_ctx: Context| async { Response::new(StatusCode::Gone) });
        router.options("/r", |_ctx: Context| async { Response::new(StatusCode::Conflict) });
        router.handle(Method::Custom("PURGE".into()), "/r", |_ctx: Context| async {
            Response::new(StatusCode::Forbidden)
        });
        assert_eq!(router.len(), 8);

        let expected = [
            ("GET", StatusCode::Ok),
            ("HEAD", StatusCode::NoContent),
            ("POST", StatusCode::Created),
            ("PUT", StatusCode::Accepted),
            ("PATCH", StatusCode::PartialContent),
            ("DELETE", StatusCode::Gone),
            ("OPTIONS", StatusCode::Conflict),
            ("PURGE", StatusCode::Forbidden),
        ];
        for (method, status) in expected {
            let res = router.route(make_request(method, "/r")).await;
            assert_eq!(res.status(), status, "{method} /r");
        }
    }

    #[tokio::test]
    async fn lookup_binds_params_into_context() {
        let mut router = Router::new();
        router.get("/user/:name", |ctx: Context| async move {
            Response::new(StatusCode::Ok).body(ctx.param("name").unwrap_or_default().to_owned())
        });

        let mut ctx = Context::new(make_request("GET", "/user/gopher"));
        let (handler, tsr) = router.lookup(&Method::Get, "/user/gopher", &mut ctx);
        assert!(!tsr);
        assert_eq!(ctx.param("name"), Some("gopher"));
        let handler = handler.expect("route should match");
        let res = handler(ctx).await;
        assert_eq!(res.body_slice(), b"gopher");

        let mut ctx = Context::new(make_request("GET", "/user/gopher/"));
        let (handler, tsr) = router.lookup(&Method::Get, "/user/gopher/", &mut ctx);
        assert!(handler.is_none());
        assert!(tsr);
        assert!(ctx.params().is_empty());

        let (handler, tsr) = router.lookup(&Method::Post, "/user/gopher", &mut ctx);
        assert!(handler.is_none());
        assert!(!tsr);
    }

    #[test]
    fn allowed_lists_other_methods_then_options() {
        let mut router = Router::new();
        router.post("/path", ok);
        router.delete("/path", ok);
        router.options("/path", ok);
        router.get("/other", ok);

        assert_eq!(
            router.allowed("/path", &Method::Get).as_deref(),
            Some("POST, DELETE, OPTIONS")
        );
        assert_eq!(
            router.allowed("/path", &Method::Post).as_deref(),
            Some("DELETE, OPTIONS")
        );
        assert_eq!(router.allowed("/nowhere", &Method::Get), None);
        assert_eq!(
            router.allowed("*", &Method::Options).as_deref(),
            Some("POST, DELETE, GET, OPTIONS")
        );
        assert_eq!(router.allowed("/*", &Method::Options), router.allowed("*", &Method::Options));
    }

    #[tokio::test]
    async fn connect_never_redirects() {
        let mut router = Router::new();
        router.handle(Method::Connect, "/tunnel/", ok);

        let res = router.route(make_request("CONNECT", "/tunnel")).await;
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn panic_handler_receives_payload() {
        let seen = Arc::new(Mutex::new(None));

        let mut router = Router::new();
        router.put("/user/:name", boom);
        let recorder = Arc::clone(&seen);
        router.panic_handler(move |panic: HandlerPanic| {
            *recorder.lock().unwrap() = panic.message().map(str::to_owned);
            assert_eq!(panic.method(), &Method::Put);
            assert_eq!(panic.path(), "/user/gopher");
            Response::new(StatusCode::InternalServerError)
        });

        let res = router.route(make_request("PUT", "/user/gopher")).await;
        assert_eq!(res.status(), StatusCode::InternalServerError);
        assert_eq!(seen.lock().unwrap().as_deref(), Some("oops!"));
    }

    #[tokio::test]
    async fn panic_in_synchronous_handler_body_is_caught() {
        fn eager(_ctx: Context) -> std::future::Ready<Response> {
            panic!("before the future exists");
        }

        let mut router = Router::new();
        router.get("/eager", eager);
        router.panic_handler(|panic| {
            Response::new(StatusCode::InternalServerError)
                .body(panic.message().unwrap_or_default().to_owned())
        });

        let res = router.route(make_request("GET", "/eager")).await;
        assert_eq!(res.status(), StatusCode::InternalServerError);
        assert_eq!(res.body_slice(), b"before the future exists");
    }

    #[test]
    fn handler_panic_message_formats() {
        let panic = HandlerPanic {
            method: Method::Get,
            path: "/".to_owned(),
            payload: Box::new(format!("code {}", 7)),
        };
        assert_eq!(panic.message(), Some("code 7"));

        let panic = HandlerPanic {
            method: Method::Get,
            path: "/".to_owned(),
            payload: Box::new(42_u8),
        };
        assert_eq!(panic.message(), None);
        assert!(format!("{panic:?}").contains("HandlerPanic"));
        assert_eq!(panic.into_payload().downcast_ref::<u8>(), Some(&42));
    }
}
