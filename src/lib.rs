//! # radixroute
//!
//! A radix-tree HTTP request router for async Rust, with a small Tokio
//! HTTP/1.1 server to run it on.
//!
//! Routes are stored in one compressed prefix tree per method, so a lookup
//! costs a single pass over the request path no matter how many routes are
//! registered. Near misses are recovered instead of answered with 404:
//! `/users/` redirects to `/users`, `/USERS` redirects to `/users`, a path
//! registered only for `POST` answers `GET` with `405` and an `Allow`
//! header, and `OPTIONS` is answered automatically.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use radixroute::{Context, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.get("/", |_ctx: Context| async {
//!         Response::new(StatusCode::Ok).body("Welcome!")
//!     });
//!     router.get("/hello/:name", |ctx: Context| async move {
//!         let name = ctx.param("name").unwrap_or_default().to_owned();
//!         Response::new(StatusCode::Ok).body(format!("hello, {name}!"))
//!     });
//!
//!     let server = Server::bind("127.0.0.1:8080").await?;
//!     server.serve(router).await?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod fs;
pub mod http;
pub mod router;
pub mod server;

pub use context::{Context, Param, Parameters};
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use router::{
    Handler, HandlerPanic, IntoHandler, PanicHandler, RegistrationError, Router, RouterConfig,
};
pub use server::{Server, ServerError};
