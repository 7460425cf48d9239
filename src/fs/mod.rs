//! Static file serving behind [`Router::serve_files`](crate::Router::serve_files).
//!
//! [`ServeDir`] maps the `filepath` captured by a catch-all route onto a
//! directory on disk. The captured value goes through
//! [`clean_path`](crate::router::clean_path) first, so `..` segments can never
//! climb out of the root.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::router::clean_path;
use crate::{Response, StatusCode};

/// Index document served for directory requests.
const INDEX_FILE: &str = "index.html";

/// A directory whose files are served read-only.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use radixroute::fs::ServeDir;
///
/// let dir = ServeDir::new("/srv/www");
/// assert_eq!(dir.resolve("/css/../img/logo.png"), Path::new("/srv/www/img/logo.png"));
/// assert_eq!(dir.resolve("/../../etc/passwd"), Path::new("/srv/www/etc/passwd"));
/// ```
#[derive(Debug, Clone)]
pub struct ServeDir {
    root: PathBuf,
}

impl ServeDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a request path onto a location inside the root directory.
    pub fn resolve(&self, filepath: &str) -> PathBuf {
        let cleaned = clean_path(filepath);
        let mut path = self.root.clone();
        path.extend(cleaned.split('/').filter(|segment| !segment.is_empty()));
        path
    }

    /// Reads the file named by `filepath` and answers with its contents.
    ///
    /// Directories answer with their `index.html`. A missing file is a
    /// `404 Not Found`; any other I/O failure is logged and answered with
    /// `500 Internal Server Error`.
    pub async fn serve(&self, filepath: &str) -> Response {
        let mut path = self.resolve(filepath);

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => path.push(INDEX_FILE),
            Ok(_) => {}
            Err(err) => return io_failure(&path, &err),
        }

        match tokio::fs::read(&path).await {
            Ok(contents) => {
                debug!(path = %path.display(), bytes = contents.len(), "serving file");
                Response::new(StatusCode::Ok)
                    .header("Content-Type", content_type(&path))
                    .body_bytes(contents)
            }
            Err(err) => io_failure(&path, &err),
        }
    }
}

fn io_failure(path: &Path, err: &io::Error) -> Response {
    if err.kind() == io::ErrorKind::NotFound {
        debug!(path = %path.display(), "file not found");
        return Response::status_text(StatusCode::NotFound);
    }

    warn!(path = %path.display(), error = %err, "failed to read file");
    Response::status_text(StatusCode::InternalServerError)
}

/// Guesses a `Content-Type` from the file extension.
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("wasm") => "application/wasm",
        Some("pdf") => "application/pdf",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A fresh directory per test so parallel tests never share files.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("radixroute-fs-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type(Path::new("a/index.HTML")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("app.wasm")), "application/wasm");
        assert_eq!(content_type(Path::new("logo.jpeg")), "image/jpeg");
        assert_eq!(content_type(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn resolve_stays_inside_root() {
        let dir = ServeDir::new("/srv");
        assert_eq!(dir.resolve("/"), Path::new("/srv"));
        assert_eq!(dir.resolve("/a//b/./c"), Path::new("/srv/a/b/c"));
        assert_eq!(dir.resolve("/../../../x"), Path::new("/srv/x"));
        assert_eq!(dir.root(), Path::new("/srv"));
    }

    #[tokio::test]
    async fn serves_file_contents() {
        let root = scratch_dir("file");
        std::fs::create_dir_all(root.join("css")).unwrap();
        std::fs::write(root.join("css/site.css"), "body{}").unwrap();

        let res = ServeDir::new(&root).serve("/css/site.css").await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.body_slice(), b"body{}");
        assert_eq!(res.headers().get("content-type"), Some("text/css; charset=utf-8"));
    }

    #[tokio::test]
    async fn directory_serves_index() {
        let root = scratch_dir("index");
        std::fs::write(root.join("index.html"), "<h1>hi</h1>").unwrap();

        let res = ServeDir::new(&root).serve("/").await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.body_slice(), b"<h1>hi</h1>");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let root = scratch_dir("missing");

        let res = ServeDir::new(&root).serve("/nope.txt").await;
        assert_eq!(res.status(), StatusCode::NotFound);

        // a directory without an index document
        std::fs::create_dir_all(root.join("empty")).unwrap();
        let res = ServeDir::new(&root).serve("/empty/").await;
        assert_eq!(res.status(), StatusCode::NotFound);
    }
}
