//! Static file serving for [`MuxBuilder::file_server`](crate::mux::MuxBuilder::file_server).

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use http::{header, HeaderValue, StatusCode};
use tracing::{debug, error};

use crate::handler::{self, Handler, Request, Response};

const INDEX_FILE: &str = "index.html";

/// Maps URL paths onto files below a base directory.
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base_dir: base.into() }
    }

    /// Directory files are served from.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve `url_path` below the base directory.
    ///
    /// Returns `None` for any path that would leave it (`..`, absolute or
    /// prefixed components).
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for segment in url_path.split(['/', '\\']) {
            for comp in Path::new(segment).components() {
                match comp {
                    Component::Normal(s) => pb.push(s),
                    Component::CurDir => {}
                    _ => return None,
                }
            }
        }
        Some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" | "htm" => "text/html; charset=utf-8",
            "css" => "text/css; charset=utf-8",
            "js" | "mjs" => "text/javascript; charset=utf-8",
            "json" => "application/json",
            "txt" => "text/plain; charset=utf-8",
            "xml" => "text/xml; charset=utf-8",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "ico" => "image/x-icon",
            "wasm" => "application/wasm",
            "pdf" => "application/pdf",
            "woff" => "font/woff",
            "woff2" => "font/woff2",
            _ => "application/octet-stream",
        }
    }

    /// Read the file at `url_path`, falling back to `index.html` for directories.
    ///
    /// Returns the bytes and the content type derived from the extension.
    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let mut path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if path.is_dir() {
            path.push(INDEX_FILE);
        }
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        Ok((bytes, Self::content_type(&path)))
    }
}

/// Handler serving `GET prefix/...` from a [`StaticFiles`] directory.
pub struct FileServer {
    prefix: String,
    files: StaticFiles,
}

impl FileServer {
    /// `prefix` is stripped from the request path before the file lookup.
    pub fn new<P: Into<PathBuf>>(prefix: impl Into<String>, dir: P) -> Self {
        Self {
            prefix: prefix.into(),
            files: StaticFiles::new(dir),
        }
    }
}

impl Handler for FileServer {
    fn serve(&self, res: &mut Response, req: &mut Request) {
        let path = req.uri().path();
        let Some(rest) = path.strip_prefix(self.prefix.as_str()) else {
            handler::not_found(res, req);
            return;
        };

        match self.files.load(rest) {
            Ok((bytes, content_type)) => {
                *res.status_mut() = StatusCode::OK;
                res.headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
                *res.body_mut() = bytes;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path, "Static file not found");
                handler::not_found(res, req);
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                handler::write_text(res, StatusCode::FORBIDDEN, "403 Forbidden\n");
            }
            Err(e) => {
                error!(
                    path = %path,
                    base_dir = %self.files.base_dir().display(),
                    error = %e,
                    "Failed to read static file"
                );
                handler::write_text(
                    res,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "500 Internal Server Error\n",
                );
            }
        }
    }
}
