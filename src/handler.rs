//! Handler seam between the mux and the surrounding HTTP runtime.
//!
//! The mux does not own connections or parse HTTP. It is handed an
//! [`http::Request`] and a mutable [`http::Response`] acting as the response
//! sink, and every handler and middleware layer writes into that sink.

use std::sync::Arc;

use http::{header, HeaderValue, StatusCode};

/// Body type carried by requests and responses flowing through the mux.
pub type Body = Vec<u8>;

/// Inbound request as seen by handlers.
pub type Request = http::Request<Body>;

/// Response sink written by handlers.
pub type Response = http::Response<Body>;

/// A terminal request handler.
///
/// Handlers run on whichever concurrent unit the runtime uses for the request
/// (thread, coroutine, task). They may block or suspend; the mux applies no
/// timeout or cancellation of its own.
pub trait Handler: Send + Sync + 'static {
    /// Handle `req`, writing the outcome into `res`.
    fn serve(&self, res: &mut Response, req: &mut Request);
}

impl<F> Handler for F
where
    F: Fn(&mut Response, &mut Request) + Send + Sync + 'static,
{
    #[inline]
    fn serve(&self, res: &mut Response, req: &mut Request) {
        self(res, req)
    }
}

/// Shared, type-erased handler. Composed middleware chains are also `BoxHandler`s.
pub type BoxHandler = Arc<dyn Handler>;

/// Pin a closure to the handler signature so its argument types are inferred.
///
/// ```rust
/// use brrtmux::handler::handler_fn;
///
/// let hello = handler_fn(|res, _req| {
///     *res.body_mut() = b"hello".to_vec();
/// });
/// # let _ = hello;
/// ```
pub fn handler_fn<F>(f: F) -> F
where
    F: Fn(&mut Response, &mut Request) + Send + Sync + 'static,
{
    f
}

/// Replace status, content type and body of `res` with a plain-text message.
pub fn write_text(res: &mut Response, status: StatusCode, body: &str) {
    *res.status_mut() = status;
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    res.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    let body_mut = res.body_mut();
    body_mut.clear();
    body_mut.extend_from_slice(body.as_bytes());
}

/// Default not-found handler: `404 page not found`.
pub fn not_found(res: &mut Response, _req: &mut Request) {
    write_text(res, StatusCode::NOT_FOUND, "404 page not found\n");
}
