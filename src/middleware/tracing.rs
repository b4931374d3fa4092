use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, field, info_span};

use super::Middleware;
use crate::handler::{BoxHandler, Request, Response};
use crate::ids::RequestId;

/// Header carrying a caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Opens a `request` span around the inner layers.
///
/// The request id is taken from `x-request-id` when it holds a valid ULID and
/// generated otherwise. Status and latency are recorded on the span once the
/// inner layers return.
///
/// The span is never entered: handlers may suspend and resume on another
/// worker thread, so the completion event names it as its parent instead.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        Arc::new(move |res: &mut Response, req: &mut Request| {
            let request_id = RequestId::from_header_or_new(
                req.headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok()),
            );
            let span = info_span!(
                "request",
                method = %req.method(),
                path = %req.uri().path(),
                request_id = %request_id,
                status = field::Empty,
                latency_us = field::Empty,
            );
            let start = Instant::now();

            next.serve(res, req);

            let latency_us = start.elapsed().as_micros() as u64;
            span.record("status", res.status().as_u16());
            span.record("latency_us", latency_us);
            debug!(
                parent: &span,
                status = res.status().as_u16(),
                latency_us,
                "Request complete"
            );
        })
    }
}
