use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use http::StatusCode;
use tracing::error;

use super::Middleware;
use crate::handler::{write_text, BoxHandler, Request, Response};

/// Catches a panic raised by the inner layers and answers `500`.
///
/// The mux never installs this itself; a panic in an unwrapped handler
/// propagates to whatever runs the request. Anything the inner layers wrote
/// before panicking is discarded.
pub struct RecoverMiddleware;

impl Middleware for RecoverMiddleware {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        Arc::new(move |res: &mut Response, req: &mut Request| {
            let outcome = catch_unwind(AssertUnwindSafe(|| next.serve(res, req)));
            if let Err(panic) = outcome {
                error!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    panic_message = %panic_message(panic.as_ref()),
                    "Handler panicked - recovered"
                );
                res.headers_mut().clear();
                write_text(res, StatusCode::INTERNAL_SERVER_ERROR, "500 internal server error\n");
            }
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
