use std::sync::Arc;

use crate::handler::BoxHandler;

/// Wraps a handler with extra behavior.
///
/// `wrap` is called once per route at registration time; the returned handler
/// is what dispatch invokes for every matching request.
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: BoxHandler) -> BoxHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxHandler) -> BoxHandler + Send + Sync,
{
    #[inline]
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        self(next)
    }
}

/// Shared middleware reference, as stored in route and group lists.
pub type MiddlewareRef = Arc<dyn Middleware>;

/// Box a closure as middleware.
pub fn from_fn<F>(f: F) -> MiddlewareRef
where
    F: Fn(BoxHandler) -> BoxHandler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Fold `middlewares` around `handler`, first element outermost.
///
/// An empty list returns `handler` itself.
#[must_use]
pub fn compose(middlewares: &[MiddlewareRef], handler: BoxHandler) -> BoxHandler {
    middlewares
        .iter()
        .rev()
        .fold(handler, |next, middleware| middleware.wrap(next))
}
