//! Prefixed and middleware-scoped registrars.
//!
//! A [`Group`] borrows the builder for as long as it is used, prefixes every
//! pattern it registers and applies its own middleware list. A [`Route`]
//! applies an explicit middleware list and nothing else.

use http::Method;

use crate::error::SetupError;
use crate::handler::{BoxHandler, Handler};
use crate::middleware::MiddlewareRef;
use crate::mux::{method_registrars, MuxBuilder};
use crate::router::pattern;

/// Registrar for routes sharing a path prefix and a middleware list.
pub struct Group<'m> {
    mux: &'m mut MuxBuilder,
    prefix: String,
    middlewares: Vec<MiddlewareRef>,
}

impl<'m> Group<'m> {
    pub(crate) fn new(mux: &'m mut MuxBuilder, prefix: String, middlewares: Vec<MiddlewareRef>) -> Self {
        Self {
            mux,
            prefix,
            middlewares,
        }
    }

    /// Path prefix prepended to every pattern registered here.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Middleware applied to every route registered here, outermost first.
    #[must_use]
    pub fn middlewares(&self) -> &[MiddlewareRef] {
        &self.middlewares
    }

    /// Append middleware for routes registered on this group from now on.
    pub fn use_middleware(&mut self, middleware: MiddlewareRef) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    /// Nested group: prefixes concatenate and `middlewares` follow this group's.
    ///
    /// This group's own list is left as is.
    pub fn group(&mut self, prefix: &str, middlewares: &[MiddlewareRef]) -> Group<'_> {
        let mut stack = self.middlewares.clone();
        stack.extend_from_slice(middlewares);
        let prefix = join(&self.prefix, &pattern::normalize(prefix));
        Group::new(self.mux, prefix, stack)
    }

    /// Register `handler` under `prefix + pattern` with the group middleware
    /// followed by `middlewares`.
    pub fn handle<H: Handler>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
        middlewares: &[MiddlewareRef],
    ) -> Result<(), SetupError> {
        self.register(method, pattern, std::sync::Arc::new(handler), middlewares)
    }

    method_registrars!();

    fn register(
        &mut self,
        method: Method,
        pattern: &str,
        handler: BoxHandler,
        middlewares: &[MiddlewareRef],
    ) -> Result<(), SetupError> {
        let mut stack = Vec::with_capacity(self.middlewares.len() + middlewares.len());
        stack.extend_from_slice(&self.middlewares);
        stack.extend_from_slice(middlewares);
        let full = join(&self.prefix, &pattern::normalize(pattern));
        self.mux.insert(method, &full, handler, stack)
    }
}

/// Registrar applying a fixed middleware list, without prefix or mux-wide middleware.
pub struct Route<'m> {
    mux: &'m mut MuxBuilder,
    middlewares: Vec<MiddlewareRef>,
}

impl<'m> Route<'m> {
    pub(crate) fn new(mux: &'m mut MuxBuilder, middlewares: Vec<MiddlewareRef>) -> Self {
        Self { mux, middlewares }
    }

    /// Register `handler` with the route middleware followed by `middlewares`.
    pub fn handle<H: Handler>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
        middlewares: &[MiddlewareRef],
    ) -> Result<(), SetupError> {
        self.register(method, pattern, std::sync::Arc::new(handler), middlewares)
    }

    method_registrars!();

    fn register(
        &mut self,
        method: Method,
        pattern: &str,
        handler: BoxHandler,
        middlewares: &[MiddlewareRef],
    ) -> Result<(), SetupError> {
        let mut stack = self.middlewares.clone();
        stack.extend_from_slice(middlewares);
        self.mux.insert(method, pattern, handler, stack)
    }
}

/// `prefix` and `pattern` are both normalized; the root pattern adds nothing.
fn join(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if pattern == "/" {
        if prefix.is_empty() {
            return "/".to_string();
        }
        return prefix.to_string();
    }
    format!("{prefix}{pattern}")
}
