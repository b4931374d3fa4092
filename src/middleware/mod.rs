//! # Middleware Module
//!
//! Middleware wraps a handler in another handler. A route's middleware list is
//! folded right-to-left around its terminal handler, so the first registered
//! middleware is the outermost layer: it runs first and may short-circuit by
//! writing the response without calling the next layer.
//!
//! ```text
//! registered: [A, B, C]   handler: H
//! composed:   A(B(C(H)))
//! call order: A → B → C → H → C → B → A
//! ```
//!
//! Composition happens once, when a route is registered. Dispatch only invokes
//! the precomputed chain.
//!
//! ## Built-in middleware
//!
//! None of these are installed by default.
//!
//! - [`TracingMiddleware`] - request span with method, path, request id, status, latency
//! - [`MetricsMiddleware`] - lock-free request/latency/error counters
//! - [`RecoverMiddleware`] - turns a handler panic into a `500` response

mod core;
mod metrics;
mod recover;
mod tracing;

pub use self::core::{compose, from_fn, Middleware, MiddlewareRef};
pub use self::metrics::MetricsMiddleware;
pub use self::recover::RecoverMiddleware;
pub use self::tracing::{TracingMiddleware, REQUEST_ID_HEADER};
