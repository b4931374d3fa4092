//! # brrtmux
//!
//! **brrtmux** is a trie-based HTTP request multiplexer. It maps an incoming
//! `(method, path)` pair to a handler through a per-method segment trie with
//! static, named-parameter (`:name`) and catch-all (`*`) segments, and runs the
//! handler inside a middleware chain composed once at registration time.
//!
//! ## Architecture
//!
//! - **[`router`]** - pattern parsing and the per-method trie
//! - **[`params`]** - path parameter bindings and their per-request pool
//! - **[`handler`]** - the `Handler` seam and default not-found response
//! - **[`middleware`]** - middleware composition and built-in layers
//! - **[`mux`]** - `MuxBuilder` (setup) and `Mux` (serving)
//! - **[`group`]** - prefixed and middleware-scoped registrars
//! - **[`static_files`]** - file-server handler
//! - **[`config`]** / **[`logging`]** - environment-driven configuration
//!
//! ### Request flow
//!
//! ```mermaid
//! flowchart LR
//!     Req[Request] --> Static{exact static hit?}
//!     Static -- yes --> Chain[Middleware chain]
//!     Static -- no --> Trie[Segment descent]
//!     Trie -- bound --> Chain
//!     Trie -- no match --> NF[Not-found handler]
//!     Chain --> H[Handler]
//!     H --> Rel[Release params to pool]
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use brrtmux::prelude::*;
//!
//! fn main() -> Result<(), SetupError> {
//!     let mut builder = Mux::builder();
//!     builder.get("/users/:id", |res: &mut Response, req: &mut Request| {
//!         let id = req.param("id").unwrap_or_default().to_string();
//!         *res.body_mut() = id.into_bytes();
//!     }, &[])?;
//!     let mux = builder.build();
//!
//!     let mut req = http::Request::builder().uri("/users/42").body(Vec::new()).unwrap();
//!     let mut res = Response::new(Vec::new());
//!     mux.serve(&mut res, &mut req);
//!     assert_eq!(res.body(), b"42");
//!     Ok(())
//! }
//! ```
//!
//! ## Matching rules
//!
//! - a registered fully static pattern is matched exactly and wins outright
//! - at each segment a static edge beats `:param`, which beats `*`
//! - the closest enclosing catch-all with a handler answers when descent fails
//! - methods are independent: a route under `GET` never answers `POST`
//!
//! ## Concurrency
//!
//! A frozen [`Mux`] is `Send + Sync` and read-only. The only shared mutable state
//! on the request path is the parameter pool's freelist.

pub mod config;
pub mod error;
pub mod group;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod mux;
pub mod params;
pub mod router;
pub mod static_files;

pub use error::SetupError;
pub use group::{Group, Route};
pub use handler::{BoxHandler, Handler, Request, Response};
pub use middleware::{Middleware, MiddlewareRef};
pub use mux::{Mux, MuxBuilder, RouteMatch};
pub use params::{Params, ParamsPool, RequestParamsExt};

/// Everything needed to register routes and write handlers.
pub mod prelude {
    pub use crate::config::MuxConfig;
    pub use crate::error::SetupError;
    pub use crate::handler::{handler_fn, BoxHandler, Handler, Request, Response};
    pub use crate::middleware::{from_fn, Middleware, MiddlewareRef};
    pub use crate::mux::{Mux, MuxBuilder};
    pub use crate::params::RequestParamsExt;
}
