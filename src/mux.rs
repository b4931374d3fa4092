//! # Mux Module
//!
//! Registration surface and dispatch entry point.
//!
//! ## Lifecycle
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Setup as Setup code
//!     participant Builder as MuxBuilder
//!     participant Mux as Mux (frozen)
//!     participant Pool as ParamsPool
//!     participant Chain as Middleware chain
//!
//!     Setup->>Builder: get / post / group / file_server ...
//!     Builder-->>Setup: Result<(), SetupError>
//!     Setup->>Builder: build()
//!     Builder->>Mux: trie + pool sized to max params
//!     Note over Mux: read-only from here on
//!     Mux->>Mux: serve(res, req)
//!     Mux->>Pool: acquire (first bound segment only)
//!     Mux->>Chain: invoke with params attached
//!     Chain-->>Mux: response written
//!     Mux->>Pool: reset + release
//! ```
//!
//! Registration is only possible on [`MuxBuilder`]. Serving is only possible
//! on [`Mux`], which is `Send + Sync` and meant to be shared (typically behind
//! an `Arc`) by every concurrent request unit.

use std::path::PathBuf;
use std::sync::Arc;

use http::Method;
use tracing::{debug, info};

use crate::config::MuxConfig;
use crate::error::SetupError;
use crate::group::{Group, Route};
use crate::handler::{self, BoxHandler, Handler, Request, Response};
use crate::middleware::MiddlewareRef;
use crate::params::{AttachedParams, Params, ParamsPool};
use crate::router::pattern;
use crate::router::{Endpoint, Trie};
use crate::static_files::FileServer;

/// Generates one registrar per standard HTTP method, each delegating to the
/// enclosing type's `register` with the method fixed.
macro_rules! method_registrars {
    () => {
        $crate::mux::method_registrars! {
            get => GET,
            post => POST,
            put => PUT,
            delete => DELETE,
            head => HEAD,
            options => OPTIONS,
            patch => PATCH,
            connect => CONNECT,
            trace => TRACE,
        }
    };
    ($($name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Register a `", stringify!($method), "` route.")]
            pub fn $name<H: $crate::handler::Handler>(
                &mut self,
                pattern: &str,
                handler: H,
                middlewares: &[$crate::middleware::MiddlewareRef],
            ) -> Result<(), $crate::error::SetupError> {
                self.register(
                    ::http::Method::$method,
                    pattern,
                    ::std::sync::Arc::new(handler),
                    middlewares,
                )
            }
        )*
    };
}
pub(crate) use method_registrars;

/// Mutable routing table used during the setup phase.
pub struct MuxBuilder {
    trie: Trie,
    middlewares: Vec<MiddlewareRef>,
    not_found: BoxHandler,
    config: MuxConfig,
}

impl Default for MuxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MuxBuilder {
    /// Create an empty builder configured from `BRRTMUX_*` environment variables.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MuxConfig::from_env())
    }

    /// Create an empty builder with an explicit configuration.
    #[must_use]
    pub fn with_config(config: MuxConfig) -> Self {
        Self {
            trie: Trie::default(),
            middlewares: Vec::new(),
            not_found: Arc::new(handler::not_found),
            config,
        }
    }

    /// Register `handler` for `method` + `pattern` with exactly `middlewares`.
    ///
    /// Mux-wide middleware from [`use_middleware`](Self::use_middleware) is not
    /// applied here; the per-method registrars and groups apply it.
    pub fn handle<H: Handler>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
        middlewares: &[MiddlewareRef],
    ) -> Result<(), SetupError> {
        self.insert(method, pattern, Arc::new(handler), middlewares.to_vec())
    }

    /// Append mux-wide middleware.
    ///
    /// It applies to routes registered afterwards through the per-method
    /// registrars and through groups created afterwards.
    pub fn use_middleware(&mut self, middleware: MiddlewareRef) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    /// Mux-wide middleware registered so far.
    #[must_use]
    pub fn middlewares(&self) -> &[MiddlewareRef] {
        &self.middlewares
    }

    /// Replace the handler invoked when no route matches.
    pub fn not_found<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.not_found = Arc::new(handler);
        self
    }

    /// Registrar whose routes live under `prefix`.
    ///
    /// Its middleware is the mux-wide list as of now, followed by `middlewares`.
    pub fn group(&mut self, prefix: &str, middlewares: &[MiddlewareRef]) -> Group<'_> {
        let mut stack = self.middlewares.clone();
        stack.extend_from_slice(middlewares);
        let prefix = pattern::normalize(prefix).into_owned();
        Group::new(self, prefix, stack)
    }

    /// Registrar applying exactly `middlewares` (mux-wide middleware excluded).
    pub fn route(&mut self, middlewares: &[MiddlewareRef]) -> Route<'_> {
        Route::new(self, middlewares.to_vec())
    }

    /// Serve files under `dir` at `GET prefix/...`.
    ///
    /// `prefix` must be static. A trailing `/` is added when missing, and the
    /// route is registered as `prefix*` without mux-wide middleware.
    pub fn file_server(&mut self, prefix: &str, dir: impl Into<PathBuf>) -> Result<(), SetupError> {
        if !pattern::is_static(prefix) {
            return Err(SetupError::NonStaticPattern {
                pattern: prefix.to_string(),
            });
        }

        let mut prefix = pattern::normalize(prefix).into_owned();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        let route = format!("{prefix}*");
        let server = FileServer::new(prefix, dir);
        self.insert(Method::GET, &route, Arc::new(server), Vec::new())
    }

    method_registrars!();

    /// Freeze the table and start the serving phase.
    #[must_use]
    pub fn build(self) -> Mux {
        let max_params = self.trie.max_params();
        let pool = ParamsPool::new(
            max_params,
            self.config.param_value_bytes,
            self.config.pool_max_idle,
        );
        pool.prewarm(self.config.pool_prewarm);

        let routes = self.trie.routes();
        let routes_summary: Vec<String> = routes
            .iter()
            .take(10)
            .map(|(method, pattern)| format!("{method} {pattern}"))
            .collect();
        info!(
            routes_count = routes.len(),
            max_params,
            pool_prewarm = self.config.pool_prewarm,
            routes_summary = ?routes_summary,
            "Routing table frozen"
        );

        Mux {
            trie: self.trie,
            pool,
            not_found: self.not_found,
        }
    }

    /// Per-method registrars land here: mux-wide middleware first, then `middlewares`.
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
        self.insert(method, pattern, handler, stack)
    }

    pub(crate) fn insert(
        &mut self,
        method: Method,
        pattern: &str,
        handler: BoxHandler,
        middlewares: Vec<MiddlewareRef>,
    ) -> Result<(), SetupError> {
        self.trie.insert(method, pattern, handler, middlewares)
    }
}

/// Frozen routing table and dispatch entry point.
pub struct Mux {
    trie: Trie,
    pool: ParamsPool,
    not_found: BoxHandler,
}

impl Mux {
    /// Start a new setup phase.
    #[must_use]
    pub fn builder() -> MuxBuilder {
        MuxBuilder::new()
    }

    /// Match `req`, run the route's middleware chain and handler, or fall back
    /// to the not-found handler.
    ///
    /// The parameter context (if any) is attached to `req` while the chain runs
    /// and released to the pool afterwards, also when a panic unwinds through
    /// this call. A panic is not caught here.
    pub fn dispatch(&self, res: &mut Response, req: &mut Request) {
        let (endpoint, params) = self
            .trie
            .lookup(req.method(), req.uri().path(), &self.pool);

        match endpoint {
            Some(endpoint) => {
                let mut attached = AttachedParams::new(req, params, &self.pool);
                endpoint.chain().serve(res, attached.request());
            }
            None => {
                if let Some(params) = params {
                    self.pool.release(params);
                }
                debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    "No route matched"
                );
                self.not_found.serve(res, req);
            }
        }
    }

    /// Resolve `method` + `path` without invoking anything.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let (endpoint, params) = self.trie.lookup(method, path, &self.pool);
        match endpoint {
            Some(endpoint) => Some(RouteMatch {
                endpoint,
                params,
                pool: &self.pool,
            }),
            None => {
                if let Some(params) = params {
                    self.pool.release(params);
                }
                None
            }
        }
    }

    /// Registered `(method, pattern)` pairs in registration order.
    #[must_use]
    pub fn routes(&self) -> &[(Method, String)] {
        self.trie.routes()
    }

    /// Highest parameter count of any registration; pooled contexts are sized to it.
    #[must_use]
    pub fn max_params(&self) -> usize {
        self.trie.max_params()
    }

    /// The parameter context pool.
    #[must_use]
    pub fn pool(&self) -> &ParamsPool {
        &self.pool
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes().len());
        for (method, pattern) in self.routes() {
            println!("[route] {method} {pattern}");
        }
    }
}

impl Handler for Mux {
    fn serve(&self, res: &mut Response, req: &mut Request) {
        self.dispatch(res, req);
    }
}

/// Result of [`Mux::find`]. Returns its parameter context to the pool on drop.
pub struct RouteMatch<'m> {
    endpoint: &'m Endpoint,
    params: Option<Params>,
    pool: &'m ParamsPool,
}

impl RouteMatch<'_> {
    /// Pattern of the matched registration.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.endpoint.pattern()
    }

    /// The matched endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        self.endpoint
    }

    /// Bindings captured by the match, if any segment was bound.
    #[must_use]
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// A single binding by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.as_ref().and_then(|p| p.get(name))
    }
}

impl Drop for RouteMatch<'_> {
    fn drop(&mut self) {
        if let Some(params) = self.params.take() {
            self.pool.release(params);
        }
    }
}
