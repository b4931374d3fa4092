use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::handler::BoxHandler;
use crate::middleware::{compose, MiddlewareRef};

/// Kind of path segment a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Static,
    Param,
    CatchAll,
}

/// Handler bound where a registration ends, with its middleware.
///
/// The middleware chain is composed once, here, rather than on every dispatch.
pub struct Endpoint {
    pattern: Arc<str>,
    handler: BoxHandler,
    middlewares: Vec<MiddlewareRef>,
    chain: BoxHandler,
}

impl Endpoint {
    pub(crate) fn new(pattern: &str, handler: BoxHandler, middlewares: Vec<MiddlewareRef>) -> Self {
        let chain = compose(&middlewares, Arc::clone(&handler));
        Self {
            pattern: Arc::from(pattern),
            handler,
            middlewares,
            chain,
        }
    }

    /// Pattern of the registration that bound this endpoint.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The terminal handler, without middleware.
    #[must_use]
    pub fn handler(&self) -> &BoxHandler {
        &self.handler
    }

    /// Number of middleware layers around the handler.
    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.middlewares.len()
    }

    /// Handler with every middleware layer applied, first registered outermost.
    #[must_use]
    pub fn chain(&self) -> &BoxHandler {
        &self.chain
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("pattern", &self.pattern)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// One trie vertex, standing for a path-segment boundary.
///
/// Static edges, the param slot and the catch-all slot are separate address
/// spaces: a node has at most one param child and one catch-all child however
/// many static children it has.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) children: HashMap<Box<str>, Node>,
    pub(crate) param: Option<Box<Node>>,
    pub(crate) catch_all: Option<Box<Node>>,
    /// Binding name; empty unless `kind == Param`.
    pub(crate) param_name: Arc<str>,
    pub(crate) endpoint: Option<Endpoint>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: HashMap::new(),
            param: None,
            catch_all: None,
            param_name: Arc::from(""),
            endpoint: None,
        }
    }

    /// True when no static, param or catch-all child hangs off this node.
    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.param.is_none() && self.catch_all.is_none()
    }

    /// The catch-all child, if it carries a handler.
    #[inline]
    pub(crate) fn bound_catch_all(&self) -> Option<&Node> {
        self.catch_all
            .as_deref()
            .filter(|child| child.endpoint.is_some())
    }
}
