//! Per-method segment trie.
//!
//! Each HTTP method owns an independent tree. Fully static patterns are kept
//! in a map keyed by the whole pattern next to the tree root so an exact hit
//! never walks the tree or touches the parameter pool. Dynamic patterns are
//! inserted segment by segment, sharing nodes with every route that has the
//! same prefix.
//!
//! ## Lookup
//!
//! Descent prefers a static edge, then the param child (binding the segment),
//! then the catch-all child. While descending, the parent's handler-bearing
//! catch-all is remembered as a backtracking candidate. The descent ends:
//!
//! 1. on the last segment, when the reached node has a handler
//! 2. at a childless catch-all node with a handler, which absorbs the rest of the path
//! 3. when no edge continues the descent, yielding the most recent candidate, if any
//!
//! The result is "closest enclosing catch-all wins", not a global wildcard.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::{debug, warn};

use super::node::{Endpoint, Node, NodeKind};
use super::pattern::{self, Segment};
use crate::error::SetupError;
use crate::handler::BoxHandler;
use crate::middleware::MiddlewareRef;
use crate::params::{Params, ParamsPool};

#[derive(Debug)]
struct MethodTree {
    statics: HashMap<Box<str>, Endpoint>,
    root: Node,
}

impl Default for MethodTree {
    fn default() -> Self {
        Self {
            statics: HashMap::new(),
            root: Node::new(NodeKind::Static),
        }
    }
}

/// Outcome of a lookup: the bound endpoint (if any) and the context holding
/// whatever was bound during the descent (if anything was).
///
/// The context is returned even when no endpoint matched, so the caller can
/// release it to the pool.
pub(crate) type Lookup<'t> = (Option<&'t Endpoint>, Option<Params>);

/// Append-only routing table. Built during setup, read-only while serving.
#[derive(Debug, Default)]
pub(crate) struct Trie {
    methods: HashMap<Method, MethodTree>,
    max_params: usize,
    routes: Vec<(Method, String)>,
}

impl Trie {
    /// Register `handler` with its middleware under `method` + `pattern`.
    ///
    /// A static pattern that is already registered keeps its first handler. A
    /// dynamic pattern ending on an existing node replaces that node's endpoint.
    /// The pattern is fully validated before the tree is touched.
    pub(crate) fn insert(
        &mut self,
        method: Method,
        pattern: &str,
        handler: BoxHandler,
        middlewares: Vec<MiddlewareRef>,
    ) -> Result<(), SetupError> {
        let pattern = pattern::normalize(pattern);

        if pattern::is_static(&pattern) {
            let tree = self.methods.entry(method.clone()).or_default();
            match tree.statics.entry(Box::from(pattern.as_ref())) {
                Entry::Occupied(_) => {
                    debug!(
                        method = %method,
                        pattern = %pattern,
                        "Static route already registered, keeping the first handler"
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(Endpoint::new(&pattern, handler, middlewares));
                    debug!(method = %method, pattern = %pattern, kind = "static", "Route registered");
                    self.routes.push((method, pattern.into_owned()));
                }
            }
            return Ok(());
        }

        let segments = pattern::parse(&pattern)?;
        let tree = self.methods.entry(method.clone()).or_default();
        let mut node = &mut tree.root;
        let mut param_count = 0;

        for segment in segments {
            node = match segment {
                Segment::Static(edge) => node
                    .children
                    .entry(Box::from(edge))
                    .or_insert_with(|| Node::new(NodeKind::Static)),
                Segment::Param(name) => {
                    let child = node
                        .param
                        .get_or_insert_with(|| Box::new(Node::new(NodeKind::Param)));
                    if !name.is_empty() {
                        param_count += 1;
                        if !child.param_name.is_empty() && child.param_name.as_ref() != name {
                            warn!(
                                pattern = %pattern,
                                previous = %child.param_name,
                                name = %name,
                                "Shared parameter segment renamed by a later registration"
                            );
                        }
                        child.param_name = Arc::from(name);
                    }
                    child.as_mut()
                }
                Segment::CatchAll => node
                    .catch_all
                    .get_or_insert_with(|| Box::new(Node::new(NodeKind::CatchAll)))
                    .as_mut(),
            };
        }

        let replaced = node
            .endpoint
            .replace(Endpoint::new(&pattern, handler, middlewares))
            .map(|previous| Box::<str>::from(previous.pattern()));
        self.max_params = self.max_params.max(param_count);

        match replaced {
            Some(previous) => {
                debug!(
                    method = %method,
                    pattern = %pattern,
                    previous = %previous,
                    "Replacing handler on existing dynamic route"
                );
                // Same node, so the listing keeps one entry, spelled like the latest registration.
                if let Some(entry) = self
                    .routes
                    .iter_mut()
                    .find(|entry| entry.0 == method && entry.1 == *previous)
                {
                    entry.1 = pattern.into_owned();
                }
            }
            None => {
                debug!(
                    method = %method,
                    pattern = %pattern,
                    kind = "dynamic",
                    params = param_count,
                    "Route registered"
                );
                self.routes.push((method, pattern.into_owned()));
            }
        }
        Ok(())
    }

    /// Match `path` against the tree of `method`.
    ///
    /// A parameter context is acquired from `pool` the first time a segment is
    /// bound; a static hit or a purely static descent never acquires one.
    pub(crate) fn lookup<'t>(&'t self, method: &Method, path: &str, pool: &ParamsPool) -> Lookup<'t> {
        let Some(tree) = self.methods.get(method) else {
            return (None, None);
        };

        if let Some(endpoint) = tree.statics.get(path) {
            return (Some(endpoint), None);
        }

        if !path.starts_with('/') {
            return (None, None);
        }

        let bytes = path.as_bytes();
        let len = bytes.len();
        let mut parent = &tree.root;
        let mut backtrack: Option<&Node> = None;
        let mut params: Option<Params> = None;

        // i = 0 is the leading '/'
        let mut i = 1;
        while i < len {
            let start = i;
            while i < len && bytes[i] != b'/' {
                i += 1;
            }
            let edge = &path[start..i];
            // A trailing '/' after the final segment still counts as the last segment.
            let is_last = i + 1 >= len;

            let child = match parent.children.get(edge) {
                Some(child) => Some(child),
                None => match parent.param.as_deref() {
                    Some(param) => {
                        params
                            .get_or_insert_with(|| pool.acquire())
                            .bind(&param.param_name, edge);
                        Some(param)
                    }
                    None => parent.catch_all.as_deref(),
                },
            };

            let Some(child) = child else {
                break;
            };

            if is_last && child.endpoint.is_some() {
                return (child.endpoint.as_ref(), params);
            }

            if let Some(candidate) = parent.bound_catch_all() {
                backtrack = Some(candidate);
            }

            if child.is_leaf() {
                if child.kind == NodeKind::CatchAll && child.endpoint.is_some() {
                    return (child.endpoint.as_ref(), params);
                }
                break;
            }

            parent = child;
            i += 1;
        }

        (backtrack.and_then(|node| node.endpoint.as_ref()), params)
    }

    /// Highest number of named parameters seen in any single registration.
    pub(crate) fn max_params(&self) -> usize {
        self.max_params
    }

    /// Registrations in the order they took effect.
    pub(crate) fn routes(&self) -> &[(Method, String)] {
        &self.routes
    }
}
