//! Path parameter bindings and their per-request pool.
//!
//! A [`Params`] is produced lazily while a dynamic route is matched and is
//! owned by exactly one in-flight request until dispatch finishes. Instances
//! are recycled through a [`ParamsPool`] so the hot path does not allocate once
//! the pool is warm.
//!
//! # Reset before reuse
//!
//! Every instance is `reset()` inside [`ParamsPool::release`] before it becomes
//! idle again. Dispatch releases through a drop guard, so the reset also runs on
//! the not-found path and when a handler panic unwinds through the mux. A
//! context that skipped the reset would hand one request's bindings to the
//! next request drawing it from the pool.

use std::ops::Range;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::handler::Request;

/// Maximum number of bindings stored inline before the entry list spills to the heap.
/// Most routes have ≤4 params (e.g. `/users/:id/posts/:post_id`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Ordered name → value bindings captured by one match.
///
/// Names are `Arc<str>` shared with the trie node that declared them (an atomic
/// increment per binding, no copy). Values are appended to a single reusable
/// buffer and addressed by byte range, so `reset()` keeps all capacity.
#[derive(Debug, Clone, Default)]
pub struct Params {
    entries: SmallVec<[(Arc<str>, Range<usize>); MAX_INLINE_PARAMS]>,
    values: String,
}

impl Params {
    /// Create an empty context pre-sized for `params` bindings and `value_bytes` of values.
    #[must_use]
    pub fn with_capacity(params: usize, value_bytes: usize) -> Self {
        Self {
            entries: SmallVec::with_capacity(params),
            values: String::with_capacity(value_bytes),
        }
    }

    /// Append a binding, preserving match order.
    pub fn bind(&mut self, name: &Arc<str>, value: &str) {
        let start = self.values.len();
        self.values.push_str(value);
        self.entries
            .push((Arc::clone(name), start..self.values.len()));
    }

    /// Get a binding by name.
    ///
    /// Uses "last write wins" semantics when the same name was bound twice
    /// along the matched path.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .and_then(|(_, range)| self.values.get(range.clone()))
    }

    /// Iterate bindings in match order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().filter_map(move |(k, range)| {
            self.values.get(range.clone()).map(|v| (k.as_ref(), v))
        })
    }

    /// Number of bindings.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is bound.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all bindings, keeping the backing storage.
    pub fn reset(&mut self) -> &mut Self {
        self.entries.clear();
        self.values.clear();
        self
    }

    /// Associate this context with `req`, returning whatever context was attached before.
    pub fn attach(self, req: &mut Request) -> Option<Params> {
        req.extensions_mut().insert(self)
    }

    /// Remove the context attached to `req`, if any.
    pub fn detach(req: &mut Request) -> Option<Params> {
        req.extensions_mut().remove::<Params>()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> (usize, usize) {
        (self.entries.capacity(), self.values.capacity())
    }
}

/// Read path parameters from a request handed to a handler.
pub trait RequestParamsExt {
    /// The attached bindings, if the matched route bound any.
    fn params(&self) -> Option<&Params>;

    /// A single binding by name.
    fn param(&self, name: &str) -> Option<&str> {
        self.params().and_then(|p| p.get(name))
    }
}

impl<B> RequestParamsExt for http::Request<B> {
    #[inline]
    fn params(&self) -> Option<&Params> {
        self.extensions().get::<Params>()
    }
}

/// Freelist of idle [`Params`] shared by all concurrent requests.
///
/// `acquire` and `release` each take the lock for a single push/pop and are
/// safe under any number of concurrent callers. Entries carry no identity.
#[derive(Debug)]
pub struct ParamsPool {
    idle: Mutex<Vec<Params>>,
    params_capacity: usize,
    value_bytes: usize,
    max_idle: usize,
}

impl ParamsPool {
    /// Create an empty pool handing out contexts sized for `params_capacity` bindings.
    #[must_use]
    pub fn new(params_capacity: usize, value_bytes: usize, max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            params_capacity,
            value_bytes,
            max_idle,
        }
    }

    /// Allocate up to `count` idle contexts ahead of serving.
    pub fn prewarm(&self, count: usize) {
        let count = count.min(self.max_idle);
        let mut idle = self.idle.lock();
        while idle.len() < count {
            idle.push(self.allocate());
        }
    }

    /// Take an idle context, or allocate one sized to the trie's high-water mark.
    #[must_use]
    pub fn acquire(&self) -> Params {
        let recycled = self.idle.lock().pop();
        recycled.unwrap_or_else(|| self.allocate())
    }

    /// Reset `params` and return it to the idle list.
    ///
    /// When the idle list is already at its limit the context is dropped instead.
    pub fn release(&self, mut params: Params) {
        params.reset();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(params);
        }
    }

    /// Number of idle contexts currently held.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Capacity, in bindings, of freshly allocated contexts.
    #[must_use]
    pub fn params_capacity(&self) -> usize {
        self.params_capacity
    }

    fn allocate(&self) -> Params {
        Params::with_capacity(self.params_capacity, self.value_bytes)
    }
}

/// Attaches a pooled context to a request for the duration of a dispatch.
///
/// On drop (normal return or unwind) the context is detached, reset and
/// released, and any context that was attached before is put back.
pub(crate) struct AttachedParams<'a> {
    req: &'a mut Request,
    pool: &'a ParamsPool,
    previous: Option<Params>,
    attached: bool,
}

impl<'a> AttachedParams<'a> {
    pub(crate) fn new(req: &'a mut Request, params: Option<Params>, pool: &'a ParamsPool) -> Self {
        let (previous, attached) = match params {
            Some(params) => (params.attach(req), true),
            None => (None, false),
        };
        Self {
            req,
            pool,
            previous,
            attached,
        }
    }

    pub(crate) fn request(&mut self) -> &mut Request {
        self.req
    }
}

impl Drop for AttachedParams<'_> {
    fn drop(&mut self) {
        if !self.attached {
            return;
        }
        if let Some(params) = Params::detach(self.req) {
            self.pool.release(params);
        }
        if let Some(previous) = self.previous.take() {
            previous.attach(self.req);
        }
    }
}
