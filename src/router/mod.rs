//! # Router Module
//!
//! Trie-based route matching for brrtmux.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Validating and normalizing route patterns at registration time
//! - Building one segment trie per HTTP method
//! - Matching an inbound `(method, path)` to the endpoint bound in that trie
//! - Binding `:name` segments into a pooled [`Params`](crate::params::Params)
//!
//! ## Pattern syntax
//!
//! ```text
//! /users              static, matched as a whole
//! /users/:id          ':' binds the segment as "id"
//! /files/*            '*' catch-all, absorbs the remainder below a leaf
//! ```
//!
//! ## Architecture
//!
//! Two phases, enforced by the type system:
//!
//! 1. **Setup**: [`MuxBuilder`](crate::mux::MuxBuilder) owns the trie mutably and
//!    inserts registrations. Malformed patterns fail here, never at dispatch.
//! 2. **Serving**: [`MuxBuilder::build`](crate::mux::MuxBuilder::build) moves the
//!    trie into an immutable [`Mux`](crate::mux::Mux) that concurrent requests
//!    share without synchronization.
//!
//! ## Performance
//!
//! - Static routes: one hash lookup on the full path, no parameter context
//! - Dynamic routes: one hash lookup per segment plus bounded backtracking
//! - Parameter storage comes from a pool and is reused across requests

mod node;
pub(crate) mod pattern;
mod trie;
#[cfg(test)]
mod tests;

pub use self::node::Endpoint;
pub(crate) use self::trie::Trie;
