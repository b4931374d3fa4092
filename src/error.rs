//! Setup-time faults raised while the routing table is being built.
//!
//! Every variant is returned from the registering call itself, before the trie
//! is touched. A route table built on a malformed pattern is not trustworthy,
//! so callers are expected to propagate these with `?` out of their setup code
//! and abort initialization.

use thiserror::Error;

/// A malformed registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// A `:` or `*` marker appears somewhere other than the first byte of a segment.
    #[error("parameter marker must lead its segment: '{segment}' in pattern '{pattern}'")]
    MarkerNotLeading {
        /// The full (normalized) pattern
        pattern: String,
        /// The offending segment
        segment: String,
    },

    /// A dynamic pattern contains an empty segment (`//`).
    #[error("empty path segment in pattern '{pattern}'")]
    EmptySegment {
        /// The full (normalized) pattern
        pattern: String,
    },

    /// A pattern that must be fully static (e.g. a file-server prefix) contains a marker.
    #[error("pattern '{pattern}' must be static (no ':' or '*' segments)")]
    NonStaticPattern {
        /// The rejected pattern
        pattern: String,
    },
}
