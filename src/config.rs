//! # Mux Configuration
//!
//! Sizing of the parameter context pool, loaded from environment variables by
//! [`MuxBuilder::new`](crate::mux::MuxBuilder::new) or passed explicitly with
//! [`MuxBuilder::with_config`](crate::mux::MuxBuilder::with_config).
//!
//! ## Environment Variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `BRRTMUX_POOL_MAX_IDLE` | `1024` | idle contexts kept for reuse; extras are dropped |
//! | `BRRTMUX_POOL_PREWARM` | `0` | contexts allocated when the table is frozen |
//! | `BRRTMUX_PARAM_VALUE_BYTES` | `64` | initial capacity of a context's value buffer |
//!
//! Values are decimal (`4096`) or hexadecimal (`0x1000`). An unparsable value
//! falls back to the default with a warning.
//!
//! ```bash
//! export BRRTMUX_POOL_PREWARM=256
//! export BRRTMUX_PARAM_VALUE_BYTES=0x80
//! ```

use std::env;

use tracing::warn;

const DEFAULT_POOL_MAX_IDLE: usize = 1024;
const DEFAULT_POOL_PREWARM: usize = 0;
const DEFAULT_PARAM_VALUE_BYTES: usize = 64;

/// Pool sizing applied when a [`MuxBuilder`](crate::mux::MuxBuilder) is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxConfig {
    /// Upper bound on idle contexts held by the pool
    pub pool_max_idle: usize,
    /// Contexts allocated up front by `build()` (capped at `pool_max_idle`)
    pub pool_prewarm: usize,
    /// Initial byte capacity of each context's value buffer
    pub param_value_bytes: usize,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            pool_max_idle: DEFAULT_POOL_MAX_IDLE,
            pool_prewarm: DEFAULT_POOL_PREWARM,
            param_value_bytes: DEFAULT_PARAM_VALUE_BYTES,
        }
    }
}

impl MuxConfig {
    /// Load configuration from `BRRTMUX_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, default: usize| match lookup(key) {
            Some(raw) => parse_size(&raw).unwrap_or_else(|| {
                warn!(key, value = %raw, default, "Invalid size in environment, using default");
                default
            }),
            None => default,
        };

        Self {
            pool_max_idle: read("BRRTMUX_POOL_MAX_IDLE", DEFAULT_POOL_MAX_IDLE),
            pool_prewarm: read("BRRTMUX_POOL_PREWARM", DEFAULT_POOL_PREWARM),
            param_value_bytes: read("BRRTMUX_PARAM_VALUE_BYTES", DEFAULT_PARAM_VALUE_BYTES),
        }
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal size.
fn parse_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}
