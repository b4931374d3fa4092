//! Structured logging setup.
//!
//! The mux itself only emits `tracing` events and spans; installing a
//! subscriber is left to the embedding service. [`init_logging`] is the
//! ready-made one: an `EnvFilter` plus a JSON or pretty `fmt` layer.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `BRRTMUX_LOG_LEVEL` | `info` | trace/debug/info/warn/error |
//! | `BRRTMUX_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `BRRTMUX_LOG_TARGET_FILTER` | unset | extra comma-separated filter directives |
//! | `BRRTMUX_LOG_INCLUDE_LOCATION` | `false` | add file and line to each event |
//!
//! `RUST_LOG`, when set, replaces the level-derived base filter.

use std::env;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Extra filter directives (comma-separated), e.g. `brrtmux::router=debug`
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("BRRTMUX_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("BRRTMUX_LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            ),
            target_filter: env::var("BRRTMUX_LOG_TARGET_FILTER").ok(),
            include_location: env::var("BRRTMUX_LOG_INCLUDE_LOCATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Verbose, human-readable configuration for local development and tests
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Base filter plus every valid directive from `target_filter`.
    ///
    /// Invalid directives are skipped and returned so the caller can report them
    /// once a subscriber is installed.
    fn env_filter(&self) -> (EnvFilter, Vec<String>) {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));
        let mut rejected = Vec::new();

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                match filter.parse::<Directive>() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(_) => rejected.push(filter.to_string()),
                }
            }
        }
        (env_filter, rejected)
    }
}

/// Install the global subscriber described by `config`.
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let (env_filter, rejected) = config.env_filter();

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_list(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    for directive in rejected {
        tracing::warn!(directive = %directive, "Invalid log filter directive ignored");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("bogus"), LogFormat::Json);
    }

    #[test]
    fn test_log_config_default_dev() {
        let config = LogConfig::default_dev();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.include_location);
    }

    #[test]
    fn test_level_mapping() {
        let mut config = LogConfig::default_dev();
        config.log_level = "WARN".to_string();
        assert_eq!(config.level(), Level::WARN);
        config.log_level = "verbose".to_string();
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn test_invalid_directives_rejected() {
        let mut config = LogConfig::default_dev();
        config.target_filter = Some("brrtmux::router=debug, ,brrtmux=loud".to_string());
        let (_filter, rejected) = config.env_filter();
        assert_eq!(rejected, vec!["brrtmux=loud".to_string()]);
    }
}
