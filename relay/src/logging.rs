//! Log filter shared by the service and the dispatch CLI.
//!
//! Relay skip and delivery lines are info-level, so the filter falls back to
//! `info` when `RUST_LOG` is unset or fails to parse.

use tracing_subscriber::EnvFilter;

/// Directive applied when `RUST_LOG` provides none.
pub const DEFAULT_LOG_DIRECTIVE: &str = "info";

/// Build the filter from `RUST_LOG`, defaulting to [`DEFAULT_LOG_DIRECTIVE`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}
