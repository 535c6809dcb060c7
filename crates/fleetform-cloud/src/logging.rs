//! Logging setup for provider processes
//!
//! The plugin host owns stdout, so logs always go to stderr without ANSI
//! colors. The filter comes from `RUST_LOG` and falls back to the given
//! default directive.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, panicking if one is already set
pub fn init_logging() {
    init_logging_with_default(DEFAULT_FILTER);
}

/// Install the global subscriber with a custom default filter
pub fn init_logging_with_default(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter(default_filter))
        .with_ansi(false)
        .init();
}

/// Install the global subscriber unless one is already set
///
/// Returns `false` when another subscriber was installed first.
pub fn try_init_logging() -> bool {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter(DEFAULT_FILTER))
        .with_ansi(false)
        .try_init()
        .is_ok()
}

fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}
