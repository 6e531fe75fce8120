//! Logging setup for the procsh binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the binary. `PROCSH_LOG` takes precedence over the configured filter.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PROCSH_LOG";

/// Install a stderr `fmt` subscriber.
///
/// Logs go to stderr so streamed program output on stdout stays clean.
/// Calling this twice keeps the first subscriber.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
