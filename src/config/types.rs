//! Configuration defaults for procsh.
//!
//! The termination defaults give a 3 second grace window: 30 polls, 100 ms apart.

/// Default number of status polls after the graceful termination signal.
pub const DEFAULT_GRACE_POLLS: u32 = 30;

/// Default delay between grace-window polls, in milliseconds.
pub const DEFAULT_GRACE_INTERVAL_MS: u64 = 100;

/// Default delay between status polls while waiting on a timeout, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

pub(crate) fn default_long_separator() -> Option<String> {
    Some("=".to_string())
}

pub(crate) fn default_long_prefix() -> String {
    "--".to_string()
}

pub(crate) fn default_grace_polls() -> u32 {
    DEFAULT_GRACE_POLLS
}

pub(crate) fn default_grace_interval_ms() -> u64 {
    DEFAULT_GRACE_INTERVAL_MS
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub(crate) fn default_log_filter() -> String {
    "warn".to_string()
}
