//! ShellConfig struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration shared by every command and pipeline of a `Shell`.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    // =========================================================================
    // Program resolution
    // =========================================================================
    /// Ordered directories searched for programs. `None` uses `$PATH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_path: Option<Vec<PathBuf>>,

    // =========================================================================
    // Argument style
    // =========================================================================
    /// Joins long options and values (`--name=value`). `null` splits them
    /// into two tokens.
    #[serde(default = "default_long_separator")]
    pub long_separator: Option<String>,

    /// Prefix of long options.
    #[serde(default = "default_long_prefix")]
    pub long_prefix: String,

    // =========================================================================
    // Termination
    // =========================================================================
    /// Status polls after SIGTERM before escalating to SIGKILL.
    #[serde(default = "default_grace_polls")]
    pub grace_polls: u32,

    /// Delay between grace polls.
    #[serde(default = "default_grace_interval_ms")]
    pub grace_interval_ms: u64,

    /// Delay between status polls while a timeout is pending.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    // =========================================================================
    // Logging
    // =========================================================================
    /// `tracing` filter used by the CLI when `PROCSH_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            search_path: None,
            long_separator: default_long_separator(),
            long_prefix: default_long_prefix(),
            grace_polls: default_grace_polls(),
            grace_interval_ms: default_grace_interval_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            log_filter: default_log_filter(),
        }
    }
}
