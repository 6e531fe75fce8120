//! Exit code constants for the procsh CLI.
//!
//! These follow common shell conventions:
//! - 0: Success
//! - 1: Generic failure (child failed without a usable code, I/O error)
//! - 2: Usage error (bad arguments, invalid configuration)
//! - 124: Timeout (same as coreutils `timeout`)
//! - 127: Command not found (same as POSIX shells)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Generic failure: I/O error, or a child that failed without an exit code.
pub const FAILURE: i32 = 1;

/// Usage error: invalid arguments, conflicting options, or a bad config file.
pub const USAGE_ERROR: i32 = 2;

/// The command was terminated because its timeout elapsed.
pub const TIMEOUT: i32 = 124;

/// The program could not be resolved to an executable file.
pub const NOT_FOUND: i32 = 127;
