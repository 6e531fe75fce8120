//! Error types for procsh.
//!
//! Uses thiserror for derive macros. Every failure surfaced to callers goes
//! through [`ProcshError`]; I/O errors hit by a stream reader mid-drain are the
//! one exception and end the stream instead.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for procsh operations.
#[derive(Error, Debug)]
pub enum ProcshError {
    /// The program could not be resolved to an executable file, or a
    /// pipeline was run without any stage.
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// The child exited with a code outside the accepted set.
    ///
    /// `exit_code` is `None` when the child was killed by a signal.
    #[error("command returned failure (exit code {}):{message}", display_code(.exit_code))]
    CommandReturnFailure {
        exit_code: Option<i32>,
        message: String,
    },

    /// The timeout elapsed and termination was escalated.
    #[error("command timed out: {0}")]
    CommandTimeout(String),

    /// Malformed arguments or unsupported/conflicting execution options.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration file could not be read, parsed or validated.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// OS-level failure while opening redirections or spawning a process.
    #[error("{0}")]
    Io(String),
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

impl ProcshError {
    /// Returns the CLI exit code for this error.
    ///
    /// A failing child propagates its own code when it fits in an exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcshError::CommandNotFound(_) => exit_codes::NOT_FOUND,
            ProcshError::CommandReturnFailure { exit_code, .. } => match exit_code {
                Some(code) if (1..=255).contains(code) => *code,
                _ => exit_codes::FAILURE,
            },
            ProcshError::CommandTimeout(_) => exit_codes::TIMEOUT,
            ProcshError::InvalidArgument(_) => exit_codes::USAGE_ERROR,
            ProcshError::Config(_) => exit_codes::USAGE_ERROR,
            ProcshError::Io(_) => exit_codes::FAILURE,
        }
    }
}

/// Result type alias for procsh operations.
pub type Result<T> = std::result::Result<T, ProcshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_error_has_correct_exit_code() {
        let err = ProcshError::CommandNotFound("no command `nope'".to_string());
        assert_eq!(err.exit_code(), exit_codes::NOT_FOUND);
    }

    #[test]
    fn timeout_error_has_correct_exit_code() {
        let err = ProcshError::CommandTimeout("execution expired".to_string());
        assert_eq!(err.exit_code(), exit_codes::TIMEOUT);
    }

    #[test]
    fn return_failure_propagates_child_code() {
        let err = ProcshError::CommandReturnFailure {
            exit_code: Some(3),
            message: String::new(),
        };
        assert_eq!(err.exit_code(), 3);

        let err = ProcshError::CommandReturnFailure {
            exit_code: None,
            message: String::new(),
        };
        assert_eq!(err.exit_code(), exit_codes::FAILURE);

        // An accepted-codes set can make 0 a failure; the CLI must not report success.
        let err = ProcshError::CommandReturnFailure {
            exit_code: Some(0),
            message: String::new(),
        };
        assert_eq!(err.exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn usage_errors_have_correct_exit_code() {
        let err = ProcshError::InvalidArgument("bad".to_string());
        assert_eq!(err.exit_code(), exit_codes::USAGE_ERROR);

        let err = ProcshError::Config("bad".to_string());
        assert_eq!(err.exit_code(), exit_codes::USAGE_ERROR);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = ProcshError::CommandNotFound("no command `nope'".to_string());
        assert_eq!(err.to_string(), "command not found: no command `nope'");

        let err = ProcshError::CommandReturnFailure {
            exit_code: Some(2),
            message: "\n  RAN: /bin/ls /missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command returned failure (exit code 2):\n  RAN: /bin/ls /missing"
        );

        let err = ProcshError::CommandReturnFailure {
            exit_code: None,
            message: String::new(),
        };
        assert!(err.to_string().contains("exit code none"));
    }
}
