//! procsh: run external programs and pipelines from Rust.
//!
//! Programs are resolved up front ([`Command`]), called with tagged
//! arguments ([`Arg`]) and validated execution options ([`ExecOptions`]),
//! and observed through a [`RunningCommand`] or [`RunningPipeline`]:
//! captured output, exit code, timestamps and wall time.
//!
//! ```no_run
//! use procsh::{Arg, ExecOptions, Shell};
//! use std::time::Duration;
//!
//! let sh = Shell::new();
//! let ls = sh.command("ls")?;
//! let listing = ls.call(
//!     [Arg::flag("l"), Arg::positional("/tmp")],
//!     &ExecOptions::new().with_timeout(Duration::from_secs(5)),
//! )?;
//! println!("{}", listing.stdout_lossy());
//! # Ok::<(), procsh::ProcshError>(())
//! ```
//!
//! Unix only: redirection uses file descriptors and termination uses POSIX
//! signals.

#[cfg(not(unix))]
compile_error!("procsh supports Unix platforms only");

pub mod argument;
pub mod cli;
pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod options;
pub mod pipeline;
pub mod process;
pub mod resolve;
pub mod running;
pub mod shell;
pub mod stream;

#[cfg(test)]
mod test_support;

pub use argument::{Arg, ArgStyle, ArgValue};
pub use command::Command;
pub use config::ShellConfig;
pub use error::{ProcshError, Result};
pub use options::{CaptureSink, ExecOptions, InputSource, OutputSink, StreamKind};
pub use pipeline::RunningPipeline;
pub use process::Termination;
pub use running::{RunState, RunningCommand};
pub use shell::Shell;
