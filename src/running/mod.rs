//! Single-process runner.
//!
//! A [`RunningCommand`] owns one child's lifecycle:
//! `Unspawned → Spawned → Exited | TimedOut`. Each transition happens once
//! and a runner is never reused.

mod lifecycle;


use crate::options::ExecOptions;
use crate::process::{StreamSet, Termination, reap_detached};
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::time::{Duration, Instant};

/// Lifecycle state of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Unspawned,
    Spawned,
    Exited,
    TimedOut,
}

/// One program invocation and its outcome.
#[derive(Debug)]
pub struct RunningCommand {
    program: PathBuf,
    name: String,
    args: Vec<String>,
    options: ExecOptions,
    termination: Termination,

    state: RunState,
    child: Option<Child>,
    pid: Option<u32>,
    streams: StreamSet,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    started: Option<Instant>,
    wall_time: Option<Duration>,
    exit_code: Option<i32>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl RunningCommand {
    /// Runner for `program` (already resolved) with compiled `args`.
    ///
    /// `name` is what the user asked for; it becomes the child's `argv[0]`.
    pub(crate) fn new(
        program: PathBuf,
        name: impl Into<String>,
        args: Vec<String>,
        options: ExecOptions,
        termination: Termination,
    ) -> Self {
        Self {
            program,
            name: name.into(),
            args,
            options,
            termination,
            state: RunState::Unspawned,
            child: None,
            pid: None,
            streams: StreamSet::default(),
            started_at: None,
            finished_at: None,
            started: None,
            wall_time: None,
            exit_code: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiled argument tokens, without the program.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn options(&self) -> &ExecOptions {
        &self.options
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Process id, once spawned.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Exit code, once waited. `None` if the child was killed by a signal.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Returns true if the exit code is in the accepted set.
    pub fn ok(&self) -> bool {
        self.options.accepts(self.exit_code)
    }

    /// Accumulated standard output; empty until waited.
    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    /// Accumulated standard error; empty until waited.
    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Time between spawn and the end of the wait.
    pub fn wall_time(&self) -> Option<Duration> {
        self.wall_time
    }

    /// Program path followed by its arguments, space separated.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// A runner dropped before its wait hands the child to a reaper; its stream
/// threads detach and drain until the child closes its end.
impl Drop for RunningCommand {
    fn drop(&mut self) {
        if let Some(child) = self.child.take() {
            reap_detached(vec![child]);
        }
    }
}

impl fmt::Display for RunningCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Message attached to a `CommandReturnFailure`.
pub(crate) fn failure_message(command_line: &str, stdout: &[u8], stderr: &[u8]) -> String {
    format!(
        "\n\n  RAN: {}\n\n  STDOUT:\n{}\n  STDERR:\n{}\n",
        command_line,
        String::from_utf8_lossy(stdout),
        String::from_utf8_lossy(stderr)
    )
}
