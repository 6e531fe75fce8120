//! Pipeline runner.
//!
//! A [`RunningPipeline`] is built by registering unspawned stages in order,
//! then sealed by a single [`RunningPipeline::run`] call that connects stage
//! `i` stdout to stage `i + 1` stdin and waits on all of them.
//!
//! Success follows the last stage, as in a POSIX shell without `pipefail`.
//! Per-stage exit codes are exposed for stricter policies.

#[cfg(test)]
mod tests;

use crate::error::{ProcshError, Result};
use crate::options::{ExecOptions, StreamKind};
use crate::process::{
    Endpoint, StreamSet, Termination, kill_and_reap, open_input, open_output, reap_detached,
    wait_all,
};
use crate::running::{RunState, RunningCommand, failure_message};
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::os::fd::OwnedFd;
use std::process::{Child, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Ordered stages connected by pipes, plus pipeline-wide options.
#[derive(Debug)]
pub struct RunningPipeline {
    stages: Vec<RunningCommand>,
    options: ExecOptions,
    termination: Termination,

    state: RunState,
    children: Vec<Child>,
    streams: StreamSet,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    started: Option<Instant>,
    wall_time: Option<Duration>,
    exit_code: Option<i32>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl Default for RunningPipeline {
    fn default() -> Self {
        Self::new(Termination::default())
    }
}

impl RunningPipeline {
    pub fn new(termination: Termination) -> Self {
        Self {
            stages: Vec::new(),
            options: ExecOptions::new(),
            termination,
            state: RunState::Unspawned,
            children: Vec::new(),
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

    // =========================================================================
    // Building
    // =========================================================================

    /// Append a stage. Only allowed before [`run`](Self::run).
    pub fn register(&mut self, stage: RunningCommand) -> Result<()> {
        if self.state != RunState::Unspawned {
            return Err(ProcshError::InvalidArgument(
                "cannot register a stage after the pipeline started".to_string(),
            ));
        }
        if stage.state() != RunState::Unspawned {
            return Err(ProcshError::InvalidArgument(format!(
                "stage `{}' was already spawned",
                stage.name()
            )));
        }
        self.stages.push(stage);
        Ok(())
    }

    /// Spawn every stage with pipeline-wide `options`, then wait and check
    /// unless the options ask for background execution.
    pub fn run(&mut self, options: ExecOptions) -> Result<()> {
        if self.state != RunState::Unspawned {
            return Err(ProcshError::InvalidArgument(
                "pipeline was already started".to_string(),
            ));
        }
        if self.stages.is_empty() {
            return Err(ProcshError::CommandNotFound("no commands".to_string()));
        }
        options.validate_for_pipeline()?;
        self.options = options;

        self.spawn()?;
        if !self.options.background() {
            self.wait()?;
        }
        Ok(())
    }

    fn spawn(&mut self) -> Result<()> {
        let io_error = |e: io::Error| {
            ProcshError::Io(format!("failed to set up pipeline streams: {}", e))
        };

        let (stdin, pending) = open_input(self.options.input()).map_err(io_error)?;
        let (stdout, stdout_reader) =
            open_output(self.options.output(), StreamKind::Stdout).map_err(io_error)?;
        let (stderr, stderr_reader) = if self.options.err_to_out() {
            (None, None)
        } else {
            let (endpoint, reader) =
                open_output(self.options.error(), StreamKind::Stderr).map_err(io_error)?;
            (Some(endpoint), reader)
        };

        let last = self.stages.len() - 1;
        let mut next_stdin = Some(stdin);
        let mut last_stdout = Some(stdout);

        for index in 0..=last {
            let result = self.spawn_stage(
                index,
                last,
                &mut next_stdin,
                &mut last_stdout,
                stderr.as_ref(),
            );
            if let Err(e) = result {
                debug!(stage = index, error = %e, "stage failed to spawn, unwinding");
                let mut children = std::mem::take(&mut self.children);
                kill_and_reap(&mut children);
                for stage in &mut self.stages[..index] {
                    stage.record(None, false);
                }
                return Err(e);
            }
        }
        // Our copy of the shared stderr must close, or its reader never ends.
        drop(stderr);

        self.state = RunState::Spawned;
        self.started_at = Some(Utc::now());
        self.started = Some(Instant::now());
        debug!(pipeline = %self, stages = self.stages.len(), "pipeline spawned");

        match StreamSet::start(
            "pipeline",
            &self.options,
            pending,
            stdout_reader,
            stderr_reader,
        ) {
            Ok(streams) => {
                self.streams = streams;
                Ok(())
            }
            Err(e) => {
                let mut children = std::mem::take(&mut self.children);
                kill_and_reap(&mut children);
                self.finish(vec![None; self.stages.len()], vec![false; self.stages.len()], false);
                Err(io_error(e))
            }
        }
    }

    /// Wire and spawn stage `index`.
    fn spawn_stage(
        &mut self,
        index: usize,
        last: usize,
        next_stdin: &mut Option<Stdio>,
        last_stdout: &mut Option<Endpoint>,
        shared_stderr: Option<&Endpoint>,
    ) -> Result<()> {
        let io_error =
            |e: io::Error| ProcshError::Io(format!("failed to connect pipeline stage: {}", e));

        let stdin = next_stdin.take().unwrap_or_else(Stdio::null);
        let stdout = if index == last {
            last_stdout.take().unwrap_or(Endpoint::Null)
        } else {
            let (reader, writer) = io::pipe().map_err(io_error)?;
            *next_stdin = Some(Stdio::from(reader));
            Endpoint::Fd(OwnedFd::from(writer))
        };
        let stderr = match shared_stderr {
            Some(endpoint) => endpoint.try_clone(),
            None => stdout.mirror(),
        }
        .map_err(io_error)?;

        let stage = &mut self.stages[index];
        stage.spawn_stage(
            stdin,
            stdout,
            stderr,
            self.options.env(),
            self.options.cwd(),
        )?;
        if let Some(child) = stage.take_child() {
            self.children.push(child);
        }
        Ok(())
    }

    // =========================================================================
    // Waiting
    // =========================================================================

    /// Wait with the timeout from the pipeline options, then check.
    pub fn wait(&mut self) -> Result<()> {
        self.wait_with_timeout(self.options.timeout())
    }

    /// Wait on every stage with an explicit timeout, then check.
    ///
    /// On timeout every live stage gets SIGTERM, one shared grace window,
    /// then SIGKILL.
    pub fn wait_with_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match self.state {
            RunState::Unspawned => {
                return Err(ProcshError::InvalidArgument(
                    "pipeline was never started".to_string(),
                ));
            }
            RunState::Spawned => {
                let mut children = std::mem::take(&mut self.children);
                let outcome = wait_all(&mut children, timeout, &self.termination);
                let (stdout, stderr) = self.streams.finish();
                self.stdout = stdout;
                self.stderr = stderr;
                self.finish(outcome.statuses, outcome.terminated, outcome.timed_out);
            }
            RunState::Exited | RunState::TimedOut => {}
        }
        self.check()
    }

    fn finish(
        &mut self,
        statuses: Vec<Option<std::process::ExitStatus>>,
        terminated: Vec<bool>,
        timed_out: bool,
    ) {
        for ((stage, status), terminated) in self.stages.iter_mut().zip(statuses).zip(terminated) {
            stage.record(status, terminated);
        }
        self.exit_code = self.stages.last().and_then(RunningCommand::exit_code);
        self.state = if timed_out {
            RunState::TimedOut
        } else {
            RunState::Exited
        };
        self.finished_at = Some(Utc::now());
        self.wall_time = self.started.map(|started| started.elapsed());
        debug!(
            pipeline = %self,
            exit_code = ?self.exit_code,
            stage_exit_codes = ?self.stage_exit_codes(),
            timed_out,
            "pipeline finished"
        );
    }

    fn check(&self) -> Result<()> {
        if self.state == RunState::TimedOut {
            return Err(ProcshError::CommandTimeout(format!(
                "{}: execution expired",
                self
            )));
        }
        if self.ok() {
            return Ok(());
        }
        Err(ProcshError::CommandReturnFailure {
            exit_code: self.exit_code,
            message: failure_message(&self.to_string(), &self.stdout, &self.stderr),
        })
    }

    // =========================================================================
    // Results
    // =========================================================================

    pub fn stages(&self) -> &[RunningCommand] {
        &self.stages
    }

    pub fn options(&self) -> &ExecOptions {
        &self.options
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Exit code of the last stage.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Exit code of every stage, in order.
    pub fn stage_exit_codes(&self) -> Vec<Option<i32>> {
        self.stages.iter().map(RunningCommand::exit_code).collect()
    }

    /// Returns true if the last stage's exit code is accepted.
    pub fn ok(&self) -> bool {
        self.options.accepts(self.exit_code)
    }

    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

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

    pub fn wall_time(&self) -> Option<Duration> {
        self.wall_time
    }
}

impl Drop for RunningPipeline {
    fn drop(&mut self) {
        reap_detached(std::mem::take(&mut self.children));
    }
}

impl fmt::Display for RunningPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, stage) in self.stages.iter().enumerate() {
            if index > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", stage)?;
        }
        Ok(())
    }
}
