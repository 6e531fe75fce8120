//! Spawning, waiting and outcome checks for [`RunningCommand`].

use super::{RunState, RunningCommand, failure_message};
use crate::error::{ProcshError, Result};
use crate::options::StreamKind;
use crate::process::{Endpoint, StreamSet, kill_and_reap, open_input, open_output, wait_all};
use chrono::Utc;
use std::collections::BTreeMap;
use std::io;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

impl RunningCommand {
    /// Spawn, then either return right away (background) or wait and check.
    pub(crate) fn run(mut self) -> Result<Self> {
        self.spawn()?;
        if !self.options.background() {
            self.wait()?;
        }
        Ok(self)
    }

    /// Launch the child with the redirections described by the options.
    pub(crate) fn spawn(&mut self) -> Result<()> {
        self.ensure_unspawned()?;

        let (stdin, pending) = open_input(self.options.input()).map_err(|e| self.io_error(e))?;
        let (stdout, stdout_reader) = open_output(self.options.output(), StreamKind::Stdout)
            .map_err(|e| self.io_error(e))?;
        let (stderr, stderr_reader) = if self.options.err_to_out() {
            (stdout.mirror().map_err(|e| self.io_error(e))?, None)
        } else {
            open_output(self.options.error(), StreamKind::Stderr).map_err(|e| self.io_error(e))?
        };

        // The child-side ends live in `command` and close when it drops.
        let child = {
            let mut command = self.build(self.options.env(), self.options.cwd());
            command
                .stdin(stdin)
                .stdout(stdout.into_stdio())
                .stderr(stderr.into_stdio());
            command.spawn().map_err(|e| self.spawn_error(e))?
        };
        self.mark_spawned(child);

        match StreamSet::start(
            &self.name,
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
                if let Some(child) = self.child.take() {
                    kill_and_reap(&mut [child]);
                }
                self.record(None, false);
                Err(self.io_error(e))
            }
        }
    }

    /// Spawn as a pipeline stage with redirections chosen by the pipeline.
    ///
    /// `env` and `cwd` override the stage's own options when set.
    pub(crate) fn spawn_stage(
        &mut self,
        stdin: Stdio,
        stdout: Endpoint,
        stderr: Endpoint,
        env: Option<&BTreeMap<String, String>>,
        cwd: Option<&Path>,
    ) -> Result<()> {
        self.ensure_unspawned()?;

        let env = env.or(self.options.env());
        let cwd = cwd.or(self.options.cwd());
        let child = {
            let mut command = self.build(env, cwd);
            command
                .stdin(stdin)
                .stdout(stdout.into_stdio())
                .stderr(stderr.into_stdio());
            command.spawn().map_err(|e| self.spawn_error(e))?
        };
        self.mark_spawned(child);
        Ok(())
    }

    /// Hand the child over to a pipeline that waits on all stages at once.
    pub(crate) fn take_child(&mut self) -> Option<Child> {
        self.child.take()
    }

    /// Wait with the timeout from the options, then check the outcome.
    pub fn wait(&mut self) -> Result<()> {
        self.wait_with_timeout(self.options.timeout())
    }

    /// Wait with an explicit timeout, then check the outcome.
    ///
    /// Blocks until the child exits (or is terminated after `timeout`) and
    /// both output streams are drained. A finished runner re-reports its
    /// outcome without blocking.
    pub fn wait_with_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match self.state {
            RunState::Unspawned => {
                return Err(ProcshError::InvalidArgument(format!(
                    "command `{}' was never spawned",
                    self.name
                )));
            }
            RunState::Spawned => {
                let outcome = match self.child.take() {
                    Some(child) => {
                        let mut children = [child];
                        wait_all(&mut children, timeout, &self.termination)
                    }
                    None => {
                        return Err(ProcshError::InvalidArgument(format!(
                            "command `{}' is owned by a pipeline",
                            self.name
                        )));
                    }
                };
                let (stdout, stderr) = self.streams.finish();
                self.stdout = stdout;
                self.stderr = stderr;
                self.record(outcome.statuses[0], outcome.timed_out);
            }
            RunState::Exited | RunState::TimedOut => {}
        }
        self.check()
    }

    /// Record how the child ended. Called once, by the runner or its pipeline.
    pub(crate) fn record(&mut self, status: Option<ExitStatus>, timed_out: bool) {
        self.exit_code = status.and_then(|s| s.code());
        self.state = if timed_out {
            RunState::TimedOut
        } else {
            RunState::Exited
        };
        self.finished_at = Some(Utc::now());
        self.wall_time = self.started.map(|started| started.elapsed());
        debug!(
            command = %self.name,
            pid = ?self.pid,
            exit_code = ?self.exit_code,
            timed_out,
            "process finished"
        );
    }

    /// Outcome of a finished runner as a `Result`.
    fn check(&self) -> Result<()> {
        if self.state == RunState::TimedOut {
            return Err(ProcshError::CommandTimeout(format!(
                "{}: execution expired",
                self.command_line()
            )));
        }
        if self.ok() {
            return Ok(());
        }
        Err(ProcshError::CommandReturnFailure {
            exit_code: self.exit_code,
            message: failure_message(&self.command_line(), &self.stdout, &self.stderr),
        })
    }

    fn build(&self, env: Option<&BTreeMap<String, String>>, cwd: Option<&Path>) -> Command {
        let mut command = Command::new(&self.program);
        command.arg0(&self.name).args(&self.args);
        if let Some(env) = env {
            command.env_clear().envs(env);
        }
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        command
    }

    fn mark_spawned(&mut self, child: Child) {
        self.pid = Some(child.id());
        self.child = Some(child);
        self.state = RunState::Spawned;
        self.started_at = Some(Utc::now());
        self.started = Some(Instant::now());
        debug!(command = %self.name, pid = ?self.pid, args = ?self.args, "process spawned");
    }

    fn ensure_unspawned(&self) -> Result<()> {
        if self.state != RunState::Unspawned {
            return Err(ProcshError::InvalidArgument(format!(
                "command `{}' was already spawned",
                self.name
            )));
        }
        Ok(())
    }

    fn io_error(&self, e: io::Error) -> ProcshError {
        ProcshError::Io(format!("failed to set up streams for '{}': {}", self.name, e))
    }

    fn spawn_error(&self, e: io::Error) -> ProcshError {
        ProcshError::Io(format!("failed to spawn '{}': {}", self.command_line(), e))
    }
}
