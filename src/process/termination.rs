//! Waiting on children with an optional timeout.
//!
//! When the timeout elapses, every child still running gets SIGTERM, then a
//! grace window of status polls, then SIGKILL. All children are reaped before
//! returning, so no zombie outlives a runner.

use crate::config::types::{DEFAULT_GRACE_INTERVAL_MS, DEFAULT_GRACE_POLLS, DEFAULT_POLL_INTERVAL_MS};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::process::{Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Timing of the wait loop and of the escalation after a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    /// Status polls between SIGTERM and SIGKILL.
    pub grace_polls: u32,
    /// Delay between grace-window polls.
    pub grace_interval: Duration,
    /// Delay between status polls while the timeout has not elapsed.
    pub poll_interval: Duration,
}

impl Default for Termination {
    fn default() -> Self {
        Self {
            grace_polls: DEFAULT_GRACE_POLLS,
            grace_interval: Duration::from_millis(DEFAULT_GRACE_INTERVAL_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl Termination {
    /// Longest time a child may survive SIGTERM before it is killed.
    pub fn grace_window(&self) -> Duration {
        self.grace_interval.saturating_mul(self.grace_polls)
    }
}

/// Result of [`wait_all`].
#[derive(Debug)]
pub(crate) struct WaitOutcome {
    /// One entry per child, in order. `None` when the status could not be
    /// collected.
    pub statuses: Vec<Option<ExitStatus>>,
    /// Children that were still running when the timeout elapsed.
    pub terminated: Vec<bool>,
    /// The timeout elapsed while at least one child was still running.
    pub timed_out: bool,
}

/// Wait for every child in `children`.
///
/// Without a timeout this blocks on each child in turn, as it does for a
/// timeout too large to express as a deadline. With one, children are polled
/// until all have exited or the timeout elapses; survivors are then
/// terminated per `policy`. A shared grace window applies to all of them.
pub(crate) fn wait_all(
    children: &mut [Child],
    timeout: Option<Duration>,
    policy: &Termination,
) -> WaitOutcome {
    let mut statuses = vec![None; children.len()];
    let mut done = vec![false; children.len()];

    let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
    let (Some(timeout), Some(deadline)) = (timeout, deadline) else {
        for (index, child) in children.iter_mut().enumerate() {
            statuses[index] = reap(child);
        }
        return WaitOutcome {
            terminated: vec![false; statuses.len()],
            statuses,
            timed_out: false,
        };
    };

    loop {
        poll(children, &mut statuses, &mut done);
        if done.iter().all(|d| *d) {
            return WaitOutcome {
                terminated: vec![false; statuses.len()],
                statuses,
                timed_out: false,
            };
        }

        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(policy.poll_interval.min(deadline - now));
    }

    let terminated: Vec<bool> = done.iter().map(|d| !d).collect();
    let pending = terminated.iter().filter(|t| **t).count();
    warn!(
        pending,
        timeout_ms = timeout.as_millis() as u64,
        grace_ms = policy.grace_window().as_millis() as u64,
        "timeout elapsed, terminating"
    );
    terminate(children, &mut statuses, &mut done, policy);

    WaitOutcome {
        statuses,
        terminated,
        timed_out: true,
    }
}

/// Check every pending child once without blocking.
fn poll(children: &mut [Child], statuses: &mut [Option<ExitStatus>], done: &mut [bool]) {
    for (index, child) in children.iter_mut().enumerate() {
        if done[index] {
            continue;
        }
        match child.try_wait() {
            Ok(Some(status)) => {
                statuses[index] = Some(status);
                done[index] = true;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(pid = child.id(), error = %e, "failed to check process status");
                done[index] = true;
            }
        }
    }
}

fn terminate(
    children: &mut [Child],
    statuses: &mut [Option<ExitStatus>],
    done: &mut [bool],
    policy: &Termination,
) {
    for (index, child) in children.iter().enumerate() {
        if !done[index] {
            send_signal(child, Signal::SIGTERM);
        }
    }

    for _ in 0..policy.grace_polls {
        thread::sleep(policy.grace_interval);
        poll(children, statuses, done);
        if done.iter().all(|d| *d) {
            return;
        }
    }

    for (index, child) in children.iter_mut().enumerate() {
        if done[index] {
            continue;
        }
        send_signal(child, Signal::SIGKILL);
        statuses[index] = reap(child);
        done[index] = true;
    }
}

/// SIGKILL and reap every child; used to unwind a partially started run.
pub(crate) fn kill_and_reap(children: &mut [Child]) {
    for child in children.iter_mut() {
        if let Err(e) = child.kill() {
            debug!(pid = child.id(), error = %e, "kill failed");
        }
        reap(child);
    }
}

/// Reap `children` without blocking the caller.
///
/// Children that already exited are collected here; the rest are waited on by
/// a detached thread so none of them is left as a zombie.
pub(crate) fn reap_detached(children: Vec<Child>) {
    let mut pending: Vec<Child> = children
        .into_iter()
        .filter_map(|mut child| match child.try_wait() {
            Ok(Some(_)) => None,
            Ok(None) => Some(child),
            Err(e) => {
                debug!(pid = child.id(), error = %e, "failed to check process status");
                Some(child)
            }
        })
        .collect();
    if pending.is_empty() {
        return;
    }

    let pids: Vec<u32> = pending.iter().map(Child::id).collect();
    let spawned = thread::Builder::new()
        .name("procsh-reaper".to_string())
        .spawn(move || {
            for child in pending.iter_mut() {
                reap(child);
            }
        });
    match spawned {
        Ok(_) => debug!(?pids, "reaping detached processes"),
        Err(e) => warn!(?pids, error = %e, "failed to start reaper thread"),
    }
}

/// Block until `child` exits.
fn reap(child: &mut Child) -> Option<ExitStatus> {
    match child.wait() {
        Ok(status) => Some(status),
        Err(e) => {
            warn!(pid = child.id(), error = %e, "failed to wait for process");
            None
        }
    }
}

/// Send `signal` to `child`; a process that is already gone is not an error.
fn send_signal(child: &Child, signal: Signal) {
    let pid = Pid::from_raw(child.id() as i32);
    match kill(pid, signal) {
        Ok(()) => debug!(pid = child.id(), signal = %signal, "signal sent"),
        Err(Errno::ESRCH) => debug!(pid = child.id(), signal = %signal, "process already gone"),
        Err(e) => warn!(pid = child.id(), signal = %signal, error = %e, "failed to send signal"),
    }
}
