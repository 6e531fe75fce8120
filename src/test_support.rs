use std::thread;
use std::time::{Duration, Instant};

/// State letter from `/proc/<pid>/stat`, `None` once the pid is gone.
pub(crate) fn process_state(pid: u32) -> Option<char> {
    let stat = std::fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;
    let (_, rest) = stat.rsplit_once(')')?;
    rest.trim_start().chars().next()
}

/// Poll until none of `pids` is a zombie. Returns false if `limit` elapses first.
pub(crate) fn wait_until_reaped(pids: &[u32], limit: Duration) -> bool {
    let started = Instant::now();
    while started.elapsed() < limit {
        if pids.iter().all(|pid| process_state(*pid) != Some('Z')) {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}
