//! OS-level plumbing shared by single commands and pipelines.
//!
//! - `redirect`: turns redirection options into child-side `Stdio` values and
//!   the parent-side pipe ends the runner keeps
//! - `termination`: waiting with a timeout and escalating SIGTERM → SIGKILL

mod redirect;
mod termination;

pub use termination::Termination;

pub(crate) use redirect::{Endpoint, StreamSet, open_input, open_output};
pub(crate) use termination::{WaitOutcome, kill_and_reap, reap_detached, wait_all};
