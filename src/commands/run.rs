//! Implementation of the `procsh run` command.

use super::exec::exec_options;
use super::report::RunReport;
use crate::cli::RunArgs;
use crate::error::{ProcshError, Result};
use crate::shell::Shell;
use tracing::debug;

/// Run one program with the given execution flags.
///
/// With `--json` the report is printed whether or not the run succeeded;
/// the run's error still decides the exit code.
pub fn cmd_run(shell: &Shell, args: RunArgs) -> Result<()> {
    let Some((program, rest)) = args.command.split_first() else {
        return Err(ProcshError::InvalidArgument("no program given".to_string()));
    };

    let command = shell.command(program)?;
    let options = exec_options(&args.exec);
    let mut running = command.call(rest.iter().map(String::as_str), &options)?;
    debug!(command = %running, pid = ?running.pid(), "running");

    let outcome = running.wait();
    if args.exec.json {
        println!("{}", RunReport::from_command(&running).to_json()?);
    }
    outcome
}
