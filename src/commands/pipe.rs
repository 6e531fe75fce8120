//! Implementation of the `procsh pipe` command.

use super::exec::exec_options;
use super::report::RunReport;
use crate::cli::PipeArgs;
use crate::error::{ProcshError, Result};
use crate::options::ExecOptions;
use crate::running::RunningCommand;
use crate::shell::Shell;

/// Run the stages as one pipeline.
pub fn cmd_pipe(shell: &Shell, args: PipeArgs) -> Result<()> {
    let mut pipeline = shell.pipeline();
    for stage in &args.stages {
        pipeline.register(prepare_stage(shell, stage)?)?;
    }

    pipeline.run(exec_options(&args.exec))?;
    let outcome = pipeline.wait();
    if args.exec.json {
        println!("{}", RunReport::from_pipeline(&pipeline).to_json()?);
    }
    outcome
}

/// Split one stage command line and prepare its runner.
fn prepare_stage(shell: &Shell, stage: &str) -> Result<RunningCommand> {
    let words = shell_words::split(stage).map_err(|e| {
        ProcshError::InvalidArgument(format!("failed to parse stage '{}': {}", stage, e))
    })?;
    let Some((program, rest)) = words.split_first() else {
        return Err(ProcshError::InvalidArgument(format!(
            "empty pipeline stage '{}'",
            stage
        )));
    };

    shell
        .command(program)?
        .prepare(rest.iter().map(String::as_str), &ExecOptions::new())
}
