//! Shell facade: creates commands and pipelines from one configuration.

use crate::command::Command;
use crate::config::ShellConfig;
use crate::error::Result;
use crate::options::ExecOptions;
use crate::pipeline::RunningPipeline;

/// Entry point holding the configuration shared by its commands.
///
/// # Example
///
/// ```no_run
/// use procsh::{Arg, ExecOptions, Shell};
///
/// let sh = Shell::new();
/// let git = sh.command("git")?;
/// let status = git.call([Arg::positional("status"), Arg::flag("short")], &ExecOptions::new())?;
/// print!("{}", status.stdout_lossy());
///
/// let cat = sh.command("cat")?;
/// let wc = sh.command("wc")?;
/// let count = sh.run_pipeline(ExecOptions::new().with_input_data("hello"), |p| {
///     p.register(cat.prepare(Vec::<Arg>::new(), &ExecOptions::new())?)?;
///     p.register(wc.prepare(["-c"], &ExecOptions::new())?)
/// })?;
/// assert_eq!(count.stdout_lossy().trim(), "5");
/// # Ok::<(), procsh::ProcshError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Shell {
    config: ShellConfig,
}

impl Shell {
    /// Shell with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shell with `config`, validated first.
    pub fn with_config(config: ShellConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Resolve `program` into a command template.
    pub fn command(&self, program: &str) -> Result<Command> {
        Command::new(program, &self.config)
    }

    /// Empty pipeline using this shell's termination policy.
    pub fn pipeline(&self) -> RunningPipeline {
        RunningPipeline::new(self.config.termination())
    }

    /// Build a pipeline with `build`, then run it with `options`.
    ///
    /// `build` registers stages in order; a pipeline with no stage fails with
    /// `CommandNotFound`.
    pub fn run_pipeline<F>(&self, options: ExecOptions, build: F) -> Result<RunningPipeline>
    where
        F: FnOnce(&mut RunningPipeline) -> Result<()>,
    {
        let mut pipeline = self.pipeline();
        build(&mut pipeline)?;
        pipeline.run(options)?;
        Ok(pipeline)
    }
}
