//! Command templates.
//!
//! A [`Command`] is an un-run program: its resolved path plus baked arguments
//! and options. Calling it produces a [`RunningCommand`]; baking produces a
//! new, independent template.

use crate::argument::{Arg, ArgStyle, compile_args};
use crate::config::ShellConfig;
use crate::error::Result;
use crate::options::ExecOptions;
use crate::process::Termination;
use crate::resolve::resolve_program;
use crate::running::RunningCommand;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    program: PathBuf,
    args: Vec<Arg>,
    options: ExecOptions,
    style: ArgStyle,
    termination: Termination,
}

impl Command {
    /// Resolve `name` with the search path of `config`.
    ///
    /// # Returns
    ///
    /// * `Ok(Command)` - Template with no baked arguments or options
    /// * `Err(ProcshError::CommandNotFound)` - Nothing executable matched
    pub fn new(name: &str, config: &ShellConfig) -> Result<Self> {
        let program = resolve_program(name, &config.effective_search_path())?;
        Ok(Self {
            name: name.to_string(),
            program,
            args: Vec::new(),
            options: ExecOptions::new(),
            style: config.arg_style(),
            termination: config.termination(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn baked_args(&self) -> &[Arg] {
        &self.args
    }

    pub fn baked_options(&self) -> &ExecOptions {
        &self.options
    }

    /// New template with `args` appended to the baked arguments and `options`
    /// layered over the baked options.
    pub fn bake<I>(&self, args: I, options: &ExecOptions) -> Result<Command>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let options = self.options.merge(options);
        options.validate()?;

        let mut baked = self.clone();
        baked.args.extend(args.into_iter().map(Into::into));
        baked.options = options;
        Ok(baked)
    }

    /// Run the program.
    ///
    /// In the foreground this waits and checks the exit code; in the
    /// background it returns right after spawning.
    pub fn call<I>(&self, args: I, options: &ExecOptions) -> Result<RunningCommand>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let options = self.options.merge(options);
        options.validate()?;
        self.runner(args, options)?.run()
    }

    /// Unspawned runner to register as a pipeline stage.
    ///
    /// Stage options may only set the environment, working directory and
    /// argument style.
    pub fn prepare<I>(&self, args: I, options: &ExecOptions) -> Result<RunningCommand>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let options = self.options.merge(options);
        options.validate_for_stage()?;
        self.runner(args, options)
    }

    fn runner<I>(&self, args: I, options: ExecOptions) -> Result<RunningCommand>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let style = options.arg_style(&self.style);
        let all_args = self
            .args
            .iter()
            .cloned()
            .chain(args.into_iter().map(Into::into));
        let tokens = compile_args(all_args, &style)?;

        Ok(RunningCommand::new(
            self.program.clone(),
            self.name.clone(),
            tokens,
            options,
            self.termination,
        ))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::ArgValue;
    use crate::error::ProcshError;
    use std::time::Duration;

    fn command(name: &str) -> Command {
        Command::new(name, &ShellConfig::default()).unwrap()
    }

    fn no_args() -> Vec<Arg> {
        Vec::new()
    }

    #[test]
    fn test_missing_program_fails_before_spawn() {
        let err = Command::new("procsh-no-such-program", &ShellConfig::default()).unwrap_err();
        assert!(matches!(err, ProcshError::CommandNotFound(_)));
        assert_eq!(
            err.to_string(),
            "command not found: no command `procsh-no-such-program'"
        );
    }

    #[test]
    fn test_explicit_search_path_is_used() {
        let config = ShellConfig {
            search_path: Some(Vec::new()),
            ..ShellConfig::default()
        };
        assert!(Command::new("sh", &config).is_err());
    }

    #[test]
    fn test_call_compiles_arguments() {
        let echo = command("echo");
        let cmd = echo
            .call(
                [
                    Arg::positional("status"),
                    Arg::named("v", true),
                    Arg::named("untracked_files", "normal"),
                    Arg::named("short", false),
                ],
                &ExecOptions::new(),
            )
            .unwrap();

        assert_eq!(cmd.args(), &["status", "-v", "--untracked-files=normal"]);
        assert_eq!(cmd.stdout_lossy(), "status -v --untracked-files=normal\n");
    }

    #[test]
    fn test_call_with_split_long_separator() {
        let echo = command("echo");
        let cmd = echo
            .call(
                [Arg::named("name", "value")],
                &ExecOptions::new().with_long_separator(None),
            )
            .unwrap();
        assert_eq!(cmd.args(), &["--name", "value"]);
    }

    #[test]
    fn test_bake_returns_independent_template() {
        let echo = command("echo");
        let baked = echo
            .bake(["-n"], &ExecOptions::new().with_ok_codes([0, 1]))
            .unwrap();

        assert!(echo.baked_args().is_empty());
        assert_eq!(baked.baked_args().len(), 1);
        assert_eq!(baked.baked_options().ok_codes(), &[0, 1]);

        let cmd = baked.call(["hi"], &ExecOptions::new()).unwrap();
        assert_eq!(cmd.stdout(), b"hi");
    }

    #[test]
    fn test_call_overrides_baked_named_option_in_place() {
        let echo = command("echo")
            .bake(
                [Arg::named("mode", "a"), Arg::positional("x")],
                &ExecOptions::new(),
            )
            .unwrap();

        let cmd = echo
            .call([Arg::named("mode", "b")], &ExecOptions::new())
            .unwrap();
        assert_eq!(cmd.args(), &["--mode=b", "x"]);
    }

    #[test]
    fn test_lazy_values_compile_at_call_time() {
        let echo = command("echo");
        let cmd = echo
            .call(
                [Arg::named("v", ArgValue::lazy(|| true))],
                &ExecOptions::new(),
            )
            .unwrap();
        assert_eq!(cmd.args(), &["-v"]);
    }

    #[test]
    fn test_call_validates_options() {
        let err = command("true")
            .call(no_args(), &ExecOptions::new().with_ok_codes([]))
            .unwrap_err();
        assert!(matches!(err, ProcshError::InvalidArgument(_)));
    }

    #[test]
    fn test_prepare_rejects_non_stage_options() {
        let err = command("true")
            .prepare(no_args(), &ExecOptions::new().with_timeout(Duration::from_secs(1)))
            .unwrap_err();
        assert!(err.to_string().contains("`timeout'"));

        let runner = command("true")
            .prepare(no_args(), &ExecOptions::new().with_cwd("/"))
            .unwrap();
        assert_eq!(runner.state(), crate::running::RunState::Unspawned);
    }

    #[test]
    fn test_baked_options_apply_to_stages() {
        let background = command("true")
            .bake(no_args(), &ExecOptions::new().with_background(true))
            .unwrap();
        assert!(background.prepare(no_args(), &ExecOptions::new()).is_err());
    }
}
