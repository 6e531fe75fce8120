//! Command implementations for procsh.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Shared plumbing (config loading, execution flags, the
//! JSON report) lives in `exec` and `report`.

mod config_cmd;
mod exec;
mod pipe;
mod report;
mod run;
mod which;

use crate::cli::{Cli, Command};
use crate::config::ShellConfig;
use crate::error::Result;
use crate::logging;
use crate::shell::Shell;

/// Dispatch a command to its implementation.
///
/// Loads the configuration (global flags applied), installs logging, then
/// routes the subcommand to its handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    logging::init(&config.log_filter);

    let shell = Shell::with_config(config)?;
    match cli.command {
        Command::Run(args) => run::cmd_run(&shell, args),
        Command::Pipe(args) => pipe::cmd_pipe(&shell, args),
        Command::Which(args) => which::cmd_which(&shell, args),
        Command::Config => config_cmd::cmd_config(&shell),
    }
}

/// Config file (if any) with `--path` applied on top.
fn load_config(cli: &Cli) -> Result<ShellConfig> {
    let mut config = match &cli.config {
        Some(path) => ShellConfig::load(path)?,
        None => ShellConfig::default(),
    };
    if !cli.path.is_empty() {
        config.search_path = Some(cli.path.clone());
    }
    Ok(config)
}
