//! CLI argument parsing for procsh.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// procsh: run programs and pipelines without a shell.
///
/// Arguments are passed to programs verbatim: there is no globbing,
/// variable expansion or quoting beyond what your own shell already did.
#[derive(Parser, Debug)]
#[command(name = "procsh")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory searched for programs. Repeat to build the search path;
    /// replaces $PATH and the configured search path.
    #[arg(long = "path", global = true, value_name = "DIR")]
    pub path: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for procsh.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one program.
    ///
    /// Output is streamed as it is produced unless --json is given.
    Run(RunArgs),

    /// Run a pipeline of programs.
    ///
    /// Each STAGE is one command line, split into words like a shell would
    /// (quotes and backslashes only). The exit code is the last stage's.
    Pipe(PipeArgs),

    /// Print the resolved path of a program.
    Which(WhichArgs),

    /// Print the effective configuration as YAML.
    Config,
}

/// Execution flags shared by `run` and `pipe`.
#[derive(Args, Debug, Clone, Default)]
pub struct ExecArgs {
    /// Terminate after this many seconds (SIGTERM, then SIGKILL).
    #[arg(long, value_name = "SECS", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Working directory of the child.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Environment variable; replaces the inherited environment.
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Run with an empty environment (plus any --env).
    #[arg(long)]
    pub clear_env: bool,

    /// Exit code treated as success. Repeatable; defaults to 0.
    #[arg(long = "ok-code", value_name = "CODE", allow_negative_numbers = true)]
    pub ok_codes: Vec<i32>,

    /// Read standard input from this file.
    #[arg(long, value_name = "FILE", conflicts_with = "input_data")]
    pub input: Option<PathBuf>,

    /// Feed this text to standard input.
    #[arg(long, value_name = "TEXT")]
    pub input_data: Option<String>,

    /// Write standard output to this file.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Write standard error to this file.
    #[arg(long, value_name = "FILE", conflicts_with = "err_to_out")]
    pub err: Option<PathBuf>,

    /// Send standard error wherever standard output goes.
    #[arg(long)]
    pub err_to_out: bool,

    /// Capture output and print a JSON report instead of streaming.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub exec: ExecArgs,

    /// Program followed by its arguments.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "PROGRAM"
    )]
    pub command: Vec<String>,
}

/// Arguments for the `pipe` command.
#[derive(Args, Debug)]
pub struct PipeArgs {
    #[command(flatten)]
    pub exec: ExecArgs,

    /// Stage command lines, in order.
    #[arg(required = true, value_name = "STAGE")]
    pub stages: Vec<String>,
}

/// Arguments for the `which` command.
#[derive(Args, Debug)]
pub struct WhichArgs {
    /// Program name or absolute path.
    pub program: String,
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("invalid timeout '{}': expected seconds", value))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("invalid timeout '{}': must be positive", value));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("invalid timeout '{}': too large", value))
}

fn parse_env_pair(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, val)) if !key.is_empty() => Ok((key.to_string(), val.to_string())),
        _ => Err(format!("invalid environment entry '{}': expected KEY=VALUE", value)),
    }
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
