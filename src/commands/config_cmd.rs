//! Implementation of the `procsh config` command.

use crate::error::Result;
use crate::shell::Shell;

/// Print the effective configuration as YAML.
///
/// The search path is shown resolved, so an unset `search_path` prints the
/// directories taken from `$PATH`.
pub fn cmd_config(shell: &Shell) -> Result<()> {
    let mut config = shell.config().clone();
    config.search_path = Some(config.effective_search_path());
    print!("{}", config.to_yaml()?);
    Ok(())
}
