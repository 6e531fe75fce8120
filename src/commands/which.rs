//! Implementation of the `procsh which` command.

use crate::cli::WhichArgs;
use crate::error::Result;
use crate::shell::Shell;

/// Print the path `args.program` resolves to.
pub fn cmd_which(shell: &Shell, args: WhichArgs) -> Result<()> {
    let command = shell.command(&args.program)?;
    println!("{}", command.program().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;
    use crate::error::ProcshError;

    #[test]
    fn test_which_respects_search_path() {
        let config = ShellConfig {
            search_path: Some(Vec::new()),
            ..ShellConfig::default()
        };
        let shell = Shell::with_config(config).unwrap();
        let err = cmd_which(
            &shell,
            WhichArgs {
                program: "sh".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ProcshError::CommandNotFound(_)));
    }
}
