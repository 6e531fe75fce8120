//! Program path resolution.
//!
//! Maps a program name to an executable file using an explicit, ordered
//! search path. Absolute names are checked as-is and never searched.

use crate::error::{ProcshError, Result};
use std::ffi::OsStr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Split a `PATH`-style value into its entries, dropping empty ones.
pub fn split_search_path(value: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// Search path taken from the `PATH` environment variable.
pub fn search_path_from_env() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|value| split_search_path(&value))
        .unwrap_or_default()
}

/// Returns true if `path` is a regular file with an execute bit set.
pub fn is_executable(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

/// Resolve `program` against `search_path`.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The first executable match (or `program` itself if absolute)
/// * `Err(ProcshError::CommandNotFound)` - Nothing executable was found
pub fn resolve_program(program: &str, search_path: &[PathBuf]) -> Result<PathBuf> {
    let not_found = || ProcshError::CommandNotFound(format!("no command `{}'", program));

    if program.is_empty() {
        return Err(not_found());
    }

    let candidate = Path::new(program);
    if candidate.is_absolute() {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(not_found())
        };
    }

    search_path
        .iter()
        .map(|dir| dir.join(program))
        .find(|path| is_executable(path))
        .ok_or_else(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\necho hi\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_resolves_first_match_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_script(second.path(), "tool", 0o755);
        let expected = write_script(first.path(), "tool", 0o755);

        let search = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(resolve_program("tool", &search).unwrap(), expected);
    }

    #[test]
    fn test_skips_non_executable_files() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_script(first.path(), "tool", 0o644);
        let expected = write_script(second.path(), "tool", 0o755);

        let search = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(resolve_program("tool", &search).unwrap(), expected);
    }

    #[test]
    fn test_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("tool")).unwrap();

        let search = vec![dir.path().to_path_buf()];
        let err = resolve_program("tool", &search).unwrap_err();
        assert!(matches!(err, ProcshError::CommandNotFound(_)));
    }

    #[test]
    fn test_absolute_path_is_not_searched() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "tool", 0o755);

        let resolved = resolve_program(script.to_str().unwrap(), &[]).unwrap();
        assert_eq!(resolved, script);

        let missing = dir.path().join("missing");
        let err = resolve_program(missing.to_str().unwrap(), &[dir.path().to_path_buf()]);
        assert!(err.is_err());
    }

    #[test]
    fn test_not_found_message_names_program() {
        let err = resolve_program("procsh-commandnotfound", &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "command not found: no command `procsh-commandnotfound'"
        );
        assert!(resolve_program("", &search_path_from_env()).is_err());
    }

    #[test]
    fn test_split_search_path_drops_empty_entries() {
        let paths = split_search_path(OsStr::new("/usr/bin::/bin"));
        assert_eq!(paths, vec![PathBuf::from("/usr/bin"), PathBuf::from("/bin")]);
    }
}
