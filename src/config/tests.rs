//! Tests for config functionality.

use crate::config::ShellConfig;
use crate::config::types::{DEFAULT_GRACE_INTERVAL_MS, DEFAULT_GRACE_POLLS};
use crate::resolve::search_path_from_env;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = ShellConfig::default();

    assert_eq!(config.search_path, None);
    assert_eq!(config.long_separator.as_deref(), Some("="));
    assert_eq!(config.long_prefix, "--");
    assert_eq!(config.grace_polls, DEFAULT_GRACE_POLLS);
    assert_eq!(config.grace_interval_ms, DEFAULT_GRACE_INTERVAL_MS);
    assert_eq!(config.poll_interval_ms, 10);
    assert_eq!(config.log_filter, "warn");
}

#[test]
fn test_parse_empty_yaml() {
    let config = ShellConfig::from_yaml("").unwrap();
    assert_eq!(config, ShellConfig::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
grace_polls: 5
long_prefix: "-"
"#;
    let config = ShellConfig::from_yaml(yaml).unwrap();

    assert_eq!(config.grace_polls, 5);
    assert_eq!(config.long_prefix, "-");

    // Unspecified values should use defaults
    assert_eq!(config.long_separator.as_deref(), Some("="));
    assert_eq!(config.grace_interval_ms, DEFAULT_GRACE_INTERVAL_MS);
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
search_path:
  - /opt/tools/bin
  - /usr/bin
long_separator: null
long_prefix: "--"
grace_polls: 10
grace_interval_ms: 50
poll_interval_ms: 5
log_filter: debug
"#;
    let config = ShellConfig::from_yaml(yaml).unwrap();

    assert_eq!(
        config.search_path,
        Some(vec![PathBuf::from("/opt/tools/bin"), PathBuf::from("/usr/bin")])
    );
    assert_eq!(config.long_separator, None);
    assert_eq!(config.grace_polls, 10);
    assert_eq!(config.log_filter, "debug");

    let termination = config.termination();
    assert_eq!(termination.grace_polls, 10);
    assert_eq!(termination.grace_interval, Duration::from_millis(50));
    assert_eq!(termination.poll_interval, Duration::from_millis(5));

    let style = config.arg_style();
    assert_eq!(style.long_separator, None);
    assert_eq!(style.long_prefix, "--");
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = r#"
grace_polls: 3
some_future_option: true
"#;
    let config = ShellConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.grace_polls, 3);
}

#[test]
fn test_validation_rejects_zero_values() {
    for yaml in [
        "grace_polls: 0",
        "grace_interval_ms: 0",
        "poll_interval_ms: 0",
        "long_prefix: \"\"",
    ] {
        let result = ShellConfig::from_yaml(yaml);
        assert!(result.is_err(), "expected '{}' to be rejected", yaml);
    }
}

#[test]
fn test_invalid_yaml_reports_parse_error() {
    let err = ShellConfig::from_yaml("grace_polls: [").unwrap_err();
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_yaml_roundtrip_preserves_values() {
    let config = ShellConfig {
        search_path: Some(vec![PathBuf::from("/bin")]),
        long_separator: None,
        ..ShellConfig::default()
    };
    let yaml = config.to_yaml().unwrap();
    assert_eq!(ShellConfig::from_yaml(&yaml).unwrap(), config);
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("procsh.yaml");
    std::fs::write(&path, "grace_polls: 7\n").unwrap();

    let config = ShellConfig::load(&path).unwrap();
    assert_eq!(config.grace_polls, 7);

    let err = ShellConfig::load(dir.path().join("missing.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_effective_search_path_defaults_to_env() {
    let config = ShellConfig::default();
    assert_eq!(config.effective_search_path(), search_path_from_env());

    let explicit = ShellConfig {
        search_path: Some(vec![PathBuf::from("/only")]),
        ..ShellConfig::default()
    };
    assert_eq!(explicit.effective_search_path(), vec![PathBuf::from("/only")]);
}
