//! Config loading, validation, and conversion into runtime policies.

use super::model::ShellConfig;
use crate::argument::ArgStyle;
use crate::error::{ProcshError, Result};
use crate::process::Termination;
use crate::resolve::search_path_from_env;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl ShellConfig {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(ShellConfig)` - Successfully loaded and validated config
    /// * `Err(ProcshError::Config)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ProcshError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document; treat it as "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: ShellConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ProcshError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ProcshError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `grace_polls` must be positive
    /// - `grace_interval_ms` and `poll_interval_ms` must be positive
    /// - `long_prefix` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.grace_polls == 0 {
            return Err(ProcshError::Config(
                "grace_polls must be greater than 0".to_string(),
            ));
        }

        if self.grace_interval_ms == 0 {
            return Err(ProcshError::Config(
                "grace_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(ProcshError::Config(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.long_prefix.is_empty() {
            return Err(ProcshError::Config(
                "long_prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Search path used for program resolution.
    pub fn effective_search_path(&self) -> Vec<PathBuf> {
        match &self.search_path {
            Some(paths) => paths.clone(),
            None => search_path_from_env(),
        }
    }

    /// Default argument style for commands created from this config.
    pub fn arg_style(&self) -> ArgStyle {
        ArgStyle {
            long_separator: self.long_separator.clone(),
            long_prefix: self.long_prefix.clone(),
        }
    }

    /// Termination policy applied when a timeout elapses.
    pub fn termination(&self) -> Termination {
        Termination {
            grace_polls: self.grace_polls,
            grace_interval: Duration::from_millis(self.grace_interval_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}
