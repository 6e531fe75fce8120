//! Validation of option combinations.

use super::model::ExecOptions;
use crate::error::{ProcshError, Result};

/// Options a pipeline stage may set; everything else belongs to the pipeline.
const STAGE_OPTIONS: &[&str] = &["env", "cwd", "long_separator", "long_prefix"];

/// Options that only make sense when compiling one command's arguments.
const ARGUMENT_OPTIONS: &[&str] = &["long_separator", "long_prefix"];

impl ExecOptions {
    /// Names of the fields set on this record.
    pub(super) fn set_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("input", self.input.is_some()),
            ("output", self.output.is_some()),
            ("error", self.error.is_some()),
            ("err_to_out", self.err_to_out.is_some()),
            ("capture", self.capture.is_some()),
            ("background", self.background.is_some()),
            ("env", self.env.is_some()),
            ("timeout", self.timeout.is_some()),
            ("cwd", self.cwd.is_some()),
            ("ok_codes", self.ok_codes.is_some()),
            ("out_bufsize", self.out_bufsize.is_some()),
            ("err_bufsize", self.err_bufsize.is_some()),
            ("no_out", self.no_out.is_some()),
            ("no_err", self.no_err.is_some()),
            ("long_separator", self.long_separator.is_some()),
            ("long_prefix", self.long_prefix.is_some()),
        ];
        fields
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }

    /// Reject conflicting or malformed options.
    ///
    /// Validation rules:
    /// - the accepted exit-code set must not be empty
    /// - `err_to_out` cannot be combined with an explicit error sink
    /// - the long prefix must not be empty
    pub fn validate(&self) -> Result<()> {
        if self.ok_codes.as_ref().is_some_and(Vec::is_empty) {
            return Err(ProcshError::InvalidArgument(
                "accepted exit codes must not be empty".to_string(),
            ));
        }

        if self.err_to_out() && self.error.is_some() {
            return Err(ProcshError::InvalidArgument(
                "err_to_out conflicts with an explicit error sink".to_string(),
            ));
        }

        if self.long_prefix.as_ref().is_some_and(String::is_empty) {
            return Err(ProcshError::InvalidArgument(
                "long prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate options given to a command that will run as a pipeline stage.
    pub fn validate_for_stage(&self) -> Result<()> {
        self.validate()?;
        if let Some(name) = self
            .set_fields()
            .into_iter()
            .find(|name| !STAGE_OPTIONS.contains(name))
        {
            return Err(ProcshError::InvalidArgument(format!(
                "unsupported option within a pipeline stage `{}'",
                name
            )));
        }
        Ok(())
    }

    /// Validate options given to a whole pipeline.
    pub fn validate_for_pipeline(&self) -> Result<()> {
        self.validate()?;
        if let Some(name) = self
            .set_fields()
            .into_iter()
            .find(|name| ARGUMENT_OPTIONS.contains(name))
        {
            return Err(ProcshError::InvalidArgument(format!(
                "unsupported pipeline option `{}'",
                name
            )));
        }
        Ok(())
    }
}
