//! ExecOptions definition, builders and resolved accessors.

use super::types::{CaptureSink, InputSource, OutputSink, StreamKind};
use crate::argument::ArgStyle;
use crate::stream::ChunkPolicy;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Exit codes accepted when none are configured.
const DEFAULT_OK_CODES: &[i32] = &[0];

/// Execution options for a command or pipeline.
///
/// Unset fields fall back to defaults when read through the accessors.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    pub(super) input: Option<InputSource>,
    pub(super) output: Option<OutputSink>,
    pub(super) error: Option<OutputSink>,
    pub(super) err_to_out: Option<bool>,
    pub(super) capture: Option<CaptureSink>,
    pub(super) background: Option<bool>,
    pub(super) env: Option<BTreeMap<String, String>>,
    pub(super) timeout: Option<Duration>,
    pub(super) cwd: Option<PathBuf>,
    pub(super) ok_codes: Option<Vec<i32>>,
    pub(super) out_bufsize: Option<usize>,
    pub(super) err_bufsize: Option<usize>,
    pub(super) no_out: Option<bool>,
    pub(super) no_err: Option<bool>,
    pub(super) long_separator: Option<Option<String>>,
    pub(super) long_prefix: Option<String>,
}

impl ExecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Standard input source.
    pub fn with_input(mut self, input: InputSource) -> Self {
        self.input = Some(input);
        self
    }

    /// Shorthand for `with_input(InputSource::Data(..))`.
    pub fn with_input_data(self, data: impl Into<Vec<u8>>) -> Self {
        self.with_input(InputSource::data(data))
    }

    /// Send standard output to `sink` instead of capturing it.
    pub fn with_output(mut self, sink: OutputSink) -> Self {
        self.output = Some(sink);
        self
    }

    /// Send standard error to `sink` instead of capturing it.
    pub fn with_error(mut self, sink: OutputSink) -> Self {
        self.error = Some(sink);
        self
    }

    /// Send standard error wherever standard output goes.
    pub fn with_err_to_out(mut self, enabled: bool) -> Self {
        self.err_to_out = Some(enabled);
        self
    }

    /// Deliver every drained chunk to `sink`.
    pub fn with_capture(mut self, sink: CaptureSink) -> Self {
        self.capture = Some(sink);
        self
    }

    /// Return right after spawning; failures surface on `wait`.
    pub fn with_background(mut self, enabled: bool) -> Self {
        self.background = Some(enabled);
        self
    }

    /// Replace the inherited environment with exactly these variables.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Run with an empty environment.
    pub fn with_clear_env(mut self) -> Self {
        self.env = Some(BTreeMap::new());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Exit codes treated as success.
    pub fn with_ok_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.ok_codes = Some(codes.into_iter().collect());
        self
    }

    /// Stdout chunk size for the capture sink: 0 is line-buffered.
    pub fn with_out_bufsize(mut self, size: usize) -> Self {
        self.out_bufsize = Some(size);
        self
    }

    /// Stderr chunk size for the capture sink: 0 is line-buffered.
    pub fn with_err_bufsize(mut self, size: usize) -> Self {
        self.err_bufsize = Some(size);
        self
    }

    /// Do not accumulate stdout internally.
    pub fn with_no_out(mut self, enabled: bool) -> Self {
        self.no_out = Some(enabled);
        self
    }

    /// Do not accumulate stderr internally.
    pub fn with_no_err(mut self, enabled: bool) -> Self {
        self.no_err = Some(enabled);
        self
    }

    /// Long option separator; `None` emits name and value as two tokens.
    pub fn with_long_separator(mut self, separator: Option<&str>) -> Self {
        self.long_separator = Some(separator.map(str::to_string));
        self
    }

    pub fn with_long_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.long_prefix = Some(prefix.into());
        self
    }

    // =========================================================================
    // Merging
    // =========================================================================

    /// Layer `over` on top of `self`: every field set in `over` wins.
    pub fn merge(&self, over: &ExecOptions) -> ExecOptions {
        fn pick<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
            over.clone().or_else(|| base.clone())
        }

        ExecOptions {
            input: pick(&self.input, &over.input),
            output: pick(&self.output, &over.output),
            error: pick(&self.error, &over.error),
            err_to_out: pick(&self.err_to_out, &over.err_to_out),
            capture: pick(&self.capture, &over.capture),
            background: pick(&self.background, &over.background),
            env: pick(&self.env, &over.env),
            timeout: pick(&self.timeout, &over.timeout),
            cwd: pick(&self.cwd, &over.cwd),
            ok_codes: pick(&self.ok_codes, &over.ok_codes),
            out_bufsize: pick(&self.out_bufsize, &over.out_bufsize),
            err_bufsize: pick(&self.err_bufsize, &over.err_bufsize),
            no_out: pick(&self.no_out, &over.no_out),
            no_err: pick(&self.no_err, &over.no_err),
            long_separator: pick(&self.long_separator, &over.long_separator),
            long_prefix: pick(&self.long_prefix, &over.long_prefix),
        }
    }

    // =========================================================================
    // Resolved accessors
    // =========================================================================

    pub fn input(&self) -> Option<&InputSource> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&OutputSink> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&OutputSink> {
        self.error.as_ref()
    }

    pub fn err_to_out(&self) -> bool {
        self.err_to_out.unwrap_or(false)
    }

    pub fn capture(&self) -> Option<&CaptureSink> {
        self.capture.as_ref()
    }

    pub fn background(&self) -> bool {
        self.background.unwrap_or(false)
    }

    pub fn env(&self) -> Option<&BTreeMap<String, String>> {
        self.env.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn ok_codes(&self) -> &[i32] {
        self.ok_codes.as_deref().unwrap_or(DEFAULT_OK_CODES)
    }

    /// Returns true if `exit_code` is in the accepted set.
    ///
    /// A missing exit code (killed by a signal, never reaped) is never accepted.
    pub fn accepts(&self, exit_code: Option<i32>) -> bool {
        exit_code.is_some_and(|code| self.ok_codes().contains(&code))
    }

    /// Whether chunks of `kind` are accumulated internally.
    pub fn accumulates(&self, kind: StreamKind) -> bool {
        let suppressed = match kind {
            StreamKind::Stdout => self.no_out,
            StreamKind::Stderr => self.no_err,
        };
        !suppressed.unwrap_or(false)
    }

    /// Chunking used when draining `kind`.
    ///
    /// Without a capture sink nobody observes chunk boundaries, so reads are
    /// best-effort. With one, the configured size applies (line-buffered by
    /// default).
    pub fn chunking(&self, kind: StreamKind) -> ChunkPolicy {
        if self.capture.is_none() {
            return ChunkPolicy::BestEffort;
        }
        let bufsize = match kind {
            StreamKind::Stdout => self.out_bufsize,
            StreamKind::Stderr => self.err_bufsize,
        };
        ChunkPolicy::from_bufsize(Some(bufsize.unwrap_or(0)))
    }

    /// Argument style with this record's overrides applied to `base`.
    pub fn arg_style(&self, base: &ArgStyle) -> ArgStyle {
        ArgStyle {
            long_separator: match &self.long_separator {
                Some(separator) => separator.clone(),
                None => base.long_separator.clone(),
            },
            long_prefix: self
                .long_prefix
                .clone()
                .unwrap_or_else(|| base.long_prefix.clone()),
        }
    }
}
