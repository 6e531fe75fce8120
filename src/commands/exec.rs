//! Translation of execution flags into [`ExecOptions`].

use crate::cli::ExecArgs;
use crate::options::{CaptureSink, ExecOptions, InputSource, OutputSink, StreamKind};
use std::io::{self, Write};

/// Options for a CLI run.
///
/// Runs always start in the background so the handler keeps the runner (and
/// its report) even when the wait fails. Without `--json` output is streamed
/// to our own stdout/stderr as it arrives instead of being accumulated.
pub(super) fn exec_options(args: &ExecArgs) -> ExecOptions {
    let mut options = ExecOptions::new().with_background(true);

    if let Some(timeout) = args.timeout {
        options = options.with_timeout(timeout);
    }
    if let Some(cwd) = &args.cwd {
        options = options.with_cwd(cwd);
    }
    if args.clear_env || !args.env.is_empty() {
        options = options.with_env(args.env.iter().cloned());
    }
    if !args.ok_codes.is_empty() {
        options = options.with_ok_codes(args.ok_codes.iter().copied());
    }

    if let Some(path) = &args.input {
        options = options.with_input(InputSource::path(path));
    } else if let Some(data) = &args.input_data {
        options = options.with_input_data(data.as_bytes());
    }
    if let Some(path) = &args.out {
        options = options.with_output(OutputSink::path(path));
    }
    if let Some(path) = &args.err {
        options = options.with_error(OutputSink::path(path));
    }
    if args.err_to_out {
        options = options.with_err_to_out(true);
    }

    if !args.json {
        options = options
            .with_capture(live_sink())
            .with_no_out(true)
            .with_no_err(true);
    }
    options
}

/// Sink copying each chunk to the matching stream of this process.
fn live_sink() -> CaptureSink {
    CaptureSink::new(|kind, chunk| {
        let result = match kind {
            StreamKind::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(chunk).and_then(|()| out.flush())
            }
            StreamKind::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(chunk).and_then(|()| err.flush())
            }
        };
        if let Err(e) = result {
            tracing::debug!(stream = %kind, error = %e, "failed to forward output");
        }
    })
}
