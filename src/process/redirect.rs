//! Redirection of child standard streams.
//!
//! Every internal pipe comes from `std::io::pipe`, so both ends are
//! close-on-exec and owned: the child-side end is moved into a `Stdio` and
//! closed in the parent as soon as the `std::process::Command` holding it is
//! dropped, and the parent-side end is owned by exactly one feeder or reader.

use crate::options::{ExecOptions, InputSource, OutputSink, StreamKind};
use crate::stream::{Collector, StreamReader};
use std::fs::File;
use std::io::{self, ErrorKind, PipeReader, PipeWriter, Write};
use std::os::fd::{AsFd, OwnedFd};
use std::process::Stdio;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Literal stdin payload waiting to be written once the child is running.
#[derive(Debug)]
pub(crate) struct PendingInput {
    writer: PipeWriter,
    data: Vec<u8>,
}

/// Child-side destination of an output stream.
#[derive(Debug)]
pub(crate) enum Endpoint {
    Fd(OwnedFd),
    Inherit(StreamKind),
    Null,
}

impl Endpoint {
    pub(crate) fn try_clone(&self) -> io::Result<Endpoint> {
        Ok(match self {
            Endpoint::Fd(fd) => Endpoint::Fd(fd.try_clone()?),
            Endpoint::Inherit(kind) => Endpoint::Inherit(*kind),
            Endpoint::Null => Endpoint::Null,
        })
    }

    /// Endpoint for a stderr that must land wherever this stdout endpoint goes.
    pub(crate) fn mirror(&self) -> io::Result<Endpoint> {
        match self {
            Endpoint::Inherit(StreamKind::Stdout) => {
                Ok(Endpoint::Fd(io::stdout().as_fd().try_clone_to_owned()?))
            }
            other => other.try_clone(),
        }
    }

    pub(crate) fn into_stdio(self) -> Stdio {
        match self {
            Endpoint::Fd(fd) => Stdio::from(fd),
            Endpoint::Inherit(_) => Stdio::inherit(),
            Endpoint::Null => Stdio::null(),
        }
    }
}

/// Child-side stdin plus the payload to feed, if any.
///
/// Without an input option the child gets the read end of a pipe whose write
/// end is closed right away, so it sees end-of-input on its first read.
pub(crate) fn open_input(source: Option<&InputSource>) -> io::Result<(Stdio, Option<PendingInput>)> {
    match source {
        None => {
            let (reader, writer) = io::pipe()?;
            drop(writer);
            Ok((Stdio::from(reader), None))
        }
        Some(InputSource::Data(data)) => {
            let (reader, writer) = io::pipe()?;
            let pending = PendingInput {
                writer,
                data: data.clone(),
            };
            Ok((Stdio::from(reader), Some(pending)))
        }
        Some(InputSource::Path(path)) => {
            let file = File::open(path).map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("failed to open input file '{}': {}", path.display(), e),
                )
            })?;
            Ok((Stdio::from(file), None))
        }
        Some(InputSource::Descriptor(fd)) => Ok((Stdio::from(fd.try_clone()?), None)),
        Some(InputSource::Inherit) => Ok((Stdio::inherit(), None)),
        Some(InputSource::Null) => Ok((Stdio::null(), None)),
    }
}

/// Child-side endpoint for an output stream plus the read end to drain, if
/// the stream is captured internally.
pub(crate) fn open_output(
    sink: Option<&OutputSink>,
    kind: StreamKind,
) -> io::Result<(Endpoint, Option<PipeReader>)> {
    match sink {
        None => {
            let (reader, writer) = io::pipe()?;
            Ok((Endpoint::Fd(OwnedFd::from(writer)), Some(reader)))
        }
        Some(OutputSink::Path(path)) => {
            let file = File::create(path).map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("failed to open {} file '{}': {}", kind, path.display(), e),
                )
            })?;
            Ok((Endpoint::Fd(OwnedFd::from(file)), None))
        }
        Some(OutputSink::Descriptor(fd)) => Ok((Endpoint::Fd(fd.try_clone()?), None)),
        Some(OutputSink::Inherit) => Ok((Endpoint::Inherit(kind), None)),
        Some(OutputSink::Null) => Ok((Endpoint::Null, None)),
    }
}

/// Write `pending` on its own thread, then close the pipe.
///
/// A child that exits without reading its input makes the write fail with a
/// broken pipe; that is not an error.
pub(crate) fn feed_input(name: &str, pending: PendingInput) -> io::Result<JoinHandle<()>> {
    let PendingInput { mut writer, data } = pending;
    let name = name.to_string();
    thread::Builder::new()
        .name(format!("procsh-{}-stdin", name))
        .spawn(move || {
            match writer.write_all(&data) {
                Ok(()) => debug!(command = %name, bytes = data.len(), "stdin payload written"),
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!(command = %name, "child closed stdin before payload was written")
                }
                Err(e) => debug!(command = %name, error = %e, "failed to write stdin payload"),
            }
            drop(writer);
        })
}

/// Parent-side I/O tasks of one runner: stdin feeder and output readers.
#[derive(Debug, Default)]
pub(crate) struct StreamSet {
    feeder: Option<JoinHandle<()>>,
    stdout: Option<StreamReader<Collector>>,
    stderr: Option<StreamReader<Collector>>,
}

impl StreamSet {
    /// Start draining the captured streams, then start feeding stdin.
    ///
    /// Readers start first so a child blocked on a full output pipe can never
    /// hold up the payload writer.
    pub(crate) fn start(
        name: &str,
        options: &ExecOptions,
        input: Option<PendingInput>,
        stdout: Option<PipeReader>,
        stderr: Option<PipeReader>,
    ) -> io::Result<Self> {
        let mut set = StreamSet::default();

        if let Some(reader) = stdout {
            let collector = Collector::new(
                StreamKind::Stdout,
                options.accumulates(StreamKind::Stdout),
                options.capture().cloned(),
            );
            set.stdout = Some(StreamReader::spawn(
                format!("{}-stdout", name),
                reader,
                options.chunking(StreamKind::Stdout),
                collector,
            )?);
        }

        if let Some(reader) = stderr {
            let collector = Collector::new(
                StreamKind::Stderr,
                options.accumulates(StreamKind::Stderr),
                options.capture().cloned(),
            );
            set.stderr = Some(StreamReader::spawn(
                format!("{}-stderr", name),
                reader,
                options.chunking(StreamKind::Stderr),
                collector,
            )?);
        }

        if let Some(pending) = input {
            set.feeder = Some(feed_input(name, pending)?);
        }

        Ok(set)
    }

    /// Join every task and return the accumulated `(stdout, stderr)`.
    ///
    /// Blocks until both streams reached end-of-input. Later calls return
    /// empty buffers.
    pub(crate) fn finish(&mut self) -> (Vec<u8>, Vec<u8>) {
        if let Some(feeder) = self.feeder.take() {
            if feeder.join().is_err() {
                debug!("stdin feeder panicked");
            }
        }
        let stdout = self
            .stdout
            .take()
            .map(|reader| reader.wait().into_bytes())
            .unwrap_or_default();
        let stderr = self
            .stderr
            .take()
            .map(|reader| reader.wait().into_bytes())
            .unwrap_or_default();
        (stdout, stderr)
    }
}
