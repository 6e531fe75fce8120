//! Redirection and capture types.

use std::fmt;
use std::os::fd::OwnedFd;
use std::path::PathBuf;
use std::sync::Arc;

/// What a child reads as standard input.
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Read from this file.
    Path(PathBuf),
    /// Read from a duplicate of this descriptor.
    Descriptor(Arc<OwnedFd>),
    /// Literal payload written through an internal pipe, then closed.
    Data(Vec<u8>),
    /// Share the caller's standard input.
    Inherit,
    /// Read from `/dev/null`.
    Null,
}

impl InputSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        InputSource::Path(path.into())
    }

    pub fn descriptor(fd: impl Into<OwnedFd>) -> Self {
        InputSource::Descriptor(Arc::new(fd.into()))
    }

    pub fn data(data: impl Into<Vec<u8>>) -> Self {
        InputSource::Data(data.into())
    }
}

/// Where a child's standard output or error goes instead of being captured.
#[derive(Debug, Clone)]
pub enum OutputSink {
    /// Created (or truncated) file.
    Path(PathBuf),
    /// Duplicate of this descriptor.
    Descriptor(Arc<OwnedFd>),
    /// The caller's own stream of the same kind.
    Inherit,
    /// `/dev/null`.
    Null,
}

impl OutputSink {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        OutputSink::Path(path.into())
    }

    pub fn descriptor(fd: impl Into<OwnedFd>) -> Self {
        OutputSink::Descriptor(Arc::new(fd.into()))
    }
}

/// Which output stream a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// Callback receiving every drained output chunk.
///
/// Called from stream reader threads; stdout and stderr chunks may interleave
/// in any order, but chunks of one stream arrive in order.
#[derive(Clone)]
pub struct CaptureSink(Arc<dyn Fn(StreamKind, &[u8]) + Send + Sync>);

impl CaptureSink {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(StreamKind, &[u8]) + Send + Sync + 'static,
    {
        CaptureSink(Arc::new(f))
    }

    pub(crate) fn deliver(&self, kind: StreamKind, chunk: &[u8]) {
        (self.0)(kind, chunk)
    }
}

impl fmt::Debug for CaptureSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CaptureSink(..)")
    }
}
