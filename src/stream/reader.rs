//! Stream reader thread and the sinks it feeds.

use super::policy::{ChunkPolicy, READ_BUFSIZE};
use crate::options::{CaptureSink, StreamKind};
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// Receiver of drained chunks.
pub trait ChunkSink: Send + 'static {
    fn deliver(&mut self, chunk: &[u8]);
}

impl<F> ChunkSink for F
where
    F: FnMut(&[u8]) + Send + 'static,
{
    fn deliver(&mut self, chunk: &[u8]) {
        self(chunk)
    }
}

/// Sink used by runners: accumulates chunks (unless suppressed) and forwards
/// them to the caller's capture callback.
#[derive(Debug)]
pub struct Collector {
    kind: StreamKind,
    accumulate: bool,
    capture: Option<CaptureSink>,
    buffer: Vec<u8>,
}

impl Collector {
    pub fn new(kind: StreamKind, accumulate: bool, capture: Option<CaptureSink>) -> Self {
        Self {
            kind,
            accumulate,
            capture,
            buffer: Vec::new(),
        }
    }

    /// Accumulated bytes (empty when accumulation is suppressed).
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl ChunkSink for Collector {
    fn deliver(&mut self, chunk: &[u8]) {
        if self.accumulate {
            self.buffer.extend_from_slice(chunk);
        }
        if let Some(capture) = &self.capture {
            capture.deliver(self.kind, chunk);
        }
    }
}

/// Handle to a thread draining one stream.
#[derive(Debug)]
pub struct StreamReader<S> {
    name: String,
    handle: JoinHandle<S>,
}

impl<S: ChunkSink> StreamReader<S> {
    /// Start draining `source` into `sink`.
    ///
    /// Fails only if the thread cannot be created.
    pub fn spawn<R>(name: impl Into<String>, source: R, policy: ChunkPolicy, sink: S) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let name = name.into();
        let thread_name = name.clone();
        let handle = thread::Builder::new()
            .name(format!("procsh-{}", name))
            .spawn(move || {
                let mut sink = sink;
                drain(&thread_name, source, policy, &mut sink);
                sink
            })?;
        Ok(Self { name, handle })
    }

    /// Block until the stream has ended and every chunk was delivered.
    ///
    /// A panic raised by the sink is resumed on the caller's thread.
    pub fn wait(self) -> S {
        match self.handle.join() {
            Ok(sink) => sink,
            Err(panic) => {
                debug!(stream = %self.name, "stream sink panicked");
                std::panic::resume_unwind(panic)
            }
        }
    }
}

/// Read `source` to the end, cutting chunks per `policy`.
fn drain<R: Read, S: ChunkSink>(name: &str, source: R, policy: ChunkPolicy, sink: &mut S) {
    let outcome = match policy {
        ChunkPolicy::BestEffort => drain_best_effort(source, sink),
        ChunkPolicy::Lines => drain_lines(source, sink),
        ChunkPolicy::Fixed(size) => drain_fixed(source, size.get(), sink),
    };
    match outcome {
        Ok(()) => debug!(stream = %name, "stream reached end of input"),
        Err(e) => debug!(stream = %name, error = %e, "stream ended on read error"),
    }
}

fn drain_best_effort<R: Read, S: ChunkSink>(mut source: R, sink: &mut S) -> io::Result<()> {
    let mut buf = vec![0u8; READ_BUFSIZE];
    loop {
        match source.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => {
                trace!(bytes = n, "chunk");
                sink.deliver(&buf[..n]);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn drain_lines<R: Read, S: ChunkSink>(source: R, sink: &mut S) -> io::Result<()> {
    let mut reader = BufReader::with_capacity(READ_BUFSIZE, source);
    let mut line = Vec::new();
    loop {
        line.clear();
        // read_until retries Interrupted itself.
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => return Ok(()),
            Ok(n) => {
                trace!(bytes = n, "line");
                sink.deliver(&line);
            }
            Err(e) => {
                if !line.is_empty() {
                    sink.deliver(&line);
                }
                return Err(e);
            }
        }
    }
}

fn drain_fixed<R: Read, S: ChunkSink>(mut source: R, size: usize, sink: &mut S) -> io::Result<()> {
    let mut buf = vec![0u8; size];
    loop {
        let mut filled = 0;
        let mut failure = None;
        while filled < size {
            match source.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if filled > 0 {
            trace!(bytes = filled, "chunk");
            sink.deliver(&buf[..filled]);
        }
        if let Some(e) = failure {
            return Err(e);
        }
        if filled < size {
            return Ok(());
        }
    }
}
