//! Chunking policies.

use std::num::NonZeroUsize;

/// Read size for best-effort chunks.
pub const READ_BUFSIZE: usize = 16 * 1024;

/// How a drained stream is cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPolicy {
    /// Whatever a single read returns, up to [`READ_BUFSIZE`] bytes.
    BestEffort,
    /// One chunk per `\n`-terminated line; a trailing fragment is its own chunk.
    Lines,
    /// Exactly N bytes per chunk, except possibly the last.
    Fixed(NonZeroUsize),
}

impl ChunkPolicy {
    /// Map a buffer size setting: unset is best-effort, 0 is line-buffered.
    pub fn from_bufsize(bufsize: Option<usize>) -> Self {
        match bufsize {
            None => ChunkPolicy::BestEffort,
            Some(size) => match NonZeroUsize::new(size) {
                Some(size) => ChunkPolicy::Fixed(size),
                None => ChunkPolicy::Lines,
            },
        }
    }
}
