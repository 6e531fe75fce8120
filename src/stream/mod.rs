//! Background draining of child output streams.
//!
//! A [`StreamReader`] owns the read end of one pipe and drains it on its own
//! thread, handing each chunk to a [`ChunkSink`] before reading the next one.
//! End of input and I/O errors both end the stream silently; the sink is
//! handed back by [`StreamReader::wait`] once the thread is done.

mod policy;
mod reader;


pub use policy::{ChunkPolicy, READ_BUFSIZE};
pub use reader::{ChunkSink, Collector, StreamReader};
