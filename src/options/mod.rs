//! Execution options attached to commands and pipelines.
//!
//! [`ExecOptions`] is a builder-style record: every field is optional, and
//! [`ExecOptions::merge`] layers call-site options over baked ones with later
//! set fields winning. Validation happens when a command is called, baked or
//! prepared, so invalid combinations are rejected before anything is spawned.

mod model;
mod types;
mod validate;


pub use model::ExecOptions;
pub use types::{CaptureSink, InputSource, OutputSink, StreamKind};
