//! Shell configuration for procsh.
//!
//! This module defines the ShellConfig struct, usually loaded from a YAML file.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! defaults for every field, and validation of config values.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::ShellConfig;
