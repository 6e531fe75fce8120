//! Argument compiler.
//!
//! Turns call-site values into command-line tokens. Arguments are a tagged
//! [`Arg`] list (positional or named); [`compile_args`] is a pure function of
//! that list and an [`ArgStyle`]:
//!
//! - `Named("all", true)` compiles to `--all`
//! - `Named("v", true)` compiles to `-v`
//! - `Named("n", 10)` compiles to `-n10`
//! - `Named("untracked_files", "normal")` compiles to `--untracked-files=normal`
//! - `false` and absent values compile to nothing
//!
//! A named option given twice keeps its first position and takes the last value.

mod compile;
mod value;


pub use compile::{compile_arg, compile_args, compile_option, merge_args, option_name};
pub use value::{Arg, ArgStyle, ArgValue, LazyValue};
