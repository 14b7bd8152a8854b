//! Library crate behind the `hexen` binary.
//!
//! The binary's `main` is a thin shell around [`run_cli`]; everything a
//! command does is implemented here so tests can drive it directly.

pub mod cli;

pub use cli::{check_file, parse_file, run_cli};
