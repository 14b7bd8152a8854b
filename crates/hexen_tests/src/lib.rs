//! Integration test crate for the Hexen compiler.
//!
//! All tests live under `tests/`, driving the full pipeline - source text
//! through the lexer, parser and semantic analyzer - the way the CLI
//! does. Shared helpers are in `tests/common/mod.rs`.
