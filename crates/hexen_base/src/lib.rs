//! Structural atoms shared by every Hexen crate.
//!
//! This crate has no dependencies and holds the three building blocks the
//! rest of the compiler is written against:
//!
//! - [`Span`] - byte-offset source locations carried by tokens and errors
//! - [`Interner`] / [`Symbol`] - O(1) name equality for scope lookups
//! - [`SpannedError`] / [`Result`] - the error type of the lexer and parser

mod error;
mod intern;
mod span;

pub use error::{Result, SpannedError};
pub use intern::{Interner, Symbol};
pub use span::Span;
