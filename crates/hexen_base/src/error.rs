//! Syntax errors with source locations.
//!
//! The lexer and parser fail fast with a [`SpannedError`] pointing at the
//! offending bytes. Semantic analysis never uses this type - it accumulates
//! diagnostics instead of returning `Err`.
//!
//! # Example
//!
//! ```
//! use hexen_base::{Result, Span, SpannedError};
//!
//! fn reject(token: &str) -> Result<()> {
//!     Err(SpannedError::new(
//!         format!("unexpected token '{}'", token),
//!         Span::new(0, token.len()),
//!     ))
//! }
//!
//! let err = reject("&").unwrap_err();
//! assert!(err.to_string().contains("unexpected token"));
//! ```

use crate::span::Span;
use std::fmt;

/// An error annotated with the source region it refers to.
#[derive(Debug, Clone)]
pub struct SpannedError {
    /// Human-readable description.
    pub message: String,
    /// Where in the source the problem is.
    pub span: Span,
}

impl SpannedError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for SpannedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.message, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for SpannedError {}

/// Result alias used throughout the lexer and parser.
pub type Result<T> = std::result::Result<T, SpannedError>;
