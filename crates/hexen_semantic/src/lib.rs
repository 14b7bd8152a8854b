//! Semantic analysis for Hexen: *Ergonomic Literals + Transparent Costs*.
//!
//! The analyzer consumes one AST and produces a list of diagnostics; it
//! never fails on user input. Literals carry compile-time-only types
//! (`comptime_int`, `comptime_float`, comptime arrays) that adapt to the
//! type the consuming context demands; every conversion between concrete
//! numeric types is explicit (`value:T`).
//!
//! # Entry point
//!
//! ```
//! use hexen_language::parse;
//! use hexen_semantic::analyze_program;
//!
//! let program = parse("func main() : i32 = { val x : i64 = 42; return 0 }").unwrap();
//! let diagnostics = analyze_program(&program);
//! assert!(diagnostics.is_empty());
//! ```
//!
//! # Module map
//!
//! ```text
//! types      the Type sum type and its classification predicates
//! scope      SymbolTable: lexical scope stack, mutability, init flags
//! coercion   implicit widening graph, explicit conversion legality
//! comptime   adapt_to / default_type - the comptime resolver
//! diagnostics  Diagnostic records and stable kind tags
//! analyzer   SemanticAnalyzer state, statements, declarations
//! expr       expression dispatch          binary   operators
//! block      unified blocks               conditional  if/else
//! loops      while / for-in / labels      arrays   literals, access
//! ranges     range expressions            functions  decls and calls
//! ```

mod analyzer;
mod arrays;
mod binary;
mod block;
mod coercion;
mod comptime;
mod conditional;
mod diagnostics;
mod expr;
mod functions;
mod loops;
mod ranges;
mod scope;
mod types;

pub use analyzer::{analyze_program, BlockContext, SemanticAnalyzer};
pub use coercion::{conversion_allowed, widens_implicitly};
pub use comptime::{adapt_to, default_type, AdaptError};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use scope::{Mutability, SymbolInfo, SymbolTable};
pub use types::{Dim, Type};
