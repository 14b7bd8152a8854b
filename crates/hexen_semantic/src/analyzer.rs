//! Analyzer state and statement-level analysis.
//!
//! One [`SemanticAnalyzer`] value owns everything a pass needs: the scope
//! stack, the function signature registry, the current function's return
//! type, the block-context and loop stacks, and the accumulating
//! diagnostics. Per-construct analysis lives in sibling modules as further
//! `impl SemanticAnalyzer` blocks (`expr`, `binary`, `block`,
//! `conditional`, `loops`, `arrays`, `ranges`, `functions`).
//!
//! # Pipeline
//!
//! ```text
//! Program
//!  │
//!  ├── register_functions     ← pre-pass, enables forward references
//!  ├── analyze_function       ← per declared function
//!  └── analyze_statement      ← top-level statements, global scope
//!          │
//!          └── diagnostics out (never Err, never panic on user input)
//! ```

use std::collections::HashMap;

use hexen_base::{Interner, Symbol};
use hexen_language::ast::{CompositeType, Expr, Program, Stmt, TypeAnnotation};

use crate::comptime::{adapt_to, default_type, AdaptError};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::functions::FunctionSig;
use crate::scope::{Mutability, SymbolInfo, SymbolTable};
use crate::types::{Dim, Type};

/// How the block currently being analyzed is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockContext {
    /// The outer block of a function declaration.
    Function,
    /// A block in statement position.
    Statement,
    /// A block consumed as a value; must end in `-> expr`.
    Expression,
    /// A loop body; `producing` loops collect `->` elements.
    LoopBody { producing: bool },
}

/// Per-loop bookkeeping for `break`/`continue` targeting and
/// loop-expression element collection.
#[derive(Debug)]
pub(crate) struct LoopFrame {
    pub(crate) label: Option<Symbol>,
    pub(crate) producing: bool,
    /// Element type a producing loop's `->` values must adapt to.
    pub(crate) element_target: Option<Type>,
    /// Element types collected when no target exists.
    pub(crate) yielded: Vec<Type>,
}

/// Analyzes a program with a fresh analyzer and returns its diagnostics.
pub fn analyze_program(program: &Program) -> Vec<Diagnostic> {
    SemanticAnalyzer::new().analyze(program)
}

/// The semantic analysis pass. One instance per program; reuse across
/// programs is not supported (make a new one - construction is cheap).
pub struct SemanticAnalyzer {
    pub(crate) interner: Interner,
    pub(crate) symbols: SymbolTable,
    pub(crate) functions: HashMap<Symbol, FunctionSig>,
    pub(crate) current_return_type: Option<Type>,
    pub(crate) contexts: Vec<BlockContext>,
    pub(crate) loops: Vec<LoopFrame>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            symbols: SymbolTable::new(),
            functions: HashMap::new(),
            current_return_type: None,
            contexts: Vec::new(),
            loops: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Runs the full pass and returns every diagnostic in emission order.
    pub fn analyze(mut self, program: &Program) -> Vec<Diagnostic> {
        self.register_functions(program);
        for function in &program.functions {
            self.analyze_function(function);
        }
        for stmt in &program.statements {
            self.analyze_statement(stmt);
        }

        // Internal invariants: scope and context stacks must be balanced.
        if self.symbols.depth() != 1 || !self.contexts.is_empty() || !self.loops.is_empty() {
            self.error(
                DiagnosticKind::InternalError,
                "internal error: scope or context stack unbalanced after analysis",
            );
        }
        self.diagnostics
    }

    // =========================================================================
    // Statement dispatch
    // =========================================================================

    pub(crate) fn analyze_statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::ValDeclaration {
                name,
                type_annotation,
                value,
            } => self.analyze_declaration(
                name,
                type_annotation.as_ref(),
                value,
                Mutability::Immutable,
            ),
            Stmt::MutDeclaration {
                name,
                type_annotation,
                value,
            } => self.analyze_declaration(name, type_annotation.as_ref(), value, Mutability::Mutable),
            Stmt::AssignmentStatement { target, value } => self.analyze_assignment(target, value),
            Stmt::AssignStatement { value } => self.analyze_loose_assign(value),
            Stmt::ReturnStatement { value } => self.analyze_return(value.as_ref()),
            Stmt::ConditionalStatement {
                condition,
                if_branch,
                else_clauses,
            } => self.analyze_conditional_statement(condition, if_branch, else_clauses),
            Stmt::WhileLoop {
                condition,
                body,
                label,
            } => self.analyze_while(condition, body, label.as_deref()),
            Stmt::ForInLoop {
                variable,
                variable_type,
                iterable,
                body,
                label,
            } => self.analyze_for_statement(
                variable,
                variable_type.as_ref(),
                iterable,
                body,
                label.as_deref(),
            ),
            Stmt::BreakStatement { label } => self.analyze_break(label.as_deref()),
            Stmt::ContinueStatement { label } => self.analyze_continue(label.as_deref()),
            Stmt::LabeledStatement { label, statement } => self.analyze_labeled(label, statement),
            Stmt::FunctionCallStatement { function_call } => {
                self.analyze_expr(function_call, None);
            }
            Stmt::Block { statements } => {
                self.analyze_block(statements, BlockContext::Statement, None);
            }
        }
    }

    /// `'label` wraps a loop; the wrapper's label wins when the loop node
    /// does not carry its own.
    fn analyze_labeled(&mut self, label: &str, statement: &Stmt) {
        match statement {
            Stmt::WhileLoop {
                condition,
                body,
                label: own,
            } => self.analyze_while(condition, body, own.as_deref().or(Some(label))),
            Stmt::ForInLoop {
                variable,
                variable_type,
                iterable,
                body,
                label: own,
            } => self.analyze_for_statement(
                variable,
                variable_type.as_ref(),
                iterable,
                body,
                own.as_deref().or(Some(label)),
            ),
            other => self.analyze_statement(other),
        }
    }

    // =========================================================================
    // Declarations: the val / mut pipeline
    // =========================================================================

    fn analyze_declaration(
        &mut self,
        name: &str,
        annotation: Option<&TypeAnnotation>,
        value: &Expr,
        mutability: Mutability,
    ) {
        let sym = self.intern(name);
        if self.symbols.declared_in_current_scope(sym) {
            self.error(
                DiagnosticKind::Redeclaration,
                format!("Variable '{}' already declared in this scope", name),
            );
            return;
        }

        if mutability == Mutability::Mutable && annotation.is_none() {
            self.error(
                DiagnosticKind::MissingTypeAnnotation,
                format!(
                    "mut declaration of '{}' requires an explicit type annotation",
                    name
                ),
            );
        }

        let declared_ty = annotation.map(|a| self.resolve_annotation(a));

        if is_undef(value) {
            self.declare_undef(name, sym, declared_ty, mutability);
            return;
        }

        match declared_ty {
            Some(ty) => {
                let value_ty = self.analyze_expr(value, Some(&ty));
                let what = format!("variable '{}'", name);
                self.coerce_with_context(&value_ty, &ty, &what, Some(expr_hint(value)));
                self.symbols.declare(SymbolInfo::new(sym, ty, mutability));
            }
            None => {
                let mark = self.diagnostics.len();
                let value_ty = self.analyze_expr(value, None);
                if value_ty.is_unknown() {
                    // The initializer failed. Add CannotInferType only when
                    // annotating this variable is the actual fix (a comptime
                    // operation that needed a result type), or when nothing
                    // was reported at all.
                    let fresh = &self.diagnostics[mark..];
                    let annotation_fixes_it = fresh
                        .iter()
                        .any(|d| d.kind == DiagnosticKind::MixedComptimeRequiresAnnotation);
                    if fresh.is_empty() || annotation_fixes_it {
                        self.error(
                            DiagnosticKind::CannotInferType,
                            format!(
                                "Cannot infer type for variable '{}': add an explicit type annotation",
                                name
                            ),
                        );
                    }
                    self.symbols
                        .declare(SymbolInfo::new(sym, Type::Unknown, mutability));
                } else {
                    let ty = default_type(&value_ty);
                    self.symbols.declare(SymbolInfo::new(sym, ty, mutability));
                }
            }
        }
    }

    /// `undef` initializers: annotation required, symbol starts
    /// uninitialized, and a `val` can never become readable.
    fn declare_undef(
        &mut self,
        name: &str,
        sym: Symbol,
        declared_ty: Option<Type>,
        mutability: Mutability,
    ) {
        match declared_ty {
            Some(ty) => {
                if mutability == Mutability::Immutable {
                    self.error_with(
                        DiagnosticKind::UnusableVariable,
                        format!(
                            "Variable '{}' is 'val' with an 'undef' initializer and can never be read",
                            name
                        ),
                        format!("mut {} : {} = undef", name, ty),
                    );
                }
                self.symbols
                    .declare(SymbolInfo::uninitialized(sym, ty, mutability));
            }
            None => {
                self.error(
                    DiagnosticKind::MissingTypeAnnotation,
                    format!(
                        "'undef' initializer for '{}' requires an explicit type annotation",
                        name
                    ),
                );
                self.symbols
                    .declare(SymbolInfo::uninitialized(sym, Type::Unknown, mutability));
            }
        }
    }

    // =========================================================================
    // Assignments
    // =========================================================================

    fn analyze_assignment(&mut self, target: &str, value: &Expr) {
        let sym = self.intern(target);
        let (ty, mutability) = match self.symbols.lookup(sym) {
            Some(info) => (info.ty.clone(), info.mutability),
            None => {
                self.error(
                    DiagnosticKind::UndefinedVariable,
                    format!("Undefined variable: '{}'", target),
                );
                self.analyze_expr(value, None);
                return;
            }
        };

        if mutability == Mutability::Immutable {
            self.error(
                DiagnosticKind::AssignToImmutable,
                format!(
                    "Cannot assign to immutable variable '{}'; it was declared with 'val'",
                    target
                ),
            );
            self.analyze_expr(value, Some(&ty));
            return;
        }

        let value_ty = self.analyze_expr(value, Some(&ty));
        let what = format!("assignment to '{}'", target);
        let resolved = self.coerce_with_context(&value_ty, &ty, &what, Some(expr_hint(value)));

        // A successful assignment initializes. An Unknown value already
        // carries its own diagnostic, so initialize anyway to stop cascades.
        if !resolved.is_unknown() || value_ty.is_unknown() {
            if let Some(info) = self.symbols.lookup_mut(sym) {
                info.initialized = true;
            }
        }
    }

    // =========================================================================
    // Returns
    // =========================================================================

    fn analyze_return(&mut self, value: Option<&Expr>) {
        let ret = match self.current_return_type.clone() {
            Some(ret) => ret,
            None => {
                self.error(
                    DiagnosticKind::ReturnOutsideFunction,
                    "'return' outside of a function",
                );
                if let Some(v) = value {
                    self.analyze_expr(v, None);
                }
                return;
            }
        };

        match value {
            None => {
                if ret != Type::Void {
                    self.error(
                        DiagnosticKind::BareReturnInNonVoid,
                        format!("Bare 'return' in a function returning {}", ret),
                    );
                }
            }
            Some(v) => {
                if ret == Type::Void {
                    self.error(
                        DiagnosticKind::ValueReturnInVoid,
                        "Cannot return a value from a function returning void",
                    );
                    self.analyze_expr(v, None);
                    return;
                }
                let ty = self.analyze_expr(v, Some(&ret));
                self.coerce_with_context(&ty, &ret, "return value", Some(expr_hint(v)));
            }
        }
    }

    // =========================================================================
    // Annotation resolution
    // =========================================================================

    pub(crate) fn resolve_annotation(&mut self, annotation: &TypeAnnotation) -> Type {
        match annotation {
            TypeAnnotation::Name(name) => match name.as_str() {
                "i32" => Type::I32,
                "i64" => Type::I64,
                "usize" => Type::Usize,
                "f32" => Type::F32,
                "f64" => Type::F64,
                "bool" => Type::Bool,
                "string" => Type::String,
                "void" => Type::Void,
                other => {
                    self.error(
                        DiagnosticKind::TypeMismatch,
                        format!("Unknown type name '{}'", other),
                    );
                    Type::Unknown
                }
            },
            TypeAnnotation::Composite(composite) => match composite.as_ref() {
                CompositeType::ArrayType {
                    element_type,
                    dimensions,
                } => {
                    let element = self.resolve_annotation(element_type);
                    let dims = dimensions
                        .iter()
                        .map(|d| match d.size {
                            Some(n) => Dim::Fixed(n as usize),
                            None => Dim::Inferred,
                        })
                        .collect();
                    Type::Array {
                        element: Box::new(element),
                        dims,
                    }
                }
                CompositeType::RangeType { element_type } => {
                    let element = self.resolve_annotation(element_type);
                    Type::range(element)
                }
            },
        }
    }

    // =========================================================================
    // Coercion wrapper: adaptation result → diagnostics
    // =========================================================================

    /// Adapts `found` into `target` and reports failures. Returns the
    /// resolved type, or `Unknown` after emitting a diagnostic.
    pub(crate) fn coerce_with_context(
        &mut self,
        found: &Type,
        target: &Type,
        what: &str,
        hint: Option<&str>,
    ) -> Type {
        match adapt_to(found, target) {
            Ok(ty) => ty,
            Err(AdaptError::Truncation) => {
                let hint = hint.unwrap_or("value");
                let flavor = if target.is_float() {
                    "Potential precision loss"
                } else {
                    "Potential truncation"
                };
                self.error_with(
                    DiagnosticKind::PrecisionLoss,
                    format!(
                        "{}: {} value does not fit {} losslessly ({}). Use an explicit conversion",
                        flavor, found, target, what
                    ),
                    format!("{}:{}", hint, target),
                );
                Type::Unknown
            }
            Err(AdaptError::Mismatch) => {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    format!("Type mismatch: {} expects {}, got {}", what, target, found),
                );
                Type::Unknown
            }
            Err(AdaptError::SizeMismatch {
                expected,
                actual,
                dimension,
            }) => {
                let place = if dimension == 0 {
                    String::new()
                } else {
                    format!(" in dimension {}", dimension)
                };
                self.error(
                    DiagnosticKind::ArraySizeMismatch,
                    format!(
                        "Array size mismatch{}: expected {} elements, got {} ({})",
                        place, expected, actual, what
                    ),
                );
                Type::Unknown
            }
            Err(AdaptError::ShapeMismatch) => {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "Array dimensionality mismatch: {} expects {}, got {}",
                        what, target, found
                    ),
                );
                Type::Unknown
            }
        }
    }

    // =========================================================================
    // Small shared helpers
    // =========================================================================

    pub(crate) fn intern(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    pub(crate) fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(kind, message));
    }

    pub(crate) fn error_with(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.diagnostics
            .push(Diagnostic::with_suggestion(kind, message, suggestion));
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// The syntactic `undef` literal (parsed as an identifier).
pub(crate) fn is_undef(expr: &Expr) -> bool {
    matches!(expr, Expr::Identifier { name } if name == "undef")
}

/// A short source fragment for suggestions: the identifier itself when the
/// expression is one, a generic placeholder otherwise.
pub(crate) fn expr_hint(expr: &Expr) -> &str {
    match expr {
        Expr::Identifier { name } => name,
        _ => "value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexen_language::parse;

    fn check(source: &str) -> Vec<Diagnostic> {
        analyze_program(&parse(source).expect("parse failed"))
    }

    #[test]
    fn clean_program_has_no_diagnostics() {
        let diags = check("func main() : i32 = { val x : i64 = 42; return 0 }");
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
    }

    #[test]
    fn redeclaration_in_same_scope() {
        let diags = check("func f() : void = { val x = 1; val x = 2 }");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Redeclaration);
    }

    #[test]
    fn shadowing_in_inner_scope_is_fine() {
        let diags = check("func f() : void = { val x = 1; { val x = 2 } }");
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
    }

    #[test]
    fn assignment_to_val_is_rejected() {
        let diags = check("func f() : void = { val x = 1; x = 2 }");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::AssignToImmutable);
    }

    #[test]
    fn assignment_adapts_comptime_to_target() {
        let diags = check("func f() : void = { mut x : f64 = 0.0; x = 42 }");
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
    }

    #[test]
    fn undef_requires_annotation_and_mut_to_be_useful() {
        let diags = check("func f() : void = { mut x : i32 = undef; x = 1; val y = x }");
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);

        let diags = check("func f() : void = { val x : i32 = undef }");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnusableVariable);
        assert!(diags[0].suggestion.as_deref().unwrap().contains("mut x"));
    }

    #[test]
    fn reading_uninitialized_is_an_error() {
        let diags = check("func f() : void = { mut x : i32 = undef; val y = x }");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UseOfUninitialized);
    }

    #[test]
    fn return_outside_function_is_reported() {
        let diags = check("return 1");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ReturnOutsideFunction);
    }

    #[test]
    fn unknown_type_name_is_reported() {
        let diags = check("func f() : void = { val x : mystery = 1 }");
        assert_eq!(diags[0].kind, DiagnosticKind::TypeMismatch);
        assert!(diags[0].message.contains("mystery"));
    }

    #[test]
    fn precision_loss_carries_a_conversion_suggestion() {
        let diags = check(
            "func f() : void = { val a : i64 = 9223372036854775807; mut b : i32 = 0; b = a }",
        );
        assert_eq!(diags.len(), 1, "diagnostics: {:?}", diags);
        assert_eq!(diags[0].kind, DiagnosticKind::PrecisionLoss);
        assert_eq!(diags[0].suggestion.as_deref(), Some("a:i32"));
    }
}
