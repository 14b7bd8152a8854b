//! Range expression typing.
//!
//! Bounds and step unify by the same discipline as binary operands:
//! comptime adapts toward concrete, mixed concrete demands an annotation.
//! Float-element ranges must carry a step, and a literal zero step is
//! rejected outright.

use hexen_language::ast::Expr;

use crate::analyzer::SemanticAnalyzer;
use crate::comptime::adapt_to;
use crate::diagnostics::DiagnosticKind;
use crate::types::Type;

impl SemanticAnalyzer {
    pub(crate) fn analyze_range(
        &mut self,
        start: Option<&Expr>,
        end: Option<&Expr>,
        step: Option<&Expr>,
        _inclusive: bool,
    ) -> Type {
        let mut parts = Vec::new();
        for part in [start, end, step].into_iter().flatten() {
            parts.push(self.analyze_expr(part, None));
        }
        if parts.iter().any(Type::is_unknown) {
            return Type::Unknown;
        }
        for ty in &parts {
            if !ty.is_numeric() {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    format!("Range bounds must be numeric, got {}", ty),
                );
                return Type::Unknown;
            }
        }

        if let Some(step_expr) = step {
            if is_literal_zero(step_expr) {
                self.error(DiagnosticKind::InvalidRange, "Range step cannot be zero");
                return Type::Unknown;
            }
        }

        let element = match parts.split_first() {
            // Fully open `..` - only meaningful as a whole-array slice.
            None => Type::ComptimeInt,
            Some((first, rest)) => {
                let mut unified = first.clone();
                for ty in rest {
                    match self.unify_range_part(&unified, ty) {
                        Some(u) => unified = u,
                        None => return Type::Unknown,
                    }
                }
                unified
            }
        };

        if element.is_float() && step.is_none() {
            self.error(
                DiagnosticKind::FloatRangeNeedsStep,
                "Float ranges require an explicit step",
            );
            return Type::Unknown;
        }

        Type::range(element)
    }

    fn unify_range_part(&mut self, a: &Type, b: &Type) -> Option<Type> {
        if a == b {
            return Some(a.clone());
        }
        match (a.is_comptime(), b.is_comptime()) {
            (true, true) => Some(Type::ComptimeFloat),
            (true, false) => match adapt_to(a, b) {
                Ok(ty) => Some(ty),
                Err(_) => {
                    self.error(
                        DiagnosticKind::TypeMismatch,
                        format!("Range bound of type {} cannot adapt to {}", a, b),
                    );
                    None
                }
            },
            (false, true) => match adapt_to(b, a) {
                Ok(_) => Some(a.clone()),
                Err(_) => {
                    self.error(
                        DiagnosticKind::TypeMismatch,
                        format!("Range bound of type {} cannot adapt to {}", b, a),
                    );
                    None
                }
            },
            (false, false) => {
                self.error_with(
                    DiagnosticKind::MixedConcreteRequiresAnnotation,
                    format!(
                        "Range bounds mix {} and {}; annotate the range element type",
                        a, b
                    ),
                    ": i64",
                );
                None
            }
        }
    }
}

/// A syntactically zero step: `0` or `0.0`.
fn is_literal_zero(expr: &Expr) -> bool {
    match expr {
        Expr::ComptimeInt { value } => *value == 0,
        Expr::ComptimeFloat { value } => *value == 0.0,
        _ => false,
    }
}
