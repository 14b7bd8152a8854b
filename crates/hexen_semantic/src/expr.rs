//! Expression dispatch.
//!
//! Every expression analysis receives the node and an optional *target
//! type* - the type expected where the value is consumed. Literals return
//! their comptime types untouched; adaptation happens at the consumer
//! through `coerce_with_context`, so a `comptime_int` flows as itself
//! until a declaration, argument, return or array element pins it down.

use hexen_language::ast::{Expr, LiteralValue};

use crate::analyzer::{BlockContext, SemanticAnalyzer};
use crate::coercion::conversion_allowed;
use crate::diagnostics::DiagnosticKind;
use crate::types::Type;

impl SemanticAnalyzer {
    /// Returns the expression's resolved type, `Unknown` after an error.
    /// Callers must treat `Unknown` as a silent absorber.
    pub(crate) fn analyze_expr(&mut self, expr: &Expr, target: Option<&Type>) -> Type {
        match expr {
            Expr::Literal { value } => match value {
                LiteralValue::Bool(_) => Type::Bool,
                LiteralValue::String(_) => Type::String,
            },
            Expr::ComptimeInt { .. } => Type::ComptimeInt,
            Expr::ComptimeFloat { .. } => Type::ComptimeFloat,
            Expr::Identifier { name } => self.analyze_identifier(name),
            Expr::BinaryOperation {
                operator,
                left,
                right,
            } => self.analyze_binary(*operator, left, right, target),
            Expr::UnaryOperation { operator, operand } => {
                self.analyze_unary(*operator, operand, target)
            }
            Expr::ExplicitConversionExpression {
                expression,
                target_type,
            } => self.analyze_conversion(expression, target_type),
            Expr::FunctionCall {
                function_name,
                arguments,
            } => self.analyze_call(function_name, arguments),
            Expr::ArrayLiteral { elements } => self.analyze_array_literal(elements, target),
            Expr::ArrayAccess { array, index } => self.analyze_array_access(array, index),
            Expr::PropertyAccess { object, property } => {
                self.analyze_property_access(object, property)
            }
            Expr::RangeExpr {
                start,
                end,
                step,
                inclusive,
            } => self.analyze_range(start.as_deref(), end.as_deref(), step.as_deref(), *inclusive),
            Expr::Block { statements } => {
                self.analyze_block(statements, BlockContext::Expression, target)
            }
            Expr::ConditionalStatement {
                condition,
                if_branch,
                else_clauses,
            } => self.analyze_conditional_expression(condition, if_branch, else_clauses, target),
            Expr::ForInLoop {
                variable,
                variable_type,
                iterable,
                body,
                label,
            } => self.analyze_for_expression(
                variable,
                variable_type.as_ref(),
                iterable,
                body,
                label.as_deref(),
                target,
            ),
        }
    }

    /// Identifier reference: resolve, require initialization, mark used.
    fn analyze_identifier(&mut self, name: &str) -> Type {
        // `undef` is a keyword, not a variable.
        if name == "undef" {
            return Type::Uninitialized;
        }

        let sym = self.intern(name);
        let (ty, initialized) = match self.symbols.lookup(sym) {
            Some(info) => (info.ty.clone(), info.initialized),
            None => {
                self.error(
                    DiagnosticKind::UndefinedVariable,
                    format!("Undefined variable: '{}'", name),
                );
                return Type::Unknown;
            }
        };
        if !initialized {
            self.error(
                DiagnosticKind::UseOfUninitialized,
                format!("Use of uninitialized variable: '{}'", name),
            );
            return Type::Unknown;
        }
        self.symbols.mark_used(sym);
        ty
    }

    /// `expr:T` - the inner expression is analyzed with *no* target so a
    /// comptime value stays comptime, then the conversion pair is checked.
    fn analyze_conversion(
        &mut self,
        expression: &Expr,
        target_type: &hexen_language::ast::TypeAnnotation,
    ) -> Type {
        let to = self.resolve_annotation(target_type);
        let from = self.analyze_expr(expression, None);
        if from.is_unknown() || to.is_unknown() {
            return Type::Unknown;
        }
        if conversion_allowed(&from, &to) {
            to
        } else {
            self.error(
                DiagnosticKind::InvalidConversion,
                format!("Invalid conversion: cannot convert {} to {}", from, to),
            );
            Type::Unknown
        }
    }
}
