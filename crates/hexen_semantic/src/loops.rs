//! Loop analysis: `while`, `for-in`, labels, and loop expressions.
//!
//! A `for-in` in expression position produces an array: every executed
//! `->` yields one element (conditionally skipped iterations contribute
//! nothing), `break` may cut the loop short at any point - even before the
//! first yield, giving a zero-length array. Labels are interned and live
//! on a loop-frame stack; `break 'x` / `continue 'x` search it innermost
//! first.

use hexen_language::ast::{Block, Expr, TypeAnnotation};

use crate::analyzer::{BlockContext, LoopFrame, SemanticAnalyzer};
use crate::comptime::{adapt_to, default_type};
use crate::diagnostics::DiagnosticKind;
use crate::scope::{Mutability, SymbolInfo};
use crate::types::{Dim, Type};

impl SemanticAnalyzer {
    pub(crate) fn analyze_while(&mut self, condition: &Expr, body: &Block, label: Option<&str>) {
        self.check_condition(condition);
        let label = label.map(|l| self.intern(l));
        self.loops.push(LoopFrame {
            label,
            producing: false,
            element_target: None,
            yielded: Vec::new(),
        });
        self.analyze_block(
            &body.statements,
            BlockContext::LoopBody { producing: false },
            None,
        );
        self.loops.pop();
    }

    pub(crate) fn analyze_for_statement(
        &mut self,
        variable: &str,
        variable_type: Option<&TypeAnnotation>,
        iterable: &Expr,
        body: &Block,
        label: Option<&str>,
    ) {
        let binding = self.loop_variable_binding(variable, variable_type, iterable);
        let label = label.map(|l| self.intern(l));
        self.loops.push(LoopFrame {
            label,
            producing: false,
            element_target: None,
            yielded: Vec::new(),
        });
        self.analyze_block_with_bindings(
            &body.statements,
            BlockContext::LoopBody { producing: false },
            None,
            vec![binding],
        );
        self.loops.pop();
    }

    /// The loop variable's type: the annotation when present (the iterable
    /// element must adapt to it), else the defaulted element type
    /// (`comptime_int → i32`, `usize` iterables stay `usize`, …).
    fn loop_variable_binding(
        &mut self,
        variable: &str,
        annotation: Option<&TypeAnnotation>,
        iterable: &Expr,
    ) -> SymbolInfo {
        let iter_ty = self.analyze_expr(iterable, None);
        let element = match &iter_ty {
            Type::Range { element } => (**element).clone(),
            Type::Array { element, .. } => (**element).clone(),
            Type::ComptimeArray { element, .. } => (**element).clone(),
            Type::Unknown => Type::Unknown,
            other => {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "Cannot iterate over {}; for-in requires a range or an array",
                        other
                    ),
                );
                Type::Unknown
            }
        };

        let var_ty = match annotation {
            Some(ann) => {
                let ty = self.resolve_annotation(ann);
                let what = format!("loop variable '{}'", variable);
                self.coerce_with_context(&element, &ty, &what, None);
                ty
            }
            None => default_type(&element),
        };

        let sym = self.intern(variable);
        SymbolInfo::new(sym, var_ty, Mutability::Immutable)
    }

    pub(crate) fn analyze_for_expression(
        &mut self,
        variable: &str,
        variable_type: Option<&TypeAnnotation>,
        iterable: &Expr,
        body: &Block,
        label: Option<&str>,
        target: Option<&Type>,
    ) -> Type {
        let element_target = match target {
            None | Some(Type::Unknown) => None,
            Some(Type::Array { element, dims }) => {
                if dims.len() > 1 {
                    Some(Type::Array {
                        element: element.clone(),
                        dims: dims[1..].to_vec(),
                    })
                } else {
                    Some((**element).clone())
                }
            }
            Some(other) => {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "A for-in expression produces an array and cannot adapt to {}",
                        other
                    ),
                );
                None
            }
        };

        let binding = self.loop_variable_binding(variable, variable_type, iterable);
        let label = label.map(|l| self.intern(l));
        self.loops.push(LoopFrame {
            label,
            producing: true,
            element_target: element_target.clone(),
            yielded: Vec::new(),
        });
        self.analyze_block_with_bindings(
            &body.statements,
            BlockContext::LoopBody { producing: true },
            None,
            vec![binding],
        );
        let frame = match self.loops.pop() {
            Some(frame) => frame,
            None => {
                self.error(
                    DiagnosticKind::InternalError,
                    "internal error: loop frame stack unbalanced",
                );
                return Type::Unknown;
            }
        };

        match target {
            Some(t @ Type::Array { .. }) => t.clone(),
            Some(Type::Unknown) | None => {
                if frame.yielded.is_empty() {
                    // Zero elements and no context: nothing to infer from.
                    return Type::Unknown;
                }
                match self.unify_loop_elements(&frame.yielded) {
                    Some(element) => Type::Array {
                        element: Box::new(default_type(&element)),
                        dims: vec![Dim::Inferred],
                    },
                    None => Type::Unknown,
                }
            }
            Some(_) => Type::Unknown,
        }
    }

    /// Yielded element types without a target: identical types pass, the
    /// two comptime scalar kinds merge to `comptime_float`, comptime
    /// elements fold into a single concrete element type.
    fn unify_loop_elements(&mut self, yielded: &[Type]) -> Option<Type> {
        let mut unified = yielded[0].clone();
        for ty in &yielded[1..] {
            if *ty == unified {
                continue;
            }
            let both_scalar_comptime = matches!(unified, Type::ComptimeInt | Type::ComptimeFloat)
                && matches!(ty, Type::ComptimeInt | Type::ComptimeFloat);
            if both_scalar_comptime {
                unified = Type::ComptimeFloat;
                continue;
            }
            if unified.is_comptime() && ty.is_concrete_numeric() && adapt_to(&unified, ty).is_ok()
            {
                unified = ty.clone();
                continue;
            }
            if ty.is_comptime() && unified.is_concrete_numeric() && adapt_to(ty, &unified).is_ok()
            {
                continue;
            }
            self.error(
                DiagnosticKind::TypeMismatch,
                format!(
                    "Loop expression elements have mixed types {} and {}; annotate the result array type",
                    unified, ty
                ),
            );
            return None;
        }
        Some(unified)
    }

    // =========================================================================
    // break / continue
    // =========================================================================

    pub(crate) fn analyze_break(&mut self, label: Option<&str>) {
        if self.loops.is_empty() {
            self.error(DiagnosticKind::BreakOutsideLoop, "'break' outside of a loop");
            return;
        }
        if let Some(label) = label {
            self.check_label(label);
        }
    }

    pub(crate) fn analyze_continue(&mut self, label: Option<&str>) {
        if self.loops.is_empty() {
            self.error(
                DiagnosticKind::ContinueOutsideLoop,
                "'continue' outside of a loop",
            );
            return;
        }
        if let Some(label) = label {
            self.check_label(label);
        }
    }

    fn check_label(&mut self, label: &str) {
        let sym = self.intern(label);
        if !self.loops.iter().any(|frame| frame.label == Some(sym)) {
            self.error(
                DiagnosticKind::UnknownLabel,
                format!("Unknown label '{}'", label),
            );
        }
    }
}
