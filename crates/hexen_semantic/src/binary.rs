//! Binary and unary operation typing.
//!
//! Operands are always analyzed *without* a target type so each side keeps
//! its most-informative type; the rule ladder then decides the result:
//!
//! 1. comptime ⊕ comptime of one kind stays comptime
//! 2. mixed comptime needs a target to collapse into
//! 3. comptime ⊕ concrete adapts toward the concrete side
//! 4. equal concrete types pass through
//! 5. mixed concrete types demand an annotated result reachable by
//!    implicit widening
//!
//! Division is split: `/` always produces a floating result, `\` is
//! integer-only. Comparisons produce `bool`; `&&`/`||` require `bool`.

use hexen_language::ast::{BinaryOp, Expr, UnaryOp};

use crate::analyzer::SemanticAnalyzer;
use crate::coercion::widens_implicitly;
use crate::comptime::{adapt_to, AdaptError};
use crate::diagnostics::DiagnosticKind;
use crate::types::Type;

impl SemanticAnalyzer {
    pub(crate) fn analyze_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        target: Option<&Type>,
    ) -> Type {
        let lt = self.analyze_expr(left, None);
        let rt = self.analyze_expr(right, None);
        if lt.is_unknown() || rt.is_unknown() {
            return Type::Unknown;
        }

        if op.is_comparison() {
            return self.analyze_comparison(op, &lt, &rt);
        }
        if op.is_logical() {
            return self.analyze_logical(op, &lt, &rt);
        }
        match op {
            BinaryOp::IntDiv => self.analyze_integer_division(&lt, &rt, target),
            BinaryOp::FloatDiv => self.analyze_float_division(&lt, &rt, target),
            _ => self.analyze_arithmetic(op, &lt, &rt, target),
        }
    }

    // =========================================================================
    // Arithmetic: + - *
    // =========================================================================

    fn analyze_arithmetic(
        &mut self,
        op: BinaryOp,
        lt: &Type,
        rt: &Type,
        target: Option<&Type>,
    ) -> Type {
        if !lt.is_numeric() || !rt.is_numeric() {
            self.error(
                DiagnosticKind::TypeMismatch,
                format!(
                    "Operator '{}' requires numeric operands, got {} and {}",
                    op, lt, rt
                ),
            );
            return Type::Unknown;
        }

        match (lt.is_comptime(), rt.is_comptime()) {
            (true, true) => {
                if lt == rt {
                    return lt.clone();
                }
                // comptime_int mixed with comptime_float
                if matches!(target, Some(t) if t.is_float()) {
                    Type::ComptimeFloat
                } else {
                    self.error_with(
                        DiagnosticKind::MixedComptimeRequiresAnnotation,
                        format!(
                            "Mixed comptime_int and comptime_float in '{}' require an explicit result type",
                            op
                        ),
                        ": f64",
                    );
                    Type::Unknown
                }
            }
            (true, false) => self.adapt_operand(op, lt, rt),
            (false, true) => self.adapt_operand(op, rt, lt),
            (false, false) => {
                if lt == rt {
                    return lt.clone();
                }
                self.mixed_concrete(op, lt, rt, target, false)
            }
        }
    }

    /// Rule 3: the comptime side adapts to the concrete side's type.
    fn adapt_operand(&mut self, op: BinaryOp, comptime: &Type, concrete: &Type) -> Type {
        match adapt_to(comptime, concrete) {
            Ok(ty) => ty,
            Err(AdaptError::Truncation) => {
                self.error_with(
                    DiagnosticKind::PrecisionLoss,
                    format!(
                        "Potential truncation: {} operand of '{}' does not fit {} losslessly",
                        comptime, op, concrete
                    ),
                    format!("value:{}", concrete),
                );
                Type::Unknown
            }
            Err(_) => {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "Operator '{}' cannot combine {} and {}",
                        op, comptime, concrete
                    ),
                );
                Type::Unknown
            }
        }
    }

    /// Rule 5: mixed concrete operands need a target every side can widen
    /// into. `integer_only` restricts the target for `\`.
    fn mixed_concrete(
        &mut self,
        op: BinaryOp,
        lt: &Type,
        rt: &Type,
        target: Option<&Type>,
        integer_only: bool,
    ) -> Type {
        if let Some(t) = target {
            let fits_kind = if integer_only {
                t.is_integer()
            } else {
                t.is_numeric()
            };
            if t.is_concrete_numeric()
                && fits_kind
                && widens_implicitly(lt, t)
                && widens_implicitly(rt, t)
            {
                return t.clone();
            }
        }
        let suggestion = common_widening_target(lt, rt, integer_only)
            .map(|t| format!(": {}", t))
            .unwrap_or_else(|| ": i64".to_string());
        self.error_with(
            DiagnosticKind::MixedConcreteRequiresAnnotation,
            format!(
                "Mixed concrete types in binary operation: {} {} {} requires an explicit result type",
                lt, op, rt
            ),
            suggestion,
        );
        Type::Unknown
    }

    // =========================================================================
    // Division: `\` integer, `/` float
    // =========================================================================

    fn analyze_integer_division(
        &mut self,
        lt: &Type,
        rt: &Type,
        target: Option<&Type>,
    ) -> Type {
        if lt.is_float() || rt.is_float() {
            self.error(
                DiagnosticKind::FloatInIntegerDivision,
                format!(
                    "Integer division '\\' requires integer operands, got {} and {}; use '/' for float division",
                    lt, rt
                ),
            );
            return Type::Unknown;
        }
        if !lt.is_numeric() || !rt.is_numeric() {
            self.error(
                DiagnosticKind::TypeMismatch,
                format!(
                    "Operator '\\' requires integer operands, got {} and {}",
                    lt, rt
                ),
            );
            return Type::Unknown;
        }

        match (lt.is_comptime(), rt.is_comptime()) {
            (true, true) => Type::ComptimeInt,
            (true, false) => rt.clone(),
            (false, true) => lt.clone(),
            (false, false) => {
                if lt == rt {
                    lt.clone()
                } else {
                    self.mixed_concrete(BinaryOp::IntDiv, lt, rt, target, true)
                }
            }
        }
    }

    fn analyze_float_division(&mut self, lt: &Type, rt: &Type, target: Option<&Type>) -> Type {
        if !lt.is_numeric() || !rt.is_numeric() {
            self.error(
                DiagnosticKind::TypeMismatch,
                format!(
                    "Operator '/' requires numeric operands, got {} and {}",
                    lt, rt
                ),
            );
            return Type::Unknown;
        }

        // Two concrete floats: behave like ordinary rule 4/5.
        if lt.is_concrete_numeric() && rt.is_concrete_numeric() && lt.is_float() && rt.is_float() {
            if lt == rt {
                return lt.clone();
            }
            return self.mixed_concrete(BinaryOp::FloatDiv, lt, rt, target, false);
        }

        // One concrete float and a comptime side: the comptime operand
        // adapts to the float (both comptime kinds may).
        if lt.is_concrete_numeric() && lt.is_float() && rt.is_comptime() {
            return lt.clone();
        }
        if rt.is_concrete_numeric() && rt.is_float() && lt.is_comptime() {
            return rt.clone();
        }

        // Integer operands are involved: the floating result needs a float
        // context to land in.
        match target {
            Some(t) if t.is_concrete_numeric() && t.is_float() => {
                for side in [lt, rt] {
                    if side.is_comptime() {
                        continue;
                    }
                    if !widens_implicitly(side, t) {
                        self.error_with(
                            DiagnosticKind::PrecisionLoss,
                            format!(
                                "Potential precision loss: {} operand of '/' does not fit {} losslessly",
                                side, t
                            ),
                            format!("value:{}", t),
                        );
                        return Type::Unknown;
                    }
                }
                t.clone()
            }
            Some(t) if t.is_concrete_numeric() => {
                self.error_with(
                    DiagnosticKind::PrecisionLoss,
                    format!(
                        "Float division '/' always produces a floating result and cannot adapt to {}; use '\\' for integer division or convert the result explicitly",
                        t
                    ),
                    format!("value:{}", t),
                );
                Type::Unknown
            }
            _ => {
                if lt.is_comptime() || rt.is_comptime() {
                    self.error_with(
                        DiagnosticKind::MixedComptimeRequiresAnnotation,
                        "Float division requires an explicit float result type",
                        ": f64",
                    );
                } else {
                    self.error_with(
                        DiagnosticKind::MixedConcreteRequiresAnnotation,
                        format!(
                            "Float division of {} and {} requires an explicit float result type",
                            lt, rt
                        ),
                        ": f64",
                    );
                }
                Type::Unknown
            }
        }
    }

    // =========================================================================
    // Comparisons and logical operators
    // =========================================================================

    fn analyze_comparison(&mut self, op: BinaryOp, lt: &Type, rt: &Type) -> Type {
        let equality = matches!(op, BinaryOp::Eq | BinaryOp::Ne);

        if lt.is_numeric() && rt.is_numeric() {
            return match (lt.is_comptime(), rt.is_comptime()) {
                (false, false) => {
                    if lt == rt {
                        Type::Bool
                    } else {
                        self.error(
                            DiagnosticKind::ComparisonTypeMismatch,
                            format!(
                                "Cannot compare {} with {}; convert one side explicitly",
                                lt, rt
                            ),
                        );
                        Type::Unknown
                    }
                }
                (true, true) => Type::Bool,
                _ => {
                    let (comptime, concrete) =
                        if lt.is_comptime() { (lt, rt) } else { (rt, lt) };
                    if adapt_to(comptime, concrete).is_ok() {
                        Type::Bool
                    } else {
                        self.error(
                            DiagnosticKind::ComparisonTypeMismatch,
                            format!(
                                "Cannot compare {} with {}; convert one side explicitly",
                                lt, rt
                            ),
                        );
                        Type::Unknown
                    }
                }
            };
        }

        if lt == rt && matches!(lt, Type::Bool | Type::String) {
            if equality {
                return Type::Bool;
            }
            self.error(
                DiagnosticKind::TypeMismatch,
                format!(
                    "Ordering comparison '{}' requires numeric operands, got {}",
                    op, lt
                ),
            );
            return Type::Unknown;
        }

        self.error(
            DiagnosticKind::ComparisonTypeMismatch,
            format!("Cannot compare {} with {}", lt, rt),
        );
        Type::Unknown
    }

    fn analyze_logical(&mut self, op: BinaryOp, lt: &Type, rt: &Type) -> Type {
        for side in [lt, rt] {
            if *side != Type::Bool {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    format!(
                        "Logical operator '{}' requires bool operands, got {}",
                        op, side
                    ),
                );
                return Type::Unknown;
            }
        }
        Type::Bool
    }

    // =========================================================================
    // Unary operators
    // =========================================================================

    pub(crate) fn analyze_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        target: Option<&Type>,
    ) -> Type {
        match op {
            UnaryOp::Neg => {
                let ty = self.analyze_expr(operand, target);
                if ty.is_unknown() {
                    return Type::Unknown;
                }
                if ty.is_numeric() {
                    ty
                } else {
                    self.error(
                        DiagnosticKind::TypeMismatch,
                        format!("Unary '-' requires a numeric operand, got {}", ty),
                    );
                    Type::Unknown
                }
            }
            UnaryOp::Not => {
                let ty = self.analyze_expr(operand, None);
                if ty.is_unknown() {
                    return Type::Unknown;
                }
                if ty == Type::Bool {
                    Type::Bool
                } else {
                    self.error(
                        DiagnosticKind::TypeMismatch,
                        format!("Unary '!' requires a bool operand, got {}", ty),
                    );
                    Type::Unknown
                }
            }
        }
    }
}

/// Smallest type both operands reach through the widening graph, for the
/// annotation suggestion on mixed-concrete errors.
fn common_widening_target(lt: &Type, rt: &Type, integer_only: bool) -> Option<Type> {
    let candidates: &[Type] = if integer_only {
        &[Type::I64]
    } else {
        &[Type::I64, Type::F64]
    };
    candidates
        .iter()
        .find(|&t| widens_implicitly(lt, t) && widens_implicitly(rt, t))
        .cloned()
}

#[cfg(test)]
mod tests {
    use crate::analyzer::analyze_program;
    use crate::diagnostics::{Diagnostic, DiagnosticKind};
    use hexen_language::parse;

    fn check(source: &str) -> Vec<Diagnostic> {
        analyze_program(&parse(source).expect("parse failed"))
    }

    fn assert_clean(source: &str) {
        let diags = check(source);
        assert!(diags.is_empty(), "diagnostics: {:?}", diags);
    }

    // =========================================================================
    // Comptime preservation and adaptation
    // =========================================================================

    #[test]
    fn comptime_int_arithmetic_stays_comptime() {
        assert_clean(
            r"
            func test() : i32 = {
                val add = 42 + 100
                val sub = 100 - 42
                val mul = 10 * 20
                val idiv = 100 \ 3
                val wide : i64 = 100 \ 3
                return add
            }
            ",
        );
    }

    #[test]
    fn comptime_float_arithmetic_adapts_to_annotation() {
        assert_clean(
            r"
            func test() : f64 = {
                val add : f64 = 3.14 + 2.71
                val single : f32 = 3.14 + 2.71
                val div : f64 = 3.14 / 2.71
                return add
            }
            ",
        );
    }

    #[test]
    fn mixed_comptime_adapts_with_float_annotation() {
        assert_clean(
            r"
            func test() : f64 = {
                val sum : f64 = 42 + 3.14
                val single : f32 = 42 - 3.14
                return sum
            }
            ",
        );
    }

    #[test]
    fn mixed_comptime_without_annotation_is_rejected() {
        let diags = check("func f() : void = { val x = 42 + 3.14 }");
        // one for the operation, one CannotInferType on x
        assert_eq!(diags.len(), 2, "diagnostics: {:?}", diags);
        assert_eq!(
            diags[0].kind,
            DiagnosticKind::MixedComptimeRequiresAnnotation
        );
        assert_eq!(diags[1].kind, DiagnosticKind::CannotInferType);
    }

    #[test]
    fn comptime_adapts_to_concrete_operand() {
        assert_clean(
            r"
            func test() : void = {
                val a : i32 = 10
                val b = a + 1
                val c : f64 = 1.0
                val d = c * 2.5
            }
            ",
        );
    }

    // =========================================================================
    // Mixed concrete operands
    // =========================================================================

    #[test]
    fn mixed_concrete_without_annotation_is_one_error() {
        let diags = check(
            "func f() : void = { val a : i32 = 1; val b : i64 = 2; val c = a + b }",
        );
        assert_eq!(diags.len(), 1, "diagnostics: {:?}", diags);
        assert_eq!(diags[0].kind, DiagnosticKind::MixedConcreteRequiresAnnotation);
        assert!(diags[0].message.contains("i32"));
        assert!(diags[0].message.contains("i64"));
    }

    #[test]
    fn mixed_concrete_with_reachable_annotation_is_fine() {
        assert_clean(
            "func f() : void = { val a : i32 = 1; val b : i64 = 2; val c : i64 = a + b }",
        );
    }

    #[test]
    fn usize_mixes_only_through_the_widening_graph() {
        assert_clean(
            "func f() : void = { val n : usize = 10; val i : i32 = 3; val sum : i64 = n + i }",
        );
        let diags = check(
            "func f() : void = { val n : usize = 10; val i : i32 = 3; val sum = n + i }",
        );
        assert_eq!(diags.len(), 1, "diagnostics: {:?}", diags);
        assert_eq!(diags[0].kind, DiagnosticKind::MixedConcreteRequiresAnnotation);
    }

    // =========================================================================
    // Division
    // =========================================================================

    #[test]
    fn float_division_needs_float_context() {
        let diags = check("func f() : void = { val x = 10 / 3 }");
        assert_eq!(diags.len(), 2, "diagnostics: {:?}", diags);
        assert_eq!(
            diags[0].kind,
            DiagnosticKind::MixedComptimeRequiresAnnotation
        );
        assert_eq!(diags[1].kind, DiagnosticKind::CannotInferType);
    }

    #[test]
    fn float_division_with_float_annotation() {
        assert_clean(
            r"
            func f() : void = {
                val a : f64 = 10 / 3
                val b : f32 = 22 / 7
                val c : f64 = 10.5 / 2.1
            }
            ",
        );
    }

    #[test]
    fn float_division_result_refuses_integer_annotation() {
        let diags = check("func f() : void = { val x : i32 = 10 / 3 }");
        assert_eq!(diags.len(), 1, "diagnostics: {:?}", diags);
        assert_eq!(diags[0].kind, DiagnosticKind::PrecisionLoss);
    }

    #[test]
    fn integer_division_rejects_float_operands() {
        let diags = check(r"func f() : void = { val x = 10.5 \ 2 }");
        assert_eq!(diags[0].kind, DiagnosticKind::FloatInIntegerDivision);
    }

    #[test]
    fn integer_division_on_concrete_ints() {
        assert_clean(
            r"
            func f() : void = {
                val a : i32 = 10
                val b : i32 = 3
                val q = a \ b
            }
            ",
        );
    }

    // =========================================================================
    // Comparisons and logical operators
    // =========================================================================

    #[test]
    fn comparisons_return_bool() {
        assert_clean(
            r#"
            func f() : void = {
                val a : i32 = 1
                val lt : bool = a < 2
                val eq : bool = a == 1
                val s : bool = "x" == "y"
            }
            "#,
        );
    }

    #[test]
    fn mixed_concrete_comparison_is_rejected() {
        let diags = check(
            "func f() : void = { val a : i32 = 1; val b : i64 = 2; val c : bool = a < b }",
        );
        assert_eq!(diags.len(), 1, "diagnostics: {:?}", diags);
        assert_eq!(diags[0].kind, DiagnosticKind::ComparisonTypeMismatch);
    }

    #[test]
    fn ordering_on_strings_is_rejected() {
        let diags = check(r#"func f() : void = { val c : bool = "a" < "b" }"#);
        assert_eq!(diags[0].kind, DiagnosticKind::TypeMismatch);
    }

    #[test]
    fn logical_operators_require_bool() {
        assert_clean("func f() : void = { val a : bool = true && false || true }");
        let diags = check("func f() : void = { val a : bool = 1 && true }");
        assert_eq!(diags[0].kind, DiagnosticKind::TypeMismatch);
    }

    // =========================================================================
    // Unary operators
    // =========================================================================

    #[test]
    fn unary_minus_preserves_type() {
        assert_clean(
            r"
            func f() : void = {
                val a : i32 = -5
                val b : f64 = -2.5
                val c : i32 = 5
                val d = -c
            }
            ",
        );
    }

    #[test]
    fn unary_not_requires_bool() {
        assert_clean("func f() : void = { val a : bool = !false }");
        let diags = check("func f() : void = { val a = !1 }");
        assert_eq!(diags[0].kind, DiagnosticKind::TypeMismatch);
    }
}
