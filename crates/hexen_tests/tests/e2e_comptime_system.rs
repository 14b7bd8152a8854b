//! E2E: the comptime type system across every context that provides a
//! target type - declarations, assignments, returns, call arguments,
//! array elements and loop elements.

mod common;

use common::{assert_clean, assert_one_error};
use hexen_semantic::DiagnosticKind;

// =============================================================================
// Target-type propagation
// =============================================================================

#[test]
fn declaration_annotation_is_the_target() {
    assert_clean(
        r"
        func f() : void = {
            val a : i64 = 42
            val b : f32 = 42
            mut c : f64 = 0.0
        }
        ",
    );
}

#[test]
fn assignment_target_is_the_declared_type() {
    assert_clean(
        r"
        func f() : void = {
            mut acc : f64 = 0.0
            acc = 42
            acc = 3.14
            acc = acc + 1
        }
        ",
    );
}

#[test]
fn return_type_is_the_target() {
    assert_clean("func f() : f32 = { return 42 }");
    assert_clean("func f() : i64 = { return 40 + 2 }");
}

#[test]
fn call_arguments_take_parameter_types_as_targets() {
    assert_clean(
        r"
        func scale(x : f64, factor : f64) : f64 = {
            return x * factor
        }
        func main() : f64 = {
            return scale(10, 2.5)
        }
        ",
    );
}

#[test]
fn nested_expressions_resolve_under_one_annotation() {
    assert_clean(
        r"
        func f() : void = {
            val x : i64 = (40 + 2) * 100
            val y : f64 = (42 + 8) * 2
        }
        ",
    );
}

// =============================================================================
// Defaulting without a target
// =============================================================================

#[test]
fn bare_comptime_literals_default() {
    assert_clean(
        r"
        func f() : void = {
            val i = 42
            val check_i : i32 = i
            val x = 3.14
            val check_x : f64 = x
        }
        ",
    );
}

#[test]
fn defaulted_int_is_exactly_i32() {
    // After defaulting, `i` is concrete i32 - adapting it into i64 works
    // only through widening, and into f32 it still widens; but an i64
    // context for a *defaulted* value is not the same as annotating the
    // declaration itself.
    assert_clean(
        r"
        func f() : void = {
            val i = 42
            val widened : i64 = i
        }
        ",
    );
    assert_one_error(
        r"
        func f() : void = {
            val x = 3.14
            val narrowed : f32 = x
        }
        ",
        DiagnosticKind::PrecisionLoss,
    );
}

// =============================================================================
// Explicit conversions cross the forbidden edges
// =============================================================================

#[test]
fn explicit_conversions_fix_every_precision_error() {
    assert_clean(
        r"
        func f() : void = {
            val wide : i64 = 5000000000
            val narrow : i32 = wide:i32
            val truncated : i32 = 3.9:i32
            val demoted : f32 = 2.718281828:f32
            mut counter : usize = 0
            val signed : i32 = counter:i32
        }
        ",
    );
}

#[test]
fn conversion_is_required_for_usize_narrowing() {
    assert_one_error(
        "func f() : void = { val n : usize = 10; val i : i32 = n }",
        DiagnosticKind::PrecisionLoss,
    );
    assert_clean("func f() : void = { val n : usize = 10; val i : i32 = n:i32 }");
}

#[test]
fn usize_widens_implicitly_into_i64_and_f64() {
    assert_clean(
        r"
        func f() : void = {
            val n : usize = 10
            val a : i64 = n
            val b : f64 = n
        }
        ",
    );
}

#[test]
fn conversion_in_a_larger_expression_binds_tightly() {
    assert_clean(
        r"
        func f() : void = {
            val wide : i64 = 100
            val sum : i32 = wide:i32 + 1
        }
        ",
    );
}

#[test]
fn non_numeric_conversion_is_invalid() {
    assert_one_error(
        r#"func f() : void = { val s = "5"; val n : i32 = s:i32 }"#,
        DiagnosticKind::InvalidConversion,
    );
}

// =============================================================================
// Comptime values stay flexible until consumed
// =============================================================================

#[test]
fn one_literal_expression_feeds_many_contexts() {
    assert_clean(
        r"
        func f() : void = {
            val as_i32 : i32 = 100 * 100
            val as_i64 : i64 = 100 * 100
            val as_f64 : f64 = 100 * 100
        }
        ",
    );
}

#[test]
fn comptime_preserved_through_expression_blocks() {
    assert_clean(
        r"
        func f() : void = {
            val x : f64 = {
                val base = 10
                -> base * 4
            }
        }
        ",
    );
}
