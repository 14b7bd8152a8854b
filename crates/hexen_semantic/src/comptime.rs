//! The comptime resolver - the heart of *Ergonomic Literals*.
//!
//! Every expression is analyzed against an optional target type; when the
//! expression's own type is comptime, [`adapt_to`] decides whether it may
//! become the target silently. Concrete types pass through the implicit
//! widening graph instead. The function is pure: the analyzer maps its
//! error variants onto diagnostics with suggestions.

use crate::coercion::widens_implicitly;
use crate::types::{Dim, Type};

/// Why an adaptation was refused. The analyzer turns these into
/// `PrecisionLoss` / `TypeMismatch` / `ArraySizeMismatch` diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdaptError {
    /// A float-valued source meeting an integer target, or a concrete
    /// narrowing - legal only through an explicit `value:T`.
    Truncation,
    /// No adaptation path exists at all (`comptime_int` to `bool`, …).
    Mismatch,
    /// Array length differs from a fixed target dimension.
    SizeMismatch {
        expected: usize,
        actual: usize,
        dimension: usize,
    },
    /// Array dimensionality differs from the target's.
    ShapeMismatch,
}

/// Adapts `found` into `target`, returning the resolved type.
///
/// `Unknown` on either side absorbs silently - one upstream diagnostic is
/// enough. Comptime scalars adapt by the literal rules (`comptime_int` to any
/// concrete numeric, `comptime_float` to floats only); comptime arrays
/// adapt structurally; concrete types must widen implicitly.
pub fn adapt_to(found: &Type, target: &Type) -> Result<Type, AdaptError> {
    match (found, target) {
        (Type::Unknown, _) | (_, Type::Unknown) => Ok(Type::Unknown),

        (a, b) if a == b => Ok(a.clone()),

        (Type::ComptimeInt, t) if t.is_concrete_numeric() => Ok(t.clone()),
        (Type::ComptimeFloat, Type::F32) | (Type::ComptimeFloat, Type::F64) => {
            Ok(target.clone())
        }
        (Type::ComptimeFloat, t) if t.is_concrete_numeric() => Err(AdaptError::Truncation),
        (Type::ComptimeInt, _) | (Type::ComptimeFloat, _) => Err(AdaptError::Mismatch),

        (
            Type::ComptimeArray { element, dims },
            Type::Array {
                element: target_element,
                dims: target_dims,
            },
        ) => {
            if dims.len() != target_dims.len() {
                return Err(AdaptError::ShapeMismatch);
            }
            for (i, (actual, wanted)) in dims.iter().zip(target_dims.iter()).enumerate() {
                if let Dim::Fixed(n) = wanted {
                    if n != actual {
                        return Err(AdaptError::SizeMismatch {
                            expected: *n,
                            actual: *actual,
                            dimension: i,
                        });
                    }
                }
            }
            adapt_to(element, target_element)?;
            Ok(Type::Array {
                element: target_element.clone(),
                dims: dims.iter().map(|&n| Dim::Fixed(n)).collect(),
            })
        }

        (
            Type::Array { element, dims },
            Type::Array {
                element: target_element,
                dims: target_dims,
            },
        ) => {
            if element != target_element {
                return Err(AdaptError::Mismatch);
            }
            if dims.len() != target_dims.len() {
                return Err(AdaptError::ShapeMismatch);
            }
            for (i, (actual, wanted)) in dims.iter().zip(target_dims.iter()).enumerate() {
                match (actual, wanted) {
                    (_, Dim::Inferred) => {}
                    (Dim::Fixed(a), Dim::Fixed(w)) if a == w => {}
                    (Dim::Fixed(a), Dim::Fixed(w)) => {
                        return Err(AdaptError::SizeMismatch {
                            expected: *w,
                            actual: *a,
                            dimension: i,
                        });
                    }
                    // A `[_]` value cannot satisfy a fixed target size.
                    (Dim::Inferred, Dim::Fixed(_)) => return Err(AdaptError::Mismatch),
                }
            }
            Ok(found.clone())
        }

        (
            Type::Range { element },
            Type::Range {
                element: target_element,
            },
        ) => {
            let resolved = adapt_to(element, target_element)?;
            Ok(Type::range(resolved))
        }

        (a, b) if a.is_concrete_numeric() && b.is_concrete_numeric() => {
            if widens_implicitly(a, b) {
                Ok(b.clone())
            } else {
                Err(AdaptError::Truncation)
            }
        }

        _ => Err(AdaptError::Mismatch),
    }
}

/// The defaulting rule, applied only where no target type exists and the
/// context forces a decision (unannotated `val`, loop variable, …):
/// `comptime_int → i32`, `comptime_float → f64`, comptime arrays and
/// ranges default their element. Concrete types pass through.
pub fn default_type(ty: &Type) -> Type {
    match ty {
        Type::ComptimeInt => Type::I32,
        Type::ComptimeFloat => Type::F64,
        Type::ComptimeArray { element, dims } => Type::Array {
            element: Box::new(default_type(element)),
            dims: dims.iter().map(|&n| Dim::Fixed(n)).collect(),
        },
        Type::Range { element } => Type::range(default_type(element)),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Scalar adaptation
    // =========================================================================

    #[test]
    fn comptime_int_adapts_to_every_numeric() {
        for target in [Type::I32, Type::I64, Type::Usize, Type::F32, Type::F64] {
            assert_eq!(adapt_to(&Type::ComptimeInt, &target), Ok(target.clone()));
        }
    }

    #[test]
    fn comptime_int_never_adapts_to_non_numerics() {
        for target in [Type::Bool, Type::String, Type::Void] {
            assert_eq!(
                adapt_to(&Type::ComptimeInt, &target),
                Err(AdaptError::Mismatch)
            );
        }
    }

    #[test]
    fn comptime_float_adapts_to_floats_only() {
        assert_eq!(adapt_to(&Type::ComptimeFloat, &Type::F32), Ok(Type::F32));
        assert_eq!(adapt_to(&Type::ComptimeFloat, &Type::F64), Ok(Type::F64));
        assert_eq!(
            adapt_to(&Type::ComptimeFloat, &Type::I32),
            Err(AdaptError::Truncation)
        );
        assert_eq!(
            adapt_to(&Type::ComptimeFloat, &Type::Usize),
            Err(AdaptError::Truncation)
        );
    }

    #[test]
    fn concrete_types_follow_the_widening_graph() {
        assert_eq!(adapt_to(&Type::I32, &Type::I64), Ok(Type::I64));
        assert_eq!(adapt_to(&Type::Usize, &Type::I64), Ok(Type::I64));
        assert_eq!(adapt_to(&Type::I64, &Type::I32), Err(AdaptError::Truncation));
        assert_eq!(adapt_to(&Type::F64, &Type::F32), Err(AdaptError::Truncation));
        assert_eq!(adapt_to(&Type::F64, &Type::I64), Err(AdaptError::Truncation));
    }

    #[test]
    fn unknown_absorbs_both_ways() {
        assert_eq!(adapt_to(&Type::Unknown, &Type::I32), Ok(Type::Unknown));
        assert_eq!(adapt_to(&Type::Bool, &Type::Unknown), Ok(Type::Unknown));
    }

    // =========================================================================
    // Array adaptation
    // =========================================================================

    #[test]
    fn comptime_array_adapts_with_matching_shape() {
        let literal = Type::comptime_array(Type::ComptimeInt, vec![3]);
        let target = Type::array(Type::I64, vec![Dim::Fixed(3)]);
        assert_eq!(
            adapt_to(&literal, &target),
            Ok(Type::array(Type::I64, vec![Dim::Fixed(3)]))
        );
    }

    #[test]
    fn inferred_dimension_takes_the_literal_size() {
        let literal = Type::comptime_array(Type::ComptimeInt, vec![4]);
        let target = Type::array(Type::I32, vec![Dim::Inferred]);
        assert_eq!(
            adapt_to(&literal, &target),
            Ok(Type::array(Type::I32, vec![Dim::Fixed(4)]))
        );
    }

    #[test]
    fn fixed_dimension_mismatch_is_a_size_error() {
        let literal = Type::comptime_array(Type::ComptimeInt, vec![2]);
        let target = Type::array(Type::I32, vec![Dim::Fixed(3)]);
        assert_eq!(
            adapt_to(&literal, &target),
            Err(AdaptError::SizeMismatch {
                expected: 3,
                actual: 2,
                dimension: 0
            })
        );
    }

    #[test]
    fn dimensionality_mismatch_is_a_shape_error() {
        let literal = Type::comptime_array(Type::ComptimeInt, vec![2, 3]);
        let target = Type::array(Type::I32, vec![Dim::Fixed(6)]);
        assert_eq!(adapt_to(&literal, &target), Err(AdaptError::ShapeMismatch));
    }

    #[test]
    fn float_array_refuses_integer_element_target() {
        let literal = Type::comptime_array(Type::ComptimeFloat, vec![2]);
        let target = Type::array(Type::I32, vec![Dim::Fixed(2)]);
        assert_eq!(adapt_to(&literal, &target), Err(AdaptError::Truncation));
    }

    #[test]
    fn concrete_arrays_require_equal_elements() {
        let a = Type::array(Type::I32, vec![Dim::Fixed(3)]);
        let b = Type::array(Type::I64, vec![Dim::Fixed(3)]);
        assert_eq!(adapt_to(&a, &a), Ok(a.clone()));
        assert_eq!(adapt_to(&a, &b), Err(AdaptError::Mismatch));
    }

    // =========================================================================
    // Ranges and defaults
    // =========================================================================

    #[test]
    fn comptime_range_adapts_its_element() {
        let found = Type::range(Type::ComptimeInt);
        let target = Type::range(Type::I32);
        assert_eq!(adapt_to(&found, &target), Ok(Type::range(Type::I32)));
    }

    #[test]
    fn defaults_follow_the_spec() {
        assert_eq!(default_type(&Type::ComptimeInt), Type::I32);
        assert_eq!(default_type(&Type::ComptimeFloat), Type::F64);
        assert_eq!(default_type(&Type::Usize), Type::Usize);
        assert_eq!(
            default_type(&Type::comptime_array(Type::ComptimeInt, vec![2, 3])),
            Type::array(Type::I32, vec![Dim::Fixed(2), Dim::Fixed(3)])
        );
        assert_eq!(
            default_type(&Type::range(Type::ComptimeInt)),
            Type::range(Type::I32)
        );
    }
}
