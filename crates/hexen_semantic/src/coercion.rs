//! Implicit coercion graph and explicit conversion legality.
//!
//! *Transparent Costs* in two predicates: [`widens_implicitly`] enumerates
//! the lossless widenings the analyzer performs silently, and
//! [`conversion_allowed`] gates the `value:T` operator - the only way to
//! cross the edges the first predicate refuses.

use crate::types::Type;

/// The implicit coercion graph over concrete numerics. Identity is always
/// allowed; everything else must be a lossless widening:
///
/// ```text
/// i32 → i64, f32, f64      usize → i64, f64
/// i64 → f64                f32 → f64
/// ```
///
/// `i64 → f32` is absent (precision loss), and nothing ever narrows or
/// converts back out of a float implicitly. `usize` only widens into the
/// signed/float world, never the reverse.
pub fn widens_implicitly(from: &Type, to: &Type) -> bool {
    if from == to {
        return true;
    }
    matches!(
        (from, to),
        (Type::I32, Type::I64)
            | (Type::I32, Type::F32)
            | (Type::I32, Type::F64)
            | (Type::I64, Type::F64)
            | (Type::F32, Type::F64)
            | (Type::Usize, Type::I64)
            | (Type::Usize, Type::F64)
    )
}

/// Legality of the explicit conversion `value:T`.
///
/// Any numeric-to-numeric conversion is legal - that is the point of the
/// operator - and identity conversions are harmless. Everything else
/// (e.g. `string:i32`) is `InvalidConversion`.
pub fn conversion_allowed(from: &Type, to: &Type) -> bool {
    if from == to {
        return true;
    }
    from.is_numeric() && to.is_numeric()
}
