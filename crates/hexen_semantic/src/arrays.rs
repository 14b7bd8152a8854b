//! Array literals, access, slicing, properties and range materialization.
//!
//! Literal analysis runs in two modes. With an array target the structure
//! is checked outside-in: the element count against the outermost
//! dimension, rows against the peeled inner type, leaf elements adapting
//! to the element type. Without a target the literal describes itself:
//! all-comptime elements preserve their shape as a `ComptimeArray` for
//! later adaptation, concrete elements must agree.

use hexen_language::ast::Expr;

use crate::analyzer::{expr_hint, SemanticAnalyzer};
use crate::comptime::{adapt_to, default_type};
use crate::diagnostics::DiagnosticKind;
use crate::types::{Dim, Type};

impl SemanticAnalyzer {
    pub(crate) fn analyze_array_literal(
        &mut self,
        elements: &[Expr],
        target: Option<&Type>,
    ) -> Type {
        match target {
            Some(Type::Array {
                element,
                dims,
            }) => self.array_literal_with_target(elements, element, dims),
            _ => self.array_literal_inferred(elements, target),
        }
    }

    // =========================================================================
    // Target-directed analysis
    // =========================================================================

    fn array_literal_with_target(
        &mut self,
        elements: &[Expr],
        elem_ty: &Type,
        dims: &[Dim],
    ) -> Type {
        let Some((outer_dim, inner_dims)) = dims.split_first() else {
            return Type::Unknown;
        };

        // `[a..b]` - a lone range element materializes into the array.
        if inner_dims.is_empty() && elements.len() == 1 {
            if let Expr::RangeExpr {
                start,
                end,
                step,
                inclusive,
            } = &elements[0]
            {
                return self.materialize_range(
                    start.as_deref(),
                    end.as_deref(),
                    step.as_deref(),
                    *inclusive,
                    Some(elem_ty),
                    Some(outer_dim),
                );
            }
        }

        let actual = elements.len();
        if let Dim::Fixed(expected) = outer_dim {
            if *expected != actual {
                self.error(
                    DiagnosticKind::ArraySizeMismatch,
                    format!(
                        "Array size mismatch: expected {} elements, got {}",
                        expected, actual
                    ),
                );
                // Elements are still checked; the literal itself is spent.
                self.check_elements_against(elements, elem_ty, inner_dims);
                return Type::Unknown;
            }
        }

        self.check_elements_against(elements, elem_ty, inner_dims);

        let mut out_dims = Vec::with_capacity(dims.len());
        out_dims.push(Dim::Fixed(actual));
        out_dims.extend_from_slice(inner_dims);
        Type::Array {
            element: Box::new(elem_ty.clone()),
            dims: out_dims,
        }
    }

    fn check_elements_against(&mut self, elements: &[Expr], elem_ty: &Type, inner_dims: &[Dim]) {
        if inner_dims.is_empty() {
            for (i, element) in elements.iter().enumerate() {
                let ty = self.analyze_expr(element, Some(elem_ty));
                let what = format!("array element {}", i);
                self.coerce_with_context(&ty, elem_ty, &what, Some(expr_hint(element)));
            }
        } else {
            let row_ty = Type::Array {
                element: Box::new(elem_ty.clone()),
                dims: inner_dims.to_vec(),
            };
            for (i, element) in elements.iter().enumerate() {
                let ty = self.analyze_expr(element, Some(&row_ty));
                let what = format!("array row {}", i);
                self.coerce_with_context(&ty, &row_ty, &what, Some(expr_hint(element)));
            }
        }
    }

    // =========================================================================
    // Inference without a target
    // =========================================================================

    fn array_literal_inferred(&mut self, elements: &[Expr], target: Option<&Type>) -> Type {
        if elements.is_empty() {
            return match target {
                // A non-array target: describe ourselves and let the
                // caller's coercion report the single mismatch.
                Some(t) if !t.is_unknown() => Type::comptime_array(Type::ComptimeInt, vec![0]),
                Some(_) => Type::Unknown,
                None => {
                    self.error_with(
                        DiagnosticKind::EmptyArrayNeedsContext,
                        "Empty array literal requires an explicit array type annotation",
                        ": [_]T",
                    );
                    Type::Unknown
                }
            };
        }

        if elements.len() == 1 {
            if let Expr::RangeExpr {
                start,
                end,
                step,
                inclusive,
            } = &elements[0]
            {
                return self.materialize_range(
                    start.as_deref(),
                    end.as_deref(),
                    step.as_deref(),
                    *inclusive,
                    None,
                    None,
                );
            }
        }

        if matches!(elements[0], Expr::ArrayLiteral { .. }) {
            return self.multidim_literal_inferred(elements);
        }

        let mut types = Vec::with_capacity(elements.len());
        for element in elements {
            types.push(self.analyze_expr(element, None));
        }
        self.unify_literal_elements(&types, elements.len())
    }

    /// Scalar element unification: same kind stays, the comptime kinds
    /// promote toward `comptime_float`, a single concrete type absorbs
    /// adapting comptime neighbours.
    fn unify_literal_elements(&mut self, types: &[Type], len: usize) -> Type {
        let known: Vec<&Type> = types.iter().filter(|t| !t.is_unknown()).collect();
        let Some((&first, rest)) = known.split_first() else {
            return Type::Unknown;
        };

        let mut unified = first.clone();
        for &ty in rest {
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
            if unified.is_concrete_numeric() && ty.is_concrete_numeric() {
                self.error_with(
                    DiagnosticKind::MixedConcreteRequiresAnnotation,
                    format!(
                        "Mixed concrete element types {} and {} require an explicit array type annotation",
                        unified, ty
                    ),
                    ": [_]T",
                );
                return Type::Unknown;
            }
            self.error(
                DiagnosticKind::TypeMismatch,
                format!(
                    "Array elements have incompatible types {} and {}",
                    unified, ty
                ),
            );
            return Type::Unknown;
        }

        match unified {
            Type::ComptimeInt | Type::ComptimeFloat => Type::ComptimeArray {
                element: Box::new(unified),
                dims: vec![len],
            },
            concrete => Type::Array {
                element: Box::new(concrete),
                dims: vec![Dim::Fixed(len)],
            },
        }
    }

    /// Nested literals: every row must be an array literal of the same
    /// shape; a deviating row is named in the diagnostic.
    fn multidim_literal_inferred(&mut self, elements: &[Expr]) -> Type {
        let mut rows = Vec::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            if !matches!(element, Expr::ArrayLiteral { .. }) {
                self.error(
                    DiagnosticKind::InconsistentShape,
                    format!(
                        "Row {} is not a sub-array; a multidimensional array literal must contain sub-arrays",
                        i
                    ),
                );
                return Type::Unknown;
            }
            rows.push(self.analyze_expr(element, None));
        }
        if rows.iter().any(Type::is_unknown) {
            return Type::Unknown;
        }

        match rows[0].clone() {
            Type::ComptimeArray {
                element,
                dims: first_dims,
            } => {
                let mut unified = *element;
                for (i, row) in rows.iter().enumerate().skip(1) {
                    let Type::ComptimeArray {
                        element: row_elem,
                        dims: row_dims,
                    } = row
                    else {
                        self.error(
                            DiagnosticKind::InconsistentShape,
                            format!("Row {} does not match the shape of row 0", i),
                        );
                        return Type::Unknown;
                    };
                    if *row_dims != first_dims {
                        self.error(
                            DiagnosticKind::InconsistentShape,
                            format!(
                                "Inconsistent array shape: row 0 has {} elements, row {} has {}",
                                first_dims[0], i, row_dims[0]
                            ),
                        );
                        return Type::Unknown;
                    }
                    if **row_elem != unified {
                        // comptime_int rows alongside comptime_float rows
                        unified = Type::ComptimeFloat;
                    }
                }
                let mut dims = vec![elements.len()];
                dims.extend(first_dims);
                Type::ComptimeArray {
                    element: Box::new(unified),
                    dims,
                }
            }
            first @ Type::Array { .. } => {
                for (i, row) in rows.iter().enumerate().skip(1) {
                    if *row != first {
                        self.error(
                            DiagnosticKind::InconsistentShape,
                            format!(
                                "Inconsistent array shape: row {} has type {}, row 0 has {}",
                                i, row, first
                            ),
                        );
                        return Type::Unknown;
                    }
                }
                let Type::Array { element, dims } = first else {
                    return Type::Unknown;
                };
                let mut out = vec![Dim::Fixed(elements.len())];
                out.extend(dims);
                Type::Array { element, dims: out }
            }
            _ => {
                self.error(
                    DiagnosticKind::InconsistentShape,
                    "Multidimensional array rows must themselves be arrays",
                );
                Type::Unknown
            }
        }
    }

    // =========================================================================
    // Range materialization: [a..b]
    // =========================================================================

    fn materialize_range(
        &mut self,
        start: Option<&Expr>,
        end: Option<&Expr>,
        step: Option<&Expr>,
        inclusive: bool,
        elem_target: Option<&Type>,
        dim_target: Option<&Dim>,
    ) -> Type {
        let range_ty = self.analyze_range(start, end, step, inclusive);
        let element = match range_ty {
            Type::Range { element } => *element,
            _ => return Type::Unknown,
        };

        if start.is_none() || end.is_none() {
            self.error(
                DiagnosticKind::RangeMaterializationNeedsBounds,
                "Cannot materialize an unbounded range into an array; both bounds are required",
            );
            return Type::Unknown;
        }

        let size = literal_range_size(start, end, step, inclusive);

        match elem_target {
            Some(target) => {
                self.coerce_with_context(&element, target, "materialized range element", None);
                let dim = match (size, dim_target) {
                    (Some(n), Some(Dim::Fixed(expected))) if n != *expected => {
                        self.error(
                            DiagnosticKind::ArraySizeMismatch,
                            format!(
                                "Array size mismatch: the range produces {} elements, the target expects {}",
                                n, expected
                            ),
                        );
                        return Type::Unknown;
                    }
                    (Some(n), _) => Dim::Fixed(n),
                    (None, _) => Dim::Inferred,
                };
                Type::Array {
                    element: Box::new(target.clone()),
                    dims: vec![dim],
                }
            }
            None => match (&element, size) {
                (Type::ComptimeInt, Some(n)) | (Type::ComptimeFloat, Some(n)) => {
                    Type::ComptimeArray {
                        element: Box::new(element),
                        dims: vec![n],
                    }
                }
                (_, Some(n)) => Type::Array {
                    element: Box::new(default_type(&element)),
                    dims: vec![Dim::Fixed(n)],
                },
                (_, None) => Type::Array {
                    element: Box::new(default_type(&element)),
                    dims: vec![Dim::Inferred],
                },
            },
        }
    }

    // =========================================================================
    // Indexing and slicing
    // =========================================================================

    pub(crate) fn analyze_array_access(&mut self, array: &Expr, index: &Expr) -> Type {
        let array_ty = self.analyze_expr(array, None);

        if let Expr::RangeExpr {
            start,
            end,
            step,
            inclusive,
        } = index
        {
            return self.analyze_slice(
                &array_ty,
                start.as_deref(),
                end.as_deref(),
                step.as_deref(),
                *inclusive,
            );
        }

        let index_ty = self.analyze_expr(index, None);
        if array_ty.is_unknown() {
            return Type::Unknown;
        }
        if !index_ty.is_unknown() && !index_ty.is_integer() {
            self.error(
                DiagnosticKind::IndexNotInteger,
                format!(
                    "Array index must be an integer type, got {}; valid index types: i32, i64, usize, comptime_int",
                    index_ty
                ),
            );
            return Type::Unknown;
        }

        match array_ty {
            Type::Array { element, dims } => {
                if dims.len() > 1 {
                    Type::Array {
                        element,
                        dims: dims[1..].to_vec(),
                    }
                } else {
                    *element
                }
            }
            Type::ComptimeArray { element, dims } => {
                if dims.len() > 1 {
                    Type::ComptimeArray {
                        element,
                        dims: dims[1..].to_vec(),
                    }
                } else {
                    *element
                }
            }
            other => {
                self.error(
                    DiagnosticKind::IndexOnNonArray,
                    format!("Cannot index non-array type: {}", other),
                );
                Type::Unknown
            }
        }
    }

    /// `a[l..r]` - a slice keeps the array's element and inner dimensions;
    /// the outer dimension is the bound span when it is literally known,
    /// the array's own size for a full `[..]`, inferred otherwise.
    fn analyze_slice(
        &mut self,
        array_ty: &Type,
        start: Option<&Expr>,
        end: Option<&Expr>,
        step: Option<&Expr>,
        inclusive: bool,
    ) -> Type {
        let range_ty = self.analyze_range(start, end, step, inclusive);
        match &range_ty {
            Type::Range { element } => {
                if !element.is_integer() {
                    self.error(
                        DiagnosticKind::IndexNotInteger,
                        format!("Slice bounds must be integers, got {}", element),
                    );
                    return Type::Unknown;
                }
            }
            _ => return Type::Unknown,
        }
        if array_ty.is_unknown() {
            return Type::Unknown;
        }

        let full_slice = start.is_none() && end.is_none();
        let size = literal_range_size(start, end, step, inclusive);

        match array_ty {
            Type::Array { element, dims } => {
                let outer = if full_slice {
                    dims.first().copied().unwrap_or(Dim::Inferred)
                } else {
                    size.map(Dim::Fixed).unwrap_or(Dim::Inferred)
                };
                let mut out = vec![outer];
                out.extend_from_slice(&dims[1..]);
                Type::Array {
                    element: element.clone(),
                    dims: out,
                }
            }
            Type::ComptimeArray { element, dims } => {
                let outer = if full_slice {
                    dims.first().copied()
                } else {
                    size
                };
                match outer {
                    Some(n) => {
                        let mut out = vec![n];
                        out.extend_from_slice(&dims[1..]);
                        Type::ComptimeArray {
                            element: element.clone(),
                            dims: out,
                        }
                    }
                    None => {
                        let mut out = vec![Dim::Inferred];
                        out.extend(dims[1..].iter().map(|&n| Dim::Fixed(n)));
                        Type::Array {
                            element: Box::new(default_type(element)),
                            dims: out,
                        }
                    }
                }
            }
            other => {
                self.error(
                    DiagnosticKind::IndexOnNonArray,
                    format!("Cannot slice non-array type: {}", other),
                );
                Type::Unknown
            }
        }
    }

    /// Property access is a closed set: `.length` on arrays, typed `usize`.
    pub(crate) fn analyze_property_access(&mut self, object: &Expr, property: &str) -> Type {
        let ty = self.analyze_expr(object, None);
        if ty.is_unknown() {
            return Type::Unknown;
        }
        if property != "length" {
            self.error(
                DiagnosticKind::TypeMismatch,
                format!("Unknown property '{}'; arrays support '.length'", property),
            );
            return Type::Unknown;
        }
        if ty.is_array() {
            Type::Usize
        } else {
            self.error(
                DiagnosticKind::TypeMismatch,
                format!("Property 'length' requires an array, got {}", ty),
            );
            Type::Unknown
        }
    }
}

/// Element count of a range whose bounds (and positive step) are integer
/// literals; `None` when any part is not statically known.
fn literal_range_size(
    start: Option<&Expr>,
    end: Option<&Expr>,
    step: Option<&Expr>,
    inclusive: bool,
) -> Option<usize> {
    let start = literal_int(start?)?;
    let end = literal_int(end?)?;
    let span = if inclusive {
        end - start + 1
    } else {
        end - start
    };
    if span <= 0 {
        return Some(0);
    }
    match step {
        None => Some(span as usize),
        Some(expr) => {
            let step = literal_int(expr)?;
            if step <= 0 {
                None
            } else {
                Some(((span + step - 1) / step) as usize)
            }
        }
    }
}

fn literal_int(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::ComptimeInt { value } => Some(*value),
        _ => None,
    }
}
