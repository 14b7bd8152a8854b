//! The Hexen type model.
//!
//! One closed sum type covers everything the analyzer reasons about:
//! concrete scalars, the two sentinels, the comptime types literals carry,
//! and the composite array/range types with their payloads carried
//! directly in the variant - there is no side table keyed by type name.
//!
//! `ComptimeInt` / `ComptimeFloat` / `ComptimeArray` exist only during
//! analysis: they are the types of literals before context resolves them,
//! and the comptime resolver adapts them to whatever concrete type the
//! consuming position demands.

use std::fmt;

/// One dimension of a concrete array type. `Inferred` is the `_` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    Fixed(usize),
    Inferred,
}

/// Every type the analyzer can assign to an expression or symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    // Concrete scalars
    I32,
    I64,
    Usize,
    F32,
    F64,
    Bool,
    String,
    Void,

    // Sentinels
    /// Error token - absorbs downstream checks so one mistake produces one
    /// diagnostic.
    Unknown,
    /// The type of the `undef` literal.
    Uninitialized,

    // Comptime scalars
    ComptimeInt,
    ComptimeFloat,

    /// Concrete array, outermost dimension first.
    Array { element: Box<Type>, dims: Vec<Dim> },
    /// Array literal type before adaptation: the element is a comptime
    /// scalar and the shape is fully known.
    ComptimeArray { element: Box<Type>, dims: Vec<usize> },
    /// Range iterator, e.g. `range[usize]` from `0..n` with usize bounds.
    Range { element: Box<Type> },
}

impl Type {
    pub fn array(element: Type, dims: Vec<Dim>) -> Type {
        Type::Array {
            element: Box::new(element),
            dims,
        }
    }

    pub fn comptime_array(element: Type, dims: Vec<usize>) -> Type {
        Type::ComptimeArray {
            element: Box::new(element),
            dims,
        }
    }

    pub fn range(element: Type) -> Type {
        Type::Range {
            element: Box::new(element),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Type::I32
                | Type::I64
                | Type::Usize
                | Type::F32
                | Type::F64
                | Type::ComptimeInt
                | Type::ComptimeFloat
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Type::I32 | Type::I64 | Type::Usize | Type::ComptimeInt
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::F32 | Type::F64 | Type::ComptimeFloat)
    }

    pub fn is_comptime(&self) -> bool {
        matches!(
            self,
            Type::ComptimeInt | Type::ComptimeFloat | Type::ComptimeArray { .. }
        )
    }

    pub fn is_signed_integer(&self) -> bool {
        matches!(self, Type::I32 | Type::I64 | Type::ComptimeInt)
    }

    /// Numeric and not comptime - a type a comptime scalar may adapt to.
    pub fn is_concrete_numeric(&self) -> bool {
        self.is_numeric() && !self.is_comptime()
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. } | Type::ComptimeArray { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::I32 => write!(f, "i32"),
            Type::I64 => write!(f, "i64"),
            Type::Usize => write!(f, "usize"),
            Type::F32 => write!(f, "f32"),
            Type::F64 => write!(f, "f64"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Unknown => write!(f, "unknown"),
            Type::Uninitialized => write!(f, "undef"),
            Type::ComptimeInt => write!(f, "comptime_int"),
            Type::ComptimeFloat => write!(f, "comptime_float"),
            Type::Array { element, dims } => {
                for dim in dims {
                    match dim {
                        Dim::Fixed(n) => write!(f, "[{}]", n)?,
                        Dim::Inferred => write!(f, "[_]")?,
                    }
                }
                write!(f, "{}", element)
            }
            Type::ComptimeArray { element, dims } => {
                for n in dims {
                    write!(f, "[{}]", n)?;
                }
                write!(f, "{}", element)
            }
            Type::Range { element } => write!(f, "range[{}]", element),
        }
    }
}
