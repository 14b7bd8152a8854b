//! Type annotation parsing: primitive names, array types, range types.

use super::Parser;
use crate::ast::{ArrayDimension, CompositeType, TypeAnnotation};
use crate::token::TokenKind;
use hexen_base::Result;

/// Primitive type names of the language. The parser accepts any identifier
/// as a type name and leaves unknown-name reporting to the analyzer, but
/// conversion postfix parsing needs to know what *starts* a type.
const PRIMITIVES: &[&str] = &[
    "i32", "i64", "f32", "f64", "usize", "bool", "string", "void",
];

pub(super) fn is_type_name(name: &str) -> bool {
    name == "range" || PRIMITIVES.contains(&name)
}

impl Parser {
    pub(super) fn parse_type_annotation(&mut self) -> Result<TypeAnnotation> {
        match self.peek_kind().clone() {
            // `[N]…[M]T` - collect the dimension groups, then the element.
            TokenKind::LBracket => {
                let mut dimensions = Vec::new();
                while self.eat(&TokenKind::LBracket) {
                    let size = match self.peek_kind() {
                        TokenKind::IntLiteral(n) if *n >= 0 => {
                            let n = *n as u64;
                            self.advance();
                            Some(n)
                        }
                        TokenKind::Underscore => {
                            self.advance();
                            None
                        }
                        other => {
                            return Err(self.error_here(format!(
                                "expected array size or '_', found '{}'",
                                other
                            )));
                        }
                    };
                    self.expect(&TokenKind::RBracket, "array type dimension")?;
                    dimensions.push(ArrayDimension { size });
                }
                let element_type = self.parse_type_annotation()?;
                Ok(TypeAnnotation::Composite(Box::new(
                    CompositeType::ArrayType {
                        element_type,
                        dimensions,
                    },
                )))
            }
            // `range[T]`
            TokenKind::Identifier(name)
                if name == "range" && self.peek_ahead(1) == &TokenKind::LBracket =>
            {
                self.advance();
                self.advance();
                let element_type = self.parse_type_annotation()?;
                self.expect(&TokenKind::RBracket, "range type")?;
                Ok(TypeAnnotation::Composite(Box::new(
                    CompositeType::RangeType { element_type },
                )))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(TypeAnnotation::Name(name))
            }
            other => Err(self.error_here(format!("expected type, found '{}'", other))),
        }
    }
}
