//! Expression parsing.
//!
//! Precedence ladder, loosest first:
//!
//! ```text
//! ||  →  &&  →  == !=  →  < <= > >=  →  ranges  →  + -  →  * / \
//!     →  unary - !  →  postfix ( ) [ ] . :T  →  primary
//! ```
//!
//! The `:` token is shared by explicit conversions (`expr:i32`, tight
//! postfix binding) and range steps (`0..100:2`). A colon is consumed as a
//! conversion only when a type follows it; otherwise it is left for the
//! enclosing range to claim as its step.

use super::Parser;
use crate::ast::{BinaryOp, Expr, LiteralValue, UnaryOp};
use crate::token::TokenKind;
use hexen_base::Result;

impl Parser {
    pub(super) fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::OrOr) {
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut left = self.parse_range()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_range()?;
            left = binary(op, left, right);
        }
    }

    /// Ranges sit between comparisons and additive expressions:
    /// `a..b`, `a..=b`, `a..`, `..b`, `..`, each with an optional `:step`.
    fn parse_range(&mut self) -> Result<Expr> {
        let start = match self.peek_kind() {
            TokenKind::DotDot | TokenKind::DotDotEq => None,
            _ => Some(self.parse_additive()?),
        };

        let inclusive = match self.peek_kind() {
            TokenKind::DotDot => false,
            TokenKind::DotDotEq => true,
            // Not a range after all; `start` is the whole expression.
            _ => match start {
                Some(expr) => return Ok(expr),
                None => {
                    return Err(self.error_here("expected a range expression".to_string()));
                }
            },
        };
        self.advance();
        let start = start.map(Box::new);

        let end = if self.range_bound_follows() {
            Some(Box::new(self.parse_additive()?))
        } else {
            None
        };

        let step = if self.check(&TokenKind::Colon) && !self.colon_starts_type() {
            self.advance();
            Some(Box::new(self.parse_unary()?))
        } else {
            None
        };

        Ok(Expr::RangeExpr {
            start,
            end,
            step,
            inclusive,
        })
    }

    /// Tokens that may begin a range bound. Deliberately narrower than
    /// "expression start" so `for i in 1.. { }` sees the body brace and
    /// `arr[..]` sees the closing bracket.
    fn range_bound_follows(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::IntLiteral(_)
                | TokenKind::FloatLiteral(_)
                | TokenKind::StringLiteral(_)
                | TokenKind::Identifier(_)
                | TokenKind::LParen
                | TokenKind::Minus
                | TokenKind::True
                | TokenKind::False
        )
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::FloatDiv,
                TokenKind::Backslash => BinaryOp::IntDiv,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    pub(super) fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::UnaryOperation {
            operator: op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    let function_name = match expr {
                        Expr::Identifier { ref name } => name.clone(),
                        _ => {
                            return Err(self
                                .error_here("only named functions can be called".to_string()));
                        }
                    };
                    self.advance();
                    let mut arguments = Vec::new();
                    while !self.check(&TokenKind::RParen) {
                        arguments.push(self.parse_expr()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RParen, "argument list")?;
                    expr = Expr::FunctionCall {
                        function_name,
                        arguments,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket, "array index")?;
                    expr = Expr::ArrayAccess {
                        array: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let property = self.expect_identifier("property name")?;
                    expr = Expr::PropertyAccess {
                        object: Box::new(expr),
                        property,
                    };
                }
                TokenKind::Colon if self.colon_starts_type() => {
                    self.advance();
                    let target_type = self.parse_type_annotation()?;
                    expr = Expr::ExplicitConversionExpression {
                        expression: Box::new(expr),
                        target_type,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.peek_kind().clone() {
            TokenKind::IntLiteral(value) => {
                self.advance();
                Ok(Expr::ComptimeInt { value })
            }
            TokenKind::FloatLiteral(value) => {
                self.advance();
                Ok(Expr::ComptimeFloat { value })
            }
            TokenKind::StringLiteral(value) => {
                self.advance();
                Ok(Expr::Literal {
                    value: LiteralValue::String(value),
                })
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal {
                    value: LiteralValue::Bool(true),
                })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal {
                    value: LiteralValue::Bool(false),
                })
            }
            TokenKind::Undef => {
                self.advance();
                Ok(Expr::Identifier {
                    name: "undef".to_string(),
                })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Identifier { name })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "parenthesized expression")?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RBracket) {
                    elements.push(self.parse_expr()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBracket, "array literal")?;
                Ok(Expr::ArrayLiteral { elements })
            }
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                Ok(Expr::Block {
                    statements: block.statements,
                })
            }
            TokenKind::If => {
                self.advance();
                let (condition, if_branch, else_clauses) = self.parse_conditional_parts()?;
                Ok(Expr::ConditionalStatement {
                    condition: Box::new(condition),
                    if_branch,
                    else_clauses,
                })
            }
            TokenKind::For => self.parse_for_expression(None),
            TokenKind::Label(label) => {
                self.advance();
                if !self.check(&TokenKind::For) {
                    return Err(self.error_here(format!(
                        "label '{}' in expression position must be followed by a for-in loop",
                        label
                    )));
                }
                self.parse_for_expression(Some(label))
            }
            other => Err(self.error_here(format!("expected expression, found '{}'", other))),
        }
    }

    fn parse_for_expression(&mut self, label: Option<String>) -> Result<Expr> {
        let (variable, variable_type, iterable, body) = self.parse_for_parts()?;
        Ok(Expr::ForInLoop {
            variable,
            variable_type,
            iterable: Box::new(iterable),
            body,
            label,
        })
    }

    /// `true` when the token after the current `:` begins a type - a
    /// primitive name, `range`, or `[`. This is what keeps `0..100:2`
    /// a stepped range while `count:i64` stays a conversion.
    fn colon_starts_type(&self) -> bool {
        match self.peek_ahead(1) {
            TokenKind::LBracket => true,
            TokenKind::Identifier(name) => super::types::is_type_name(name),
            _ => false,
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::BinaryOperation {
        operator: op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Stmt, TypeAnnotation};
    use crate::parser::parse;

    fn first_value(source: &str) -> Expr {
        match parse(source)
            .expect("parse failed")
            .statements
            .into_iter()
            .next()
            .expect("no statements")
        {
            Stmt::ValDeclaration { value, .. } => value,
            other => panic!("expected val declaration, got {:?}", other),
        }
    }

    // =========================================================================
    // Precedence
    // =========================================================================

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        match first_value("val x = 1 + 2 * 3") {
            Expr::BinaryOperation {
                operator, right, ..
            } => {
                assert_eq!(operator, BinaryOp::Add);
                assert!(matches!(
                    *right,
                    Expr::BinaryOperation {
                        operator: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("expected binary operation, got {:?}", other),
        }
    }

    #[test]
    fn parentheses_override_precedence() {
        match first_value("val x = (1 + 2) * 3") {
            Expr::BinaryOperation { operator, left, .. } => {
                assert_eq!(operator, BinaryOp::Mul);
                assert!(matches!(
                    *left,
                    Expr::BinaryOperation {
                        operator: BinaryOp::Add,
                        ..
                    }
                ));
            }
            other => panic!("expected binary operation, got {:?}", other),
        }
    }

    #[test]
    fn comparison_is_looser_than_arithmetic() {
        match first_value("val x = a + 1 < b * 2") {
            Expr::BinaryOperation { operator, .. } => assert_eq!(operator, BinaryOp::Lt),
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn logical_operators_are_loosest() {
        match first_value("val x = a == 1 && b != 2 || c") {
            Expr::BinaryOperation { operator, .. } => assert_eq!(operator, BinaryOp::Or),
            other => panic!("expected logical or, got {:?}", other),
        }
    }

    #[test]
    fn both_division_operators_parse() {
        assert!(matches!(
            first_value("val x = a / b"),
            Expr::BinaryOperation {
                operator: BinaryOp::FloatDiv,
                ..
            }
        ));
        assert!(matches!(
            first_value(r"val x = a \ b"),
            Expr::BinaryOperation {
                operator: BinaryOp::IntDiv,
                ..
            }
        ));
    }

    // =========================================================================
    // Conversions and ranges sharing ':'
    // =========================================================================

    #[test]
    fn explicit_conversion_binds_tightly() {
        match first_value("val x = a:i32 + 1") {
            Expr::BinaryOperation { left, .. } => match *left {
                Expr::ExplicitConversionExpression { target_type, .. } => {
                    assert_eq!(target_type, TypeAnnotation::name("i32"));
                }
                ref other => panic!("expected conversion, got {:?}", other),
            },
            other => panic!("expected binary operation, got {:?}", other),
        }
    }

    #[test]
    fn stepped_range_keeps_its_step() {
        match first_value("val r = 0..100:2") {
            Expr::RangeExpr {
                start,
                end,
                step,
                inclusive,
            } => {
                assert!(!inclusive);
                assert_eq!(*start.unwrap(), Expr::ComptimeInt { value: 0 });
                assert_eq!(*end.unwrap(), Expr::ComptimeInt { value: 100 });
                assert_eq!(*step.unwrap(), Expr::ComptimeInt { value: 2 });
            }
            other => panic!("expected range, got {:?}", other),
        }
    }

    #[test]
    fn inclusive_range_with_negative_step() {
        match first_value("val r = 10..=0:-1") {
            Expr::RangeExpr {
                step, inclusive, ..
            } => {
                assert!(inclusive);
                assert!(matches!(
                    *step.unwrap(),
                    Expr::UnaryOperation {
                        operator: UnaryOp::Neg,
                        ..
                    }
                ));
            }
            other => panic!("expected range, got {:?}", other),
        }
    }

    #[test]
    fn unbounded_range_forms() {
        assert!(matches!(
            first_value("val r = 5.."),
            Expr::RangeExpr {
                start: Some(_),
                end: None,
                ..
            }
        ));
        assert!(matches!(
            first_value("val r = ..5"),
            Expr::RangeExpr {
                start: None,
                end: Some(_),
                ..
            }
        ));
        assert!(matches!(
            first_value("val r = .."),
            Expr::RangeExpr {
                start: None,
                end: None,
                ..
            }
        ));
    }

    #[test]
    fn conversion_on_range_materialization_element() {
        // The single range element of an array literal, then a slice.
        match first_value("val a = [1..5]") {
            Expr::ArrayLiteral { elements } => {
                assert_eq!(elements.len(), 1);
                assert!(matches!(elements[0], Expr::RangeExpr { .. }));
            }
            other => panic!("expected array literal, got {:?}", other),
        }
    }

    // =========================================================================
    // Postfix chains
    // =========================================================================

    #[test]
    fn array_access_and_property_chain() {
        match first_value("val n = grid[0][1]") {
            Expr::ArrayAccess { array, .. } => {
                assert!(matches!(*array, Expr::ArrayAccess { .. }));
            }
            other => panic!("expected array access, got {:?}", other),
        }
        match first_value("val n = arr.length") {
            Expr::PropertyAccess { property, .. } => assert_eq!(property, "length"),
            other => panic!("expected property access, got {:?}", other),
        }
    }

    #[test]
    fn full_slice_parses() {
        match first_value("val s = arr[..]") {
            Expr::ArrayAccess { index, .. } => {
                assert!(matches!(
                    *index,
                    Expr::RangeExpr {
                        start: None,
                        end: None,
                        ..
                    }
                ));
            }
            other => panic!("expected array access, got {:?}", other),
        }
    }

    #[test]
    fn call_with_expression_arguments() {
        match first_value("val x = max(a + 1, b:i64)") {
            Expr::FunctionCall {
                function_name,
                arguments,
            } => {
                assert_eq!(function_name, "max");
                assert_eq!(arguments.len(), 2);
                assert!(matches!(
                    arguments[1],
                    Expr::ExplicitConversionExpression { .. }
                ));
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    // =========================================================================
    // Value-position blocks, conditionals, loops
    // =========================================================================

    #[test]
    fn expression_block_value() {
        match first_value("val x = { -> 42 }") {
            Expr::Block { statements } => {
                assert_eq!(
                    statements[0],
                    Stmt::AssignStatement {
                        value: Expr::ComptimeInt { value: 42 }
                    }
                );
            }
            other => panic!("expected expression block, got {:?}", other),
        }
    }

    #[test]
    fn conditional_expression_value() {
        match first_value("val x = if c { -> 1 } else { -> 2 }") {
            Expr::ConditionalStatement { else_clauses, .. } => {
                assert_eq!(else_clauses.len(), 1)
            }
            other => panic!("expected conditional expression, got {:?}", other),
        }
    }

    #[test]
    fn for_loop_expression_value() {
        match first_value("val squares = for i in 1..=3 { -> i * i }") {
            Expr::ForInLoop { variable, body, .. } => {
                assert_eq!(variable, "i");
                assert_eq!(body.statements.len(), 1);
            }
            other => panic!("expected for-in expression, got {:?}", other),
        }
    }

    #[test]
    fn labeled_for_loop_expression_value() {
        match first_value("val xs = 'outer for i in 1..3 { -> i }") {
            Expr::ForInLoop { label, .. } => assert_eq!(label, Some("outer".to_string())),
            other => panic!("expected for-in expression, got {:?}", other),
        }
    }

    #[test]
    fn undef_parses_as_identifier() {
        assert_eq!(
            first_value("val x : i32 = undef"),
            Expr::Identifier {
                name: "undef".to_string()
            }
        );
    }
}
