//! Statement parsing: declarations, assignments, control flow, loops.

use super::Parser;
use crate::ast::{ElseClause, Expr, Stmt};
use crate::token::TokenKind;
use hexen_base::Result;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> Result<Stmt> {
        match self.peek_kind().clone() {
            TokenKind::Val => self.parse_val_declaration(),
            TokenKind::Mut => self.parse_mut_declaration(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Arrow => {
                self.advance();
                let value = self.parse_expr()?;
                Ok(Stmt::AssignStatement { value })
            }
            TokenKind::If => {
                self.advance();
                let (condition, if_branch, else_clauses) = self.parse_conditional_parts()?;
                Ok(Stmt::ConditionalStatement {
                    condition,
                    if_branch,
                    else_clauses,
                })
            }
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Break => {
                self.advance();
                Ok(Stmt::BreakStatement {
                    label: self.eat_label(),
                })
            }
            TokenKind::Continue => {
                self.advance();
                Ok(Stmt::ContinueStatement {
                    label: self.eat_label(),
                })
            }
            TokenKind::Label(label) => {
                self.advance();
                let mut statement = match self.peek_kind() {
                    TokenKind::While => self.parse_while()?,
                    TokenKind::For => self.parse_for()?,
                    other => {
                        return Err(self.error_here(format!(
                            "label '{}' must be followed by a loop, found '{}'",
                            label, other
                        )));
                    }
                };
                Self::attach_label(&mut statement, &label);
                Ok(Stmt::LabeledStatement {
                    label,
                    statement: Box::new(statement),
                })
            }
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                Ok(Stmt::Block {
                    statements: block.statements,
                })
            }
            TokenKind::Identifier(_) => self.parse_identifier_statement(),
            other => Err(self.error_here(format!("expected statement, found '{}'", other))),
        }
    }

    /// `val name [: T] = expr`
    fn parse_val_declaration(&mut self) -> Result<Stmt> {
        self.advance();
        let name = self.expect_identifier("variable name after 'val'")?;
        let type_annotation = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        self.expect(&TokenKind::Assign, "val declaration")?;
        let value = self.parse_expr()?;
        Ok(Stmt::ValDeclaration {
            name,
            type_annotation,
            value,
        })
    }

    /// `mut name : T = expr` - the annotation is required by the grammar.
    fn parse_mut_declaration(&mut self) -> Result<Stmt> {
        self.advance();
        let name = self.expect_identifier("variable name after 'mut'")?;
        self.expect(&TokenKind::Colon, "mut declaration (explicit type required)")?;
        let type_annotation = Some(self.parse_type_annotation()?);
        self.expect(&TokenKind::Assign, "mut declaration")?;
        let value = self.parse_expr()?;
        Ok(Stmt::MutDeclaration {
            name,
            type_annotation,
            value,
        })
    }

    /// `return [expr]` - bare when the next token cannot begin an
    /// expression (closing brace, separator, or another statement keyword).
    fn parse_return(&mut self) -> Result<Stmt> {
        self.advance();
        let value = if self.return_value_follows() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Stmt::ReturnStatement { value })
    }

    fn return_value_follows(&self) -> bool {
        !matches!(
            self.peek_kind(),
            TokenKind::RBrace
                | TokenKind::Semi
                | TokenKind::Eof
                | TokenKind::Val
                | TokenKind::Mut
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Arrow
                | TokenKind::Label(_)
        )
    }

    /// Condition, if-branch and else-clauses; `if` is already consumed.
    /// Shared by statement and expression positions.
    pub(super) fn parse_conditional_parts(
        &mut self,
    ) -> Result<(Expr, crate::ast::Block, Vec<ElseClause>)> {
        let condition = self.parse_expr()?;
        let if_branch = self.parse_block()?;
        let mut else_clauses = Vec::new();

        while self.eat(&TokenKind::Else) {
            if self.eat(&TokenKind::If) {
                let condition = Some(self.parse_expr()?);
                let branch = self.parse_block()?;
                else_clauses.push(ElseClause { condition, branch });
            } else {
                let branch = self.parse_block()?;
                else_clauses.push(ElseClause {
                    condition: None,
                    branch,
                });
                break;
            }
        }

        Ok((condition, if_branch, else_clauses))
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.advance();
        let condition = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::WhileLoop {
            condition,
            body,
            label: None,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        let (variable, variable_type, iterable, body) = self.parse_for_parts()?;
        Ok(Stmt::ForInLoop {
            variable,
            variable_type,
            iterable,
            body,
            label: None,
        })
    }

    /// `for x [: T] in iterable { … }`; `for` is consumed here. Shared by
    /// statement and expression positions.
    pub(super) fn parse_for_parts(
        &mut self,
    ) -> Result<(
        String,
        Option<crate::ast::TypeAnnotation>,
        Expr,
        crate::ast::Block,
    )> {
        self.expect(&TokenKind::For, "for-in loop")?;
        let variable = self.expect_identifier("loop variable")?;
        let variable_type = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        self.expect(&TokenKind::In, "for-in loop")?;
        let iterable = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok((variable, variable_type, iterable, body))
    }

    /// Statement starting with an identifier: assignment or call.
    fn parse_identifier_statement(&mut self) -> Result<Stmt> {
        match self.peek_ahead(1) {
            TokenKind::Assign => {
                let target = self.expect_identifier("assignment target")?;
                self.advance(); // '='
                let value = self.parse_expr()?;
                Ok(Stmt::AssignmentStatement { target, value })
            }
            TokenKind::LParen => {
                let call = self.parse_expr()?;
                match call {
                    Expr::FunctionCall { .. } => Ok(Stmt::FunctionCallStatement {
                        function_call: call,
                    }),
                    _ => Err(self.error_here(
                        "expected a function call statement".to_string(),
                    )),
                }
            }
            other => Err(self.error_here(format!(
                "expected '=' or '(' after identifier, found '{}'",
                other
            ))),
        }
    }

    fn eat_label(&mut self) -> Option<String> {
        if let TokenKind::Label(name) = self.peek_kind() {
            let name = name.clone();
            self.advance();
            Some(name)
        } else {
            None
        }
    }
}
