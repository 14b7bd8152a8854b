//! Recursive-descent parser for Hexen.
//!
//! The parser walks the token stream produced by [`crate::lexer`] and
//! builds the [`crate::ast`] tree. It is split by concern:
//!
//! - this module: the [`Parser`] driver, token plumbing, programs and
//!   function declarations
//! - [`stmt`]: statements, blocks, conditionals and loops
//! - [`expr`]: the expression precedence ladder
//! - [`types`]: type annotations (`i32`, `[N]T`, `range[T]`)
//!
//! All failures are [`SpannedError`]s pointing at the offending token; the
//! parser never recovers, matching the driver's parse-then-check pipeline.

mod expr;
mod stmt;
mod types;

use crate::ast::{Block, Function, Parameter, Program, Stmt};
use crate::lexer;
use crate::token::{Token, TokenKind};
use hexen_base::{Result, SpannedError};

/// Lexes and parses a full source file.
pub fn parse(source: &str) -> Result<Program> {
    let tokens = lexer::tokenize(source)?;
    Parser::new(tokens).parse_program()
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// `tokens` must end with [`TokenKind::Eof`], as `lexer::tokenize`
    /// guarantees.
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));
        Self { tokens, pos: 0 }
    }

    /// Parses a whole program: `func` declarations and top-level statements
    /// in any interleaving.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut functions = Vec::new();
        let mut statements = Vec::new();

        loop {
            self.skip_separators();
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Func => functions.push(self.parse_function()?),
                _ => statements.push(self.parse_statement()?),
            }
        }

        Ok(Program {
            functions,
            statements,
        })
    }

    /// `func name(params) : ReturnType = { … }`
    fn parse_function(&mut self) -> Result<Function> {
        self.expect(&TokenKind::Func, "function declaration")?;
        let name = self.expect_identifier("function name")?;

        self.expect(&TokenKind::LParen, "parameter list")?;
        let mut parameters = Vec::new();
        while !self.check(&TokenKind::RParen) {
            parameters.push(self.parse_parameter()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "parameter list")?;

        self.expect(&TokenKind::Colon, "function return type")?;
        let return_type = self.parse_type_annotation()?;
        self.expect(&TokenKind::Assign, "function body")?;
        let body = self.parse_block()?;

        Ok(Function {
            name,
            parameters,
            return_type,
            body,
        })
    }

    /// `[mut] name : T`
    fn parse_parameter(&mut self) -> Result<Parameter> {
        let is_mutable = self.eat(&TokenKind::Mut);
        let name = self.expect_identifier("parameter name")?;
        self.expect(&TokenKind::Colon, "parameter type")?;
        let param_type = self.parse_type_annotation()?;
        Ok(Parameter {
            name,
            param_type,
            is_mutable,
        })
    }

    /// `{ statements… }`
    fn parse_block(&mut self) -> Result<Block> {
        self.expect(&TokenKind::LBrace, "block")?;
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if self.check(&TokenKind::RBrace) || self.check(&TokenKind::Eof) {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RBrace, "block")?;
        Ok(Block { statements })
    }

    // =========================================================================
    // Token plumbing
    // =========================================================================

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_ahead(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Consumes the next token when it matches `kind`.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, context: &str) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!(
                "expected '{}' in {}, found '{}'",
                kind,
                context,
                self.peek_kind()
            )))
        }
    }

    fn expect_identifier(&mut self, context: &str) -> Result<String> {
        match self.peek_kind() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.error_here(format!(
                "expected {}, found '{}'",
                context, other
            ))),
        }
    }

    /// Optional `;` separators between statements.
    fn skip_separators(&mut self) {
        while self.eat(&TokenKind::Semi) {}
    }

    fn error_here(&self, message: String) -> SpannedError {
        SpannedError::new(message, self.peek().span)
    }

    // Used by submodules to back-fill loop labels.
    fn attach_label(stmt: &mut Stmt, label: &str) {
        match stmt {
            Stmt::WhileLoop { label: slot, .. } | Stmt::ForInLoop { label: slot, .. } => {
                *slot = Some(label.to_string());
            }
            _ => {}
        }
    }
}
