//! Hand-written lexer for Hexen source text.
//!
//! One pass over the bytes, producing spanned [`Token`]s. Whitespace and
//! `//` line comments are skipped; newlines are not significant (statements
//! are delimited by structure, optionally by `;`).
//!
//! The only lookahead subtlety is the digit/range split: in `1..10` the
//! first token is the integer `1`, not a float - a `.` only continues a
//! number when the byte after it is itself a digit.

use crate::token::{Token, TokenKind};
use hexen_base::{Result, Span, SpannedError};

/// Tokenizes `source`, ending the stream with a single [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            if self.pos >= self.bytes.len() {
                tokens.push(Token::new(TokenKind::Eof, Span::point(self.pos)));
                return Ok(tokens);
            }
            tokens.push(self.next_token()?);
        }
    }

    fn peek(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'/' if self.peek_at(1) == b'/' => {
                    while self.pos < self.bytes.len() && self.peek() != b'\n' {
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        let start = self.pos;
        let byte = self.peek();

        if byte.is_ascii_digit() {
            return self.lex_number(start);
        }
        if byte == b'_' && !is_ident_continue(self.peek_at(1)) {
            self.pos += 1;
            return Ok(Token::new(TokenKind::Underscore, Span::new(start, self.pos)));
        }
        if is_ident_start(byte) {
            return Ok(self.lex_identifier(start));
        }
        if byte == b'"' {
            return self.lex_string(start);
        }
        if byte == b'\'' {
            return self.lex_label(start);
        }

        // Punctuation and operators, longest match first.
        let two = (byte, self.peek_at(1));
        let kind = match two {
            (b'-', b'>') => Some((TokenKind::Arrow, 2)),
            (b'.', b'.') => {
                if self.peek_at(2) == b'=' {
                    Some((TokenKind::DotDotEq, 3))
                } else {
                    Some((TokenKind::DotDot, 2))
                }
            }
            (b'=', b'=') => Some((TokenKind::EqEq, 2)),
            (b'!', b'=') => Some((TokenKind::Ne, 2)),
            (b'<', b'=') => Some((TokenKind::Le, 2)),
            (b'>', b'=') => Some((TokenKind::Ge, 2)),
            (b'&', b'&') => Some((TokenKind::AndAnd, 2)),
            (b'|', b'|') => Some((TokenKind::OrOr, 2)),
            _ => None,
        };
        if let Some((kind, width)) = kind {
            self.pos += width;
            return Ok(Token::new(kind, Span::new(start, self.pos)));
        }

        let kind = match byte {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semi,
            b':' => TokenKind::Colon,
            b'=' => TokenKind::Assign,
            b'.' => TokenKind::Dot,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'\\' => TokenKind::Backslash,
            b'!' => TokenKind::Bang,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            _ => {
                return Err(SpannedError::new(
                    format!("unexpected character '{}'", self.peek() as char),
                    Span::new(start, start + 1),
                ));
            }
        };
        self.pos += 1;
        Ok(Token::new(kind, Span::new(start, self.pos)))
    }

    fn lex_number(&mut self, start: usize) -> Result<Token> {
        while self.peek().is_ascii_digit() {
            self.pos += 1;
        }

        // A dot continues the number only when a digit follows it, so that
        // `1..10` lexes as integer, range operator, integer.
        let mut is_float = false;
        if self.peek() == b'.' && self.peek_at(1).is_ascii_digit() {
            is_float = true;
            self.pos += 1;
            while self.peek().is_ascii_digit() {
                self.pos += 1;
            }
        }

        let span = Span::new(start, self.pos);
        let text = &self.source[start..self.pos];
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| SpannedError::new(format!("invalid float literal '{}'", text), span))?;
            Ok(Token::new(TokenKind::FloatLiteral(value), span))
        } else {
            let value: i64 = text.parse().map_err(|_| {
                SpannedError::new(format!("integer literal '{}' out of range", text), span)
            })?;
            Ok(Token::new(TokenKind::IntLiteral(value), span))
        }
    }

    fn lex_identifier(&mut self, start: usize) -> Token {
        while is_ident_continue(self.peek()) {
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];
        let span = Span::new(start, self.pos);
        match TokenKind::keyword(text) {
            Some(kind) => Token::new(kind, span),
            None => Token::new(TokenKind::Identifier(text.to_string()), span),
        }
    }

    fn lex_string(&mut self, start: usize) -> Result<Token> {
        self.pos += 1; // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                0 | b'\n' => {
                    return Err(SpannedError::new(
                        "unterminated string literal",
                        Span::new(start, self.pos),
                    ));
                }
                b'"' => {
                    self.pos += 1;
                    return Ok(Token::new(
                        TokenKind::StringLiteral(value),
                        Span::new(start, self.pos),
                    ));
                }
                b'\\' => {
                    let escape = self.peek_at(1);
                    let replacement = match escape {
                        b'n' => '\n',
                        b't' => '\t',
                        b'\\' => '\\',
                        b'"' => '"',
                        _ => {
                            return Err(SpannedError::new(
                                format!("unknown escape '\\{}'", escape as char),
                                Span::new(self.pos, self.pos + 2),
                            ));
                        }
                    };
                    value.push(replacement);
                    self.pos += 2;
                }
                _ => {
                    // Multi-byte UTF-8 sequences are copied through verbatim.
                    let ch_start = self.pos;
                    let ch = self.source[ch_start..].chars().next().unwrap_or('\u{fffd}');
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
    }

    fn lex_label(&mut self, start: usize) -> Result<Token> {
        self.pos += 1; // apostrophe
        if !is_ident_start(self.peek()) {
            return Err(SpannedError::new(
                "expected label name after '",
                Span::new(start, self.pos),
            ));
        }
        let name_start = self.pos;
        while is_ident_continue(self.peek()) {
            self.pos += 1;
        }
        let name = self.source[name_start..self.pos].to_string();
        Ok(Token::new(
            TokenKind::Label(name),
            Span::new(start, self.pos),
        ))
    }
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("tokenize failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    // =========================================================================
    // Numbers and ranges
    // =========================================================================

    #[test]
    fn integer_literal() {
        assert_eq!(kinds("42"), vec![TokenKind::IntLiteral(42), TokenKind::Eof]);
    }

    #[test]
    fn float_literal() {
        assert_eq!(
            kinds("3.14"),
            vec![TokenKind::FloatLiteral(3.14), TokenKind::Eof]
        );
    }

    #[test]
    fn range_does_not_eat_the_dot() {
        assert_eq!(
            kinds("1..10"),
            vec![
                TokenKind::IntLiteral(1),
                TokenKind::DotDot,
                TokenKind::IntLiteral(10),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn inclusive_range_token() {
        assert_eq!(
            kinds("1..=3"),
            vec![
                TokenKind::IntLiteral(1),
                TokenKind::DotDotEq,
                TokenKind::IntLiteral(3),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn stepped_range_keeps_colon_separate() {
        assert_eq!(
            kinds("0..100:2"),
            vec![
                TokenKind::IntLiteral(0),
                TokenKind::DotDot,
                TokenKind::IntLiteral(100),
                TokenKind::Colon,
                TokenKind::IntLiteral(2),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn huge_integer_is_an_error() {
        assert!(tokenize("99999999999999999999999").is_err());
    }

    // =========================================================================
    // Identifiers, keywords, labels
    // =========================================================================

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("val counter"),
            vec![
                TokenKind::Val,
                TokenKind::Identifier("counter".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lone_underscore_is_its_own_token() {
        assert_eq!(
            kinds("[_]"),
            vec![
                TokenKind::LBracket,
                TokenKind::Underscore,
                TokenKind::RBracket,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn underscore_prefixed_name_is_identifier() {
        assert_eq!(
            kinds("_tmp"),
            vec![TokenKind::Identifier("_tmp".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn label_token() {
        assert_eq!(
            kinds("'outer for"),
            vec![
                TokenKind::Label("outer".into()),
                TokenKind::For,
                TokenKind::Eof
            ]
        );
    }

    // =========================================================================
    // Operators, comments, strings
    // =========================================================================

    #[test]
    fn division_operators_are_distinct() {
        assert_eq!(
            kinds(r"a / b \ c"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Slash,
                TokenKind::Identifier("b".into()),
                TokenKind::Backslash,
                TokenKind::Identifier("c".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn arrow_and_comparison_operators() {
        assert_eq!(
            kinds("-> <= >= == != && ||"),
            vec![
                TokenKind::Arrow,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::EqEq,
                TokenKind::Ne,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(
            kinds("val x // the answer\n= 42"),
            vec![
                TokenKind::Val,
                TokenKind::Identifier("x".into()),
                TokenKind::Assign,
                TokenKind::IntLiteral(42),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn string_with_escapes() {
        assert_eq!(
            kinds(r#""line\n\"quoted\"""#),
            vec![
                TokenKind::StringLiteral("line\n\"quoted\"".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("\"oops").is_err());
    }

    #[test]
    fn spans_point_at_source_bytes() {
        let tokens = tokenize("val x").expect("tokenize failed");
        assert_eq!(tokens[0].span, Span::new(0, 3));
        assert_eq!(tokens[1].span, Span::new(4, 5));
    }

    #[test]
    fn unexpected_character_reports_position() {
        let err = tokenize("val @").unwrap_err();
        assert!(err.message.contains('@'));
        assert_eq!(err.span.start, 4);
    }
}
