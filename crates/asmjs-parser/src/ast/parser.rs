//! Core parser state and token navigation helpers.
//!
//! Expression and statement parsing live in `expr_parser.rs` and
//! `stmt_parser.rs` as further `impl Parser` blocks.

use asmjs_core::{ParseError, ParseErrors, Span};
use bumpalo::Bump;
use bumpalo::collections::Vec as BVec;

use crate::ast::{Expr, Ident, Program, Stmt};
use crate::lexer::{Lexer, Token, TokenKind};

/// Parser for asm.js module source.
///
/// Tokenizes the whole input up front; every AST node and lexeme is
/// allocated in the arena, so the returned tree outlives the source string.
pub struct Parser<'ast> {
    /// Token buffer, always terminated by an `Eof` token.
    tokens: Vec<Token<'ast>>,
    /// Index of the current token.
    position: usize,
    /// Arena for AST nodes.
    pub(crate) arena: &'ast Bump,
}

impl<'ast> Parser<'ast> {
    /// Parse a complete program.
    ///
    /// Stops at the first error.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<Program<'ast>, ParseErrors> {
        let mut parser = Self::new(source, arena)?;
        let start = parser.peek().span;

        let mut items = BVec::new_in(arena);
        while !parser.is_eof() {
            items.push(parser.parse_statement()?);
        }

        let span = items
            .last()
            .map(|last: &Stmt<'ast>| start.merge(last.span()))
            .unwrap_or(start);
        Ok(Program::new(items.into_bump_slice(), span))
    }

    /// Parse a single expression (useful for tests and tooling).
    pub fn expression(source: &str, arena: &'ast Bump) -> Result<&'ast Expr<'ast>, ParseErrors> {
        let mut parser = Self::new(source, arena)?;
        let expr = parser.parse_full_expr()?;
        parser.expect_eof()?;
        Ok(expr)
    }

    /// Parse a single statement (useful for tests and tooling).
    pub fn statement(source: &str, arena: &'ast Bump) -> Result<Stmt<'ast>, ParseErrors> {
        let mut parser = Self::new(source, arena)?;
        let stmt = parser.parse_statement()?;
        parser.expect_eof()?;
        Ok(stmt)
    }

    fn new(source: &str, arena: &'ast Bump) -> Result<Self, ParseErrors> {
        let mut lexer = Lexer::new(source, arena);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let eof = token.is_eof();
            tokens.push(token);
            if eof {
                break;
            }
        }

        let lex_errors = lexer.take_errors();
        if !lex_errors.is_empty() {
            let mut errors = ParseErrors::new();
            for error in lex_errors {
                errors.push(ParseError::from(error));
            }
            return Err(errors);
        }

        Ok(Self {
            tokens,
            position: 0,
            arena,
        })
    }

    // =========================================
    // Token navigation
    // =========================================

    /// The current token.
    pub(crate) fn peek(&self) -> Token<'ast> {
        self.peek_nth(0)
    }

    /// The token `n` positions ahead of the current one.
    pub(crate) fn peek_nth(&self, n: usize) -> Token<'ast> {
        let index = (self.position + n).min(self.tokens.len() - 1);
        self.tokens[index]
    }

    /// Consume the current token. The trailing `Eof` is never consumed.
    pub(crate) fn advance(&mut self) -> Token<'ast> {
        let token = self.peek();
        if !token.is_eof() {
            self.position += 1;
        }
        token
    }

    /// Whether the current token has the given kind.
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.peek().is_eof()
    }

    /// Consume a token of the given kind or report what was found instead.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        let token = self.peek();
        if token.kind == kind {
            return Ok(self.advance());
        }
        if token.is_eof() {
            return Err(ParseError::unexpected_eof(token.span));
        }
        Err(ParseError::expected_token(
            token.span,
            kind.description(),
            token.lexeme,
        ))
    }

    /// Consume an identifier.
    pub(crate) fn expect_ident(&mut self) -> Result<Ident<'ast>, ParseError> {
        let token = self.peek();
        if token.kind == TokenKind::Identifier {
            self.advance();
            return Ok(Ident::new(token.lexeme, token.span));
        }
        if token.is_eof() {
            return Err(ParseError::unexpected_eof(token.span));
        }
        Err(ParseError::expected_identifier(token.span, token.lexeme))
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        let token = self.peek();
        if token.is_eof() {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(token.span, token.lexeme))
        }
    }

    /// Consume an optional statement terminator.
    ///
    /// A semicolon may be omitted before `}`, at end of input, or when the
    /// next token starts a new line.
    pub(crate) fn consume_semicolon(&mut self, prev: Span) -> Result<(), ParseError> {
        if self.eat(TokenKind::Semicolon) {
            return Ok(());
        }
        let token = self.peek();
        if token.is_eof() || token.kind == TokenKind::RightBrace || token.span.line > prev.line {
            return Ok(());
        }
        Err(ParseError::expected_token(token.span, "';'", token.lexeme))
    }

    /// Span of the most recently consumed token.
    pub(crate) fn previous_span(&self) -> Span {
        if self.position == 0 {
            self.peek().span
        } else {
            self.tokens[self.position - 1].span
        }
    }
}
