//! Main lexer implementation.
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s.
//! It dispatches on the first character of each token.
//!
//! Token lexemes are copied into the arena, so the source string can be
//! dropped once parsing completes.

use std::collections::VecDeque;

use asmjs_core::{LexError, Span};
use bumpalo::Bump;

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer for asm.js module source.
///
/// Provides lookahead via [`peek`](Self::peek) and [`peek_nth`](Self::peek_nth).
///
/// The `'src` lifetime is the source string being lexed (temporary).
/// The `'ast` lifetime is the arena where token lexemes are allocated.
pub struct Lexer<'src, 'ast> {
    /// Low-level character cursor.
    cursor: Cursor<'src>,
    /// Arena for allocating token lexemes.
    arena: &'ast Bump,
    /// Lookahead buffer for peeking.
    lookahead: VecDeque<Token<'ast>>,
    /// Accumulated errors.
    errors: Vec<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            lookahead: VecDeque::with_capacity(4),
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    /// Check if any errors occurred.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'ast> {
        if let Some(token) = self.lookahead.pop_front() {
            return token;
        }
        self.scan_token()
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Token<'ast> {
        self.peek_nth(0)
    }

    /// Peek `n` tokens ahead (0 = next token).
    pub fn peek_nth(&mut self, n: usize) -> Token<'ast> {
        while self.lookahead.len() <= n {
            let token = self.scan_token();
            self.lookahead.push_back(token);
        }
        self.lookahead[n]
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token(&mut self) -> Token<'ast> {
        if let Err(error) = self.skip_trivia() {
            return self.make_error(error);
        }

        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();

        if self.cursor.is_eof() {
            return self.make_eof();
        }
        let Some(first) = self.cursor.peek() else {
            return self.make_eof();
        };

        match first {
            '"' | '\'' => self.scan_string(first, start_line, start_col, start_offset),
            c if c.is_ascii_digit() => self.scan_number(start_line, start_col, start_offset),
            '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(start_line, start_col, start_offset)
            }
            c if is_ident_start(c) => self.scan_identifier(start_line, start_col, start_offset),
            _ => self.scan_operator(start_line, start_col, start_offset),
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        if self.cursor.check_str("\u{FEFF}") {
            self.cursor.advance_bytes(3);
        }

        loop {
            match self.cursor.peek() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.advance();
                }
                Some('/') if self.cursor.check_str("//") => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                Some('/') if self.cursor.check_str("/*") => {
                    let span = Span::new(self.cursor.line(), self.cursor.column(), 2);
                    self.cursor.advance_bytes(2);
                    loop {
                        if self.cursor.check_str("*/") {
                            self.cursor.advance_bytes(2);
                            break;
                        }
                        if self.cursor.advance().is_none() {
                            return Err(LexError::UnterminatedComment { span });
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn make_eof(&self) -> Token<'ast> {
        let span = Span::point(self.cursor.line(), self.cursor.column());
        Token::new(TokenKind::Eof, "", span)
    }

    /// Create a token from start position to current position.
    fn make_token(
        &self,
        kind: TokenKind,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let text = self.cursor.slice_from(start_offset);
        let span = Span::new(start_line, start_col, text.len() as u32);
        Token::new(kind, self.arena.alloc_str(text), span)
    }

    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Scanning: Strings
    // =========================================

    fn scan_string(
        &mut self,
        quote: char,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        self.cursor.advance();

        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let len = self.cursor.offset() - start_offset;
                    return self.make_error(LexError::UnterminatedString {
                        span: Span::new(start_line, start_col, len),
                    });
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    return self.make_token(
                        TokenKind::StringLiteral,
                        start_line,
                        start_col,
                        start_offset,
                    );
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // =========================================
    // Scanning: Numbers
    // =========================================

    fn scan_number(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        if self.cursor.peek() == Some('0') && matches!(self.cursor.peek_nth(1), Some('x' | 'X')) {
            self.cursor.advance_bytes(2);
            let digits = self.cursor.eat_while(|c| c.is_ascii_hexdigit());
            if digits.is_empty() {
                let len = self.cursor.offset() - start_offset;
                return self.make_error(LexError::InvalidNumber {
                    span: Span::new(start_line, start_col, len),
                    detail: "expected hex digits after '0x'".to_string(),
                });
            }
            return self.make_token(TokenKind::IntLiteral, start_line, start_col, start_offset);
        }

        let mut is_float = false;
        self.cursor.eat_while(|c| c.is_ascii_digit());

        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
            is_float = true;
        }

        if let Some('e' | 'E') = self.cursor.peek() {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            let exponent = self.cursor.eat_while(|c| c.is_ascii_digit());
            if exponent.is_empty() {
                let len = self.cursor.offset() - start_offset;
                return self.make_error(LexError::InvalidNumber {
                    span: Span::new(start_line, start_col, len),
                    detail: "missing exponent digits".to_string(),
                });
            }
            is_float = true;
        }

        if self.cursor.peek().is_some_and(is_ident_start) {
            let len = self.cursor.offset() - start_offset + 1;
            return self.make_error(LexError::InvalidNumber {
                span: Span::new(start_line, start_col, len),
                detail: "identifier starts immediately after numeric literal".to_string(),
            });
        }

        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Identifiers and keywords
    // =========================================

    fn scan_identifier(
        &mut self,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        self.cursor.eat_while(is_ident_continue);
        let lexeme = self.cursor.slice_from(start_offset);
        let kind = lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Operators
    // =========================================

    fn scan_operator(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        use TokenKind::*;

        // Longest match first.
        const OPERATORS: &[(&str, TokenKind)] = &[
            (">>>", GreaterGreaterGreater),
            ("===", EqualEqualEqual),
            ("!==", BangEqualEqual),
            ("...", DotDotDot),
            ("<<", LessLess),
            (">>", GreaterGreater),
            ("<=", LessEqual),
            (">=", GreaterEqual),
            ("==", EqualEqual),
            ("!=", BangEqual),
            ("&&", AmpAmp),
            ("||", PipePipe),
            ("+", Plus),
            ("-", Minus),
            ("*", Star),
            ("/", Slash),
            ("%", Percent),
            ("&", Amp),
            ("|", Pipe),
            ("^", Caret),
            ("~", Tilde),
            ("!", Bang),
            ("<", Less),
            (">", Greater),
            ("=", Equal),
            ("?", Question),
            (":", Colon),
            ("(", LeftParen),
            (")", RightParen),
            ("[", LeftBracket),
            ("]", RightBracket),
            ("{", LeftBrace),
            ("}", RightBrace),
            (",", Comma),
            (";", Semicolon),
            (".", Dot),
        ];

        for (text, kind) in OPERATORS {
            if self.cursor.check_str(text) {
                self.cursor.advance_bytes(text.len());
                return self.make_token(*kind, start_line, start_col, start_offset);
            }
        }

        let ch = self.cursor.advance().unwrap_or('\0');
        self.make_error(LexError::UnexpectedChar {
            ch,
            span: Span::new(start_line, start_col, ch.len_utf8() as u32),
        })
    }
}

impl<'src, 'ast> Iterator for Lexer<'src, 'ast> {
    type Item = Token<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.is_eof() { None } else { Some(token) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let arena = Bump::new();
        Lexer::new(source, &arena).map(|t| t.kind).collect()
    }

    #[test]
    fn simple_module_header() {
        use TokenKind::*;
        assert_eq!(
            kinds("function m(stdlib, foreign, heap) { \"use asm\"; }"),
            vec![
                Function,
                Identifier,
                LeftParen,
                Identifier,
                Comma,
                Identifier,
                Comma,
                Identifier,
                RightParen,
                LeftBrace,
                StringLiteral,
                Semicolon,
                RightBrace,
            ]
        );
    }

    #[test]
    fn numeric_literal_kinds() {
        use TokenKind::*;
        assert_eq!(kinds("1 1.0 .5 1e3 0xff 4294967295"), vec![
            IntLiteral,
            FloatLiteral,
            FloatLiteral,
            FloatLiteral,
            IntLiteral,
            IntLiteral
        ]);
    }

    #[test]
    fn shift_operators_longest_match() {
        use TokenKind::*;
        assert_eq!(
            kinds("a >>> 0 >> 1 << 2"),
            vec![
                Identifier,
                GreaterGreaterGreater,
                IntLiteral,
                GreaterGreater,
                IntLiteral,
                LessLess,
                IntLiteral
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        use TokenKind::*;
        assert_eq!(kinds("a // line\n /* block\n */ b"), vec![Identifier, Identifier]);
    }

    #[test]
    fn unterminated_comment_is_error() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("a /* never closed", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert!(lexer.has_errors());
        assert!(matches!(
            lexer.take_errors()[0],
            LexError::UnterminatedComment { .. }
        ));
    }

    #[test]
    fn unexpected_character() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("#", &arena);
        assert_eq!(lexer.next_token().kind, TokenKind::Error);
        assert!(matches!(
            lexer.take_errors()[0],
            LexError::UnexpectedChar { ch: '#', .. }
        ));
    }

    #[test]
    fn peek_does_not_consume() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("loop: while", &arena);
        assert_eq!(lexer.peek_nth(1).kind, TokenKind::Colon);
        assert_eq!(lexer.peek().kind, TokenKind::Identifier);
        assert_eq!(lexer.next_token().lexeme, "loop");
        assert_eq!(lexer.next_token().kind, TokenKind::Colon);
        assert_eq!(lexer.next_token().kind, TokenKind::While);
    }

    #[test]
    fn spans_track_lines() {
        let arena = Bump::new();
        let mut lexer = Lexer::new("a\n  bb", &arena);
        lexer.next_token();
        let token = lexer.next_token();
        assert_eq!(token.span, Span::new(2, 3, 2));
    }
}
