//! Token definitions for the asm.js source subset.

use std::fmt;

use asmjs_core::Span;

/// A lexical token with its kind, source text, and location.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    /// The type of token.
    pub kind: TokenKind,
    /// The source text of this token (allocated in arena).
    pub lexeme: &'ast str,
    /// Location in source.
    pub span: Span,
}

impl<'ast> Token<'ast> {
    /// Create a new token.
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    /// Whether this token is the end-of-file marker.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token types of the JavaScript subset asm.js modules are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// Integer literal without fraction or exponent: `42`, `0xff`
    IntLiteral,
    /// Numeric literal written with a fraction or exponent: `1.0`, `1e3`
    FloatLiteral,
    /// String literal: `"use asm"`, `'a'`
    StringLiteral,

    /// User-defined identifier
    Identifier,

    // =========================================
    // Keywords
    // =========================================
    /// `function`
    Function,
    /// `var`
    Var,
    /// `const`
    Const,
    /// `return`
    Return,
    /// `if`
    If,
    /// `else`
    Else,
    /// `while`
    While,
    /// `do`
    Do,
    /// `for`
    For,
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `switch`
    Switch,
    /// `case`
    Case,
    /// `default`
    Default,
    /// `new`
    New,
    /// `true`
    True,
    /// `false`
    False,
    /// `async`
    Async,

    // =========================================
    // Operators
    // =========================================
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `~`
    Tilde,
    /// `!`
    Bang,
    /// `<<`
    LessLess,
    /// `>>`
    GreaterGreater,
    /// `>>>`
    GreaterGreaterGreater,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `===`
    EqualEqualEqual,
    /// `!==`
    BangEqualEqual,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `=`
    Equal,
    /// `?`
    Question,
    /// `:`
    Colon,

    // =========================================
    // Punctuation
    // =========================================
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `...`
    DotDotDot,

    /// End of input
    Eof,
    /// Lexical error placeholder; the error itself is recorded by the lexer.
    Error,
}

impl TokenKind {
    /// Human-readable description for diagnostics.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral => "integer literal",
            FloatLiteral => "float literal",
            StringLiteral => "string literal",
            Identifier => "identifier",
            Function => "'function'",
            Var => "'var'",
            Const => "'const'",
            Return => "'return'",
            If => "'if'",
            Else => "'else'",
            While => "'while'",
            Do => "'do'",
            For => "'for'",
            Break => "'break'",
            Continue => "'continue'",
            Switch => "'switch'",
            Case => "'case'",
            Default => "'default'",
            New => "'new'",
            True => "'true'",
            False => "'false'",
            Async => "'async'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            Amp => "'&'",
            Pipe => "'|'",
            Caret => "'^'",
            Tilde => "'~'",
            Bang => "'!'",
            LessLess => "'<<'",
            GreaterGreater => "'>>'",
            GreaterGreaterGreater => "'>>>'",
            Less => "'<'",
            LessEqual => "'<='",
            Greater => "'>'",
            GreaterEqual => "'>='",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            EqualEqualEqual => "'==='",
            BangEqualEqual => "'!=='",
            AmpAmp => "'&&'",
            PipePipe => "'||'",
            Equal => "'='",
            Question => "'?'",
            Colon => "':'",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            Comma => "','",
            Semicolon => "';'",
            Dot => "'.'",
            DotDotDot => "'...'",
            Eof => "end of file",
            Error => "invalid token",
        }
    }

    /// Whether this token is a keyword that may still be used as a property name.
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Function
                | Var
                | Const
                | Return
                | If
                | Else
                | While
                | Do
                | For
                | Break
                | Continue
                | Switch
                | Case
                | Default
                | New
                | True
                | False
                | Async
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Map a keyword string to its [`TokenKind`], or `None` if not a keyword.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "function" => Function,
        "var" => Var,
        "const" => Const,
        "return" => Return,
        "if" => If,
        "else" => Else,
        "while" => While,
        "do" => Do,
        "for" => For,
        "break" => Break,
        "continue" => Continue,
        "switch" => Switch,
        "case" => Case,
        "default" => Default,
        "new" => New,
        "true" => True,
        "false" => False,
        "async" => Async,
        _ => return None,
    })
}
