//! Unified error types for asm.js validation.
//!
//! Every phase reports failures with a [`Span`] pointing at the offending
//! source text.
//!
//! ## Error Hierarchy
//!
//! ```text
//! AsmJsError (top-level wrapper)
//! ├── LexError          - tokenization errors
//! ├── ParseErrors       - one or more parser errors (with ParseErrorKind)
//! └── CompilationError  - validation failures, one variant per category
//!     ├── Structure          - construct does not match a recognized shape
//!     ├── TypeMismatch       - inferred type is not a subtype of the required type
//!     ├── SignatureConflict  - call/table/return incompatible with a fixed signature
//!     ├── OutOfRange         - literal outside the legal range for its use
//!     ├── Link               - missing symbol or undefined function table
//!     └── Internal           - compiler invariant violated
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use asmjs_core::{AsmJsError, CompilationError, Span};
//!
//! fn validate(source: &str) -> Result<(), AsmJsError> {
//!     let program = parse(source)?;   // ParseErrors -> AsmJsError
//!     compile(&program)?;             // CompilationError -> AsmJsError
//!     Ok(())
//! }
//! ```

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during lexical analysis (tokenization).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// An unexpected character was encountered.
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    /// A string literal was not properly terminated.
    #[error("unterminated string at {span}")]
    UnterminatedString { span: Span },

    /// A block comment was not properly terminated.
    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    /// A numeric literal could not be parsed.
    #[error("invalid number at {span}: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::UnterminatedComment { span } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An unexpected token was encountered.
    UnexpectedToken,
    /// Unexpected end of file.
    UnexpectedEof,
    /// An expression was expected.
    ExpectedExpression,
    /// A statement was expected.
    ExpectedStatement,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// The assignment target is not a name, index or member expression.
    InvalidAssignmentTarget,
    /// The source does not contain a single module function.
    InvalidModule,
    /// A lexer error surfaced while parsing.
    InvalidToken,
    /// A literal value could not be parsed.
    InvalidLiteral,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedStatement => "expected statement",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::InvalidAssignmentTarget => "invalid assignment target",
            ParseErrorKind::InvalidModule => "invalid module",
            ParseErrorKind::InvalidToken => "invalid token",
            ParseErrorKind::InvalidLiteral => "invalid literal",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an "expected token" error.
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    /// Create an "unexpected token" error.
    pub fn unexpected_token(span: Span, token: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            span,
            format!("unexpected token: {token}"),
        )
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(ParseErrorKind::UnexpectedEof, span, "unexpected end of file")
    }

    /// Create an "expected identifier" error.
    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    /// Create an "expected expression" error.
    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedExpression,
            span,
            format!("expected expression, found {found}"),
        )
    }

    /// Format the error with source context for display.
    ///
    /// Renders the offending source line with a caret under the span.
    pub fn display_with_source(&self, source: &str) -> String {
        render_with_source(source, self.span, self.kind.as_str(), &self.message)
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        ParseError::new(ParseErrorKind::InvalidToken, error.span(), error.to_string())
    }
}

/// A collection of parse errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    /// Create a new empty error collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    /// The first recorded error, if any.
    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    /// Convert to a Vec of errors.
    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Compilation Errors
// ============================================================================

/// The five failure categories of asm.js validation, plus internal faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A construct does not match one of the fixed recognized shapes.
    Structure,
    /// An expression's type is not a subtype of the type its context requires.
    Type,
    /// A call, table or return is incompatible with an already-fixed signature.
    Signature,
    /// A literal lies outside the legal range for its use.
    Range,
    /// A referenced symbol does not exist or a table is never defined.
    Link,
    /// A compiler invariant was violated.
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable name for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Structure => "structure error",
            ErrorCategory::Type => "type error",
            ErrorCategory::Signature => "signature conflict",
            ErrorCategory::Range => "range error",
            ErrorCategory::Link => "link error",
            ErrorCategory::Internal => "internal error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised while validating and lowering an asm.js module.
///
/// Any of these aborts the function being compiled, and with it the whole
/// module.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// A construct does not match a recognized syntactic shape.
    #[error("at {span}: {message}")]
    Structure { message: String, span: Span },

    /// An expression has a type incompatible with its context.
    #[error("at {span}: {message}")]
    TypeMismatch { message: String, span: Span },

    /// A call, table entry or return conflicts with a fixed signature.
    #[error("at {span}: {message}")]
    SignatureConflict { message: String, span: Span },

    /// A literal (lane index, shift amount, table size, address) is out of range.
    #[error("at {span}: {message}")]
    OutOfRange { message: String, span: Span },

    /// A symbol is missing or a function table is never defined.
    #[error("at {span}: {message}")]
    Link { message: String, span: Span },

    /// Internal compiler error (should not happen).
    #[error("at {span}: internal compiler error: {message}")]
    Internal { message: String, span: Span },
}

impl CompilationError {
    /// Create a structural error.
    pub fn structure(span: Span, message: impl Into<String>) -> Self {
        CompilationError::Structure {
            message: message.into(),
            span,
        }
    }

    /// Create a type error.
    pub fn type_mismatch(span: Span, message: impl Into<String>) -> Self {
        CompilationError::TypeMismatch {
            message: message.into(),
            span,
        }
    }

    /// Create a signature conflict error.
    pub fn signature(span: Span, message: impl Into<String>) -> Self {
        CompilationError::SignatureConflict {
            message: message.into(),
            span,
        }
    }

    /// Create a range error.
    pub fn out_of_range(span: Span, message: impl Into<String>) -> Self {
        CompilationError::OutOfRange {
            message: message.into(),
            span,
        }
    }

    /// Create a link error.
    pub fn link(span: Span, message: impl Into<String>) -> Self {
        CompilationError::Link {
            message: message.into(),
            span,
        }
    }

    /// Create an internal error.
    pub fn internal(span: Span, message: impl Into<String>) -> Self {
        CompilationError::Internal {
            message: message.into(),
            span,
        }
    }

    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::Structure { span, .. }
            | CompilationError::TypeMismatch { span, .. }
            | CompilationError::SignatureConflict { span, .. }
            | CompilationError::OutOfRange { span, .. }
            | CompilationError::Link { span, .. }
            | CompilationError::Internal { span, .. } => *span,
        }
    }

    /// Get the bare message, without location.
    pub fn message(&self) -> &str {
        match self {
            CompilationError::Structure { message, .. }
            | CompilationError::TypeMismatch { message, .. }
            | CompilationError::SignatureConflict { message, .. }
            | CompilationError::OutOfRange { message, .. }
            | CompilationError::Link { message, .. }
            | CompilationError::Internal { message, .. } => message,
        }
    }

    /// The failure category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompilationError::Structure { .. } => ErrorCategory::Structure,
            CompilationError::TypeMismatch { .. } => ErrorCategory::Type,
            CompilationError::SignatureConflict { .. } => ErrorCategory::Signature,
            CompilationError::OutOfRange { .. } => ErrorCategory::Range,
            CompilationError::Link { .. } => ErrorCategory::Link,
            CompilationError::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Format the error with source context for display.
    pub fn display_with_source(&self, source: &str) -> String {
        render_with_source(source, self.span(), self.category().as_str(), self.message())
    }
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Any error produced while turning asm.js source into a compiled module.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AsmJsError {
    /// One or more parse errors.
    #[error(transparent)]
    Parse(#[from] ParseErrors),

    /// A validation failure.
    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

impl AsmJsError {
    /// Check if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, AsmJsError::Parse(_))
    }

    /// Check if this is a compilation error.
    pub fn is_compilation(&self) -> bool {
        matches!(self, AsmJsError::Compilation(_))
    }

    /// The compilation error, if this is one.
    pub fn as_compilation(&self) -> Option<&CompilationError> {
        match self {
            AsmJsError::Compilation(err) => Some(err),
            AsmJsError::Parse(_) => None,
        }
    }
}

impl From<ParseError> for AsmJsError {
    fn from(error: ParseError) -> Self {
        AsmJsError::Parse(error.into())
    }
}

fn render_with_source(source: &str, span: Span, kind: &str, message: &str) -> String {
    let mut output = format!("Error at {}:{}: {}\n", span.line, span.col, kind);

    if !message.is_empty() {
        output.push_str(&format!("  {}\n", message));
    }

    if let Some(line_text) = span
        .line
        .checked_sub(1)
        .and_then(|idx| source.lines().nth(idx as usize))
    {
        output.push_str("  |\n");
        output.push_str(&format!("{:>3} | {}\n", span.line, line_text));

        let indent = " ".repeat(span.col.saturating_sub(1) as usize);
        let pointer = if span.len <= 1 {
            "^".to_string()
        } else {
            "^".to_string() + &"~".repeat((span.len - 1) as usize)
        };
        output.push_str(&format!("  | {}{}\n", indent, pointer));
    }

    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::UnexpectedChar {
            ch: '@',
            span: Span::new(1, 5, 1),
        };
        assert_eq!(format!("{err}"), "unexpected character '@' at 1:5");
    }

    #[test]
    fn lex_error_converts_to_parse_error() {
        let err: ParseError = LexError::UnterminatedComment {
            span: Span::new(2, 1, 2),
        }
        .into();
        assert_eq!(err.kind, ParseErrorKind::InvalidToken);
        assert_eq!(err.span, Span::new(2, 1, 2));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::expected_token(Span::new(1, 3, 1), "';'", "'}'");
        assert_eq!(format!("{err}"), "expected token at 1:3: expected ';', found '}'");
    }

    #[test]
    fn parse_errors_display_joins_lines() {
        let mut errors = ParseErrors::new();
        errors.push(ParseError::unexpected_eof(Span::point(1, 1)));
        errors.push(ParseError::unexpected_eof(Span::point(2, 1)));
        assert_eq!(errors.len(), 2);
        assert_eq!(format!("{errors}").lines().count(), 2);
    }

    #[test]
    fn compilation_error_category() {
        let err = CompilationError::signature(Span::new(4, 2, 1), "Function f doesn't support arguments");
        assert_eq!(err.category(), ErrorCategory::Signature);
        assert_eq!(err.span(), Span::new(4, 2, 1));
        assert_eq!(err.message(), "Function f doesn't support arguments");
        assert_eq!(format!("{err}"), "at 4:2: Function f doesn't support arguments");
    }

    #[test]
    fn compilation_error_display_with_source() {
        let source = "function m() {\n  x = 1;\n}";
        let err = CompilationError::link(Span::new(2, 3, 1), "Undefined identifier x");
        let rendered = err.display_with_source(source);
        assert!(rendered.contains("link error"));
        assert!(rendered.contains("  2 |   x = 1;"));
        assert!(rendered.contains("|   ^"));
    }

    #[test]
    fn top_level_error_wraps() {
        let err: AsmJsError = CompilationError::out_of_range(Span::default(), "lane").into();
        assert!(err.is_compilation());
        assert!(!err.is_parse());
        assert!(err.as_compilation().is_some());

        let err: AsmJsError = ParseError::unexpected_eof(Span::default()).into();
        assert!(err.is_parse());
    }
}
