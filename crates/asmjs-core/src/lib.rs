//! Shared types for the asm.js validating compiler.
//!
//! Holds the pieces every other crate in the workspace depends on: source
//! [`Span`]s and the error taxonomy.

mod error;
mod span;

pub use error::{
    AsmJsError, CompilationError, ErrorCategory, LexError, ParseError, ParseErrorKind, ParseErrors,
};
pub use span::Span;
