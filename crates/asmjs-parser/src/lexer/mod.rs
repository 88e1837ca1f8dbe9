//! Lexical analysis for asm.js module source.

mod cursor;
mod lexer;
mod token;

pub use asmjs_core::Span;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
