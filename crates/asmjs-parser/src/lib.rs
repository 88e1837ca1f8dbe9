//! asm.js Parser crate.
//!
//! This crate provides the lexer and parser for asm.js module source code.
//! It includes:
//! - Lexical analysis (tokenization)
//! - Abstract Syntax Tree (AST) definitions
//! - Parser for transforming tokens into AST
//!
//! # Example
//!
//! ```
//! use asmjs_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let program = Parser::parse("function M() { \"use asm\"; return {}; }", &arena).unwrap();
//! assert_eq!(program.items().len(), 1);
//! ```

// Lexer module
pub mod lexer;

// AST module
pub mod ast;

// Re-export commonly used types at crate root
pub use ast::{Parser, Program};
pub use lexer::{Lexer, Span, Token, TokenKind};
