//! Abstract Syntax Tree (AST) for asm.js modules.
//!
//! This module provides:
//! - AST node definitions for the JavaScript subset asm.js is written in
//! - Parser for transforming tokens into AST
//!
//! # Example
//!
//! ```
//! use asmjs_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     function Module(stdlib, foreign, heap) {
//!         "use asm";
//!         function add(a, b) { a = a|0; b = b|0; return (a + b)|0; }
//!         return add;
//!     }
//! "#;
//!
//! match Parser::parse(source, &arena) {
//!     Ok(program) => println!("Parsed successfully: {} items", program.items().len()),
//!     Err(errors) => eprintln!("Parse errors: {}", errors),
//! }
//! ```

use std::fmt;

use asmjs_core::Span;

pub mod ops;

mod parser;

pub mod expr;
mod expr_parser;

pub mod stmt;
mod stmt_parser;

// Re-export error types from core
pub use asmjs_core::{ParseError, ParseErrorKind, ParseErrors};

pub use expr::*;
pub use ops::*;
pub use parser::Parser;
pub use stmt::*;

/// An identifier with its source location.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident<'ast> {
    /// The identifier text (arena allocated)
    pub name: &'ast str,
    /// Source location
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    /// Create a new identifier.
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

impl fmt::Debug for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({:?} @ {:?})", self.name, self.span)
    }
}

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A parsed program.
///
/// The program borrows from an arena allocator. All AST nodes are allocated
/// in the arena and remain valid for the lifetime of the arena.
#[derive(Debug, Clone, Copy)]
pub struct Program<'ast> {
    items: &'ast [Stmt<'ast>],
    span: Span,
}

impl<'ast> Program<'ast> {
    /// Create a new program from parsed items.
    pub(crate) fn new(items: &'ast [Stmt<'ast>], span: Span) -> Self {
        Self { items, span }
    }

    /// Get the top-level statements in this program.
    pub fn items(&self) -> &'ast [Stmt<'ast>] {
        self.items
    }

    /// Get the source location span of this program.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Top-level function declarations, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &'ast FunctionDecl<'ast>> {
        self.items.iter().filter_map(|item| match item {
            Stmt::Function(func) => Some(*func),
            _ => None,
        })
    }
}
