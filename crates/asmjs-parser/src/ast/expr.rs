//! Expression AST nodes.
//!
//! Provides nodes for all expression types asm.js modules use:
//! - Literals (numbers, strings, booleans)
//! - Binary and unary operations
//! - Postfix operations (call, index, member access)
//! - `new` expressions and array/object literals (module globals and exports)
//!
//! # Expression Precedence
//!
//! The parser uses Pratt parsing with the following precedence levels:
//! 1. Comma
//! 2. Assignment (=) - right associative
//! 3. Ternary (?:) - right associative
//! 4. Logical OR (||)
//! 5. Logical AND (&&)
//! 6. Bitwise OR (|)
//! 7. Bitwise XOR (^)
//! 8. Bitwise AND (&)
//! 9. Equality (==, !=, ===, !==)
//! 10. Relational (<, <=, >, >=)
//! 11. Bitwise shift (<<, >>, >>>)
//! 12. Additive (+, -)
//! 13. Multiplicative (*, /, %)
//! 14. Prefix unary (-, +, !, ~)
//! 15. Postfix (call, index, member)

use asmjs_core::Span;

use crate::ast::{BinaryOp, Ident, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value
    Literal(LiteralExpr<'ast>),
    /// Identifier reference
    Ident(Ident<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Assignment
    Assign(&'ast AssignExpr<'ast>),
    /// Ternary conditional (? :)
    Ternary(&'ast TernaryExpr<'ast>),
    /// Function call
    Call(&'ast CallExpr<'ast>),
    /// Indexing (`a[i]`)
    Index(&'ast IndexExpr<'ast>),
    /// Member access (`a.b`)
    Member(&'ast MemberExpr<'ast>),
    /// Constructor call (`new C(args)`)
    New(&'ast NewExpr<'ast>),
    /// Array literal (`[a, b]`)
    Array(ArrayExpr<'ast>),
    /// Object literal (`{ a: b }`)
    Object(ObjectExpr<'ast>),
    /// Comma sequence (`a, b`)
    Comma(&'ast CommaExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Ternary(e) => e.span,
            Self::Call(e) => e.span,
            Self::Index(e) => e.span,
            Self::Member(e) => e.span,
            Self::New(e) => e.span,
            Self::Array(e) => e.span,
            Self::Object(e) => e.span,
            Self::Comma(e) => e.span,
        }
    }

    /// The identifier if this expression is a bare name.
    pub fn as_ident(&self) -> Option<Ident<'ast>> {
        match self {
            Self::Ident(ident) => Some(*ident),
            _ => None,
        }
    }

    /// The literal if this expression is one.
    pub fn as_literal(&self) -> Option<LiteralExpr<'ast>> {
        match self {
            Self::Literal(lit) => Some(*lit),
            _ => None,
        }
    }

    /// Whether this expression is a numeric literal.
    pub fn is_numeric_literal(&self) -> bool {
        matches!(
            self,
            Self::Literal(LiteralExpr {
                kind: LiteralKind::Int(_) | LiteralKind::Float { .. },
                ..
            })
        )
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Integer literal that fits a signed 32-bit integer.
    Int(i32),
    /// Any other numeric literal.
    ///
    /// `maybe_int` marks integer-syntax literals outside the i32 range
    /// (`4294967295`, `0x80000000`, `-2147483648`).
    Float { value: f64, maybe_int: bool },
    /// Boolean literal
    Bool(bool),
    /// String literal, without quotes
    Str(&'ast str),
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Left operand
    pub left: &'ast Expr<'ast>,
    /// Operator
    pub op: BinaryOp,
    /// Right operand
    pub right: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    /// Operator
    pub op: UnaryOp,
    /// Operand
    pub operand: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// An assignment (`target = value`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    /// Assignment target
    pub target: &'ast Expr<'ast>,
    /// Value being assigned
    pub value: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A ternary conditional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TernaryExpr<'ast> {
    /// Condition
    pub condition: &'ast Expr<'ast>,
    /// Value if true
    pub then_expr: &'ast Expr<'ast>,
    /// Value if false
    pub else_expr: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A function call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    /// Callee expression
    pub callee: &'ast Expr<'ast>,
    /// Arguments
    pub args: &'ast [&'ast Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// An index expression (`object[index]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    /// Indexed object
    pub object: &'ast Expr<'ast>,
    /// Index
    pub index: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A member access (`object.member`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    /// Object being accessed
    pub object: &'ast Expr<'ast>,
    /// Member name
    pub member: Ident<'ast>,
    /// Source location
    pub span: Span,
}

/// A constructor call (`new callee(args)`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    /// Constructor expression
    pub callee: &'ast Expr<'ast>,
    /// Arguments
    pub args: &'ast [&'ast Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// An array literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayExpr<'ast> {
    /// Elements
    pub elements: &'ast [&'ast Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// An object literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectExpr<'ast> {
    /// Properties in source order
    pub properties: &'ast [Property<'ast>],
    /// Source location
    pub span: Span,
}

/// A `key: value` entry of an object literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Property<'ast> {
    /// Property name (identifier or string key)
    pub key: Ident<'ast>,
    /// Property value
    pub value: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A comma sequence; evaluates every expression and yields the last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommaExpr<'ast> {
    /// Expressions in evaluation order
    pub exprs: &'ast [&'ast Expr<'ast>],
    /// Source location
    pub span: Span,
}
