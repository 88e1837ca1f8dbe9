//! Statement AST nodes.
//!
//! Provides nodes for all statement types including:
//! - Expression statements
//! - Variable declarations (`var` and `const`)
//! - Function declarations
//! - Control flow (if, while, do-while, for, switch)
//! - Jump statements (return, break, continue), optionally labelled
//! - Blocks

use asmjs_core::Span;

use crate::ast::Ident;
use crate::ast::expr::Expr;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Expression statement (expr;)
    Expr(ExprStmt<'ast>),
    /// Variable declaration
    VarDecl(VarDeclStmt<'ast>),
    /// Function declaration
    Function(&'ast FunctionDecl<'ast>),
    /// Return statement
    Return(ReturnStmt<'ast>),
    /// If statement
    If(&'ast IfStmt<'ast>),
    /// While loop
    While(&'ast WhileStmt<'ast>),
    /// Do-while loop
    DoWhile(&'ast DoWhileStmt<'ast>),
    /// For loop
    For(&'ast ForStmt<'ast>),
    /// Break statement
    Break(JumpStmt<'ast>),
    /// Continue statement
    Continue(JumpStmt<'ast>),
    /// Switch statement
    Switch(&'ast SwitchStmt<'ast>),
    /// Block statement
    Block(Block<'ast>),
    /// Labelled statement (`label: stmt`)
    Labeled(&'ast LabeledStmt<'ast>),
    /// Empty statement (`;`)
    Empty(Span),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(s) => s.span,
            Self::VarDecl(s) => s.span,
            Self::Function(s) => s.span,
            Self::Return(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::DoWhile(s) => s.span,
            Self::For(s) => s.span,
            Self::Break(s) => s.span,
            Self::Continue(s) => s.span,
            Self::Switch(s) => s.span,
            Self::Block(s) => s.span,
            Self::Labeled(s) => s.span,
            Self::Empty(span) => *span,
        }
    }
}

/// An expression statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    /// The expression
    pub expr: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// Declaration keyword of a variable statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// `var`
    Var,
    /// `const`
    Const,
}

/// A variable declaration statement.
///
/// Examples:
/// - `var x = 0;`
/// - `var x = 0, y = 0.0;`
/// - `const LIMIT = 100;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclStmt<'ast> {
    /// `var` or `const`
    pub kind: VarKind,
    /// Variable declarations (can be multiple)
    pub vars: &'ast [VarDeclarator<'ast>],
    /// Source location
    pub span: Span,
}

/// A single variable declarator within a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclarator<'ast> {
    /// Variable name
    pub name: Ident<'ast>,
    /// Optional initializer
    pub init: Option<&'ast Expr<'ast>>,
    /// Source location
    pub span: Span,
}

/// A function parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    /// Parameter name
    pub name: Ident<'ast>,
    /// Default value (`x = 1`)
    pub default: Option<&'ast Expr<'ast>>,
    /// Rest parameter (`...xs`)
    pub is_rest: bool,
    /// Source location
    pub span: Span,
}

/// A function declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    /// Function name, absent for anonymous functions
    pub name: Option<Ident<'ast>>,
    /// Parameters
    pub params: &'ast [Param<'ast>],
    /// Function body
    pub body: Block<'ast>,
    /// `function*`
    pub is_generator: bool,
    /// `async function`
    pub is_async: bool,
    /// Source location
    pub span: Span,
}

/// A return statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    /// Optional return value
    pub value: Option<&'ast Expr<'ast>>,
    /// Source location
    pub span: Span,
}

/// An if statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    /// Condition
    pub condition: &'ast Expr<'ast>,
    /// Then branch
    pub then_stmt: Stmt<'ast>,
    /// Optional else branch
    pub else_stmt: Option<Stmt<'ast>>,
    /// Source location
    pub span: Span,
}

/// A while loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    /// Loop condition
    pub condition: &'ast Expr<'ast>,
    /// Loop body
    pub body: Stmt<'ast>,
    /// Source location
    pub span: Span,
}

/// A do-while loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoWhileStmt<'ast> {
    /// Loop body
    pub body: Stmt<'ast>,
    /// Loop condition
    pub condition: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A for loop. Every header clause is optional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    /// Initializer expression
    pub init: Option<&'ast Expr<'ast>>,
    /// Loop condition
    pub condition: Option<&'ast Expr<'ast>>,
    /// Update expression
    pub update: Option<&'ast Expr<'ast>>,
    /// Loop body
    pub body: Stmt<'ast>,
    /// Source location
    pub span: Span,
}

/// A `break` or `continue`, with an optional target label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpStmt<'ast> {
    /// Target label
    pub label: Option<Ident<'ast>>,
    /// Source location
    pub span: Span,
}

/// A switch statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchStmt<'ast> {
    /// Scrutinee
    pub expr: &'ast Expr<'ast>,
    /// Case clauses in source order
    pub cases: &'ast [SwitchCase<'ast>],
    /// Source location
    pub span: Span,
}

/// A `case` or `default` clause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchCase<'ast> {
    /// Case value; `None` for `default`
    pub test: Option<&'ast Expr<'ast>>,
    /// Statements of the clause
    pub body: &'ast [Stmt<'ast>],
    /// Source location
    pub span: Span,
}

impl SwitchCase<'_> {
    /// Whether this is the `default` clause.
    pub fn is_default(&self) -> bool {
        self.test.is_none()
    }
}

/// A block of statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    /// Statements in the block
    pub stmts: &'ast [Stmt<'ast>],
    /// Source location
    pub span: Span,
}

/// A labelled statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledStmt<'ast> {
    /// Label
    pub label: Ident<'ast>,
    /// Labelled statement
    pub body: Stmt<'ast>,
    /// Source location
    pub span: Span,
}
