//! Operator definitions for asm.js expressions.
//!
//! Provides enums for binary and unary operators along with precedence
//! information for the Pratt parser.

use std::fmt;

use crate::lexer::TokenKind;

/// Binary operators.
///
/// Organized by precedence from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Logical OR (precedence 3)
    /// `||`
    LogicalOr,

    // Logical AND (precedence 4)
    /// `&&`
    LogicalAnd,

    // Bitwise OR (precedence 5)
    /// `|`
    BitwiseOr,

    // Bitwise XOR (precedence 6)
    /// `^`
    BitwiseXor,

    // Bitwise AND (precedence 7)
    /// `&`
    BitwiseAnd,

    // Equality (precedence 8)
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `===`
    StrictEqual,
    /// `!==`
    StrictNotEqual,

    // Relational (precedence 9)
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,

    // Bitwise shift (precedence 10)
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `>>>`
    ShiftRightUnsigned,

    // Additive (precedence 11)
    /// `+`
    Add,
    /// `-`
    Sub,

    // Multiplicative (precedence 12)
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    /// Get the binding power (precedence) for this operator.
    ///
    /// Higher values bind more tightly. Returns (left_bp, right_bp).
    /// All binary operators here are left-associative: right_bp = left_bp + 1.
    pub fn binding_power(&self) -> (u8, u8) {
        use BinaryOp::*;
        match self {
            LogicalOr => (3, 4),
            LogicalAnd => (5, 6),
            BitwiseOr => (7, 8),
            BitwiseXor => (9, 10),
            BitwiseAnd => (11, 12),
            Equal | NotEqual | StrictEqual | StrictNotEqual => (13, 14),
            Less | LessEqual | Greater | GreaterEqual => (15, 16),
            ShiftLeft | ShiftRight | ShiftRightUnsigned => (17, 18),
            Add | Sub => (19, 20),
            Mul | Div | Mod => (21, 22),
        }
    }

    /// Try to convert a token kind to a binary operator.
    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;

        Some(match token {
            PipePipe => BinaryOp::LogicalOr,
            AmpAmp => BinaryOp::LogicalAnd,
            Pipe => BinaryOp::BitwiseOr,
            Caret => BinaryOp::BitwiseXor,
            Amp => BinaryOp::BitwiseAnd,
            EqualEqual => BinaryOp::Equal,
            BangEqual => BinaryOp::NotEqual,
            EqualEqualEqual => BinaryOp::StrictEqual,
            BangEqualEqual => BinaryOp::StrictNotEqual,
            Less => BinaryOp::Less,
            LessEqual => BinaryOp::LessEqual,
            Greater => BinaryOp::Greater,
            GreaterEqual => BinaryOp::GreaterEqual,
            LessLess => BinaryOp::ShiftLeft,
            GreaterGreater => BinaryOp::ShiftRight,
            GreaterGreaterGreater => BinaryOp::ShiftRightUnsigned,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            Percent => BinaryOp::Mod,
            _ => return None,
        })
    }

    /// Check if this operator is comparison-related.
    pub fn is_comparison(&self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            Equal
                | NotEqual
                | StrictEqual
                | StrictNotEqual
                | Less
                | LessEqual
                | Greater
                | GreaterEqual
        )
    }

    /// Check if this operator is a bitwise or shift operator.
    pub fn is_bitwise(&self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            BitwiseOr | BitwiseXor | BitwiseAnd | ShiftLeft | ShiftRight | ShiftRightUnsigned
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOp::*;
        let s = match self {
            LogicalOr => "||",
            LogicalAnd => "&&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            BitwiseAnd => "&",
            Equal => "==",
            NotEqual => "!=",
            StrictEqual => "===",
            StrictNotEqual => "!==",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            ShiftRightUnsigned => ">>>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
        };
        write!(f, "{}", s)
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-` negation
    Neg,
    /// `+` plus (ToNumber)
    Plus,
    /// `!` logical NOT
    LogicalNot,
    /// `~` bitwise NOT
    BitwiseNot,
}

impl UnaryOp {
    /// Get the binding power for prefix operators.
    pub fn binding_power() -> u8 {
        25 // Higher than all binary operators
    }

    /// Try to convert a token kind to a unary operator.
    pub fn from_token(token: TokenKind) -> Option<Self> {
        use TokenKind::*;

        Some(match token {
            Minus => UnaryOp::Neg,
            Plus => UnaryOp::Plus,
            Bang => UnaryOp::LogicalNot,
            Tilde => UnaryOp::BitwiseNot,
            _ => return None,
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use UnaryOp::*;
        let s = match self {
            Neg => "-",
            Plus => "+",
            LogicalNot => "!",
            BitwiseNot => "~",
        };
        write!(f, "{}", s)
    }
}

/// Assignment binding power: right-associative, below the ternary.
pub const ASSIGN_BINDING_POWER: (u8, u8) = (2, 1);

/// Binding power of calls, indexing and member access.
pub const POSTFIX_BINDING_POWER: u8 = 27;
