//! Coercion annotations.
//!
//! asm.js fixes storage types through a handful of syntactic patterns. The
//! shape of a pattern is recognized here; whether a call pattern names
//! `fround` or a SIMD `check` needs symbol information and is decided by the
//! caller.

use asmjs_parser::ast::{BinaryOp, Expr, Ident, LiteralKind, UnaryOp};

use super::{AsmType, SimdType, StorageType};

/// A resolved coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// `+x`
    ToNumber,
    /// `x|0`
    ToInt32,
    /// `fround(x)`
    Fround,
    /// `T.check(x)`
    SimdCheck(SimdType),
}

impl Coercion {
    pub fn asm_type(self) -> AsmType {
        match self {
            Coercion::ToNumber => AsmType::Double,
            Coercion::ToInt32 => AsmType::Signed,
            Coercion::Fround => AsmType::Float,
            Coercion::SimdCheck(ty) => AsmType::Simd(ty),
        }
    }

    pub fn storage_type(self) -> StorageType {
        match self {
            Coercion::ToNumber => StorageType::Double,
            Coercion::ToInt32 => StorageType::Int,
            Coercion::Fround => StorageType::Float,
            Coercion::SimdCheck(ty) => StorageType::Simd(ty),
        }
    }
}

/// The syntactic shape of a coercion, before the callee is resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyntacticCoercion<'ast> {
    /// `+operand`
    ToNumber(&'ast Expr<'ast>),
    /// `operand|0`
    ToInt32(&'ast Expr<'ast>),
    /// `callee(operand)`
    Call {
        callee: Ident<'ast>,
        operand: &'ast Expr<'ast>,
    },
}

impl<'ast> SyntacticCoercion<'ast> {
    /// Match `expr` against the three coercion shapes.
    pub fn of(expr: &Expr<'ast>) -> Option<Self> {
        match *expr {
            Expr::Unary(unary) if unary.op == UnaryOp::Plus => {
                Some(SyntacticCoercion::ToNumber(unary.operand))
            }
            Expr::Binary(binary)
                if binary.op == BinaryOp::BitwiseOr
                    && matches!(
                        binary.right.as_literal().map(|lit| lit.kind),
                        Some(LiteralKind::Int(0))
                    ) =>
            {
                Some(SyntacticCoercion::ToInt32(binary.left))
            }
            Expr::Call(call) if call.args.len() == 1 => {
                call.callee.as_ident().map(|callee| SyntacticCoercion::Call {
                    callee,
                    operand: call.args[0],
                })
            }
            _ => None,
        }
    }

    /// The expression being coerced.
    pub fn operand(&self) -> &'ast Expr<'ast> {
        match *self {
            SyntacticCoercion::ToNumber(operand)
            | SyntacticCoercion::ToInt32(operand)
            | SyntacticCoercion::Call { operand, .. } => operand,
        }
    }
}
