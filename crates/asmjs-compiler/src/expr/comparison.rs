//! Relational and equality operators.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{BinaryExpr, BinaryOp};

use crate::bytecode::OpCode;
use crate::expr_info::ExprInfo;
use crate::function::FunctionCompiler;
use crate::types::AsmType;

use super::Result;

/// Operand family of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Unsigned,
    Signed,
    Double,
    Float,
}

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// Both operands must be signed, unsigned, double or float alike. The
    /// result is always `int`.
    pub(super) fn compile_comparison(&mut self, binary: &BinaryExpr<'ast>) -> Result<ExprInfo> {
        let lhs = self.compile_expr(binary.left)?;
        let rhs = self.compile_expr(binary.right)?;

        let family = if lhs.ty.is_unsigned() && rhs.ty.is_unsigned() {
            Family::Unsigned
        } else if lhs.ty.is_signed() && rhs.ty.is_signed() {
            Family::Signed
        } else if lhs.ty.is_double() && rhs.ty.is_double() {
            Family::Double
        } else if lhs.ty.is_float() && rhs.ty.is_float() {
            Family::Float
        } else {
            return Err(CompilationError::type_mismatch(
                binary.span,
                format!(
                    "Operands to {} must both be signed, unsigned, double or float; \
                     got {} and {}",
                    binary.op, lhs.ty, rhs.ty
                ),
            ));
        };

        let Some(op) = comparison_op(binary.op, family) else {
            return Err(CompilationError::internal(
                binary.span,
                format!("{} is not a comparison", binary.op),
            ));
        };
        Ok(self.emit_binary_op(op, AsmType::Int, lhs, rhs))
    }
}

fn comparison_op(op: BinaryOp, family: Family) -> Option<OpCode> {
    use OpCode::*;
    // Equality ignores signedness.
    let family = match (op, family) {
        (BinaryOp::Equal | BinaryOp::NotEqual, Family::Unsigned) => Family::Signed,
        _ => family,
    };
    Some(match (family, op) {
        (Family::Signed, BinaryOp::Equal) => CmEqInt,
        (Family::Signed, BinaryOp::NotEqual) => CmNeInt,
        (Family::Signed, BinaryOp::Less) => CmLtInt,
        (Family::Signed, BinaryOp::LessEqual) => CmLeInt,
        (Family::Signed, BinaryOp::Greater) => CmGtInt,
        (Family::Signed, BinaryOp::GreaterEqual) => CmGeInt,
        (Family::Unsigned, BinaryOp::Less) => CmLtUInt,
        (Family::Unsigned, BinaryOp::LessEqual) => CmLeUInt,
        (Family::Unsigned, BinaryOp::Greater) => CmGtUInt,
        (Family::Unsigned, BinaryOp::GreaterEqual) => CmGeUInt,
        (Family::Double, BinaryOp::Equal) => CmEqDb,
        (Family::Double, BinaryOp::NotEqual) => CmNeDb,
        (Family::Double, BinaryOp::Less) => CmLtDb,
        (Family::Double, BinaryOp::LessEqual) => CmLeDb,
        (Family::Double, BinaryOp::Greater) => CmGtDb,
        (Family::Double, BinaryOp::GreaterEqual) => CmGeDb,
        (Family::Float, BinaryOp::Equal) => CmEqFlt,
        (Family::Float, BinaryOp::NotEqual) => CmNeFlt,
        (Family::Float, BinaryOp::Less) => CmLtFlt,
        (Family::Float, BinaryOp::LessEqual) => CmLeFlt,
        (Family::Float, BinaryOp::Greater) => CmGtFlt,
        (Family::Float, BinaryOp::GreaterEqual) => CmGeFlt,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{compile_body, compile_body_err};

    #[test]
    fn fixnum_literals_compare_unsigned() {
        let module = compile_body("function f() { return (1 < 2)|0; }");
        module.functions[0].chunk.assert_contains_opcodes(&[OpCode::CmLtUInt]);
    }

    #[test]
    fn signed_and_double_comparisons() {
        let module = compile_body(
            "function f(i, x) { i = i|0; x = +x; return ((i|0) < 3 | x >= 1.0)|0; }",
        );
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::CmLtInt, OpCode::CmGeDb, OpCode::OrInt]);
    }

    #[test]
    fn unsigned_equality_uses_int_compare() {
        assert_eq!(
            comparison_op(BinaryOp::Equal, Family::Unsigned),
            Some(OpCode::CmEqInt)
        );
        assert_eq!(
            comparison_op(BinaryOp::Greater, Family::Unsigned),
            Some(OpCode::CmGtUInt)
        );
    }

    #[test]
    fn mixed_signedness_is_rejected() {
        let err = compile_body_err(
            "function f(i) { i = i|0; return ((i|0) < (i>>>0))|0; }",
        );
        assert!(err.message().contains("Operands to <"));
    }

    #[test]
    fn int_argument_must_be_coerced() {
        // `int` is neither signed nor unsigned.
        let err = compile_body_err("function f(i) { i = i|0; return (i < 3)|0; }");
        assert!(err.message().contains("got int"));
    }
}
