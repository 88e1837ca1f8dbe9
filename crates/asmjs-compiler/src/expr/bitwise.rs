//! Bitwise operators and the `|0` coercion.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{BinaryExpr, BinaryOp, LiteralKind};

use crate::bytecode::OpCode;
use crate::expr_info::ExprInfo;
use crate::function::FunctionCompiler;
use crate::types::{AsmType, ReturnType};

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// `|`, `^`, `&`, `<<`, `>>` and `>>>`.
    ///
    /// `f(...)|0` types the call as `signed`. With a literal `0` on the right,
    /// every operator but `&` is the identity on int32 and only retypes its
    /// left operand.
    pub(super) fn compile_bitwise(&mut self, binary: &BinaryExpr<'ast>) -> Result<ExprInfo> {
        let zero_rhs = matches!(
            binary.right.as_literal().map(|lit| lit.kind),
            Some(LiteralKind::Int(0))
        );
        let result_ty = if binary.op == BinaryOp::ShiftRightUnsigned {
            AsmType::Unsigned
        } else {
            AsmType::Signed
        };

        if binary.op == BinaryOp::BitwiseOr
            && zero_rhs
            && let Some(call) = self.user_call(binary.left)
        {
            return self.compile_call(call, ReturnType::Signed);
        }

        let lhs = self.compile_expr(binary.left)?;
        let rhs = self.compile_expr(binary.right)?;
        if !lhs.ty.is_intish() || !rhs.ty.is_intish() {
            return Err(CompilationError::type_mismatch(
                binary.span,
                format!(
                    "Operands to {} must be intish; got {} and {}",
                    binary.op, lhs.ty, rhs.ty
                ),
            ));
        }

        if zero_rhs && binary.op != BinaryOp::BitwiseAnd {
            self.release(rhs);
            return Ok(lhs.with_type(result_ty));
        }

        let op = match binary.op {
            BinaryOp::BitwiseOr => OpCode::OrInt,
            BinaryOp::BitwiseXor => OpCode::XorInt,
            BinaryOp::BitwiseAnd => OpCode::AndInt,
            BinaryOp::ShiftLeft => OpCode::ShlInt,
            BinaryOp::ShiftRight => OpCode::ShrInt,
            BinaryOp::ShiftRightUnsigned => OpCode::ShrUInt,
            other => {
                return Err(CompilationError::internal(
                    binary.span,
                    format!("{other} is not a bitwise operator"),
                ));
            }
        };
        Ok(self.emit_binary_op(op, result_ty, lhs, rhs))
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};

    #[test]
    fn or_zero_emits_nothing() {
        let module = compile_body("function f(i) { i = i|0; return i|0; }");
        module.functions[0]
            .chunk
            .assert_opcodes(&[OpCode::ReturnInt, OpCode::Br, OpCode::Ret]);
    }

    #[test]
    fn and_zero_is_a_real_and() {
        let module = compile_body("function f(i) { i = i|0; return (i & 0)|0; }");
        module.functions[0].chunk.assert_contains_opcodes(&[OpCode::AndInt]);
    }

    #[test]
    fn shifts_and_masks() {
        let module = compile_body(
            "function f(i) { i = i|0; return ((i << 2) ^ (i >> 1) | 3)|0; }",
        );
        module.functions[0].chunk.assert_contains_opcodes(&[
            OpCode::ShlInt,
            OpCode::ShrInt,
            OpCode::XorInt,
            OpCode::OrInt,
        ]);
    }

    #[test]
    fn unsigned_shift_result_is_not_returnable() {
        let err = compile_body_err("function f(i) { i = i|0; return i>>>0; }");
        assert!(err.message().contains("return"));
    }

    #[test]
    fn double_operands_are_rejected() {
        let err = compile_body_err("function f(x) { x = +x; return (x|0)|0; }");
        assert!(err.message().contains("intish"));
    }

    #[test]
    fn call_or_zero_is_signed() {
        let module = compile_body(
            "function g() { return 1; } function f() { return g()|0; }",
        );
        module.functions[1]
            .chunk
            .assert_contains_opcodes(&[
                OpCode::StartCall,
                OpCode::LdFunc,
                OpCode::ICall,
                OpCode::IConvVTI,
            ]);
    }
}
