//! Prefix operators: `-`, `+`, `~` and `!`.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{Expr, UnaryExpr, UnaryOp};

use crate::bytecode::OpCode;
use crate::expr_info::ExprInfo;
use crate::function::FunctionCompiler;
use crate::types::{AsmType, RegisterClass, ReturnType};

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_unary(&mut self, unary: &UnaryExpr<'ast>) -> Result<ExprInfo> {
        match unary.op {
            UnaryOp::Neg => self.compile_neg(unary),
            UnaryOp::Plus => self.compile_to_number(unary),
            UnaryOp::BitwiseNot => self.compile_bitwise_not(unary),
            UnaryOp::LogicalNot => self.compile_logical_not(unary),
        }
    }

    fn compile_neg(&mut self, unary: &UnaryExpr<'ast>) -> Result<ExprInfo> {
        let operand = self.compile_expr(unary.operand)?;
        let (op, ty) = if operand.ty.is_int() {
            (OpCode::NegInt, AsmType::Intish)
        } else if operand.ty.is_maybe_double() {
            (OpCode::NegDb, AsmType::Double)
        } else if operand.ty.is_maybe_float() {
            (OpCode::NegFlt, AsmType::Floatish)
        } else {
            return Err(CompilationError::type_mismatch(
                unary.span,
                format!("Operand to - must be int, double? or float?; got {}", operand.ty),
            ));
        };
        Ok(self.emit_unary_op(op, ty, operand))
    }

    /// `+x`: the double coercion.
    fn compile_to_number(&mut self, unary: &UnaryExpr<'ast>) -> Result<ExprInfo> {
        if let Some(call) = self.user_call(unary.operand) {
            return self.compile_call(call, ReturnType::Double);
        }

        let operand = self.compile_expr(unary.operand)?;
        if operand.ty.is_unsigned() {
            Ok(self.emit_unary_op(OpCode::ConvUTD, AsmType::Double, operand))
        } else if operand.ty.is_signed() {
            Ok(self.emit_unary_op(OpCode::ConvITD, AsmType::Double, operand))
        } else if operand.ty.is_maybe_double() {
            Ok(operand.with_type(AsmType::Double))
        } else if operand.ty.is_maybe_float() {
            Ok(self.emit_unary_op(OpCode::ConvFTD, AsmType::Double, operand))
        } else {
            Err(CompilationError::type_mismatch(
                unary.span,
                format!(
                    "Operand to unary + must be signed, unsigned, double? or float?; got {}",
                    operand.ty
                ),
            ))
        }
    }

    /// A run of `~`. `~~x` truncates a double or float to signed.
    fn compile_bitwise_not(&mut self, unary: &UnaryExpr<'ast>) -> Result<ExprInfo> {
        let (mut count, inner) = peel(unary, UnaryOp::BitwiseNot);
        let mut operand = self.compile_expr(inner)?;

        if count >= 2 {
            let truncate = if operand.ty.is_maybe_double() {
                Some(OpCode::ConvDTI)
            } else if operand.ty.is_maybe_float() {
                Some(OpCode::ConvFTI)
            } else {
                None
            };
            if let Some(op) = truncate {
                operand = self.emit_unary_op(op, AsmType::Signed, operand);
                count -= 2;
            }
        }

        if !operand.ty.is_intish() {
            return Err(CompilationError::type_mismatch(
                inner.span(),
                format!(
                    "Operand to ~ must be intish, or double?/float? under ~~; got {}",
                    operand.ty
                ),
            ));
        }
        if count % 2 == 1 {
            operand = self.emit_unary_op(OpCode::NotInt, AsmType::Signed, operand);
        }
        Ok(operand.with_type(AsmType::Signed))
    }

    /// A run of `!`. An even run normalizes its operand to 0 or 1.
    fn compile_logical_not(&mut self, unary: &UnaryExpr<'ast>) -> Result<ExprInfo> {
        let (count, inner) = peel(unary, UnaryOp::LogicalNot);
        let operand = self.compile_expr(inner)?;
        if !operand.ty.is_int() {
            return Err(CompilationError::type_mismatch(
                inner.span(),
                format!("Operand to ! must be int; got {}", operand.ty),
            ));
        }
        let op = if count % 2 == 1 {
            OpCode::LogNotInt
        } else {
            OpCode::ConvITB
        };
        Ok(self.emit_unary_op(op, AsmType::Int, operand))
    }

    /// Release the operand and write `op dst, src` into a fresh temporary.
    pub(super) fn emit_unary_op(&mut self, op: OpCode, ty: AsmType, operand: ExprInfo) -> ExprInfo {
        self.release(operand);
        let class = ty.register_class().unwrap_or(RegisterClass::Int);
        let dst = self.acquire_tmp(class);
        self.emit(op, &[dst.index, operand.reg()]);
        ExprInfo::new(ty, dst)
    }
}

/// Count consecutive applications of `op` and return the innermost operand.
fn peel<'ast>(unary: &UnaryExpr<'ast>, op: UnaryOp) -> (u32, &'ast Expr<'ast>) {
    let mut count = 1;
    let mut inner = unary.operand;
    while let Expr::Unary(next) = *inner {
        if next.op != op {
            break;
        }
        count += 1;
        inner = next.operand;
    }
    (count, inner)
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};

    #[test]
    fn double_truncation() {
        let module = compile_body("function f(x) { x = +x; return ~~x; }");
        module.functions[0]
            .chunk
            .assert_opcodes(&[OpCode::ConvDTI, OpCode::ReturnInt, OpCode::Br, OpCode::Ret]);
    }

    #[test]
    fn triple_not_on_double() {
        let module = compile_body("function f(x) { x = +x; return ~~~x; }");
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::ConvDTI, OpCode::NotInt]);
    }

    #[test]
    fn single_not_on_double_is_rejected() {
        let err = compile_body_err("function f(x) { x = +x; return ~x; }");
        assert!(err.message().contains("Operand to ~"));
    }

    #[test]
    fn to_number_conversions() {
        let module = compile_body(
            "function f(i, y) { i = i|0; y = fround(y); return +(+(i>>>0) + +(i|0) + +y); }",
        );
        module.functions[0].chunk.assert_contains_opcodes(&[
            OpCode::ConvUTD,
            OpCode::ConvITD,
            OpCode::AddDb,
            OpCode::ConvFTD,
            OpCode::AddDb,
            OpCode::ReturnDb,
        ]);
    }

    #[test]
    fn logical_not_chains() {
        let module = compile_body("function f(i) { i = i|0; return (!i + !!i)|0; }");
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::LogNotInt, OpCode::ConvITB, OpCode::AddInt]);
    }

    #[test]
    fn negation_types() {
        let module = compile_body("function f(x) { x = +x; return +(-x); }");
        module.functions[0].chunk.assert_contains_opcodes(&[OpCode::NegDb]);
        let err = compile_body_err("function f(i) { i = i|0; return -i; }");
        assert!(err.message().contains("return"));
    }
}
