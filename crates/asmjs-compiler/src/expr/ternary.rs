//! Conditional expressions and branch conditions.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{Expr, TernaryExpr, UnaryOp};

use crate::bytecode::OpCode;
use crate::emit::Label;
use crate::expr_info::ExprInfo;
use crate::function::FunctionCompiler;
use crate::types::{AsmType, StorageType};

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// Branch to `if_true` or `if_false` on an `int` condition.
    ///
    /// A leading `!` swaps the targets instead of materializing the negation.
    pub(crate) fn compile_condition(
        &mut self,
        condition: &Expr<'ast>,
        if_true: Label,
        if_false: Label,
    ) -> Result<()> {
        if let Expr::Unary(unary) = *condition
            && unary.op == UnaryOp::LogicalNot
        {
            return self.compile_condition(unary.operand, if_false, if_true);
        }

        let info = self.compile_expr(condition)?;
        if !info.ty.is_int() {
            return Err(CompilationError::type_mismatch(
                condition.span(),
                format!("Condition must be of type int; got {}", info.ty),
            ));
        }
        self.release(info);
        self.emitter
            .emit_branch(OpCode::BrTrueInt, &[info.reg()], if_true);
        self.emitter.emit_br(if_false);
        Ok(())
    }

    /// `c ? a : b`. Both arms must be int, both double, or both float.
    pub(super) fn compile_ternary(&mut self, ternary: &TernaryExpr<'ast>) -> Result<ExprInfo> {
        let then_label = self.emitter.new_label();
        let else_label = self.emitter.new_label();
        let end_label = self.emitter.new_label();

        self.compile_condition(ternary.condition, then_label, else_label)?;

        self.emitter.bind_label(then_label);
        let then_info = self.compile_expr(ternary.then_expr)?;
        let (storage, ty) = if then_info.ty.is_int() {
            (StorageType::Int, AsmType::Int)
        } else if then_info.ty.is_double() {
            (StorageType::Double, AsmType::Double)
        } else if then_info.ty.is_float() {
            (StorageType::Float, AsmType::Float)
        } else {
            return Err(CompilationError::type_mismatch(
                ternary.then_expr.span(),
                format!(
                    "Arms of a conditional must be int, double or float; got {}",
                    then_info.ty
                ),
            ));
        };
        self.release(then_info);
        let dst = self.acquire_tmp(storage.register_class());
        if let Some(src) = then_info.loc
            && src != dst
        {
            self.emit_move(storage, dst, src);
        }
        self.emitter.emit_br(end_label);

        self.emitter.bind_label(else_label);
        let else_info = self.compile_expr(ternary.else_expr)?;
        if !else_info.ty.is_sub_type(ty) {
            return Err(CompilationError::type_mismatch(
                ternary.else_expr.span(),
                format!(
                    "Arms of a conditional must agree; got {} and {}",
                    then_info.ty, else_info.ty
                ),
            ));
        }
        self.release(else_info);
        if let Some(src) = else_info.loc
            && src != dst
        {
            self.emit_move(storage, dst, src);
        }
        self.emitter.bind_label(end_label);

        Ok(ExprInfo::new(ty, dst))
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};

    #[test]
    fn int_ternary() {
        let module = compile_body("function f(i) { i = i|0; return (i ? 1 : 2)|0; }");
        module.functions[0].chunk.assert_contains_opcodes(&[
            OpCode::BrTrueInt,
            OpCode::Br,
            OpCode::LdInt,
            OpCode::Br,
            OpCode::LdInt,
            OpCode::ReturnInt,
        ]);
    }

    #[test]
    fn negated_condition_swaps_targets() {
        let module = compile_body("function f(i) { i = i|0; return (!i ? 1 : 2)|0; }");
        assert!(!module.functions[0].chunk.opcodes().contains(&OpCode::LogNotInt));
    }

    #[test]
    fn double_arms() {
        let module = compile_body("function f(i) { i = i|0; return +(i ? 1.5 : 2.5); }");
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::LdDb, OpCode::LdDb, OpCode::ReturnDb]);
    }

    #[test]
    fn mismatched_arms_are_rejected() {
        let err = compile_body_err("function f(i) { i = i|0; return +(i ? 1.5 : 2); }");
        assert!(err.message().contains("must agree"));
    }

    #[test]
    fn double_condition_is_rejected() {
        let err = compile_body_err("function f(x) { x = +x; return (x ? 1 : 2)|0; }");
        assert!(err.message().contains("Condition"));
    }
}
