//! `Math.*` builtin calls.

use asmjs_core::CompilationError;
use asmjs_parser::ast::CallExpr;

use crate::builtins::MathBuiltin;
use crate::expr_info::ExprInfo;
use crate::function::{ARG_SLOT_BYTES, FunctionCompiler, internal_runtime_args};
use crate::types::{AsmType, LiteralClass, RegisterClass, ReturnType};

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// Lower a math builtin call by picking the overload its argument types
    /// select.
    pub(super) fn compile_math_call(
        &mut self,
        builtin: MathBuiltin,
        call: &CallExpr<'ast>,
    ) -> Result<ExprInfo> {
        if builtin == MathBuiltin::Fround && call.args.len() == 1 {
            let arg = call.args[0];
            if let Some(inner) = self.user_call(arg) {
                return self.compile_call(inner, ReturnType::Float);
            }
            if let Some(value) = LiteralClass::of_expr(arg).as_f64() {
                let loc = self.float_constant(value as f32, arg.span())?;
                return Ok(ExprInfo::new(AsmType::Float, loc));
            }
        }

        if builtin.is_variadic() {
            return self.compile_min_max(builtin, call);
        }

        let mut depth = self.calls.enter();
        let mut args = Vec::with_capacity(call.args.len());
        for arg in call.args {
            args.push(self.compile_expr(arg)?);
            depth = self.calls.after_arg(depth);
        }
        let types: Vec<AsmType> = args.iter().map(|arg| arg.ty).collect();
        let Some(overload) = builtin.resolve(&types) else {
            return Err(no_overload(builtin, &types, call));
        };
        self.calls.reserve(depth, math_runtime_args(args.len()));
        self.calls.leave();

        for arg in args.iter().rev() {
            self.release(*arg);
        }
        let dst = self.acquire_tmp(result_class(overload.ret));
        let mut operands = Vec::with_capacity(args.len() + 1);
        operands.push(dst.index);
        operands.extend(args.iter().map(ExprInfo::reg));
        self.emit(overload.op, &operands);
        Ok(ExprInfo::new(overload.ret, dst))
    }

    /// `min`/`max` fold their arguments left to right.
    fn compile_min_max(&mut self, builtin: MathBuiltin, call: &CallExpr<'ast>) -> Result<ExprInfo> {
        if call.args.len() < 2 {
            return Err(CompilationError::type_mismatch(
                call.span,
                format!("Math.{} needs at least two arguments", builtin.name()),
            ));
        }

        self.calls.enter();
        let mut acc = self.compile_expr(call.args[0])?;
        let mut depth = self.calls.level;
        for arg in &call.args[1..] {
            let rhs = self.compile_expr(arg)?;
            depth = self.calls.after_arg(depth);
            let types = [acc.ty, rhs.ty];
            let Some(overload) = builtin.resolve(&types) else {
                return Err(no_overload(builtin, &types, call));
            };
            self.calls.reserve(depth, math_runtime_args(2));
            depth = 0;
            acc = self.emit_binary_op(overload.op, overload.ret, acc, rhs);
        }
        self.calls.leave();
        Ok(acc)
    }
}

/// Math builtins are framed like internal calls with one slot per argument.
fn math_runtime_args(argc: usize) -> u32 {
    internal_runtime_args(argc as u32 * ARG_SLOT_BYTES)
}

fn result_class(ty: AsmType) -> RegisterClass {
    ty.register_class().unwrap_or(RegisterClass::Int)
}

fn no_overload(builtin: MathBuiltin, types: &[AsmType], call: &CallExpr<'_>) -> CompilationError {
    let types = types
        .iter()
        .map(AsmType::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    CompilationError::type_mismatch(
        call.span,
        format!("Math.{} does not accept ({types})", builtin.name()),
    )
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};

    #[test]
    fn double_overload() {
        let module = compile_body("function f(x) { x = +x; return +sqrt(x); }");
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::SqrtDb, OpCode::ReturnDb]);
    }

    #[test]
    fn float_overload() {
        let module = compile_body("function f(y) { y = fround(y); return fround(sqrt(y)); }");
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::SqrtFlt, OpCode::FroundFlt, OpCode::ReturnFlt]);
    }

    #[test]
    fn imul_accepts_intish() {
        let module =
            compile_body("function f(i, j) { i = i|0; j = j|0; return imul(i + 1, j)|0; }");
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::AddInt, OpCode::ImulInt, OpCode::ReturnInt]);
    }

    #[test]
    fn abs_of_signed_is_unsigned() {
        let module = compile_body("function f(i) { i = i|0; return +abs(i|0); }");
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::AbsInt, OpCode::ConvUTD, OpCode::ReturnDb]);
    }

    #[test]
    fn min_folds_pairwise() {
        let module = compile_body("function f(x, z) { x = +x; z = +z; return +min(x, z, 1.0); }");
        let opcodes = module.functions[0].chunk.opcodes();
        assert_eq!(opcodes.iter().filter(|op| **op == OpCode::MinDb).count(), 2);
    }

    #[test]
    fn min_needs_two_arguments() {
        let err = compile_body_err("function f(x) { x = +x; return +min(x); }");
        assert!(err.message().contains("at least two"));
    }

    #[test]
    fn fround_of_literal_uses_float_pool() {
        let module = compile_body("function f() { return fround(1.5); }");
        let function = &module.functions[0];
        assert_eq!(function.info.constants.float, vec![1.5]);
        function.chunk.assert_opcodes(&[OpCode::ReturnFlt, OpCode::Br, OpCode::Ret]);
    }

    #[test]
    fn wrong_argument_types_are_rejected() {
        let err = compile_body_err("function f(i) { i = i|0; return +sqrt(i); }");
        assert!(err.message().contains("Math.sqrt does not accept (int)"));
    }
}
