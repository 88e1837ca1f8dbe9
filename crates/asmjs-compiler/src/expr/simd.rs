//! `SIMD.*` builtin calls.
//!
//! All value-producing operations lower to one variadic instruction:
//!
//! ```text
//! Simd128Op  builtin, ty, dst, args...
//! ```
//!
//! Register arguments and literal lane indices share the argument list.
//! Loads and stores go through the heap addressing rules instead.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{CallExpr, Expr};

use crate::builtins::{SimdArg, SimdBuiltin, SimdOp};
use crate::bytecode::OpCode;
use crate::expr_info::ExprInfo;
use crate::function::{FunctionCompiler, simd_operand};
use crate::types::{AsmType, LiteralClass, RegisterClass, ReturnType, SimdType};

use super::{HeapAddress, Result};

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_simd_call(
        &mut self,
        builtin: SimdBuiltin,
        call: &CallExpr<'ast>,
    ) -> Result<ExprInfo> {
        let ty = builtin.ty;
        let signature = builtin.signature();
        if call.args.len() != signature.args.len() {
            return Err(CompilationError::type_mismatch(
                call.span,
                format!(
                    "{} takes {} arguments; got {}",
                    builtin.display_name(),
                    signature.args.len(),
                    call.args.len()
                ),
            ));
        }

        if builtin.op == SimdOp::Check {
            return self.compile_simd_check(builtin, call.args[0]);
        }
        if builtin.op.is_load() || builtin.op.is_store() {
            return self.compile_simd_access(builtin, call);
        }

        let mut operands = vec![builtin.op.code(), simd_operand(ty), 0];
        let mut values = Vec::with_capacity(call.args.len());
        for (arg, kind) in call.args.iter().zip(&signature.args) {
            match *kind {
                SimdArg::Lane { bound } => operands.push(lane_index(builtin, arg, bound)?),
                SimdArg::Value(expected) => {
                    let info = self.compile_simd_value(ty, arg)?;
                    self.expect_type(arg, info, expected, &arg_name(builtin))?;
                    operands.push(info.reg());
                    values.push(info);
                }
                SimdArg::View => {
                    return Err(CompilationError::internal(
                        arg.span(),
                        format!("{} has a view argument", builtin.display_name()),
                    ));
                }
            }
        }

        for info in values.iter().rev() {
            self.release(*info);
        }
        let class = signature.ret.register_class().unwrap_or(RegisterClass::Int);
        let dst = self.acquire_tmp(class);
        operands[2] = dst.index;
        self.emit(OpCode::Simd128Op, &operands);
        Ok(ExprInfo::new(signature.ret, dst))
    }

    /// `T.check(x)` is a coercion: of a call it fixes the return type, of
    /// anything else it only checks.
    fn compile_simd_check(&mut self, builtin: SimdBuiltin, arg: &Expr<'ast>) -> Result<ExprInfo> {
        if let Some(call) = self.user_call(arg) {
            return self.compile_call(call, ReturnType::Simd(builtin.ty));
        }
        let info = self.compile_expr(arg)?;
        self.expect_type(arg, info, AsmType::Simd(builtin.ty), &arg_name(builtin))?;
        Ok(info)
    }

    /// A lane argument. Float literals of `Float32x4` operations read the
    /// float pool.
    fn compile_simd_value(&mut self, ty: SimdType, arg: &Expr<'ast>) -> Result<ExprInfo> {
        if ty == SimdType::Float32x4
            && let LiteralClass::Double(value) = LiteralClass::of_expr(arg)
        {
            let loc = self.float_constant(value as f32, arg.span())?;
            return Ok(ExprInfo::new(AsmType::Float, loc));
        }
        self.compile_expr(arg)
    }

    /// `T.load*(view, index)` and `T.store*(view, index, value)`.
    fn compile_simd_access(&mut self, builtin: SimdBuiltin, call: &CallExpr<'ast>) -> Result<ExprInfo> {
        let ty = builtin.ty;
        let view = self.resolve_view(call.args[0])?;
        let address = self.heap_address(view, call.args[1])?;
        let width = builtin.op.access_lanes(ty) * ty.lane_bits() / 8;
        let (addr, dynamic) = address.operand();
        let view_operand = u32::from(u8::from(view));

        let result = if builtin.op.is_store() {
            let value_expr = call.args[2];
            let value = self.compile_simd_value(ty, value_expr)?;
            self.expect_type(value_expr, value, AsmType::Simd(ty), &arg_name(builtin))?;
            let op = if dynamic {
                OpCode::Simd128StArr
            } else {
                OpCode::Simd128StArrConst
            };
            self.emit(
                op,
                &[simd_operand(ty), value.reg(), addr, view_operand, width],
            );
            if let HeapAddress::Dynamic(info) = address {
                self.release(info);
            }
            value
        } else {
            if let HeapAddress::Dynamic(info) = address {
                self.release(info);
            }
            let dst = self.acquire_tmp(RegisterClass::Simd);
            let op = if dynamic {
                OpCode::Simd128LdArr
            } else {
                OpCode::Simd128LdArrConst
            };
            self.emit(op, &[simd_operand(ty), dst.index, addr, view_operand, width]);
            ExprInfo::new(AsmType::Simd(ty), dst)
        };
        Ok(result)
    }
}

/// A literal lane index in `[0, bound)`.
fn lane_index(builtin: SimdBuiltin, arg: &Expr<'_>, bound: u32) -> Result<u32> {
    let Some(lane) = LiteralClass::of_expr(arg).as_uint() else {
        return Err(CompilationError::type_mismatch(
            arg.span(),
            format!("Lane arguments of {} must be int literals", builtin.display_name()),
        ));
    };
    if lane >= bound {
        return Err(CompilationError::out_of_range(
            arg.span(),
            format!(
                "Lane {lane} is out of range for {}; must be in [0, {bound})",
                builtin.display_name()
            ),
        ));
    }
    Ok(lane)
}

fn arg_name(builtin: SimdBuiltin) -> String {
    format!("Argument to {}", builtin.display_name())
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};
    use asmjs_core::ErrorCategory;

    #[test]
    fn add_lowers_to_simd_op() {
        let module = compile_body(
            "function f(a, b) { a = i4check(a); b = i4check(b); return i4check(i4add(a, b)); }",
        );
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::Simd128Op, OpCode::Simd128Return]);
    }

    #[test]
    fn float_constructor_literals_use_float_pool() {
        let module =
            compile_body("function f() { return f4check(f4(1.5, 2.5, 1.5, 0.5)); }");
        let function = &module.functions[0];
        assert_eq!(function.info.constants.float, vec![1.5, 2.5, 0.5]);
        assert!(function.info.constants.double.is_empty());
    }

    #[test]
    fn extract_lane_is_range_checked() {
        let module = compile_body(
            "function f(a) { a = i4check(a); return i4extractLane(a, 3)|0; }",
        );
        let chunk = &module.functions[0].chunk;
        let op = chunk
            .instructions()
            .find(|instruction| instruction.op == OpCode::Simd128Op)
            .unwrap();
        assert_eq!(op.operands.last(), Some(&3));

        let err =
            compile_body_err("function f(a) { a = i4check(a); return i4extractLane(a, 4)|0; }");
        assert_eq!(err.category(), ErrorCategory::Range);
    }

    #[test]
    fn lane_must_be_literal() {
        let err = compile_body_err(
            "function f(a, i) { a = i4check(a); i = i|0; return i4extractLane(a, i)|0; }",
        );
        assert!(err.message().contains("must be int literals"));
    }

    #[test]
    fn load_and_store() {
        let module = compile_body(
            "function f(i) { i = i|0; var a = i4(0, 0, 0, 0); \
             a = i4load(HEAPU8, i); i4store(HEAP32, 4, a); }",
        );
        let chunk = &module.functions[0].chunk;
        chunk.assert_contains_opcodes(&[OpCode::Simd128LdArr, OpCode::Simd128StArrConst]);
        let store = chunk
            .instructions()
            .find(|instruction| instruction.op == OpCode::Simd128StArrConst)
            .unwrap();
        assert_eq!(store.operands[2], 16);
        assert_eq!(store.operands[4], 16);
    }

    #[test]
    fn check_of_call_fixes_return_type() {
        let module = compile_body(
            "function g() { return i4check(i4splat(1)); } \
             function f() { return i4check(g()); }",
        );
        module.functions[1]
            .chunk
            .assert_contains_opcodes(&[OpCode::ICall, OpCode::Simd128IConvVT]);
    }

    #[test]
    fn mixed_simd_types_are_rejected() {
        let err = compile_body_err(
            "function f(a, b) { a = i4check(a); b = f4check(b); return i4check(i4add(a, b)); }",
        );
        assert!(err.message().contains("Int32x4.add"));
    }
}
