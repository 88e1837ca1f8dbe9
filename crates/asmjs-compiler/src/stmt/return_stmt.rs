//! Return statement compilation.
//!
//! The first `return` fixes the function's return type; later ones must
//! agree. The value is written to the return slot and control branches to
//! the shared epilogue.

use asmjs_core::CompilationError;
use asmjs_parser::ast::ReturnStmt;

use crate::bytecode::OpCode;
use crate::function::{FunctionCompiler, simd_operand};
use crate::types::ReturnType;

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_return(&mut self, ret: &ReturnStmt<'ast>) -> Result<()> {
        let Some(value) = ret.value else {
            self.check_return(ReturnType::Void, ret.span)?;
            self.emitter.emit_br(self.exit_label);
            return Ok(());
        };

        let info = self.compile_expr(value)?;
        let ret_type = match ReturnType::from_asm_type(info.ty) {
            Some(ret_type) if ret_type != ReturnType::Void => ret_type,
            _ => {
                return Err(CompilationError::type_mismatch(
                    value.span(),
                    format!(
                        "Value of a return statement must be signed, double, float or SIMD; got {}",
                        info.ty
                    ),
                ));
            }
        };
        self.check_return(ret_type, ret.span)?;

        let src = info.reg();
        match ret_type {
            ReturnType::Signed => self.emit(OpCode::ReturnInt, &[src]),
            ReturnType::Double => self.emit(OpCode::ReturnDb, &[src]),
            ReturnType::Float => self.emit(OpCode::ReturnFlt, &[src]),
            ReturnType::Simd(ty) => self.emit(OpCode::Simd128Return, &[simd_operand(ty), src]),
            ReturnType::Void => {}
        }
        self.release(info);
        self.emitter.emit_br(self.exit_label);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};
    use crate::types::ReturnType;
    use asmjs_core::ErrorCategory;

    #[test]
    fn first_return_fixes_type() {
        let module = compile_body("function f(x) { x = +x; return +x; }");
        let function = &module.functions[0];
        assert_eq!(function.info.ret, ReturnType::Double);
        function
            .chunk
            .assert_contains_opcodes(&[OpCode::ReturnDb, OpCode::Br, OpCode::Ret]);
    }

    #[test]
    fn double_literal_returns_double() {
        let module = compile_body("function f() { return 1.5; }");
        assert_eq!(module.functions[0].info.ret, ReturnType::Double);
    }

    #[test]
    fn bare_return_is_void() {
        let module = compile_body("function f() { return; }");
        let function = &module.functions[0];
        assert_eq!(function.info.ret, ReturnType::Void);
        function.chunk.assert_opcodes(&[OpCode::Br, OpCode::Ret]);
    }

    #[test]
    fn conflicting_returns_are_rejected() {
        let err = compile_body_err(
            "function f(i) { i = i|0; if (i) return 1; return 1.5; }",
        );
        assert_eq!(err.category(), ErrorCategory::Signature);
    }

    #[test]
    fn implicit_void_conflicts_with_value() {
        let err = compile_body_err("function f(i) { i = i|0; if (i) return i|0; }");
        assert_eq!(err.category(), ErrorCategory::Signature);
    }

    #[test]
    fn returning_if_else_does_not_fall_through() {
        let module = compile_body(
            "function f(i) { i = i|0; if ((i|0) > 0) { return 1; } else { return 2; } }",
        );
        assert_eq!(module.functions[0].info.ret, ReturnType::Signed);

        let module = compile_body(
            "function f(x) { x = +x; { if (x > 0.0) return +x; else if (x < 0.0) return +(-x); else return 0.0; } }",
        );
        assert_eq!(module.functions[0].info.ret, ReturnType::Double);
    }

    #[test]
    fn if_else_with_open_branch_falls_through() {
        let err = compile_body_err(
            "function f(i) { i = i|0; if (i) { return 1; } else { i = 2; } }",
        );
        assert_eq!(err.category(), ErrorCategory::Signature);
    }

    #[test]
    fn return_needs_coercion_form() {
        let err = compile_body_err("function f(i) { i = i|0; return (i + 1); }");
        assert!(err.message().contains("Value of a return statement"));
    }

    #[test]
    fn fixnum_returns_signed() {
        let module = compile_body("function f() { return 0; }");
        assert_eq!(module.functions[0].info.ret, ReturnType::Signed);
    }
}
