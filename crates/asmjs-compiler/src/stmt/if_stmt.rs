//! If/else statement compilation.
//!
//! Bytecode layout:
//!
//! ```text
//!     BrTrueInt cond -> then
//!     Br -> else
//! then:
//!     [then branch]
//!     Br -> end
//! else:
//!     [else branch]
//! end:
//! ```
//!
//! Without an else branch the `else` and `end` labels coincide.

use asmjs_parser::ast::IfStmt;

use crate::function::FunctionCompiler;

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_if(&mut self, if_stmt: &'ast IfStmt<'ast>) -> Result<()> {
        let then_label = self.emitter.new_label();
        let else_label = self.emitter.new_label();

        self.compile_condition(if_stmt.condition, then_label, else_label)?;

        self.emitter.bind_label(then_label);
        self.compile_stmt(&if_stmt.then_stmt)?;

        match &if_stmt.else_stmt {
            Some(else_stmt) => {
                let end_label = self.emitter.new_label();
                self.emitter.emit_br(end_label);
                self.emitter.bind_label(else_label);
                self.compile_stmt(else_stmt)?;
                self.emitter.bind_label(end_label);
            }
            None => self.emitter.bind_label(else_label),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};

    #[test]
    fn if_only() {
        let module =
            compile_body("function f(i) { i = i|0; if (i) { i = (i + 1)|0; } return i|0; }");
        module.functions[0].chunk.assert_opcodes(&[
            OpCode::BrTrueInt,
            OpCode::Br,
            OpCode::AddInt,
            OpCode::LdInt,
            OpCode::ReturnInt,
            OpCode::Br,
            OpCode::Ret,
        ]);
    }

    #[test]
    fn if_else_joins() {
        let module = compile_body(
            "function f(i) { i = i|0; if ((i|0) < 0) return 0; else return 1; return 2; }",
        );
        module.functions[0].chunk.assert_contains_opcodes(&[
            OpCode::CmLtInt,
            OpCode::BrTrueInt,
            OpCode::Br,
            OpCode::ReturnInt,
            OpCode::Br,
            OpCode::Br,
            OpCode::ReturnInt,
        ]);
    }

    #[test]
    fn negated_condition_swaps_targets() {
        let module = compile_body("function f(i) { i = i|0; if (!i) return 1; return 0; }");
        let chunk = &module.functions[0].chunk;
        assert!(!chunk.opcodes().contains(&OpCode::LogNotInt));
    }

    #[test]
    fn condition_must_be_int() {
        let err = compile_body_err("function f(x) { x = +x; if (x) return; }");
        assert!(err.message().contains("Condition must be of type int"));
    }
}
