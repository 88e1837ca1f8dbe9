//! While loop compilation.
//!
//! Bytecode layout:
//!
//! ```text
//! head:                       <- continue target
//!     BrTrueInt cond -> body
//!     Br -> exit
//! body:
//!     [body]
//!     Br -> head
//! exit:                       <- break target
//! ```

use asmjs_parser::ast::WhileStmt;

use crate::emit::BreakableKind;
use crate::function::FunctionCompiler;

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_while(
        &mut self,
        while_stmt: &'ast WhileStmt<'ast>,
        labels: Vec<String>,
    ) -> Result<()> {
        let head = self.emitter.new_label();
        let body = self.emitter.new_label();
        let exit = self.emitter.new_label();

        self.emitter.bind_label(head);
        self.compile_condition(while_stmt.condition, body, exit)?;
        self.emitter.bind_label(body);

        self.emitter
            .enter_breakable(BreakableKind::Loop, labels, exit, Some(head));
        self.compile_stmt(&while_stmt.body)?;
        self.emitter.exit_breakable();

        self.emitter.emit_br(head);
        self.emitter.bind_label(exit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};

    #[test]
    fn while_loop_shape() {
        let module = compile_body(
            "function f(i) { i = i|0; while ((i|0) > 0) { i = (i - 1)|0; } return i|0; }",
        );
        let chunk = &module.functions[0].chunk;
        chunk.assert_opcodes(&[
            OpCode::CmGtInt,
            OpCode::BrTrueInt,
            OpCode::Br,
            OpCode::SubInt,
            OpCode::LdInt,
            OpCode::Br,
            OpCode::ReturnInt,
            OpCode::Br,
            OpCode::Ret,
        ]);
        let back_edge = chunk
            .instructions()
            .filter(|instruction| instruction.op == OpCode::Br)
            .nth(1)
            .unwrap();
        assert_eq!(back_edge.operands[0], 0);
    }

    #[test]
    fn break_and_continue_resolve() {
        compile_body(
            "function f(i) { i = i|0; while (1) { if (i) break; i = (i + 1)|0; continue; } }",
        );
    }

    #[test]
    fn break_after_loop_is_rejected() {
        let err = compile_body_err("function f() { while (0) {} break; }");
        assert!(err.message().contains("not inside a loop"));
    }
}
