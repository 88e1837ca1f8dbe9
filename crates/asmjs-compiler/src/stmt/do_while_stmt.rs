//! Do-while loop compilation.
//!
//! Bytecode layout:
//!
//! ```text
//! head:
//!     [body]
//! cond:                       <- continue target
//!     BrTrueInt cond -> head
//!     Br -> exit
//! exit:                       <- break target
//! ```

use asmjs_parser::ast::DoWhileStmt;

use crate::emit::BreakableKind;
use crate::function::FunctionCompiler;

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_do_while(
        &mut self,
        do_while: &'ast DoWhileStmt<'ast>,
        labels: Vec<String>,
    ) -> Result<()> {
        let head = self.emitter.new_label();
        let cond = self.emitter.new_label();
        let exit = self.emitter.new_label();

        self.emitter.bind_label(head);
        self.emitter
            .enter_breakable(BreakableKind::Loop, labels, exit, Some(cond));
        self.compile_stmt(&do_while.body)?;
        self.emitter.exit_breakable();

        self.emitter.bind_label(cond);
        self.compile_condition(do_while.condition, head, exit)?;
        self.emitter.bind_label(exit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::compile_body;

    #[test]
    fn body_runs_before_condition() {
        let module = compile_body(
            "function f(i) { i = i|0; do { i = (i + 1)|0; } while ((i|0) < 10); return i|0; }",
        );
        let chunk = &module.functions[0].chunk;
        chunk.assert_contains_opcodes(&[
            OpCode::AddInt,
            OpCode::CmLtInt,
            OpCode::BrTrueInt,
            OpCode::Br,
            OpCode::ReturnInt,
        ]);
        let back_edge = chunk
            .instructions()
            .find(|instruction| instruction.op == OpCode::BrTrueInt)
            .unwrap();
        assert_eq!(back_edge.operands[1], 0);
    }

    #[test]
    fn continue_jumps_to_condition() {
        compile_body(
            "function f(i) { i = i|0; do { if (i) continue; i = 1; } while (0); }",
        );
    }
}
