//! For loop compilation.
//!
//! Bytecode layout:
//!
//! ```text
//!     [init]
//! head:
//!     BrTrueInt cond -> body  (omitted without a condition)
//!     Br -> exit
//! body:
//!     [body]
//! update:                     <- continue target
//!     [update]
//!     Br -> head
//! exit:                       <- break target
//! ```
//!
//! The init and update clauses are evaluated for their effects only.

use asmjs_parser::ast::ForStmt;

use crate::emit::BreakableKind;
use crate::function::FunctionCompiler;

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_for(
        &mut self,
        for_stmt: &'ast ForStmt<'ast>,
        labels: Vec<String>,
    ) -> Result<()> {
        if let Some(init) = for_stmt.init {
            self.compile_discarded(init)?;
        }

        let head = self.emitter.new_label();
        let update = self.emitter.new_label();
        let exit = self.emitter.new_label();

        self.emitter.bind_label(head);
        if let Some(condition) = for_stmt.condition {
            let body = self.emitter.new_label();
            self.compile_condition(condition, body, exit)?;
            self.emitter.bind_label(body);
        }

        self.emitter
            .enter_breakable(BreakableKind::Loop, labels, exit, Some(update));
        self.compile_stmt(&for_stmt.body)?;
        self.emitter.exit_breakable();

        self.emitter.bind_label(update);
        if let Some(step) = for_stmt.update {
            self.compile_discarded(step)?;
        }
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
    fn counting_loop() {
        let module = compile_body(
            "function f(n) { n = n|0; var i = 0, s = 0; \
             for (i = 0; (i|0) < (n|0); i = (i + 1)|0) { s = (s + i)|0; } return s|0; }",
        );
        module.functions[0].chunk.assert_contains_opcodes(&[
            OpCode::CmLtInt,
            OpCode::BrTrueInt,
            OpCode::Br,
            OpCode::AddInt,
            OpCode::AddInt,
            OpCode::Br,
            OpCode::ReturnInt,
        ]);
    }

    #[test]
    fn missing_condition_loops_forever() {
        let module = compile_body("function f() { for (;;) { break; } }");
        let chunk = &module.functions[0].chunk;
        assert!(!chunk.opcodes().contains(&OpCode::BrTrueInt));
        chunk.assert_opcodes(&[OpCode::Br, OpCode::Br, OpCode::Ret]);
    }

    #[test]
    fn update_must_typecheck() {
        let err = compile_body_err(
            "function f() { var i = 0; for (i = 0; (i|0) < 3; i = i + 1) {} }",
        );
        assert!(err.message().contains("intish"));
    }
}
