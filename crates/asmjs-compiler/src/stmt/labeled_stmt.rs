//! Labelled statements.
//!
//! `A: B: stmt` attaches both labels to `stmt`. Loops and switches take the
//! labels as their own; any other statement becomes a block that only
//! `break A` can leave.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{LabeledStmt, Stmt};

use crate::emit::BreakableKind;
use crate::function::FunctionCompiler;

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_labeled(
        &mut self,
        labeled: &'ast LabeledStmt<'ast>,
        mut labels: Vec<String>,
    ) -> Result<()> {
        let name = labeled.label.name;
        if self.emitter.has_statement_label(name) || labels.iter().any(|label| label == name) {
            return Err(CompilationError::structure(
                labeled.label.span,
                format!("Label '{name}' is already defined"),
            ));
        }
        labels.push(name.to_string());
        self.compile_stmt_inner(&labeled.body, labels)
    }

    pub(super) fn compile_labeled_block(
        &mut self,
        stmt: &'ast Stmt<'ast>,
        labels: Vec<String>,
    ) -> Result<()> {
        let exit = self.emitter.new_label();
        self.emitter
            .enter_breakable(BreakableKind::Block, labels, exit, None);
        self.compile_stmt_inner(stmt, Vec::new())?;
        self.emitter.exit_breakable();
        self.emitter.bind_label(exit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};

    #[test]
    fn labelled_continue_targets_outer_loop() {
        let module = compile_body(
            "function f(i) { i = i|0; \
             outer: while (1) { while (1) { if (i) continue outer; break outer; } } }",
        );
        let chunk = &module.functions[0].chunk;
        let continue_branch = chunk
            .instructions()
            .filter(|instruction| instruction.op == OpCode::Br)
            .nth(3)
            .unwrap();
        assert_eq!(continue_branch.operands[0], 0);
    }

    #[test]
    fn labelled_block_accepts_break() {
        compile_body("function f(i) { i = i|0; done: { if (i) break done; i = 1; } }");
    }

    #[test]
    fn unlabelled_break_skips_labelled_block() {
        let err = compile_body_err("function f() { done: { break; } }");
        assert!(err.message().contains("not inside a loop or switch"));
    }

    #[test]
    fn continue_to_block_label_is_rejected() {
        let err = compile_body_err(
            "function f() { done: { while (1) { continue done; } } }",
        );
        assert!(err.message().contains("does not name a loop"));
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = compile_body_err("function f() { while (1) { break nowhere; } }");
        assert!(err.message().contains("undefined label 'nowhere'"));
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let err = compile_body_err("function f() { a: a: while (0) {} }");
        assert!(err.message().contains("Label 'a' is already defined"));
        let err = compile_body_err("function f() { a: while (0) { a: while (0) {} } }");
        assert!(err.message().contains("Label 'a' is already defined"));
    }
}
