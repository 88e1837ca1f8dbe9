//! Statement lowering.
//!
//! Statements lower to fixed shapes over labels; see the individual modules.
//! Every statement is bracketed by a statement marker carrying its span.
//!
//! Breakable statements (loops, `switch`, labelled blocks) are tracked by the
//! emitter's breakable stack so `break` and `continue` resolve against the
//! innermost matching statement.

mod block;
mod do_while_stmt;
mod for_stmt;
mod if_stmt;
mod labeled_stmt;
mod return_stmt;
mod switch_stmt;
mod while_stmt;

use asmjs_core::CompilationError;
use asmjs_parser::ast::{JumpStmt, Stmt};

use crate::emit::BreakError;
use crate::function::FunctionCompiler;

type Result<T> = std::result::Result<T, CompilationError>;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// Lower a statement list in order.
    pub(crate) fn compile_stmts(&mut self, stmts: &'ast [Stmt<'ast>]) -> Result<()> {
        for stmt in stmts {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn compile_stmt(&mut self, stmt: &'ast Stmt<'ast>) -> Result<()> {
        self.emitter.begin_statement(stmt.span());
        let result = self.compile_stmt_inner(stmt, Vec::new());
        self.emitter.end_statement();
        result
    }

    /// Lower a statement carrying the labels in `labels`.
    ///
    /// Labels only matter to breakable statements; anything else wraps the
    /// body in a labelled block.
    fn compile_stmt_inner(&mut self, stmt: &'ast Stmt<'ast>, labels: Vec<String>) -> Result<()> {
        match stmt {
            Stmt::While(s) => self.compile_while(s, labels),
            Stmt::DoWhile(s) => self.compile_do_while(s, labels),
            Stmt::For(s) => self.compile_for(s, labels),
            Stmt::Switch(s) => self.compile_switch(s, labels),
            Stmt::Labeled(s) => self.compile_labeled(s, labels),
            _ if !labels.is_empty() => self.compile_labeled_block(stmt, labels),
            Stmt::Expr(s) => self.compile_discarded(s.expr),
            Stmt::Empty(_) => Ok(()),
            Stmt::Block(block) => self.compile_block(block),
            Stmt::If(s) => self.compile_if(s),
            Stmt::Return(s) => self.compile_return(s),
            Stmt::Break(s) => self.compile_break(s),
            Stmt::Continue(s) => self.compile_continue(s),
            Stmt::VarDecl(s) => Err(CompilationError::structure(
                s.span,
                "Local variables must be declared before any other statement",
            )),
            Stmt::Function(f) => Err(CompilationError::structure(
                f.span,
                "Nested functions are not allowed",
            )),
        }
    }

    fn compile_break(&mut self, stmt: &JumpStmt<'ast>) -> Result<()> {
        let label = stmt.label.map(|ident| ident.name);
        self.emitter
            .emit_break(label)
            .map_err(|err| jump_error(stmt, err))
    }

    fn compile_continue(&mut self, stmt: &JumpStmt<'ast>) -> Result<()> {
        let label = stmt.label.map(|ident| ident.name);
        self.emitter
            .emit_continue(label)
            .map_err(|err| jump_error(stmt, err))
    }
}

fn jump_error(stmt: &JumpStmt<'_>, err: BreakError) -> CompilationError {
    CompilationError::structure(stmt.span, err.to_string())
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};
    use asmjs_core::ErrorCategory;

    #[test]
    fn break_outside_loop_is_rejected() {
        let err = compile_body_err("function f() { break; }");
        assert_eq!(err.category(), ErrorCategory::Structure);
        assert!(err.message().contains("not inside a loop or switch"));
    }

    #[test]
    fn continue_outside_loop_is_rejected() {
        let err = compile_body_err("function f() { continue; }");
        assert!(err.message().contains("continue statement not inside a loop"));
    }

    #[test]
    fn late_var_is_rejected() {
        let err = compile_body_err("function f() { var i = 0; i = 1; var j = 0; }");
        assert_eq!(err.category(), ErrorCategory::Structure);
        assert!(err.message().contains("Local variables must be declared"));
    }

    #[test]
    fn nested_function_is_rejected() {
        let err = compile_body_err("function f() { function h() {} }");
        assert!(err.message().contains("Nested functions"));
    }

    #[test]
    fn every_statement_gets_a_marker() {
        let module = compile_body("function f(i) { i = i|0; i = (i + 1)|0; ; i = (i + 2)|0; }");
        let chunk = &module.functions[0].chunk;
        assert_eq!(chunk.markers().len(), 3);
        chunk.assert_contains_opcodes(&[OpCode::AddInt, OpCode::AddInt, OpCode::Ret]);
    }
}
