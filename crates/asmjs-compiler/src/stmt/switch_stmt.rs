//! Switch statement compilation.
//!
//! A switch is a forward scan over case equality tests, not a jump table:
//!
//! ```text
//!     BeginSwitchInt tmp, scrutinee
//!     CaseInt tmp, 1 -> case_0
//!     CaseInt tmp, 2 -> case_1
//!     EndSwitchInt -> default (or exit)
//! case_0:
//!     [body]                  <- falls through
//! case_1:
//!     [body]
//! default:
//!     [body]
//! exit:                       <- break target
//! ```
//!
//! The scrutinee must be signed. Case values are distinct int literals and
//! `default`, if present, is the last clause.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{Expr, SwitchStmt};
use rustc_hash::FxHashSet;

use crate::bytecode::OpCode;
use crate::emit::BreakableKind;
use crate::function::FunctionCompiler;
use crate::types::{LiteralClass, RegisterClass};

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_switch(
        &mut self,
        switch: &'ast SwitchStmt<'ast>,
        labels: Vec<String>,
    ) -> Result<()> {
        let values = self.case_values(switch)?;

        let scrutinee = self.compile_expr(switch.expr)?;
        if !scrutinee.ty.is_signed() {
            return Err(CompilationError::type_mismatch(
                switch.expr.span(),
                format!("Switch expression must be signed; got {}", scrutinee.ty),
            ));
        }
        self.release(scrutinee);
        let tmp = self.acquire_tmp(RegisterClass::Int);
        self.emit(OpCode::BeginSwitchInt, &[tmp.index, scrutinee.reg()]);

        let exit = self.emitter.new_label();
        let mut default = None;
        let mut targets = Vec::with_capacity(switch.cases.len());
        for (case, value) in switch.cases.iter().zip(&values) {
            let target = self.emitter.new_label();
            match value {
                Some(value) => {
                    self.emitter
                        .emit_branch(OpCode::CaseInt, &[tmp.index, *value as u32], target);
                }
                None => default = Some(target),
            }
            targets.push((target, case));
        }
        self.emitter
            .emit_branch(OpCode::EndSwitchInt, &[], default.unwrap_or(exit));
        self.registers.release(tmp);

        self.emitter
            .enter_breakable(BreakableKind::Switch, labels, exit, None);
        for (target, case) in targets {
            self.emitter.bind_label(target);
            self.compile_stmts(case.body)?;
        }
        self.emitter.exit_breakable();
        self.emitter.bind_label(exit);
        Ok(())
    }

    /// Case values in clause order, `None` for `default`.
    fn case_values(&self, switch: &SwitchStmt<'ast>) -> Result<Vec<Option<i32>>> {
        let mut seen = FxHashSet::default();
        let last = switch.cases.len().saturating_sub(1);
        let mut values = Vec::with_capacity(switch.cases.len());

        for (i, case) in switch.cases.iter().enumerate() {
            let Some(test) = case.test else {
                if i != last {
                    return Err(CompilationError::structure(
                        case.span,
                        "default must be the last case of a switch",
                    ));
                }
                values.push(None);
                continue;
            };
            let value = case_literal(test)?;
            if !seen.insert(value) {
                return Err(CompilationError::structure(
                    test.span(),
                    format!("Duplicate case value {value}"),
                ));
            }
            values.push(Some(value));
        }
        Ok(values)
    }
}

/// A case label is a signed int literal.
fn case_literal(test: &Expr<'_>) -> Result<i32> {
    match LiteralClass::of_expr(test) {
        LiteralClass::Int(value) => Ok(value),
        LiteralClass::MinInt => Ok(i32::MIN),
        _ => Err(CompilationError::type_mismatch(
            test.span(),
            "Case labels must be signed int literals",
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};
    use asmjs_core::ErrorCategory;

    const SWITCH: &str = "function f(i) { i = i|0; var r = 0; \
        switch (i|0) { case 1: r = 10; break; case -2: r = 20; default: r = 30; } \
        return r|0; }";

    #[test]
    fn dispatch_is_a_forward_scan() {
        let module = compile_body(SWITCH);
        let chunk = &module.functions[0].chunk;
        chunk.assert_contains_opcodes(&[
            OpCode::BeginSwitchInt,
            OpCode::CaseInt,
            OpCode::CaseInt,
            OpCode::EndSwitchInt,
            OpCode::LdInt,
            OpCode::Br,
            OpCode::LdInt,
            OpCode::LdInt,
            OpCode::ReturnInt,
        ]);
        let values: Vec<u32> = chunk
            .instructions()
            .filter(|instruction| instruction.op == OpCode::CaseInt)
            .map(|instruction| instruction.operands[1])
            .collect();
        assert_eq!(values, vec![1, (-2i32) as u32]);
    }

    #[test]
    fn scrutinee_must_be_signed() {
        let err = compile_body_err("function f(i) { i = i|0; switch (i) { case 0: break; } }");
        assert!(err.message().contains("must be signed"));
    }

    #[test]
    fn duplicate_cases_are_rejected() {
        let err = compile_body_err(
            "function f(i) { i = i|0; switch (i|0) { case 1: break; case 1: break; } }",
        );
        assert!(err.message().contains("Duplicate case value 1"));
    }

    #[test]
    fn default_must_be_last() {
        let err = compile_body_err(
            "function f(i) { i = i|0; switch (i|0) { default: break; case 1: break; } }",
        );
        assert_eq!(err.category(), ErrorCategory::Structure);
    }

    #[test]
    fn case_labels_must_be_int_literals() {
        let err = compile_body_err(
            "function f(i) { i = i|0; switch (i|0) { case 1.5: break; } }",
        );
        assert!(err.message().contains("signed int literals"));
    }

    #[test]
    fn continue_inside_switch_needs_a_loop() {
        let err = compile_body_err(
            "function f(i) { i = i|0; switch (i|0) { case 0: continue; } }",
        );
        assert!(err.message().contains("not inside a loop"));
        compile_body(
            "function f(i) { i = i|0; while (1) { switch (i|0) { case 0: continue; } break; } }",
        );
    }
}
