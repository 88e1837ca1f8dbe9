//! Change-heap function recognition.
//!
//! A module whose first function has exactly this shape may swap its heap
//! buffer at run time:
//!
//! ```js
//! function changeHeap(b) {
//!     if (byteLength(b) & 0xffffff || byteLength(b) <= 0xffffff || byteLength(b) > 0x80000000)
//!         return false;
//!     HEAP32 = new Int32Array(b);   // every view, in declaration order
//!     heap = b;
//!     return true;
//! }
//! ```
//!
//! The function is accepted as-is and produces no code.

use asmjs_parser::ast::{BinaryOp, Expr, FunctionDecl, LiteralKind, Stmt};

use crate::builtins::TypedArrayBuiltin;
use crate::context::ViewEntry;
use crate::output::ModuleFlags;
use crate::symbols::{ModuleArgument, Symbol};
use crate::types::LiteralClass;

use super::ModuleCompiler;

/// Smallest heap length mask the guard may test against.
const MIN_LENGTH_MASK: u32 = 0x00ff_ffff;
/// Exclusive upper bound on a heap length.
const MAX_HEAP_LENGTH: u32 = 0x8000_0000;

impl<'ast> ModuleCompiler<'ast> {
    /// Mark the first function as the change-heap function if it matches
    /// the template.
    pub(super) fn accept_change_heap(&mut self) -> bool {
        let Some(entry) = self.ctx.functions.first() else {
            return false;
        };
        if !self.is_change_heap(entry.decl) {
            return false;
        }
        self.ctx.functions[0].change_heap = true;
        self.ctx.flags |= ModuleFlags::USES_CHANGE_HEAP;
        true
    }

    fn is_change_heap(&self, decl: &FunctionDecl<'ast>) -> bool {
        let [param] = decl.params else {
            return false;
        };
        if param.default.is_some() || param.is_rest {
            return false;
        }
        let Some(heap) = self.ctx.module_arg(ModuleArgument::Heap) else {
            return false;
        };
        let buffer = param.name.name;
        let views = &self.ctx.views;
        let stmts = decl.body.stmts;
        if stmts.len() != views.len() + 3 {
            return false;
        }

        let Stmt::If(guard) = stmts[0] else {
            return false;
        };
        if guard.else_stmt.is_some()
            || !self.is_length_guard(guard.condition, buffer)
            || !returns_bool(&guard.then_stmt, false)
        {
            return false;
        }

        let rebinds = &stmts[1..=views.len()];
        if !rebinds
            .iter()
            .zip(views)
            .all(|(stmt, view)| self.is_view_rebind(stmt, view, buffer))
        {
            return false;
        }

        let [buffer_rebind, ret] = &stmts[views.len() + 1..] else {
            return false;
        };
        let buffer_rebound = assignment(buffer_rebind).is_some_and(|(target, value)| {
            target == heap.name && value.as_ident().is_some_and(|ident| ident.name == buffer)
        });
        buffer_rebound && returns_bool(ret, true)
    }

    /// `byteLength(b) & M || byteLength(b) <= M || byteLength(b) > 0x80000000`
    fn is_length_guard(&self, cond: &Expr<'ast>, buffer: &str) -> bool {
        let Some((rest, too_long)) = binary(cond, BinaryOp::LogicalOr) else {
            return false;
        };
        let Some((misaligned, too_short)) = binary(rest, BinaryOp::LogicalOr) else {
            return false;
        };

        let operand = |expr: &Expr<'ast>, op| {
            let (call, bound) = binary(expr, op)?;
            self.is_byte_length_call(call, buffer)
                .then(|| LiteralClass::of_expr(bound).as_uint())
                .flatten()
        };
        let Some(mask) = operand(misaligned, BinaryOp::BitwiseAnd) else {
            return false;
        };
        mask >= MIN_LENGTH_MASK
            && mask.checked_add(1).is_some_and(u32::is_power_of_two)
            && operand(too_short, BinaryOp::LessEqual) == Some(mask)
            && operand(too_long, BinaryOp::Greater) == Some(MAX_HEAP_LENGTH)
    }

    fn is_byte_length_call(&self, expr: &Expr<'ast>, buffer: &str) -> bool {
        let Expr::Call(call) = *expr else {
            return false;
        };
        let callee_ok = call.callee.as_ident().is_some_and(|callee| {
            matches!(
                self.ctx.lookup(callee.name),
                Some(Symbol::TypedArrayBuiltin(TypedArrayBuiltin::ByteLength))
            )
        });
        callee_ok && is_single_ident_arg(call.args, buffer)
    }

    /// `VIEW = new Ctor(b)` where `Ctor` builds the view's own kind.
    fn is_view_rebind(&self, stmt: &Stmt<'ast>, view: &ViewEntry<'ast>, buffer: &str) -> bool {
        let Some((target, Expr::New(new))) = assignment(stmt) else {
            return false;
        };
        if target != view.name.name || !is_single_ident_arg(new.args, buffer) {
            return false;
        }
        new.callee.as_ident().is_some_and(|ctor| {
            self.ctx.lookup(ctor.name)
                == Some(Symbol::TypedArrayBuiltin(TypedArrayBuiltin::View(view.kind)))
        })
    }
}

fn binary<'ast>(expr: &Expr<'ast>, op: BinaryOp) -> Option<(&'ast Expr<'ast>, &'ast Expr<'ast>)> {
    match *expr {
        Expr::Binary(binary) if binary.op == op => Some((binary.left, binary.right)),
        _ => None,
    }
}

/// `name = value;` as a statement.
fn assignment<'ast>(stmt: &Stmt<'ast>) -> Option<(&'ast str, Expr<'ast>)> {
    let Stmt::Expr(expr_stmt) = *stmt else {
        return None;
    };
    let Expr::Assign(assign) = *expr_stmt.expr else {
        return None;
    };
    Some((assign.target.as_ident()?.name, *assign.value))
}

fn is_single_ident_arg(args: &[&Expr<'_>], name: &str) -> bool {
    matches!(args, [arg] if arg.as_ident().is_some_and(|ident| ident.name == name))
}

/// `return true;` or `return false;`, optionally braced.
fn returns_bool(stmt: &Stmt<'_>, expected: bool) -> bool {
    match stmt {
        Stmt::Return(ret) => matches!(
            ret.value.and_then(Expr::as_literal).map(|lit| lit.kind),
            Some(LiteralKind::Bool(value)) if value == expected
        ),
        Stmt::Block(block) => matches!(block.stmts, [only] if returns_bool(only, expected)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::output::ModuleFlags;
    use crate::testing::{compile_source, compile_source_err};
    use asmjs_core::ErrorCategory;

    fn module(guard: &str, rebinds: &str) -> String {
        format!(
            r#"function M(stdlib, foreign, heap) {{
                "use asm";
                var byteLength = stdlib.byteLength;
                var Int8Array = stdlib.Int8Array;
                var Float64Array = stdlib.Float64Array;
                var H8 = new Int8Array(heap);
                var HF64 = new Float64Array(heap);
                function changeHeap(b) {{
                    if ({guard}) return false;
                    {rebinds}
                    heap = b;
                    return true;
                }}
                function f() {{}}
                return f;
            }}"#
        )
    }

    const GUARD: &str = "byteLength(b) & 0xffffff || byteLength(b) <= 0xffffff || byteLength(b) > 0x80000000";
    const REBINDS: &str = "H8 = new Int8Array(b); HF64 = new Float64Array(b);";

    #[test]
    fn template_is_accepted() {
        let module = compile_source(&module(GUARD, REBINDS));
        assert!(module.info.flags.contains(ModuleFlags::USES_CHANGE_HEAP));
        assert_eq!(module.functions[0].name, "changeHeap");
        assert_eq!(module.functions[0].chunk.instructions().count(), 0);
        assert_eq!(module.exports, crate::output::Exports::Single(1));
    }

    #[test]
    fn larger_mask_is_accepted() {
        let guard = "byteLength(b) & 0x3ffffff || byteLength(b) <= 0x3ffffff || byteLength(b) > 0x80000000";
        let module = compile_source(&module(guard, REBINDS));
        assert!(module.info.flags.contains(ModuleFlags::USES_CHANGE_HEAP));
    }

    #[test]
    fn small_mask_is_not_the_template() {
        let guard = "byteLength(b) & 0xffff || byteLength(b) <= 0xffff || byteLength(b) > 0x80000000";
        compile_source_err(&module(guard, REBINDS));
    }

    #[test]
    fn views_must_be_rebound_in_order() {
        compile_source_err(&module(
            GUARD,
            "HF64 = new Float64Array(b); H8 = new Int8Array(b);",
        ));
    }

    #[test]
    fn view_kind_must_match() {
        compile_source_err(&module(GUARD, "H8 = new Int8Array(b); HF64 = new Int8Array(b);"));
    }

    #[test]
    fn change_heap_cannot_be_called() {
        let source = module(GUARD, REBINDS).replace(
            "function f() {}",
            "function f() { changeHeap(0); }",
        );
        let err = compile_source_err(&source);
        assert!(err.message().contains("cannot be called"));
    }

    fn with_body(body: &str) -> String {
        module(GUARD, REBINDS).replace(
            "function f() {}",
            &format!("function g() {{ return 1; }} {body}"),
        )
    }

    #[test]
    fn calls_in_heap_store_value_are_rejected() {
        let err = compile_source_err(&with_body(
            "function f(i) { i = i|0; H8[i] = g()|0; }",
        ));
        assert_eq!(err.category(), ErrorCategory::Type);
        assert!(err.message().contains("heap access"));
    }

    #[test]
    fn calls_in_heap_index_are_rejected() {
        let err = compile_source_err(&with_body(
            "function f(i) { i = i|0; HF64[(g()|0) >> 3] = 1.0; }",
        ));
        assert!(err.message().contains("heap access"));
    }

    #[test]
    fn calls_outside_heap_access_are_allowed() {
        let module = compile_source(&with_body(
            "function f(i) { i = i|0; i = g()|0; H8[i] = i; }",
        ));
        assert!(module.info.flags.contains(ModuleFlags::USES_CHANGE_HEAP));
    }

    #[test]
    fn ordinary_first_function_is_compiled() {
        let module = compile_source(
            r#"function M(stdlib, foreign, heap) { "use asm"; function f() {} return f; }"#,
        );
        assert!(!module.info.flags.contains(ModuleFlags::USES_CHANGE_HEAP));
    }
}
