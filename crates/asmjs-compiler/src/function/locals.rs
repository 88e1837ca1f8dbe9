//! Local variable binding.

use asmjs_core::{CompilationError, Span};
use asmjs_parser::ast::{Stmt, VarKind};

use crate::registers::Location;
use crate::symbols::{ConstValue, Symbol, VarHome, Variable};

use super::{FunctionCompiler, Result, register_error};

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// Bind the `var` statements that open the body and emit their
    /// initial values. Returns the number of statements consumed.
    ///
    /// Registers start out zeroed, so only non-zero initializers emit a move.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn bind_locals(&mut self, stmts: &'ast [Stmt<'ast>]) -> Result<usize> {
        let mut initial: Vec<(Location, ConstValue, Span)> = Vec::new();
        let mut consumed = 0;

        for stmt in stmts {
            let Stmt::VarDecl(decl) = stmt else {
                break;
            };
            consumed += 1;

            for var in decl.vars {
                let Some(init) = var.init else {
                    return Err(CompilationError::type_mismatch(
                        var.span,
                        format!("Local variable '{}' must be initialized", var.name),
                    ));
                };
                let Some(value) = self.ctx.constant_initializer(init) else {
                    return Err(CompilationError::type_mismatch(
                        init.span(),
                        format!(
                            "Initializer of '{}' must be a numeric literal, a constant, \
                             or fround/SIMD constructor of literals",
                            var.name
                        ),
                    ));
                };

                let storage = value.storage_type();
                let loc = self
                    .registers
                    .acquire_named(storage.register_class())
                    .map_err(|err| register_error(var.span, err))?;
                self.locals.define(
                    var.name,
                    Symbol::Variable(Variable {
                        storage,
                        home: VarHome::Register(loc),
                        mutable: decl.kind == VarKind::Var,
                        value: Some(value),
                    }),
                )?;
                if !value.is_zero() {
                    initial.push((loc, value, var.span));
                }
            }
        }

        for (loc, value, span) in initial {
            let src = self.constant_location(value, span)?;
            self.emit_move(value.storage_type(), loc, src);
        }

        Ok(consumed)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{compile_body, compile_body_err};
    use crate::types::ReturnType;
    use asmjs_core::ErrorCategory;

    #[test]
    fn local_may_shadow_module_name() {
        let module = compile_body("function f() { var imul = 3; return imul|0; }");
        assert_eq!(module.functions[0].info.ret, ReturnType::Signed);
    }

    #[test]
    fn parameter_may_not_shadow_module_name() {
        let err = compile_body_err("function f(imul) { imul = imul|0; return imul|0; }");
        assert_eq!(err.category(), ErrorCategory::Structure);
        assert!(err.message().contains("shadows a module-level name"));
    }

    #[test]
    fn local_needs_initializer() {
        let err = compile_body_err("function f() { var x; return 0; }");
        assert!(err.message().contains("must be initialized"));
    }
}
