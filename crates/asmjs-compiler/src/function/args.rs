//! Argument binding.
//!
//! Each parameter of an asm.js function must be annotated, in order, by a
//! statement of the form `p = +p`, `p = p|0`, `p = fround(p)` or
//! `p = T.check(p)` at the very top of the body.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{Expr, FunctionDecl, Param, Stmt};

use crate::builtins::{MathBuiltin, SimdOp};
use crate::symbols::{Argument, Symbol};
use crate::types::{Coercion, StorageType, SyntacticCoercion};

use super::{FunctionCompiler, Result, register_error};

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// Bind every parameter and return how many leading statements were
    /// consumed by the annotations.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn bind_arguments(&mut self, decl: &'ast FunctionDecl<'ast>) -> Result<usize> {
        let stmts = decl.body.stmts;
        let mut storages = Vec::with_capacity(decl.params.len());

        for (index, param) in decl.params.iter().enumerate() {
            self.check_param(param)?;

            let Some(stmt) = stmts.get(index) else {
                return Err(CompilationError::structure(
                    param.span,
                    format!("Missing type annotation for parameter '{}'", param.name),
                ));
            };
            let storage = self.annotation_of(param, stmt)?.storage_type();

            let loc = self
                .registers
                .acquire_named(storage.register_class())
                .map_err(|err| register_error(param.span, err))?;
            self.locals.define(
                param.name,
                Symbol::Argument(Argument {
                    index: index as u32,
                    storage,
                    loc,
                }),
            )?;
            storages.push(storage);
        }

        let entry = &mut self.ctx.functions[self.index as usize];
        if !entry.signature.declare_args(storages.clone()) {
            let fixed = entry
                .signature
                .args()
                .map(join_storages)
                .unwrap_or_default();
            return Err(CompilationError::signature(
                decl.span,
                format!(
                    "Arguments ({}) of '{}' conflict with earlier call arguments ({fixed})",
                    join_storages(&storages),
                    entry.name
                ),
            ));
        }

        Ok(decl.params.len())
    }

    fn check_param(&self, param: &Param<'ast>) -> Result<()> {
        if param.default.is_some() || param.is_rest {
            return Err(CompilationError::structure(
                param.span,
                format!("Parameter '{}' must be a plain identifier", param.name),
            ));
        }
        if self.ctx.symbols.contains(param.name.name) {
            return Err(CompilationError::structure(
                param.span,
                format!("Parameter '{}' shadows a module-level name", param.name),
            ));
        }
        Ok(())
    }

    /// Resolve the coercion in `p = <coercion of p>`.
    fn annotation_of(&self, param: &Param<'ast>, stmt: &Stmt<'ast>) -> Result<Coercion> {
        let invalid = || {
            CompilationError::structure(
                stmt.span(),
                format!(
                    "Expected type annotation for parameter '{name}': \
                     '{name} = +{name}', '{name} = {name}|0' or '{name} = fround({name})'",
                    name = param.name
                ),
            )
        };

        let Stmt::Expr(expr_stmt) = *stmt else {
            return Err(invalid());
        };
        let Expr::Assign(assign) = *expr_stmt.expr else {
            return Err(invalid());
        };
        if assign.target.as_ident().map(|ident| ident.name) != Some(param.name.name) {
            return Err(invalid());
        }
        let coercion = SyntacticCoercion::of(assign.value).ok_or_else(invalid)?;
        if coercion.operand().as_ident().map(|ident| ident.name) != Some(param.name.name) {
            return Err(invalid());
        }

        match coercion {
            SyntacticCoercion::ToNumber(_) => Ok(Coercion::ToNumber),
            SyntacticCoercion::ToInt32(_) => Ok(Coercion::ToInt32),
            SyntacticCoercion::Call { callee, .. } => match self.ctx.lookup(callee.name) {
                Some(Symbol::MathBuiltin(MathBuiltin::Fround)) => Ok(Coercion::Fround),
                Some(Symbol::SimdBuiltin(simd)) if simd.op == SimdOp::Check => {
                    Ok(Coercion::SimdCheck(simd.ty))
                }
                _ => Err(invalid()),
            },
        }
    }
}

fn join_storages(storages: &[StorageType]) -> String {
    storages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
