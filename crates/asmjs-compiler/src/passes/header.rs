//! Module header validation.
//!
//! ```js
//! function Module(stdlib, foreign, heap) {
//!     "use asm";
//!     ...
//! }
//! ```
//!
//! Parameters are positional: the first names the standard library, the
//! second the foreign import object, the third the heap buffer. Any of them
//! may be omitted from the right.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{Expr, LiteralKind, Stmt};

use crate::symbols::{ModuleArgument, Symbol};

use super::{ModuleCompiler, Result};

const USE_ASM: &str = "use asm";

impl<'ast> ModuleCompiler<'ast> {
    /// Bind the module parameters and the closure alias, and check the
    /// directive. Returns the statements after the directive.
    pub(super) fn check_header(&mut self) -> Result<&'ast [Stmt<'ast>]> {
        let decl = self.decl;
        if decl.is_generator || decl.is_async {
            return Err(CompilationError::structure(
                decl.span,
                "An asm.js module cannot be a generator or async function",
            ));
        }
        if decl.params.len() > ModuleArgument::ALL.len() {
            return Err(CompilationError::structure(
                decl.params[ModuleArgument::ALL.len()].span,
                "An asm.js module takes at most three parameters",
            ));
        }

        if let Some(name) = decl.name {
            self.ctx.symbols.define(name, Symbol::ClosureAlias)?;
        }

        for (param, arg) in decl.params.iter().zip(ModuleArgument::ALL) {
            if param.default.is_some() || param.is_rest {
                return Err(CompilationError::structure(
                    param.span,
                    format!("Module parameter '{}' must be a plain identifier", param.name),
                ));
            }
            self.ctx
                .symbols
                .define(param.name, Symbol::ModuleArgument(arg))?;
            self.ctx.module_args[arg as usize] = Some(param.name);
        }

        let stmts = decl.body.stmts;
        match stmts.first() {
            Some(Stmt::Expr(directive)) if is_use_asm(directive.expr) => Ok(&stmts[1..]),
            _ => Err(CompilationError::structure(
                decl.body.span,
                format!("Expected \"{USE_ASM}\" directive at the start of the module"),
            )),
        }
    }
}

fn is_use_asm(expr: &Expr<'_>) -> bool {
    matches!(
        expr.as_literal().map(|lit| lit.kind),
        Some(LiteralKind::Str(USE_ASM))
    )
}
