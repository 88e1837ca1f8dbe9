//! Function-pointer table validation.
//!
//! Runs after every function body has compiled, so each element's signature
//! is final. Calls through a table may already have fixed the table's
//! signature; the elements must agree with it.

use asmjs_core::CompilationError;
use asmjs_parser::ast::Expr;

use crate::symbols::Symbol;

use super::{ModuleCompiler, Result};

impl<'ast> ModuleCompiler<'ast> {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn validate_tables(&mut self) -> Result<()> {
        for table_index in 0..self.ctx.tables.len() {
            let elements = self.ctx.tables[table_index].elements;
            let mut functions = Vec::with_capacity(elements.len());

            for element in elements {
                let function = self.table_element(element)?;
                let signature = self.ctx.functions[function as usize].signature.clone();
                let table = &mut self.ctx.tables[table_index];
                if !table.signature.unify(&signature) {
                    return Err(CompilationError::signature(
                        element.span(),
                        format!(
                            "Function '{}' has signature {signature}, but table '{}' holds {}",
                            self.ctx.functions[function as usize].name, table.name, table.signature
                        ),
                    ));
                }
                functions.push(function);
            }

            self.ctx.tables[table_index].functions = functions;
        }
        Ok(())
    }

    fn table_element(&self, element: &Expr<'ast>) -> Result<u32> {
        let Some(ident) = element.as_ident() else {
            return Err(CompilationError::structure(
                element.span(),
                "Function table elements must be function names",
            ));
        };
        match self.ctx.lookup(ident.name) {
            Some(Symbol::ModuleFunction(index)) if self.ctx.functions[index as usize].change_heap => {
                Err(CompilationError::structure(
                    ident.span,
                    format!("The change-heap function '{ident}' cannot be placed in a table"),
                ))
            }
            Some(Symbol::ModuleFunction(index)) => Ok(index),
            Some(other) => Err(CompilationError::type_mismatch(
                ident.span,
                format!("{} '{ident}' cannot be placed in a function table", other.describe()),
            )),
            None => Err(CompilationError::link(
                ident.span,
                format!("'{ident}' is not defined"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{compile_source, compile_source_err};
    use asmjs_core::ErrorCategory;

    #[test]
    fn elements_resolve_to_function_indices() {
        let module = compile_source(
            r#"function M() {
                "use asm";
                function a(x) { x = x|0; return x|0; }
                function b(x) { x = x|0; return (x + 1)|0; }
                function f(i) { i = i|0; return t[i & 1](i)|0; }
                var t = [b, a];
                return f;
            }"#,
        );
        assert_eq!(module.tables.len(), 1);
        assert_eq!(module.tables[0].size, 2);
        assert_eq!(module.tables[0].functions, vec![1, 0]);
    }

    #[test]
    fn mixed_signatures_are_rejected() {
        let err = compile_source_err(
            r#"function M() {
                "use asm";
                function a(x) { x = x|0; return x|0; }
                function b(x) { x = +x; return +x; }
                var t = [a, b];
                return a;
            }"#,
        );
        assert_eq!(err.category(), ErrorCategory::Signature);
        assert!(err.message().contains("table 't'"));
    }

    #[test]
    fn elements_must_agree_with_call_sites() {
        let err = compile_source_err(
            r#"function M() {
                "use asm";
                function a(x) { x = x|0; return x|0; }
                function f() { return +t[0 & 0](1); }
                var t = [a];
                return f;
            }"#,
        );
        assert_eq!(err.category(), ErrorCategory::Signature);
    }

    #[test]
    fn elements_must_be_functions() {
        let err = compile_source_err(
            r#"function M() {
                "use asm";
                var x = 0;
                function a() {}
                var t = [x];
                return a;
            }"#,
        );
        assert!(err.message().contains("cannot be placed in a function table"));
    }
}
