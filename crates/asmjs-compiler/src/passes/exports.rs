//! Export linking.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{Expr, Ident, ReturnStmt};
use rustc_hash::FxHashSet;

use crate::output::{Export, Exports};
use crate::symbols::Symbol;

use super::{ModuleCompiler, Result};

impl<'ast> ModuleCompiler<'ast> {
    /// Resolve `return f;` or `return { name: f, ... };`.
    pub(super) fn link_exports(&self, ret: &ReturnStmt<'ast>) -> Result<Exports> {
        let Some(value) = ret.value else {
            return Err(CompilationError::structure(
                ret.span,
                "An asm.js module must return a function or an object of functions",
            ));
        };

        match *value {
            Expr::Ident(ident) => Ok(Exports::Single(self.exported_function(ident)?)),
            Expr::Object(object) => {
                if object.properties.is_empty() {
                    return Err(CompilationError::structure(
                        object.span,
                        "An asm.js module must export at least one function",
                    ));
                }
                let mut seen = FxHashSet::default();
                let mut exports = Vec::with_capacity(object.properties.len());
                for property in object.properties {
                    if !seen.insert(property.key.name) {
                        return Err(CompilationError::structure(
                            property.key.span,
                            format!("Export '{}' is defined more than once", property.key),
                        ));
                    }
                    let Some(ident) = property.value.as_ident() else {
                        return Err(CompilationError::structure(
                            property.value.span(),
                            format!("Export '{}' must name a module function", property.key),
                        ));
                    };
                    exports.push(Export {
                        name: property.key.name.to_string(),
                        function: self.exported_function(ident)?,
                    });
                }
                Ok(Exports::Named(exports))
            }
            _ => Err(CompilationError::structure(
                value.span(),
                "An asm.js module must return a function or an object of functions",
            )),
        }
    }

    fn exported_function(&self, ident: Ident<'ast>) -> Result<u32> {
        match self.ctx.lookup(ident.name) {
            Some(Symbol::ModuleFunction(index)) => Ok(index),
            Some(other) => Err(CompilationError::type_mismatch(
                ident.span,
                format!("Only module functions can be exported; '{ident}' is a {}", other.describe()),
            )),
            None => Err(CompilationError::link(
                ident.span,
                format!("Exported name '{ident}' is not defined"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::output::Exports;
    use crate::testing::{compile_source, compile_source_err};
    use asmjs_core::ErrorCategory;

    #[test]
    fn named_exports_keep_source_order() {
        let module = compile_source(
            r#"function M() {
                "use asm";
                function a() {}
                function b() {}
                return { second: b, first: a, again: b };
            }"#,
        );
        assert_eq!(module.exports.get("second"), Some(1));
        assert_eq!(module.exports.get("first"), Some(0));
        assert_eq!(module.exports.get("again"), Some(1));
        let Exports::Named(exports) = &module.exports else {
            panic!("expected named exports");
        };
        assert_eq!(exports[0].name, "second");
    }

    #[test]
    fn empty_export_object_is_rejected() {
        let err = compile_source_err(r#"function M() { "use asm"; function a() {} return {}; }"#);
        assert!(err.message().contains("at least one function"));
    }

    #[test]
    fn duplicate_export_names_are_rejected() {
        let err = compile_source_err(
            r#"function M() { "use asm"; function a() {} return { x: a, x: a }; }"#,
        );
        assert!(err.message().contains("more than once"));
    }

    #[test]
    fn only_functions_are_exported() {
        let err = compile_source_err(
            r#"function M() { "use asm"; var v = 0; function a() {} return { v: v }; }"#,
        );
        assert_eq!(err.category(), ErrorCategory::Type);
        let err = compile_source_err(r#"function M() { "use asm"; function a() {} return b; }"#);
        assert_eq!(err.category(), ErrorCategory::Link);
    }

    #[test]
    fn export_must_be_name_or_object() {
        let err = compile_source_err(r#"function M() { "use asm"; function a() {} return 0; }"#);
        assert_eq!(err.category(), ErrorCategory::Structure);
    }
}
