//! Module compilation passes.
//!
//! A module compiles in six passes over one immutable tree:
//!
//! 1. [`header`]: module parameters, `"use asm"`, closure alias
//! 2. [`declarations`]: globals, imports, views, function names and
//!    function-table names/sizes, in source order
//! 3. function pass: every function body (the first may be accepted as the
//!    [`change_heap`] function instead)
//! 4. [`tables`]: every table entry names a function of the table's signature
//! 5. [`exports`]: the module's trailing `return`
//! 6. layout: region offsets from the final slot counts
//!
//! Any error aborts the module; no partial output escapes.

mod change_heap;
mod declarations;
mod exports;
mod header;
mod tables;

use asmjs_core::CompilationError;
use asmjs_parser::Program;
use asmjs_parser::ast::{FunctionDecl, Stmt};

use crate::bytecode::BytecodeChunk;
use crate::context::ModuleContext;
use crate::function::FunctionCompiler;
use crate::layout::MemoryLayout;
use crate::options::CompilerOptions;
use crate::output::{
    CompiledFunction, CompiledModule, ConstantImport, Exports, FunctionInfo, GlobalVar,
    ImportFunction, Imports, ModuleInfo, TableInfo,
};
use crate::types::ReturnType;

type Result<T> = std::result::Result<T, CompilationError>;

/// Validate and compile an asm.js module.
///
/// The program must consist of exactly one module function.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_module<'ast>(
    program: &Program<'ast>,
    options: &CompilerOptions,
) -> Result<CompiledModule> {
    let decl = module_function(program)?;
    let mut compiler = ModuleCompiler::new(decl, options);

    let export = {
        #[cfg(feature = "profiling")]
        profiling::scope!("declarations");

        let body = compiler.check_header()?;
        compiler.declare(body)?
    };

    let functions = {
        #[cfg(feature = "profiling")]
        profiling::scope!("functions");

        compiler.compile_functions()?
    };

    compiler.validate_tables()?;
    let exports = compiler.link_exports(export)?;
    Ok(compiler.finish(functions, exports))
}

/// The single top-level function declaration of a program.
fn module_function<'ast>(program: &Program<'ast>) -> Result<&'ast FunctionDecl<'ast>> {
    let mut items = program
        .items()
        .iter()
        .filter(|item| !matches!(item, Stmt::Empty(_)));
    match (items.next(), items.next()) {
        (Some(Stmt::Function(decl)), None) => Ok(*decl),
        (Some(_), Some(extra)) => Err(CompilationError::structure(
            extra.span(),
            "An asm.js program must contain only the module function",
        )),
        (Some(other), None) => Err(CompilationError::structure(
            other.span(),
            "Expected an asm.js module function",
        )),
        (None, _) => Err(CompilationError::structure(
            program.span(),
            "Expected an asm.js module function",
        )),
    }
}

/// Drives the passes of one module compile.
pub(crate) struct ModuleCompiler<'ast> {
    ctx: ModuleContext<'ast>,
    decl: &'ast FunctionDecl<'ast>,
}

impl<'ast> ModuleCompiler<'ast> {
    fn new(decl: &'ast FunctionDecl<'ast>, options: &CompilerOptions) -> Self {
        Self {
            ctx: ModuleContext::new(options),
            decl,
        }
    }

    /// Compile every module function in declaration order.
    fn compile_functions(&mut self) -> Result<Vec<CompiledFunction>> {
        let count = self.ctx.functions.len();
        if count > self.ctx.options.max_function_count {
            let span = self.ctx.functions[self.ctx.options.max_function_count].decl.span;
            return Err(CompilationError::out_of_range(
                span,
                format!(
                    "Module declares {count} functions; at most {} are allowed",
                    self.ctx.options.max_function_count
                ),
            ));
        }

        let mut compiled = Vec::with_capacity(count);
        for index in 0..count {
            if index == 0 && self.accept_change_heap() {
                compiled.push(self.change_heap_function());
                continue;
            }
            compiled.push(FunctionCompiler::compile(&mut self.ctx, index as u32)?);
        }
        Ok(compiled)
    }

    /// The accepted change-heap function: no code, no metadata to check.
    fn change_heap_function(&self) -> CompiledFunction {
        CompiledFunction {
            name: self.ctx.functions[0].name.name.to_string(),
            chunk: BytecodeChunk::new(),
            info: FunctionInfo {
                args: Vec::new(),
                ret: ReturnType::Void,
                registers: Default::default(),
                constants: Default::default(),
                arg_out_depth: 0,
                flags: Default::default(),
            },
        }
    }

    fn finish(self, functions: Vec<CompiledFunction>, exports: Exports) -> CompiledModule {
        let ctx = self.ctx;
        let layout = MemoryLayout::compute(&ctx.layout_counts());

        let tables = ctx
            .tables
            .iter()
            .map(|table| TableInfo {
                name: table.name.name.to_string(),
                size: table.size,
                functions: table.functions.clone(),
            })
            .collect();
        let imports = Imports {
            functions: ctx
                .imports
                .iter()
                .map(|import| ImportFunction {
                    name: import.name.name.to_string(),
                    field: import.field.to_string(),
                })
                .collect(),
            constants: ctx
                .constant_imports
                .iter()
                .map(|import| ConstantImport {
                    name: import.name.name.to_string(),
                    field: import.field.to_string(),
                    storage: import.storage,
                    slot: import.slot,
                })
                .collect(),
        };
        let globals = ctx
            .globals
            .iter()
            .map(|global| GlobalVar {
                name: global.name.name.to_string(),
                storage: global.storage,
                slot: global.slot,
                init: global.init,
            })
            .collect();
        let info = ModuleInfo {
            arg_count: self.decl.params.len() as u32,
            var_count: ctx.var_count(),
            max_heap_access: ctx.max_heap_access,
            flags: ctx.flags,
            builtins: ctx.builtins,
        };

        CompiledModule {
            functions,
            tables,
            imports,
            globals,
            exports,
            layout,
            info,
        }
    }
}
