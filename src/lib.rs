//! asm.js validating compiler.
//!
//! Parses an asm.js module, validates it against the asm.js type system and
//! lowers every function to register-based bytecode.
//!
//! # Example
//!
//! ```
//! let module = asmjs::compile(r#"
//!     function Module(stdlib, foreign, heap) {
//!         "use asm";
//!         var imul = stdlib.Math.imul;
//!         function square(x) {
//!             x = x|0;
//!             return imul(x, x)|0;
//!         }
//!         return { square: square };
//!     }
//! "#).unwrap();
//!
//! assert_eq!(module.exports.get("square"), Some(0));
//! ```
//!
//! The lower-level crates are re-exported for callers that manage the AST
//! arena themselves:
//!
//! ```
//! use asmjs::{CompilerOptions, compile_module};
//! use asmjs::parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let program = Parser::parse(r#"function M() { "use asm"; function f() {} return f; }"#, &arena).unwrap();
//! let module = compile_module(&program, &CompilerOptions::default()).unwrap();
//! assert_eq!(module.functions.len(), 1);
//! ```

use bumpalo::Bump;

pub use asmjs_compiler as compiler;
pub use asmjs_core as core;
pub use asmjs_parser as parser;

pub use asmjs_compiler::{
    AsmType, BytecodeChunk, CompiledFunction, CompiledModule, CompilerOptions, Export, Exports,
    FunctionFlags, FunctionInfo, Instruction, MemoryLayout, ModuleFlags, ModuleInfo, OpCode,
    Region, ReturnType, StorageType, compile_module,
};
pub use asmjs_core::{AsmJsError, CompilationError, ErrorCategory, ParseError, ParseErrors, Span};

/// Result of a source-to-bytecode compile.
pub type Result<T> = std::result::Result<T, AsmJsError>;

/// Parse and compile an asm.js module with the default options.
pub fn compile(source: &str) -> Result<CompiledModule> {
    compile_with_options(source, &CompilerOptions::default())
}

/// Parse and compile an asm.js module.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_with_options(source: &str, options: &CompilerOptions) -> Result<CompiledModule> {
    let arena = Bump::new();
    let program = {
        #[cfg(feature = "profiling")]
        profiling::scope!("parse");

        asmjs_parser::Parser::parse(source, &arena)?
    };

    #[cfg(feature = "profiling")]
    profiling::scope!("compile");

    Ok(compile_module(&program, options)?)
}
