//! Test helpers shared by the compiler's unit tests.

use asmjs_parser::Parser;
use bumpalo::Bump;

use crate::options::CompilerOptions;
use crate::output::CompiledModule;
use crate::passes::compile_module;
use asmjs_core::CompilationError;

/// Bindings available to every [`compile_body`] source.
const PRELUDE: &str = r#"
    var HEAP8 = new stdlib.Int8Array(heap);
    var HEAPU8 = new stdlib.Uint8Array(heap);
    var HEAP16 = new stdlib.Int16Array(heap);
    var HEAPU16 = new stdlib.Uint16Array(heap);
    var HEAP32 = new stdlib.Int32Array(heap);
    var HEAPU32 = new stdlib.Uint32Array(heap);
    var HEAPF32 = new stdlib.Float32Array(heap);
    var HEAPF64 = new stdlib.Float64Array(heap);
    var imul = stdlib.Math.imul;
    var fround = stdlib.Math.fround;
    var sqrt = stdlib.Math.sqrt;
    var abs = stdlib.Math.abs;
    var min = stdlib.Math.min;
    var max = stdlib.Math.max;
    var floor = stdlib.Math.floor;
    var ceil = stdlib.Math.ceil;
    var PI = stdlib.Math.PI;
    var print = foreign.print;
    var i4 = stdlib.SIMD.Int32x4;
    var i4check = i4.check;
    var i4add = i4.add;
    var i4splat = i4.splat;
    var i4extractLane = i4.extractLane;
    var i4load = i4.load;
    var i4store = i4.store;
    var f4 = stdlib.SIMD.Float32x4;
    var f4check = f4.check;
    var f4add = f4.add;
    var f4splat = f4.splat;
"#;

fn parse_and_compile(
    source: &str,
    options: &CompilerOptions,
) -> Result<CompiledModule, CompilationError> {
    let arena = Bump::new();
    let program = Parser::parse(source, &arena)
        .unwrap_or_else(|errors| panic!("test source failed to parse: {errors:?}"));
    compile_module(&program, options)
}

/// Compile a complete module with the given options.
pub fn compile_source_with(
    source: &str,
    options: &CompilerOptions,
) -> Result<CompiledModule, CompilationError> {
    parse_and_compile(source, options)
}

/// Compile a complete module that must validate.
pub fn compile_source(source: &str) -> CompiledModule {
    compile_source_with(source, &CompilerOptions::default())
        .unwrap_or_else(|err| panic!("module failed to compile: {err}"))
}

/// Compile a complete module that must be rejected.
pub fn compile_source_err(source: &str) -> CompilationError {
    match compile_source_with(source, &CompilerOptions::default()) {
        Ok(_) => panic!("module compiled, expected an error"),
        Err(err) => err,
    }
}

/// Wrap function declarations in a module with the standard prelude and
/// export `f`.
pub fn wrap_body(body: &str) -> String {
    format!(
        "function M(stdlib, foreign, heap) {{\n\"use asm\";\n{PRELUDE}\n{body}\nreturn f;\n}}"
    )
}

/// Compile function declarations that must validate.
pub fn compile_body(body: &str) -> CompiledModule {
    compile_source(&wrap_body(body))
}

/// Compile function declarations that must be rejected.
pub fn compile_body_err(body: &str) -> CompilationError {
    compile_source_err(&wrap_body(body))
}
