//! asm.js Compiler
//!
//! Validates an asm.js module against the asm.js type system and lowers each
//! function to register-based bytecode.
//!
//! ## Architecture
//!
//! - **Declarations**: module parameters, globals, imports, heap views,
//!   function names and function tables are bound before any body compiles
//! - **Functions**: each body is type checked and emitted in one walk, after
//!   a constant pre-scan seals its constant pools
//! - **Linking**: tables and exports are checked against the final function
//!   signatures, then the memory layout is computed
//!
//! ## Modules
//!
//! - [`builtins`]: Math, SIMD and typed-array members of the stdlib object
//! - [`bytecode`]: Opcodes and the bytecode buffer
//! - [`context`]: Module-wide compilation state
//! - `dump`: `Display` listings of chunks, functions and modules
//! - [`emit`]: Label-aware bytecode emitter
//! - [`layout`]: Module memory layout
//! - [`output`]: Compiled module descriptor
//! - [`passes`]: The module compilation passes
//! - [`registers`]: Per-class register allocation
//! - [`signature`]: Lazily fixed function signatures
//! - [`symbols`]: Name bindings
//! - [`types`]: The asm.js type lattice

pub mod builtins;
pub mod bytecode;
pub mod context;
mod dump;
pub mod emit;
mod expr;
mod expr_info;
mod function;
pub mod layout;
pub mod options;
pub mod output;
pub mod passes;
pub mod registers;
pub mod signature;
mod stmt;
pub mod symbols;
pub mod types;

#[cfg(test)]
mod testing;

pub use bytecode::{BytecodeChunk, Instruction, OpCode};
pub use emit::{BreakError, BytecodeEmitter};
pub use expr_info::ExprInfo;
pub use layout::{MemoryLayout, Region};
pub use options::CompilerOptions;
pub use output::{
    CompiledFunction, CompiledModule, Export, Exports, FunctionFlags, FunctionInfo, ModuleFlags,
    ModuleInfo,
};
pub use passes::compile_module;
pub use types::{AsmType, ReturnType, StorageType};

// Re-export CompilationError from core for convenience
pub use asmjs_core::CompilationError;
