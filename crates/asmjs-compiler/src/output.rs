//! Compiled module output.
//!
//! Everything a host needs to instantiate a validated module: one opcode
//! stream and metadata record per function, the function tables, the
//! import and export bindings, and the memory layout descriptor.

use bitflags::bitflags;

use crate::bytecode::BytecodeChunk;
use crate::layout::MemoryLayout;
use crate::registers::RegisterUsage;
use crate::symbols::ConstValue;
use crate::types::{ReturnType, SimdBits, StorageType};

bitflags! {
    /// Per-function properties the runtime needs to set up a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionFlags: u8 {
        /// The function reads or writes the heap.
        const USES_HEAP = 1 << 0;
        /// The heap may be replaced while the function runs.
        const HEAP_RESIZABLE = 1 << 1;
    }
}

bitflags! {
    /// Module-wide properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModuleFlags: u8 {
        /// Some function accesses the heap buffer.
        const USES_HEAP_BUFFER = 1 << 0;
        /// The module defines a change-heap function.
        const USES_CHANGE_HEAP = 1 << 1;
        /// The module binds members of `stdlib.SIMD`.
        const SIMD_ENABLED = 1 << 2;
    }
}

/// Values of a function's constant registers, in register order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPools {
    pub int: Vec<i32>,
    pub float: Vec<f32>,
    pub double: Vec<f64>,
    pub simd: Vec<SimdBits>,
}

/// Metadata record of one function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    pub args: Vec<StorageType>,
    pub ret: ReturnType,
    pub registers: RegisterUsage,
    pub constants: ConstantPools,
    /// Outgoing argument slots reserved by the deepest chain of nested calls.
    pub arg_out_depth: u32,
    pub flags: FunctionFlags,
}

/// A validated function.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    pub name: String,
    pub chunk: BytecodeChunk,
    pub info: FunctionInfo,
}

/// A function-pointer table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub size: u32,
    /// Module function index of each entry.
    pub functions: Vec<u32>,
}

/// A foreign function bound by `var f = foreign.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFunction {
    pub name: String,
    pub field: String,
}

/// A foreign value read by `var x = foreign.name|0` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantImport {
    pub name: String,
    pub field: String,
    pub storage: StorageType,
    /// Index into the storage class's layout region.
    pub slot: u32,
}

/// Everything the module reads from its foreign object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Imports {
    pub functions: Vec<ImportFunction>,
    pub constants: Vec<ConstantImport>,
}

/// A mutable module variable and its initial value.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVar {
    pub name: String,
    pub storage: StorageType,
    /// Index into the storage class's layout region.
    pub slot: u32,
    pub init: ConstValue,
}

/// A named export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub function: u32,
}

/// The module's return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exports {
    /// `return f;`
    Single(u32),
    /// `return { name: f, ... };`
    Named(Vec<Export>),
}

impl Exports {
    /// Function index exported under `name`.
    pub fn get(&self, name: &str) -> Option<u32> {
        match self {
            Exports::Single(_) => None,
            Exports::Named(exports) => exports
                .iter()
                .find(|export| export.name == name)
                .map(|export| export.function),
        }
    }
}

/// Module-wide summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Number of declared module parameters.
    pub arg_count: u32,
    /// Module variables and constant imports with a layout slot.
    pub var_count: u32,
    /// Largest constant heap byte offset accessed.
    pub max_heap_access: u32,
    pub flags: ModuleFlags,
    /// Stdlib members bound by the module, in declaration order.
    pub builtins: Vec<String>,
}

/// A validated asm.js module.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledModule {
    pub functions: Vec<CompiledFunction>,
    pub tables: Vec<TableInfo>,
    pub imports: Imports,
    pub globals: Vec<GlobalVar>,
    pub exports: Exports,
    pub layout: MemoryLayout,
    pub info: ModuleInfo,
}

impl CompiledModule {
    pub fn function(&self, name: &str) -> Option<&CompiledFunction> {
        self.functions.iter().find(|function| function.name == name)
    }

    /// Look up an export by name and return its function.
    pub fn export(&self, name: &str) -> Option<&CompiledFunction> {
        let index = self.exports.get(name)?;
        self.functions.get(index as usize)
    }
}
