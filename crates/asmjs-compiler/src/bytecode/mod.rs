//! Bytecode types for the asm.js compiler.
//!
//! - [`OpCode`] - The typed instruction set
//! - [`BytecodeChunk`] - Compiled instruction words for a function

mod chunk;
mod opcode;

pub use chunk::{BytecodeChunk, Instruction, StatementMarker};
pub use opcode::OpCode;
