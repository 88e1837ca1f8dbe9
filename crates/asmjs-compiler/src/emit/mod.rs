//! Bytecode emitter for the asm.js compiler.
//!
//! The [`BytecodeEmitter`] appends typed instructions to a function's
//! [`BytecodeChunk`] and owns the bookkeeping that can only be settled once
//! the whole body has been emitted:
//!
//! - branch targets, emitted against symbolic [`Label`]s;
//! - `StartCall` placeholders, whose byte size is known only after the
//!   callee's arguments have been marshalled;
//! - statement markers.
//!
//! # Example
//!
//! ```ignore
//! let mut emitter = BytecodeEmitter::new();
//! let exit = emitter.new_label();
//! emitter.emit_branch(OpCode::BrTrueInt, &[cond], exit);
//! emitter.emit(OpCode::LdIntConst, &[dst, 1]);
//! emitter.bind_label(exit);
//! let chunk = emitter.finish()?;
//! ```

mod labels;

use asmjs_core::Span;
use thiserror::Error;

use crate::bytecode::{BytecodeChunk, OpCode, StatementMarker};
pub use labels::BreakableKind;
use labels::LabelManager;

/// Placeholder written into operands that are patched later.
const PLACEHOLDER: u32 = u32::MAX;

/// Emits bytecode instructions for a single function.
#[derive(Debug, Default)]
pub struct BytecodeEmitter {
    /// The bytecode chunk being built
    chunk: BytecodeChunk,

    /// Label and break/continue management
    labels: LabelManager,

    /// `StartCall` instructions and their resolved byte sizes
    start_calls: Vec<(usize, Option<u32>)>,

    /// Statements currently being emitted (innermost last)
    open_statements: Vec<(u32, Span)>,

    /// Current source line for debug info
    current_line: u32,
}

impl BytecodeEmitter {
    /// Create a new bytecode emitter.
    pub fn new() -> Self {
        Self {
            current_line: 1,
            ..Self::default()
        }
    }

    /// Set current source line for debug info.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    /// Get current source line.
    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Emit an instruction and return its offset.
    pub fn emit(&mut self, op: OpCode, operands: &[u32]) -> usize {
        self.chunk.write_op(op, operands, self.current_line)
    }

    /// Get current bytecode offset.
    pub fn current_offset(&self) -> usize {
        self.chunk.current_offset()
    }

    // ==========================================================================
    // Labels and Branches
    // ==========================================================================

    /// Allocate a new, unbound label.
    pub fn new_label(&mut self) -> Label {
        self.labels.new_label()
    }

    /// Bind a label to the current position.
    pub fn bind_label(&mut self, label: Label) {
        let offset = self.chunk.current_offset() as u32;
        self.labels.bind(label, offset);
    }

    /// Emit a branching instruction whose last operand is `target`.
    ///
    /// `operands` holds the operands preceding the target.
    pub fn emit_branch(&mut self, op: OpCode, operands: &[u32], target: Label) -> usize {
        debug_assert_eq!(op.label_operand(), Some(operands.len()));
        let mut words = Vec::with_capacity(operands.len() + 1);
        words.extend_from_slice(operands);
        words.push(PLACEHOLDER);
        let offset = self.emit(op, &words);
        self.labels.add_fixup(offset + 1 + operands.len(), target);
        offset
    }

    /// Emit an unconditional branch.
    pub fn emit_br(&mut self, target: Label) {
        self.emit_branch(OpCode::Br, &[], target);
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    /// Emit a `StartCall` whose byte size is filled in later.
    pub fn emit_start_call(&mut self) -> StartCallSite {
        let offset = self.emit(OpCode::StartCall, &[PLACEHOLDER]);
        self.start_calls.push((offset, None));
        StartCallSite(self.start_calls.len() - 1)
    }

    /// Record the final byte size of a `StartCall` placeholder.
    pub fn set_call_bytes(&mut self, site: StartCallSite, bytes: u32) {
        if let Some(entry) = self.start_calls.get_mut(site.0) {
            entry.1 = Some(bytes);
        }
    }

    // ==========================================================================
    // Loop and Switch Control (Break/Continue)
    // ==========================================================================

    /// Enter a breakable statement.
    ///
    /// `names` are the statement labels attached to it.
    pub fn enter_breakable(
        &mut self,
        kind: BreakableKind,
        names: Vec<String>,
        break_label: Label,
        continue_label: Option<Label>,
    ) {
        self.labels.enter(kind, names, break_label, continue_label);
    }

    /// Exit the innermost breakable statement.
    pub fn exit_breakable(&mut self) {
        self.labels.exit();
    }

    /// Emit a break statement.
    ///
    /// Returns an error if no enclosing statement accepts the break.
    pub fn emit_break(&mut self, name: Option<&str>) -> Result<(), BreakError> {
        let target = self.labels.break_target(name)?;
        self.emit_br(target);
        Ok(())
    }

    /// Emit a continue statement.
    ///
    /// Returns an error if not inside a matching loop.
    pub fn emit_continue(&mut self, name: Option<&str>) -> Result<(), BreakError> {
        let target = self.labels.continue_target(name)?;
        self.emit_br(target);
        Ok(())
    }

    /// Check if currently inside a loop.
    pub fn in_loop(&self) -> bool {
        self.labels.in_loop()
    }

    /// Check if currently inside any breakable context (loop or switch).
    pub fn in_breakable(&self) -> bool {
        self.labels.in_breakable()
    }

    /// Whether `name` already labels an enclosing statement.
    pub fn has_statement_label(&self, name: &str) -> bool {
        self.labels.has_name(name)
    }

    // ==========================================================================
    // Statement Markers
    // ==========================================================================

    /// Open a statement marker at the current position.
    pub fn begin_statement(&mut self, span: Span) {
        self.set_line(span.line);
        let start = self.chunk.current_offset() as u32;
        self.open_statements.push((start, span));
    }

    /// Close the innermost statement marker.
    pub fn end_statement(&mut self) {
        if let Some((start, span)) = self.open_statements.pop() {
            let end = self.chunk.current_offset() as u32;
            self.chunk.push_marker(StatementMarker { start, end, span });
        }
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    /// Resolve labels and `StartCall` sizes and return the finished chunk.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn finish(mut self) -> Result<BytecodeChunk, EmitError> {
        for (word, label) in self.labels.take_fixups() {
            let offset = self
                .labels
                .offset_of(label)
                .ok_or(EmitError::UnboundLabel(label.0))?;
            self.chunk.patch_word(word, offset);
        }

        for (offset, bytes) in std::mem::take(&mut self.start_calls) {
            let bytes = bytes.ok_or(EmitError::UnpatchedStartCall(offset))?;
            self.chunk.patch_operand(offset, 0, bytes);
        }

        Ok(self.chunk)
    }

    /// Get current chunk size (for debugging).
    pub fn code_size(&self) -> usize {
        self.chunk.len()
    }
}

/// A symbolic branch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub(crate) u32);

/// A `StartCall` placeholder awaiting its byte size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartCallSite(usize);

/// Error from break/continue statements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakError {
    /// Continue used outside of a loop (switches don't support continue).
    #[error("continue statement not inside a loop")]
    NotInLoop,
    /// Break used outside of a breakable context (loop or switch).
    #[error("break statement not inside a loop or switch")]
    NotInBreakable,
    /// A labelled jump names no enclosing statement.
    #[error("undefined label '{0}'")]
    UnknownLabel(String),
    /// `continue label` names a statement that is not a loop.
    #[error("label '{0}' does not name a loop")]
    LabelNotLoop(String),
}

/// Error from finishing a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("label {0} was never bound")]
    UnboundLabel(u32),
    #[error("StartCall at offset {0} was never sized")]
    UnpatchedStartCall(usize),
}
