//! Bytecode chunk for compiled functions.
//!
//! A `BytecodeChunk` holds the instruction words of one asm.js function
//! together with line information and statement markers for debugging.

use asmjs_core::Span;

use super::OpCode;

/// Source range covered by one statement's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementMarker {
    /// Word offset of the first instruction of the statement.
    pub start: u32,
    /// Word offset one past the last instruction of the statement.
    pub end: u32,
    pub span: Span,
}

/// A decoded view of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    pub offset: usize,
    pub op: OpCode,
    pub operands: &'a [u32],
}

/// A chunk of compiled bytecode for a single function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BytecodeChunk {
    /// Instruction words.
    code: Vec<u32>,
    /// Line numbers for debugging (parallel to code).
    lines: Vec<u32>,
    markers: Vec<StatementMarker>,
}

impl BytecodeChunk {
    /// Create a new empty bytecode chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bytecode chunk with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: Vec::with_capacity(capacity),
            lines: Vec::with_capacity(capacity),
            markers: Vec::new(),
        }
    }

    /// Write an instruction and return its offset.
    pub fn write_op(&mut self, op: OpCode, operands: &[u32], line: u32) -> usize {
        debug_assert!(
            op.operand_count().is_none_or(|count| count == operands.len()),
            "{} expects {:?} operands, got {}",
            op.name(),
            op.operand_count(),
            operands.len()
        );
        let offset = self.code.len();
        let header = (u32::from(u16::from(op)) << 16) | (operands.len() as u32 & 0xFFFF);
        self.code.push(header);
        self.lines.push(line);
        for &operand in operands {
            self.code.push(operand);
            self.lines.push(line);
        }
        offset
    }

    /// Overwrite operand `index` of the instruction at `offset`.
    pub fn patch_operand(&mut self, offset: usize, index: usize, value: u32) {
        self.code[offset + 1 + index] = value;
    }

    /// Overwrite the word at `offset`.
    pub fn patch_word(&mut self, offset: usize, value: u32) {
        self.code[offset] = value;
    }

    /// Record the code range of a statement.
    pub fn push_marker(&mut self, marker: StatementMarker) {
        self.markers.push(marker);
    }

    /// Get current code offset (for label binding).
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Get the instruction words.
    pub fn code(&self) -> &[u32] {
        &self.code
    }

    /// Get the line numbers.
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    /// Get the line number for a given offset.
    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    pub fn markers(&self) -> &[StatementMarker] {
        &self.markers
    }

    /// Get the length of the bytecode in words.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Read a word at the given offset.
    pub fn read_word(&self, offset: usize) -> Option<u32> {
        self.code.get(offset).copied()
    }

    /// Read the opcode of the instruction starting at `offset`.
    pub fn read_op(&self, offset: usize) -> Option<OpCode> {
        self.read_word(offset)
            .and_then(|header| OpCode::from_u16((header >> 16) as u16))
    }

    /// Decode the instruction starting at `offset`.
    pub fn instruction_at(&self, offset: usize) -> Option<Instruction<'_>> {
        let header = self.read_word(offset)?;
        let op = OpCode::from_u16((header >> 16) as u16)?;
        let count = (header & 0xFFFF) as usize;
        let operands = self.code.get(offset + 1..offset + 1 + count)?;
        Some(Instruction {
            offset,
            op,
            operands,
        })
    }

    /// Iterate over all instructions in order.
    pub fn instructions(&self) -> impl Iterator<Item = Instruction<'_>> + '_ {
        let mut offset = 0;
        std::iter::from_fn(move || {
            let instruction = self.instruction_at(offset)?;
            offset += 1 + instruction.operands.len();
            Some(instruction)
        })
    }

    /// Extract all opcodes from the chunk, skipping operands.
    ///
    /// This is useful for testing bytecode sequences without worrying about
    /// specific register numbers or branch targets.
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.instructions().map(|instruction| instruction.op).collect()
    }

    /// Check if this chunk contains exactly the given opcode sequence.
    ///
    /// This ignores operand values, only checking the opcodes themselves.
    /// Panics with a descriptive message if the sequences don't match.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
            actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
        );
    }

    /// Check if this chunk contains the given opcodes (in order, but not necessarily contiguous).
    #[track_caller]
    pub fn assert_contains_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        let mut expected_iter = expected.iter().peekable();

        for op in &actual {
            if expected_iter.peek() == Some(&op) {
                expected_iter.next();
            }
        }

        if expected_iter.peek().is_some() {
            let remaining: Vec<_> = expected_iter.map(|op| op.name()).collect();
            panic!(
                "Missing opcodes in sequence.\nExpected to find: {:?}\nActual bytecode:  {:?}",
                remaining,
                actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_empty() {
        let chunk = BytecodeChunk::new();
        assert!(chunk.is_empty());
        assert_eq!(chunk.len(), 0);
        assert!(chunk.markers().is_empty());
    }

    #[test]
    fn write_op_encodes_header() {
        let mut chunk = BytecodeChunk::new();
        let offset = chunk.write_op(OpCode::LdIntConst, &[3, 42], 7);

        assert_eq!(offset, 0);
        assert_eq!(chunk.len(), 3);
        let header = chunk.read_word(0).unwrap();
        assert_eq!(header >> 16, u32::from(u16::from(OpCode::LdIntConst)));
        assert_eq!(header & 0xFFFF, 2);
        assert_eq!(chunk.read_word(2), Some(42));
        assert_eq!(chunk.line_at(2), Some(7));
    }

    #[test]
    fn patch_operand() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Nop, &[], 1);
        let br = chunk.write_op(OpCode::BrTrueInt, &[0, u32::MAX], 1);
        chunk.patch_operand(br, 1, 9);

        let instruction = chunk.instruction_at(br).unwrap();
        assert_eq!(instruction.op, OpCode::BrTrueInt);
        assert_eq!(instruction.operands, &[0, 9]);
    }

    #[test]
    fn read_word_out_of_bounds() {
        let chunk = BytecodeChunk::new();
        assert_eq!(chunk.read_word(0), None);
        assert_eq!(chunk.instruction_at(0), None);
    }

    #[test]
    fn opcodes_extraction() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::LdSlotInt, &[1, 0], 1);
        chunk.write_op(OpCode::AddInt, &[2, 1, 0], 1);
        chunk.write_op(OpCode::Simd128Op, &[5, 0, 1, 2, 3], 1);
        chunk.write_op(OpCode::Ret, &[], 1);

        let ops = chunk.opcodes();
        assert_eq!(
            ops,
            vec![OpCode::LdSlotInt, OpCode::AddInt, OpCode::Simd128Op, OpCode::Ret]
        );
    }

    #[test]
    fn markers_are_kept_in_order() {
        let mut chunk = BytecodeChunk::new();
        chunk.push_marker(StatementMarker {
            start: 0,
            end: 3,
            span: Span::new(1, 1, 4),
        });
        chunk.push_marker(StatementMarker {
            start: 3,
            end: 5,
            span: Span::new(2, 1, 4),
        });
        assert_eq!(chunk.markers().len(), 2);
        assert_eq!(chunk.markers()[1].start, 3);
    }

    #[test]
    fn assert_opcodes_success() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::LdInt, &[1, 0], 1);
        chunk.write_op(OpCode::ReturnInt, &[1], 1);

        chunk.assert_opcodes(&[OpCode::LdInt, OpCode::ReturnInt]);
    }

    #[test]
    #[should_panic(expected = "Bytecode mismatch")]
    fn assert_opcodes_failure() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::LdInt, &[1, 0], 1);

        chunk.assert_opcodes(&[OpCode::LdDb]);
    }

    #[test]
    fn assert_contains_opcodes_success() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::LdSlotInt, &[1, 0], 1);
        chunk.write_op(OpCode::LdIntConst, &[2, 5], 1);
        chunk.write_op(OpCode::AddInt, &[3, 1, 2], 1);
        chunk.write_op(OpCode::StSlotInt, &[0, 3], 1);

        chunk.assert_contains_opcodes(&[OpCode::LdSlotInt, OpCode::AddInt, OpCode::StSlotInt]);
    }

    #[test]
    #[should_panic(expected = "Missing opcodes")]
    fn assert_contains_opcodes_failure() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::LdInt, &[1, 0], 1);

        chunk.assert_contains_opcodes(&[OpCode::LdInt, OpCode::SubInt]);
    }
}
