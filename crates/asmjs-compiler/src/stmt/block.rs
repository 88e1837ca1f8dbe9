//! Block statement compilation.
//!
//! asm.js has no block scoping: every local is declared at the top of the
//! function, so a block is just its statements in order.

use asmjs_parser::ast::Block;

use crate::function::FunctionCompiler;

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_block(&mut self, block: &Block<'ast>) -> Result<()> {
        self.compile_stmts(block.stmts)
    }
}
