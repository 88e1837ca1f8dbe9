//! Numeric literals.

use asmjs_core::CompilationError;
use asmjs_parser::ast::Expr;

use crate::expr_info::ExprInfo;
use crate::function::FunctionCompiler;
use crate::types::{AsmType, LiteralClass};

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// A literal lives in its constant register; nothing is emitted.
    pub(super) fn compile_literal(&mut self, expr: &Expr<'ast>) -> Result<ExprInfo> {
        let span = expr.span();
        let class = LiteralClass::of_expr(expr);
        match class {
            LiteralClass::Double(value) => {
                let loc = self.double_constant(value, span)?;
                Ok(ExprInfo::new(AsmType::DoubleLit, loc))
            }
            LiteralClass::Int(_) | LiteralClass::MinInt | LiteralClass::Unsigned(_) => {
                let (Some(bits), Some(ty)) = (class.int_bits(), class.asm_type()) else {
                    return Err(CompilationError::internal(span, "unclassified int literal"));
                };
                let loc = self.int_constant(bits, span)?;
                Ok(ExprInfo::new(ty, loc))
            }
            LiteralClass::OutOfRange => Err(CompilationError::out_of_range(
                span,
                "Integer literal is out of range for a 32-bit value",
            )),
            LiteralClass::NotNumeric => Err(CompilationError::type_mismatch(
                span,
                "Only numeric literals are allowed",
            )),
        }
    }
}
