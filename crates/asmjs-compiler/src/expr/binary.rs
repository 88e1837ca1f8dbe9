//! Binary operators: dispatch and arithmetic.
//!
//! Arithmetic picks its instruction from the operand types:
//!
//! | operands            | `+ -`   | `*`          | `/ %`                 |
//! |---------------------|---------|--------------|-----------------------|
//! | int, int            | intish  | literal only | signed or unsigned    |
//! | double?, double?    | double  | double       | double                |
//! | float?, float?      | floatish| floatish     | floatish (`/` only)   |

use asmjs_core::CompilationError;
use asmjs_parser::ast::{BinaryExpr, BinaryOp, Expr};

use crate::bytecode::OpCode;
use crate::expr_info::ExprInfo;
use crate::function::FunctionCompiler;
use crate::types::{AsmType, LiteralClass, RegisterClass};

use super::Result;

/// Bound on the magnitude of a literal factor in an int multiply.
const MAX_INT_MULTIPLIER: i64 = 1 << 20;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_binary(&mut self, binary: &BinaryExpr<'ast>) -> Result<ExprInfo> {
        match binary.op {
            BinaryOp::LogicalOr | BinaryOp::LogicalAnd => Err(CompilationError::structure(
                binary.span,
                format!("Operator {} is not allowed; use a conditional expression", binary.op),
            )),
            BinaryOp::StrictEqual | BinaryOp::StrictNotEqual => Err(CompilationError::structure(
                binary.span,
                format!("Operator {} is not allowed; use == or !=", binary.op),
            )),
            BinaryOp::BitwiseOr
            | BinaryOp::BitwiseXor
            | BinaryOp::BitwiseAnd
            | BinaryOp::ShiftLeft
            | BinaryOp::ShiftRight
            | BinaryOp::ShiftRightUnsigned => self.compile_bitwise(binary),
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual => self.compile_comparison(binary),
            BinaryOp::Add | BinaryOp::Sub => self.compile_additive(binary),
            BinaryOp::Mul => self.compile_multiply(binary),
            BinaryOp::Div | BinaryOp::Mod => self.compile_divide(binary),
        }
    }

    fn compile_additive(&mut self, binary: &BinaryExpr<'ast>) -> Result<ExprInfo> {
        let lhs = self.compile_expr(binary.left)?;
        let rhs = self.compile_expr(binary.right)?;
        let lty = additive_operand_type(binary.left, lhs.ty);
        let rty = additive_operand_type(binary.right, rhs.ty);
        let add = binary.op == BinaryOp::Add;

        let (op, ty) = if lty.is_int() && rty.is_int() {
            (if add { OpCode::AddInt } else { OpCode::SubInt }, AsmType::Intish)
        } else if lty.is_maybe_double() && rty.is_maybe_double() {
            (if add { OpCode::AddDb } else { OpCode::SubDb }, AsmType::Double)
        } else if lty.is_maybe_float() && rty.is_maybe_float() {
            (if add { OpCode::AddFlt } else { OpCode::SubFlt }, AsmType::Floatish)
        } else {
            return Err(operand_error(binary, lhs.ty, rhs.ty, "int, double? or float?"));
        };
        Ok(self.emit_binary_op(op, ty, lhs, rhs))
    }

    fn compile_multiply(&mut self, binary: &BinaryExpr<'ast>) -> Result<ExprInfo> {
        let lhs = self.compile_expr(binary.left)?;
        let rhs = self.compile_expr(binary.right)?;

        let (op, ty) = if lhs.ty.is_int() && rhs.ty.is_int() {
            if !is_int_multiplier(binary.left) && !is_int_multiplier(binary.right) {
                return Err(CompilationError::type_mismatch(
                    binary.span,
                    "One operand of an int multiply must be a literal in (-2^20, 2^20); \
                     use Math.imul otherwise",
                ));
            }
            (OpCode::MulInt, AsmType::Intish)
        } else if lhs.ty.is_maybe_double() && rhs.ty.is_maybe_double() {
            (OpCode::MulDb, AsmType::Double)
        } else if lhs.ty.is_maybe_float() && rhs.ty.is_maybe_float() {
            (OpCode::MulFlt, AsmType::Floatish)
        } else {
            return Err(operand_error(binary, lhs.ty, rhs.ty, "int, double? or float?"));
        };
        Ok(self.emit_binary_op(op, ty, lhs, rhs))
    }

    fn compile_divide(&mut self, binary: &BinaryExpr<'ast>) -> Result<ExprInfo> {
        let lhs = self.compile_expr(binary.left)?;
        let rhs = self.compile_expr(binary.right)?;
        let div = binary.op == BinaryOp::Div;

        let (op, ty) = if lhs.ty.is_signed() && rhs.ty.is_signed() {
            (if div { OpCode::DivInt } else { OpCode::RemInt }, AsmType::Intish)
        } else if lhs.ty.is_unsigned() && rhs.ty.is_unsigned() {
            (if div { OpCode::DivUInt } else { OpCode::RemUInt }, AsmType::Intish)
        } else if lhs.ty.is_maybe_double() && rhs.ty.is_maybe_double() {
            (if div { OpCode::DivDb } else { OpCode::RemDb }, AsmType::Double)
        } else if div && lhs.ty.is_maybe_float() && rhs.ty.is_maybe_float() {
            (OpCode::DivFlt, AsmType::Floatish)
        } else {
            let expected = if div {
                "both signed, both unsigned, double? or float?"
            } else {
                "both signed, both unsigned, or double?"
            };
            return Err(operand_error(binary, lhs.ty, rhs.ty, expected));
        };
        Ok(self.emit_binary_op(op, ty, lhs, rhs))
    }

    /// Release both operands and write `op dst, lhs, rhs` into a fresh
    /// temporary of the result's class.
    pub(super) fn emit_binary_op(
        &mut self,
        op: OpCode,
        ty: AsmType,
        lhs: ExprInfo,
        rhs: ExprInfo,
    ) -> ExprInfo {
        self.release(rhs);
        self.release(lhs);
        let class = ty.register_class().unwrap_or(RegisterClass::Int);
        let dst = self.acquire_tmp(class);
        self.emit(op, &[dst.index, lhs.reg(), rhs.reg()]);
        ExprInfo::new(ty, dst)
    }
}

/// Nested `+`/`-` results count as int inside an additive chain.
fn additive_operand_type(expr: &Expr<'_>, ty: AsmType) -> AsmType {
    match *expr {
        Expr::Binary(inner)
            if ty == AsmType::Intish && matches!(inner.op, BinaryOp::Add | BinaryOp::Sub) =>
        {
            AsmType::Int
        }
        _ => ty,
    }
}

fn is_int_multiplier(expr: &Expr<'_>) -> bool {
    match LiteralClass::of_expr(expr) {
        LiteralClass::Int(value) => i64::from(value).abs() < MAX_INT_MULTIPLIER,
        _ => false,
    }
}

fn operand_error(
    binary: &BinaryExpr<'_>,
    lhs: AsmType,
    rhs: AsmType,
    expected: &str,
) -> CompilationError {
    CompilationError::type_mismatch(
        binary.span,
        format!(
            "Operands to {} must be {expected}; got {lhs} and {rhs}",
            binary.op
        ),
    )
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};
    use asmjs_core::ErrorCategory;

    #[test]
    fn int_addition_chain() {
        let module = compile_body(
            "function f(a, b, c) { a = a|0; b = b|0; c = c|0; return (a + b - c)|0; }",
        );
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::AddInt, OpCode::SubInt, OpCode::ReturnInt]);
    }

    #[test]
    fn intish_operand_outside_chain_is_rejected() {
        let err = compile_body_err(
            "function f(a, b) { a = a|0; b = b|0; return ((a * 3) + b)|0; }",
        );
        assert_eq!(err.category(), ErrorCategory::Type);
    }

    #[test]
    fn double_arithmetic() {
        let module = compile_body("function f(x) { x = +x; return +(x * 2.5 + 1.0); }");
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::MulDb, OpCode::AddDb, OpCode::ReturnDb]);
    }

    #[test]
    fn mixed_int_and_double_is_rejected() {
        let err = compile_body_err("function f(x, i) { x = +x; i = i|0; return +(x + i); }");
        assert!(err.message().contains("Operands to +"));
    }

    #[test]
    fn int_multiply_needs_small_literal() {
        compile_body("function f(i) { i = i|0; return (i * 1024)|0; }");
        let err = compile_body_err("function f(i) { i = i|0; return (i * 1048576)|0; }");
        assert!(err.message().contains("Math.imul"));
        let err = compile_body_err("function f(i, j) { i = i|0; j = j|0; return (i * j)|0; }");
        assert_eq!(err.category(), ErrorCategory::Type);
    }

    #[test]
    fn division_needs_matching_signedness() {
        let module = compile_body(
            "function f(i, j) { i = i|0; j = j|0; return ((i>>>0) / (j>>>0))|0; }",
        );
        module.functions[0].chunk.assert_contains_opcodes(&[OpCode::DivUInt]);
        let err = compile_body_err(
            "function f(i, j) { i = i|0; j = j|0; return ((i|0) % (j>>>0))|0; }",
        );
        assert!(err.message().contains("Operands to %"));
    }

    #[test]
    fn float_remainder_is_rejected() {
        let err = compile_body_err(
            "function f(x) { x = fround(x); return fround(x % x); }",
        );
        assert_eq!(err.category(), ErrorCategory::Type);
    }

    #[test]
    fn logical_operators_are_rejected() {
        let err = compile_body_err("function f(i) { i = i|0; return (i && i)|0; }");
        assert_eq!(err.category(), ErrorCategory::Structure);
    }
}
