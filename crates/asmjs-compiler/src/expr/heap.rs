//! Heap loads and stores through typed-array views.
//!
//! A heap index has one of three shapes:
//!
//! - a constant (an unsigned literal or an int module `const`), scaled by the
//!   element size at compile time;
//! - `expr >> shift` where `shift` is the view's element size log2;
//! - any intish expression, for byte views only.

use asmjs_core::{CompilationError, Span};
use asmjs_parser::ast::{BinaryOp, Expr, IndexExpr};

use crate::builtins::ViewKind;
use crate::bytecode::OpCode;
use crate::expr_info::ExprInfo;
use crate::function::FunctionCompiler;
use crate::output::FunctionFlags;
use crate::symbols::{ConstValue, Symbol};
use crate::types::{AsmType, LiteralClass, RegisterClass};

use super::Result;

/// Largest byte offset a constant heap access may name.
const MAX_CONSTANT_OFFSET: u64 = 1 << 31;

/// A lowered heap address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeapAddress {
    /// Byte offset known at compile time.
    Const(u32),
    /// Byte offset in a register.
    Dynamic(ExprInfo),
}

impl HeapAddress {
    /// The address operand, and whether it is a register.
    pub(super) fn operand(self) -> (u32, bool) {
        match self {
            HeapAddress::Const(offset) => (offset, false),
            HeapAddress::Dynamic(info) => (info.reg(), true),
        }
    }
}

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// The view named by `object`.
    pub(crate) fn resolve_view(&self, object: &Expr<'ast>) -> Result<ViewKind> {
        let name = object.as_ident();
        match name.and_then(|ident| self.lookup(ident.name)) {
            Some(Symbol::ArrayView(view)) => Ok(view),
            Some(Symbol::FunctionPointerTable(_)) => Err(CompilationError::structure(
                object.span(),
                "Function table elements can only be called",
            )),
            _ => Err(CompilationError::type_mismatch(
                object.span(),
                "Indexed expression must be a heap view",
            )),
        }
    }

    /// Lower a heap index for `view`.
    pub(crate) fn heap_address(&mut self, view: ViewKind, index: &Expr<'ast>) -> Result<HeapAddress> {
        self.flags |= FunctionFlags::USES_HEAP;
        let elem = view.element_size();

        if let Some(value) = self.constant_index(index) {
            return self.constant_address(u64::from(value) * u64::from(elem), index.span());
        }

        let operand = if view.is_byte() {
            index
        } else {
            let Expr::Binary(shift) = *index else {
                return Err(unshifted(index.span()));
            };
            if shift.op != BinaryOp::ShiftRight {
                return Err(unshifted(index.span()));
            }
            if LiteralClass::of_expr(shift.right).as_uint() != Some(view.shift()) {
                return Err(CompilationError::type_mismatch(
                    shift.right.span(),
                    format!("Shift amount must be {}", view.shift()),
                ));
            }
            if let Some(value) = self.constant_index(shift.left) {
                let masked = u64::from(value & !(elem - 1));
                return self.constant_address(masked, index.span());
            }
            shift.left
        };

        let info = self.without_calls(|this| this.compile_expr(operand))?;

        if !info.ty.is_intish() {
            return Err(CompilationError::type_mismatch(
                operand.span(),
                format!("Heap index must be intish; got {}", info.ty),
            ));
        }
        self.ctx.record_heap_access(0);
        Ok(HeapAddress::Dynamic(info))
    }

    fn constant_address(&mut self, offset: u64, span: Span) -> Result<HeapAddress> {
        if offset >= MAX_CONSTANT_OFFSET {
            return Err(CompilationError::out_of_range(
                span,
                format!("Constant heap offset {offset} must be below 2^31"),
            ));
        }
        let offset = offset as u32;
        self.ctx.record_heap_access(offset);
        Ok(HeapAddress::Const(offset))
    }

    /// A non-negative index known at compile time.
    fn constant_index(&self, expr: &Expr<'ast>) -> Option<u32> {
        if let Some(value) = LiteralClass::of_expr(expr).as_uint() {
            return Some(value);
        }
        let ident = expr.as_ident()?;
        match self.lookup(ident.name)? {
            Symbol::Variable(var) => match var.constant()? {
                ConstValue::Int(value) => u32::try_from(value).ok(),
                _ => None,
            },
            _ => None,
        }
    }

    /// Run `f` with calls forbidden when the heap can be resized, since a
    /// call could swap the buffer under a pending access.
    fn without_calls<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let call_legal = self.call_legal;
        if self.ctx.is_heap_resizable() {
            self.call_legal = false;
        }
        let result = f(self);
        self.call_legal = call_legal;
        result
    }

    pub(super) fn compile_heap_load(&mut self, index: &IndexExpr<'ast>) -> Result<ExprInfo> {
        let view = self.resolve_view(index.object)?;
        let address = self.heap_address(view, index.index)?;
        if let HeapAddress::Dynamic(info) = address {
            self.release(info);
        }

        let dst = self.acquire_tmp(view.register_class());
        let (addr, dynamic) = address.operand();
        let op = if dynamic { OpCode::LdArr } else { OpCode::LdArrConst };
        self.emit(op, &[u32::from(u8::from(view)), dst.index, addr]);
        Ok(ExprInfo::new(view.load_type(), dst))
    }

    /// `view[index] = value`. Float views convert between float and double.
    pub(super) fn compile_heap_store(
        &mut self,
        index: &IndexExpr<'ast>,
        value: &Expr<'ast>,
    ) -> Result<ExprInfo> {
        let view = self.resolve_view(index.object)?;
        let address = self.heap_address(view, index.index)?;
        let rhs = self.without_calls(|this| this.compile_expr(value))?;

        let conversion = match view {
            ViewKind::Float32 if rhs.ty.is_floatish() => None,
            ViewKind::Float32 if rhs.ty.is_maybe_double() => {
                Some((OpCode::FroundDb, RegisterClass::Float))
            }
            ViewKind::Float64 if rhs.ty.is_maybe_double() => None,
            ViewKind::Float64 if rhs.ty.is_floatish() => {
                Some((OpCode::ConvFTD, RegisterClass::Double))
            }
            ViewKind::Float32 | ViewKind::Float64 => {
                return Err(store_error(value.span(), view, rhs.ty, "floatish or double?"));
            }
            _ if rhs.ty.is_intish() => None,
            _ => return Err(store_error(value.span(), view, rhs.ty, "intish")),
        };

        let src = match conversion {
            Some((op, class)) => {
                let tmp = self.acquire_tmp(class);
                self.emit(op, &[tmp.index, rhs.reg()]);
                Some(tmp)
            }
            None => None,
        };

        let (addr, dynamic) = address.operand();
        let op = if dynamic { OpCode::StArr } else { OpCode::StArrConst };
        let src_reg = src.map_or(rhs.reg(), |tmp| tmp.index);
        self.emit(op, &[u32::from(u8::from(view)), src_reg, addr]);

        if let Some(tmp) = src {
            self.registers.release(tmp);
        }
        if let HeapAddress::Dynamic(info) = address {
            self.release(info);
        }
        Ok(rhs)
    }
}

fn unshifted(span: Span) -> CompilationError {
    CompilationError::type_mismatch(
        span,
        "Index expression isn't shifted; must be an Int8/Uint8 access",
    )
}

fn store_error(span: Span, view: ViewKind, ty: AsmType, expected: &str) -> CompilationError {
    CompilationError::type_mismatch(
        span,
        format!(
            "Value stored to {} must be {expected}; got {ty}",
            view.constructor()
        ),
    )
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::output::{FunctionFlags, ModuleFlags};
    use crate::testing::{compile_body, compile_body_err};
    use asmjs_core::ErrorCategory;

    #[test]
    fn dynamic_load_uses_register_address() {
        let module = compile_body("function f(i) { i = i|0; return HEAP32[i >> 2]|0; }");
        let function = &module.functions[0];
        function.chunk.assert_contains_opcodes(&[OpCode::LdArr, OpCode::ReturnInt]);
        assert!(function.info.flags.contains(FunctionFlags::USES_HEAP));
        assert!(module.info.flags.contains(ModuleFlags::USES_HEAP_BUFFER));
    }

    #[test]
    fn constant_load_is_scaled() {
        let module = compile_body("function f() { return HEAP32[10]|0; }");
        let chunk = &module.functions[0].chunk;
        let load = chunk
            .instructions()
            .find(|instruction| instruction.op == OpCode::LdArrConst)
            .unwrap();
        assert_eq!(load.operands[2], 40);
        assert_eq!(module.info.max_heap_access, 40);
    }

    #[test]
    fn constant_shifted_index_is_masked() {
        let module = compile_body("function f() { return HEAP32[13 >> 2]|0; }");
        let chunk = &module.functions[0].chunk;
        let load = chunk
            .instructions()
            .find(|instruction| instruction.op == OpCode::LdArrConst)
            .unwrap();
        assert_eq!(load.operands[2], 12);
    }

    #[test]
    fn wrong_shift_is_rejected() {
        let err = compile_body_err("function f(i) { i = i|0; return HEAP32[i >> 1]|0; }");
        assert!(err.message().contains("Shift amount must be 2"));
    }

    #[test]
    fn unshifted_index_needs_byte_view() {
        let err = compile_body_err("function f(i) { i = i|0; return HEAP32[i]|0; }");
        assert!(err.message().contains("isn't shifted"));
        compile_body("function f(i) { i = i|0; return HEAPU8[i]|0; }");
    }

    #[test]
    fn float_stores_convert() {
        let module = compile_body(
            "function f(i, x) { i = i|0; x = +x; HEAPF32[i >> 2] = x; HEAPF64[i >> 3] = x; }",
        );
        module.functions[0].chunk.assert_contains_opcodes(&[
            OpCode::FroundDb,
            OpCode::StArr,
            OpCode::StArr,
        ]);
    }

    #[test]
    fn store_value_may_call_without_change_heap() {
        let module = compile_body(
            "function g() { return 1; } function f(i) { i = i|0; HEAP32[i >> 2] = g()|0; }",
        );
        module.functions[1]
            .chunk
            .assert_contains_opcodes(&[OpCode::ICall, OpCode::StArr]);
    }

    #[test]
    fn int_store_rejects_double() {
        let err = compile_body_err("function f(x) { x = +x; HEAP32[0] = x; }");
        assert!(err.message().contains("Int32Array"));
    }

    #[test]
    fn float_load_is_maybe_float() {
        let module = compile_body("function f() { return fround(HEAPF32[0]); }");
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::LdArrConst, OpCode::FroundFlt, OpCode::ReturnFlt]);
    }

    #[test]
    fn huge_constant_offset_is_out_of_range() {
        let err = compile_body_err("function f() { return HEAP32[1073741824]|0; }");
        assert_eq!(err.category(), ErrorCategory::Range);
    }
}
