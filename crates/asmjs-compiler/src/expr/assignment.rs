//! Assignment to locals, module variables and the heap.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{AssignExpr, Expr, Ident};

use crate::bytecode::OpCode;
use crate::expr_info::ExprInfo;
use crate::function::{FunctionCompiler, simd_operand};
use crate::registers::Location;
use crate::symbols::{Symbol, VarHome};
use crate::types::StorageType;

use super::Result;

/// Where an assigned value ends up.
enum Target {
    Register(Location),
    Slot(u32),
}

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// The value of an assignment is its right-hand side.
    pub(super) fn compile_assign(&mut self, assign: &AssignExpr<'ast>) -> Result<ExprInfo> {
        match *assign.target {
            Expr::Ident(ident) => self.assign_to_name(ident, assign.value),
            Expr::Index(index) => self.compile_heap_store(index, assign.value),
            _ => Err(CompilationError::structure(
                assign.target.span(),
                "Can only assign to an identifier or an ArrayBufferView",
            )),
        }
    }

    fn assign_to_name(&mut self, ident: Ident<'ast>, value: &Expr<'ast>) -> Result<ExprInfo> {
        let (storage, target) = match self.lookup(ident.name) {
            Some(Symbol::Argument(arg)) => (arg.storage, Target::Register(arg.loc)),
            Some(Symbol::Variable(var)) if !var.mutable => {
                return Err(CompilationError::type_mismatch(
                    ident.span,
                    format!("Cannot assign to constant '{ident}'"),
                ));
            }
            Some(Symbol::Variable(var)) => match var.home {
                VarHome::Register(loc) => (var.storage, Target::Register(loc)),
                VarHome::Slot(slot) => (var.storage, Target::Slot(slot)),
                VarHome::Folded => {
                    return Err(CompilationError::type_mismatch(
                        ident.span,
                        format!("Cannot assign to constant '{ident}'"),
                    ));
                }
            },
            Some(Symbol::ConstantImport(import)) => (import.storage, Target::Slot(import.slot)),
            Some(other) => {
                return Err(CompilationError::type_mismatch(
                    ident.span,
                    format!("Cannot assign to {} '{ident}'", other.describe()),
                ));
            }
            None => {
                return Err(CompilationError::link(
                    ident.span,
                    format!("'{ident}' is not defined"),
                ));
            }
        };

        let rhs = self.compile_expr(value)?;
        let expected = storage.to_asm_type();
        if !rhs.ty.is_sub_type(expected) {
            return Err(CompilationError::type_mismatch(
                value.span(),
                format!(
                    "Cannot assign a value of type {} to '{ident}' of type {expected}",
                    rhs.ty
                ),
            ));
        }
        let Some(src) = rhs.loc else {
            return Err(CompilationError::internal(
                value.span(),
                "assigned value has no register",
            ));
        };

        match target {
            Target::Register(dst) if dst != src => self.emit_move(storage, dst, src),
            Target::Register(_) => {}
            Target::Slot(slot) => self.emit_slot_store(storage, slot, src),
        }
        Ok(rhs)
    }

    fn emit_slot_store(&mut self, storage: StorageType, slot: u32, src: Location) {
        match storage {
            StorageType::Int => self.emit(OpCode::StSlotInt, &[slot, src.index]),
            StorageType::Float => self.emit(OpCode::StSlotFlt, &[slot, src.index]),
            StorageType::Double => self.emit(OpCode::StSlotDb, &[slot, src.index]),
            StorageType::Simd(ty) => {
                self.emit(OpCode::Simd128StSlot, &[simd_operand(ty), slot, src.index])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};
    use asmjs_core::ErrorCategory;

    #[test]
    fn local_assignment_moves() {
        let module =
            compile_body("function f(i) { i = i|0; var j = 0; j = (i + 1)|0; return j|0; }");
        module.functions[0]
            .chunk
            .assert_contains_opcodes(&[OpCode::AddInt, OpCode::LdInt, OpCode::ReturnInt]);
    }

    #[test]
    fn global_assignment_stores_slot() {
        let module = compile_body("var g = 0.0; function f(x) { x = +x; g = x; }");
        module.functions[0].chunk.assert_contains_opcodes(&[OpCode::StSlotDb]);
    }

    #[test]
    fn constant_assignment_is_rejected() {
        let err = compile_body_err("const K = 1; function f() { K = 2; }");
        assert!(err.message().contains("constant"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = compile_body_err("function f(i) { i = i|0; var x = 0.0; x = i; }");
        assert!(err.message().contains("Cannot assign"));
    }

    #[test]
    fn intish_cannot_be_stored_in_int() {
        let err = compile_body_err("function f(i) { i = i|0; i = i + 1; }");
        assert!(err.message().contains("intish"));
    }

    #[test]
    fn call_cannot_be_assigned_without_coercion() {
        let err = compile_body_err(
            "function g() { return 1; } function f() { var i = 0; i = g(); }",
        );
        assert_eq!(err.category(), ErrorCategory::Signature);
    }

    #[test]
    fn member_target_is_rejected() {
        let err = compile_body_err("function f() { f.x = 1; }");
        assert!(err.message().contains("Can only assign"));
    }
}
