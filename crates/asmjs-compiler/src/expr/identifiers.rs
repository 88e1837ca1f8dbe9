//! Name references.

use asmjs_core::CompilationError;
use asmjs_parser::ast::Ident;

use crate::bytecode::OpCode;
use crate::expr_info::ExprInfo;
use crate::function::{FunctionCompiler, simd_operand};
use crate::symbols::{Symbol, VarHome};
use crate::types::{AsmType, StorageType};

use super::Result;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    pub(super) fn compile_ident(&mut self, ident: Ident<'ast>) -> Result<ExprInfo> {
        let Some(symbol) = self.lookup(ident.name) else {
            return Err(CompilationError::link(
                ident.span,
                format!("'{ident}' is not defined"),
            ));
        };

        match symbol {
            Symbol::Argument(arg) => Ok(ExprInfo::new(arg.storage.to_asm_type(), arg.loc)),
            Symbol::Variable(var) => match var.home {
                VarHome::Register(loc) => Ok(ExprInfo::new(var.asm_type(), loc)),
                VarHome::Slot(slot) => Ok(self.load_slot(var.storage, slot)),
                VarHome::Folded => {
                    let Some(value) = var.value else {
                        return Err(CompilationError::internal(
                            ident.span,
                            format!("constant '{ident}' has no value"),
                        ));
                    };
                    let loc = self.constant_location(value, ident.span)?;
                    Ok(ExprInfo::new(var.asm_type(), loc))
                }
            },
            Symbol::ConstantImport(import) => Ok(self.load_slot(import.storage, import.slot)),
            Symbol::MathConstant(constant) => {
                let loc = self.double_constant(constant.value(), ident.span)?;
                Ok(ExprInfo::new(AsmType::Double, loc))
            }
            other => Err(CompilationError::type_mismatch(
                ident.span,
                format!("{} '{ident}' cannot be used as a value", other.describe()),
            )),
        }
    }

    /// Copy a module variable into a temporary.
    fn load_slot(&mut self, storage: StorageType, slot: u32) -> ExprInfo {
        let dst = self.acquire_tmp(storage.register_class());
        match storage {
            StorageType::Int => self.emit(OpCode::LdSlotInt, &[dst.index, slot]),
            StorageType::Float => self.emit(OpCode::LdSlotFlt, &[dst.index, slot]),
            StorageType::Double => self.emit(OpCode::LdSlotDb, &[dst.index, slot]),
            StorageType::Simd(ty) => {
                self.emit(OpCode::Simd128LdSlot, &[simd_operand(ty), dst.index, slot])
            }
        }
        ExprInfo::new(storage.to_asm_type(), dst)
    }
}
