//! Calls to module functions, foreign functions and function tables.
//!
//! Every call is lowered to the same shape:
//!
//! ```text
//! StartCall  bytes          ; patched once the argument size is known
//! <arguments>
//! ArgOut*    slot, src      ; one per argument
//! LdFunc | LdImport | LdArrFunc
//! ICall | Call  argc
//! IConvVT* | ConvVT*  dst   ; unless the call is void
//! ```
//!
//! Builtin calls (`Math.*`, `SIMD.*`) are inline operations and branch off
//! before any of this.

use asmjs_core::{CompilationError, Span};
use asmjs_parser::ast::{BinaryOp, CallExpr, Expr, IndexExpr};

use crate::bytecode::OpCode;
use crate::expr_info::ExprInfo;
use crate::function::{FunctionCompiler, internal_runtime_args, simd_operand};
use crate::symbols::Symbol;
use crate::types::{AsmType, LiteralClass, ReturnType, StorageType};

use super::Result;

/// Bytes reserved in every call frame before the arguments.
const CALL_HEADER_BYTES: u32 = 8;

/// Width of one foreign-call argument.
const FOREIGN_ARG_BYTES: u32 = 8;

/// A resolved call target.
#[derive(Debug, Clone, Copy)]
enum Callee {
    /// Index into the module function list.
    Module(u32),
    /// Index into the foreign import list.
    Import(u32),
    /// Table index and the register holding the masked element index.
    Table(u32, ExprInfo),
}

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// Lower a call whose result the context coerces to `expected`.
    pub(crate) fn compile_call(
        &mut self,
        call: &CallExpr<'ast>,
        expected: ReturnType,
    ) -> Result<ExprInfo> {
        if let Expr::Ident(ident) = *call.callee {
            match self.lookup(ident.name) {
                Some(Symbol::MathBuiltin(builtin)) => {
                    return self.compile_math_call(builtin, call);
                }
                Some(Symbol::SimdBuiltin(builtin)) => {
                    return self.compile_simd_call(builtin, call);
                }
                _ => {}
            }
        }

        if !self.call_legal {
            return Err(CompilationError::type_mismatch(
                call.span,
                "Calls are not allowed inside a heap access when the heap can be resized",
            ));
        }

        let callee = self.resolve_callee(call)?;

        let mut depth = self.calls.enter();
        let site = self.emitter.emit_start_call();

        let mut args = Vec::with_capacity(call.args.len());
        for arg in call.args {
            let info = self.compile_expr(arg)?;
            depth = self.calls.after_arg(depth);
            args.push(info);
        }
        let types: Vec<AsmType> = args.iter().map(|arg| arg.ty).collect();

        let (storages, bytes) = match callee {
            Callee::Module(index) => {
                let storages = self.check_module_call(index, &types, expected, call.span)?;
                let bytes = storages.iter().map(|storage| storage.arg_byte_size()).sum();
                (storages, bytes)
            }
            Callee::Table(table, _) => {
                let storages = self.check_table_call(table, &types, expected, call.span)?;
                let bytes = storages.iter().map(|storage| storage.arg_byte_size()).sum();
                (storages, bytes)
            }
            Callee::Import(_) => {
                let storages = foreign_arg_storages(&types, call)?;
                check_foreign_return(expected, call.span)?;
                (storages, FOREIGN_ARG_BYTES * call.args.len() as u32)
            }
        };

        let foreign = matches!(callee, Callee::Import(_));
        let mut slot = 0;
        for (info, storage) in args.iter().zip(&storages) {
            self.emit_arg_out(*storage, slot, info.reg(), foreign);
            slot += if foreign {
                FOREIGN_ARG_BYTES
            } else {
                storage.arg_byte_size()
            };
        }
        for info in args.iter().rev() {
            self.release(*info);
        }

        let argc = call.args.len() as u32;
        match callee {
            Callee::Module(index) => {
                self.emit(OpCode::LdFunc, &[index]);
                self.emit(OpCode::ICall, &[argc]);
            }
            Callee::Table(table, element) => {
                self.emit(OpCode::LdArrFunc, &[table, element.reg()]);
                self.release(element);
                self.emit(OpCode::ICall, &[argc]);
            }
            Callee::Import(index) => {
                self.emit(OpCode::LdImport, &[index]);
                self.emit(OpCode::Call, &[argc]);
            }
        }

        self.emitter.set_call_bytes(site, bytes + CALL_HEADER_BYTES);
        let runtime_args = if foreign {
            argc + 1
        } else {
            internal_runtime_args(bytes)
        };
        self.calls.reserve(depth, runtime_args);
        self.calls.leave();

        Ok(self.convert_result(expected, foreign))
    }

    fn resolve_callee(&mut self, call: &CallExpr<'ast>) -> Result<Callee> {
        match *call.callee {
            Expr::Ident(ident) => match self.lookup(ident.name) {
                Some(Symbol::ModuleFunction(index)) => {
                    if self.ctx.functions[index as usize].change_heap {
                        return Err(CompilationError::structure(
                            ident.span,
                            format!("The change-heap function '{ident}' cannot be called"),
                        ));
                    }
                    Ok(Callee::Module(index))
                }
                Some(Symbol::ImportFunction(index)) => Ok(Callee::Import(index)),
                Some(other) => Err(CompilationError::type_mismatch(
                    ident.span,
                    format!("{} '{ident}' is not callable", other.describe()),
                )),
                None => Err(CompilationError::link(
                    ident.span,
                    format!("'{ident}' is not defined"),
                )),
            },
            Expr::Index(index) => self.resolve_table_callee(index),
            _ => Err(CompilationError::structure(
                call.callee.span(),
                "Callee must be a function name or a function table element",
            )),
        }
    }

    /// `table[index & mask]`, where `mask + 1` is the table size.
    fn resolve_table_callee(&mut self, index: &IndexExpr<'ast>) -> Result<Callee> {
        let table = match index.object.as_ident() {
            Some(ident) => match self.lookup(ident.name) {
                Some(Symbol::FunctionPointerTable(table)) => table,
                Some(other) => {
                    return Err(CompilationError::type_mismatch(
                        ident.span,
                        format!("{} '{ident}' is not a function table", other.describe()),
                    ));
                }
                None => {
                    return Err(CompilationError::link(
                        ident.span,
                        format!("'{ident}' is not defined"),
                    ));
                }
            },
            None => {
                return Err(CompilationError::structure(
                    index.object.span(),
                    "Function table call must name a table",
                ));
            }
        };

        let mask = match *index.index {
            Expr::Binary(binary) if binary.op == BinaryOp::BitwiseAnd => {
                LiteralClass::of_expr(binary.right).as_uint()
            }
            _ => None,
        };
        let Some(mask) = mask else {
            return Err(CompilationError::type_mismatch(
                index.index.span(),
                "Function table index must be masked: table[i & (size - 1)]",
            ));
        };
        let entry = &self.ctx.tables[table as usize];
        if u64::from(mask) + 1 != u64::from(entry.size) {
            return Err(CompilationError::signature(
                index.index.span(),
                format!(
                    "Mask {mask} does not match the size {} of table '{}'",
                    entry.size, entry.name
                ),
            ));
        }

        let element = self.compile_expr(index.index)?;
        if !element.ty.is_intish() {
            return Err(CompilationError::type_mismatch(
                index.index.span(),
                format!("Function table index must be intish; got {}", element.ty),
            ));
        }
        Ok(Callee::Table(table, element))
    }

    /// Fix or check the callee's signature and return its argument storage.
    fn check_module_call(
        &mut self,
        index: u32,
        args: &[AsmType],
        expected: ReturnType,
        span: Span,
    ) -> Result<Vec<StorageType>> {
        check_simd_args(args, span)?;
        let entry = &mut self.ctx.functions[index as usize];
        if !entry.signature.supports_arg_call(args) {
            return Err(CompilationError::signature(
                span,
                format!(
                    "Call arguments ({}) do not match '{}' of type {}",
                    join_types(args),
                    entry.name,
                    entry.signature
                ),
            ));
        }
        let known = entry.signature.ret();
        if !entry.signature.check_and_set_return(expected) {
            let known = known.map_or_else(|| "?".to_string(), |ret| ret.to_string());
            return Err(CompilationError::signature(
                span,
                format!(
                    "Call to '{}' expects {expected}, but it returns {known}",
                    entry.name
                ),
            ));
        }
        Ok(entry.signature.args().map(<[_]>::to_vec).unwrap_or_default())
    }

    fn check_table_call(
        &mut self,
        table: u32,
        args: &[AsmType],
        expected: ReturnType,
        span: Span,
    ) -> Result<Vec<StorageType>> {
        check_simd_args(args, span)?;
        let entry = &mut self.ctx.tables[table as usize];
        if !entry.signature.supports_arg_call(args) {
            return Err(CompilationError::signature(
                span,
                format!(
                    "Call arguments ({}) do not match table '{}' of type {}",
                    join_types(args),
                    entry.name,
                    entry.signature
                ),
            ));
        }
        if !entry.signature.check_and_set_return(expected) {
            return Err(CompilationError::signature(
                span,
                format!(
                    "Call to table '{}' expects {expected}; table type is {}",
                    entry.name, entry.signature
                ),
            ));
        }
        Ok(entry.signature.args().map(<[_]>::to_vec).unwrap_or_default())
    }

    fn emit_arg_out(&mut self, storage: StorageType, slot: u32, src: u32, foreign: bool) {
        match (storage, foreign) {
            (StorageType::Int, true) => self.emit(OpCode::ArgOutInt, &[slot, src]),
            (StorageType::Double, true) => self.emit(OpCode::ArgOutDb, &[slot, src]),
            (StorageType::Int, false) => self.emit(OpCode::IArgOutInt, &[slot, src]),
            (StorageType::Double, false) => self.emit(OpCode::IArgOutDb, &[slot, src]),
            (StorageType::Float, _) => self.emit(OpCode::IArgOutFlt, &[slot, src]),
            (StorageType::Simd(ty), _) => {
                self.emit(OpCode::Simd128IArgOut, &[simd_operand(ty), slot, src])
            }
        }
    }

    /// Read the generic return value back as `expected`.
    fn convert_result(&mut self, expected: ReturnType, foreign: bool) -> ExprInfo {
        let Some(storage) = expected.to_storage() else {
            return ExprInfo::void();
        };
        let dst = self.acquire_tmp(storage.register_class());
        match (storage, foreign) {
            (StorageType::Int, true) => self.emit(OpCode::ConvVTI, &[dst.index]),
            (StorageType::Double, true) => self.emit(OpCode::ConvVTD, &[dst.index]),
            (StorageType::Int, false) => self.emit(OpCode::IConvVTI, &[dst.index]),
            (StorageType::Double, false) => self.emit(OpCode::IConvVTD, &[dst.index]),
            (StorageType::Float, _) => self.emit(OpCode::IConvVTF, &[dst.index]),
            (StorageType::Simd(ty), _) => {
                self.emit(OpCode::Simd128IConvVT, &[simd_operand(ty), dst.index])
            }
        }
        ExprInfo::new(expected.to_asm_type(), dst)
    }
}

fn foreign_arg_storages(args: &[AsmType], call: &CallExpr<'_>) -> Result<Vec<StorageType>> {
    args.iter()
        .zip(call.args)
        .map(|(ty, arg)| {
            if ty.is_double() {
                Ok(StorageType::Double)
            } else if ty.is_signed() {
                Ok(StorageType::Int)
            } else {
                Err(CompilationError::type_mismatch(
                    arg.span(),
                    format!("Foreign function arguments must be signed or double; got {ty}"),
                ))
            }
        })
        .collect()
}

fn check_foreign_return(expected: ReturnType, span: Span) -> Result<()> {
    match expected {
        ReturnType::Float | ReturnType::Simd(_) => Err(CompilationError::type_mismatch(
            span,
            format!("Foreign functions cannot return {expected}"),
        )),
        _ => Ok(()),
    }
}

fn check_simd_args(args: &[AsmType], span: Span) -> Result<()> {
    match args.iter().find_map(|ty| ty.as_simd().filter(|simd| simd.is_unsigned())) {
        Some(simd) => Err(CompilationError::type_mismatch(
            span,
            format!("{simd} values cannot be passed to functions"),
        )),
        None => Ok(()),
    }
}

fn join_types(types: &[AsmType]) -> String {
    types
        .iter()
        .map(AsmType::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use crate::bytecode::OpCode;
    use crate::testing::{compile_body, compile_body_err};
    use crate::types::{ReturnType, StorageType};
    use asmjs_core::ErrorCategory;

    #[test]
    fn internal_call_sequence() {
        let module = compile_body(
            "function g(i, x) { i = i|0; x = +x; return i|0; } \
             function f() { return g(1, 2.5)|0; }",
        );
        let chunk = &module.functions[1].chunk;
        chunk.assert_contains_opcodes(&[
            OpCode::StartCall,
            OpCode::IArgOutInt,
            OpCode::IArgOutDb,
            OpCode::LdFunc,
            OpCode::ICall,
            OpCode::IConvVTI,
            OpCode::ReturnInt,
        ]);
        let start = chunk
            .instructions()
            .find(|instruction| instruction.op == OpCode::StartCall)
            .unwrap();
        assert_eq!(start.operands, &[24]);
    }

    #[test]
    fn first_call_fixes_forward_signature() {
        let module = compile_body(
            "function f() { return +g(3); } function g(i) { i = i|0; return 1.5; }",
        );
        let g = &module.functions[1];
        assert_eq!(g.info.args, vec![StorageType::Int]);
        assert_eq!(g.info.ret, ReturnType::Double);
    }

    #[test]
    fn declaration_must_match_call_site() {
        let err = compile_body_err(
            "function f() { g(3); } function g(x) { x = +x; }",
        );
        assert_eq!(err.category(), ErrorCategory::Signature);
    }

    #[test]
    fn foreign_call_uses_foreign_opcodes() {
        let module = compile_body("function f(x) { x = +x; print(x, 1); }");
        module.functions[0].chunk.assert_contains_opcodes(&[
            OpCode::StartCall,
            OpCode::ArgOutDb,
            OpCode::ArgOutInt,
            OpCode::LdImport,
            OpCode::Call,
        ]);
    }

    #[test]
    fn foreign_call_rejects_float_arguments() {
        let err = compile_body_err("function f(y) { y = fround(y); print(y); }");
        assert!(err.message().contains("signed or double"));
    }

    #[test]
    fn foreign_call_cannot_return_float() {
        let err = compile_body_err("function f() { return fround(print()); }");
        assert!(err.message().contains("cannot return float"));
    }

    #[test]
    fn return_type_conflict_across_call_sites() {
        let err = compile_body_err(
            "function g() { return 1; } function f() { return +g(); }",
        );
        assert_eq!(err.category(), ErrorCategory::Signature);
    }

    #[test]
    fn table_call() {
        let module = compile_body(
            "function g(i) { i = i|0; return i|0; } \
             function f(i) { i = i|0; return tbl[i & 1](i)|0; } \
             var tbl = [g, g];",
        );
        module.functions[1].chunk.assert_contains_opcodes(&[
            OpCode::AndInt,
            OpCode::StartCall,
            OpCode::IArgOutInt,
            OpCode::LdArrFunc,
            OpCode::ICall,
            OpCode::IConvVTI,
        ]);
    }

    #[test]
    fn table_mask_must_match_size() {
        let err = compile_body_err(
            "function g() {} function f(i) { i = i|0; tbl[i & 3](); } var tbl = [g, g];",
        );
        assert!(err.message().contains("does not match the size"));
    }

    #[test]
    fn nested_calls_count_argument_depth() {
        // Each internal level holds its argument slots, the header word, the
        // function object and the return address.
        let module = compile_body(
            "function g(i) { i = i|0; return i|0; } \
             function f() { return g(g(1)|0)|0; }",
        );
        assert_eq!(module.functions[1].info.arg_out_depth, 8);
        assert_eq!(module.functions[0].info.arg_out_depth, 0);
    }

    #[test]
    fn single_call_reserves_its_frame() {
        let module = compile_body(
            "function g(a, b) { a = a|0; b = b|0; return (a + b)|0; } \
             function f() { return g(1, 2)|0; }",
        );
        assert_eq!(module.functions[1].info.arg_out_depth, 5);
    }

    #[test]
    fn foreign_calls_count_one_slot_per_argument() {
        let module = compile_body("function f() { print(print(1)|0); }");
        assert_eq!(module.functions[0].info.arg_out_depth, 6);
    }

    #[test]
    fn math_builtins_reserve_a_frame() {
        let module = compile_body("function f(x) { x = +x; return +sqrt(x); }");
        assert_eq!(module.functions[0].info.arg_out_depth, 4);
    }

    #[test]
    fn calling_a_variable_is_rejected() {
        let err = compile_body_err("function f() { var i = 0; i(); }");
        assert!(err.message().contains("not callable"));
    }
}
