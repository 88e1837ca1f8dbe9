//! Per-function compilation.
//!
//! A module function is compiled in five phases:
//!
//! 1. **Collect constants.** A non-emitting walk interns every literal and
//!    folded constant the body mentions, then the pools are sealed so
//!    constant register indices are stable.
//! 2. **Bind arguments.** The leading `p = +p` / `p = p|0` / `p = fround(p)`
//!    statements fix each parameter's storage type.
//! 3. **Bind locals.** Leading `var` statements get named registers and
//!    their initial values.
//! 4. **Emit body.** Recursive descent over the remaining statements, see
//!    the `expr` and `stmt` modules.
//! 5. **Finalize.** Implicit `void` return, epilogue, label and `StartCall`
//!    patching, metadata record.

mod args;
mod locals;
mod prescan;

use asmjs_core::{CompilationError, Span};
use asmjs_parser::ast::Stmt;

use crate::bytecode::OpCode;
use crate::context::ModuleContext;
use crate::emit::{BytecodeEmitter, Label};
use crate::expr_info::ExprInfo;
use crate::output::{CompiledFunction, ConstantPools, FunctionFlags, FunctionInfo};
use crate::registers::{Location, RegisterError, RegisterSet};
use crate::signature::Signature;
use crate::symbols::{ConstValue, Symbol, SymbolTable};
use crate::types::{RegisterClass, ReturnType, SimdType, StorageType};

type Result<T> = std::result::Result<T, CompilationError>;

/// Width of one outgoing argument slot.
pub(crate) const ARG_SLOT_BYTES: u32 = 8;

/// Runtime argument slots of a non-foreign call passing `arg_bytes`: the
/// arguments and the header word, plus the function object.
pub(crate) fn internal_runtime_args(arg_bytes: u32) -> u32 {
    (arg_bytes + ARG_SLOT_BYTES) / ARG_SLOT_BYTES + 1
}

/// Outgoing argument bookkeeping for nested calls.
///
/// Every call reserves its runtime arguments plus a return-address slot on
/// top of whatever its own arguments' calls reserved.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CallDepth {
    /// Calls currently being lowered.
    pub nested: u32,
    /// Slots held by the innermost finished call while its caller is still
    /// lowering arguments.
    pub level: u32,
    /// Deepest reservation of any call in the function.
    pub max: u32,
}

impl CallDepth {
    /// Open a call. Returns the depth already reserved for it.
    pub fn enter(&mut self) -> u32 {
        self.nested += 1;
        self.level
    }

    /// Fold in the reservation of calls made by an argument just lowered.
    pub fn after_arg(&self, depth: u32) -> u32 {
        depth.max(self.level)
    }

    /// Reserve the frame of the current call on top of `depth`.
    pub fn reserve(&mut self, depth: u32, runtime_args: u32) {
        let depth = depth + runtime_args + 1;
        self.level = if self.nested > 1 { depth } else { 0 };
        self.max = self.max.max(depth);
    }

    /// Close the call opened by [`CallDepth::enter`].
    pub fn leave(&mut self) {
        self.nested = self.nested.saturating_sub(1);
    }
}

/// Compiles one module function.
pub(crate) struct FunctionCompiler<'a, 'ast> {
    pub(crate) ctx: &'a mut ModuleContext<'ast>,
    /// Index of this function in the module function list.
    pub(crate) index: u32,
    /// Arguments and locals; consulted before the module table.
    pub(crate) locals: SymbolTable<'ast>,
    pub(crate) registers: RegisterSet,
    pub(crate) emitter: BytecodeEmitter,
    pub(crate) flags: FunctionFlags,
    /// Cleared while a heap index is emitted in a resizable-heap module.
    pub(crate) call_legal: bool,
    pub(crate) calls: CallDepth,
    pub(crate) exit_label: Label,
}

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    fn new(ctx: &'a mut ModuleContext<'ast>, index: u32) -> Self {
        let mut emitter = BytecodeEmitter::new();
        let exit_label = emitter.new_label();
        Self {
            ctx,
            index,
            locals: SymbolTable::new(),
            registers: RegisterSet::new(),
            emitter,
            flags: FunctionFlags::empty(),
            call_legal: true,
            calls: CallDepth::default(),
            exit_label,
        }
    }

    /// Compile the function at `index` of the module function list.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn compile(
        ctx: &'a mut ModuleContext<'ast>,
        index: u32,
    ) -> Result<CompiledFunction> {
        let entry = &ctx.functions[index as usize];
        let decl = entry.decl;
        let name = entry.name.name.to_string();
        let stmts = decl.body.stmts;

        let mut compiler = Self::new(ctx, index);

        compiler.collect_constants(stmts)?;
        compiler.registers.seal_constants();

        let bound = compiler.bind_arguments(decl)?;
        let declared = compiler.bind_locals(&stmts[bound..])?;
        compiler.compile_stmts(&stmts[bound + declared..])?;

        compiler.finalize(name, stmts, decl.body.span)
    }

    fn finalize(
        mut self,
        name: String,
        stmts: &'ast [Stmt<'ast>],
        span: Span,
    ) -> Result<CompiledFunction> {
        if !stmts.last().is_some_and(always_returns) {
            self.check_return(ReturnType::Void, span)?;
        }
        self.emitter.bind_label(self.exit_label);
        self.emitter.emit(OpCode::Ret, &[]);

        if self.ctx.is_heap_resizable() {
            self.flags |= FunctionFlags::HEAP_RESIZABLE;
        }

        let signature = self.signature();
        let args = signature.args().map(<[_]>::to_vec).unwrap_or_default();
        let ret = signature.ret().unwrap_or(ReturnType::Void);

        let constants = ConstantPools {
            int: self.registers.int.constants().to_vec(),
            float: self
                .registers
                .float
                .constants()
                .iter()
                .map(|bits| f32::from_bits(*bits))
                .collect(),
            double: self
                .registers
                .double
                .constants()
                .iter()
                .map(|bits| f64::from_bits(*bits))
                .collect(),
            simd: self.registers.simd.constants().to_vec(),
        };
        let info = FunctionInfo {
            args,
            ret,
            registers: self.registers.usage(),
            constants,
            arg_out_depth: self.calls.max,
            flags: self.flags,
        };
        let chunk = self
            .emitter
            .finish()
            .map_err(|err| CompilationError::internal(span, err.to_string()))?;

        Ok(CompiledFunction { name, chunk, info })
    }

    // ==========================================================================
    // Symbols and signatures
    // ==========================================================================

    pub(crate) fn lookup(&self, name: &str) -> Option<Symbol> {
        self.locals.get(name).or_else(|| self.ctx.lookup(name))
    }

    pub(crate) fn signature(&self) -> &Signature {
        &self.ctx.functions[self.index as usize].signature
    }

    /// Fix or check this function's return type.
    pub(crate) fn check_return(&mut self, ret: ReturnType, span: Span) -> Result<()> {
        let entry = &mut self.ctx.functions[self.index as usize];
        let known = entry.signature.ret();
        if entry.signature.check_and_set_return(ret) {
            return Ok(());
        }
        let known = known.map_or_else(|| "?".to_string(), |ty| ty.to_string());
        Err(CompilationError::signature(
            span,
            format!(
                "Return type {ret} of '{}' conflicts with earlier return type {known}",
                entry.name
            ),
        ))
    }

    // ==========================================================================
    // Registers
    // ==========================================================================

    pub(crate) fn acquire_tmp(&mut self, class: RegisterClass) -> Location {
        self.registers.acquire_tmp(class)
    }

    /// Release the register of an expression result. Only temporaries are freed.
    pub(crate) fn release(&mut self, info: ExprInfo) {
        if let Some(loc) = info.loc {
            self.registers.release(loc);
        }
    }

    pub(crate) fn int_constant(&self, value: i32, span: Span) -> Result<Location> {
        self.registers
            .int_constant(value)
            .ok_or_else(|| missing_constant(span, value))
    }

    pub(crate) fn float_constant(&self, value: f32, span: Span) -> Result<Location> {
        self.registers
            .float_constant(value)
            .ok_or_else(|| missing_constant(span, value))
    }

    pub(crate) fn double_constant(&self, value: f64, span: Span) -> Result<Location> {
        self.registers
            .double_constant(value)
            .ok_or_else(|| missing_constant(span, value))
    }

    /// Constant register holding `value`.
    pub(crate) fn constant_location(&self, value: ConstValue, span: Span) -> Result<Location> {
        match value {
            ConstValue::Int(v) => self.int_constant(v, span),
            ConstValue::Float(v) => self.float_constant(v, span),
            ConstValue::Double(v) => self.double_constant(v, span),
            ConstValue::Simd(ty, bits) => self
                .registers
                .simd_constant(bits)
                .ok_or_else(|| missing_constant(span, format!("{ty}{:?}", bits.0))),
        }
    }

    // ==========================================================================
    // Emission helpers
    // ==========================================================================

    pub(crate) fn emit(&mut self, op: OpCode, operands: &[u32]) {
        self.emitter.emit(op, operands);
    }

    /// Register-to-register move of a value of the given storage type.
    pub(crate) fn emit_move(&mut self, storage: StorageType, dst: Location, src: Location) {
        match storage {
            StorageType::Int => self.emit(OpCode::LdInt, &[dst.index, src.index]),
            StorageType::Float => self.emit(OpCode::LdFlt, &[dst.index, src.index]),
            StorageType::Double => self.emit(OpCode::LdDb, &[dst.index, src.index]),
            StorageType::Simd(ty) => {
                self.emit(OpCode::Simd128Ld, &[simd_operand(ty), dst.index, src.index])
            }
        }
    }
}

/// Instruction operand naming a SIMD type.
pub(crate) fn simd_operand(ty: SimdType) -> u32 {
    u32::from(u8::from(ty))
}

pub(crate) fn register_error(span: Span, err: RegisterError) -> CompilationError {
    CompilationError::internal(span, err.to_string())
}

fn missing_constant(span: Span, value: impl std::fmt::Display) -> CompilationError {
    CompilationError::internal(span, format!("constant {value} was not collected"))
}

/// Whether control never runs past `stmt` when it is the last statement of a
/// function body.
fn always_returns(stmt: &Stmt<'_>) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(block) => block.stmts.last().is_some_and(always_returns),
        Stmt::If(if_stmt) => if_stmt.else_stmt.as_ref().is_some_and(|else_stmt| {
            always_returns(&if_stmt.then_stmt) && always_returns(else_stmt)
        }),
        _ => false,
    }
}
