//! Module-wide compilation state.
//!
//! [`ModuleContext`] is filled by the module declaration pass and then lent
//! to each function compiler in turn. Function compilers read symbols from
//! it and write back what they learn about callees: lazily fixed
//! signatures, heap usage, and the largest constant heap offset.

use asmjs_parser::ast::{Expr, FunctionDecl, Ident};

use crate::builtins::{MathBuiltin, SimdOp, ViewKind};
use crate::layout::LayoutCounts;
use crate::options::CompilerOptions;
use crate::output::ModuleFlags;
use crate::signature::Signature;
use crate::symbols::{ConstValue, ModuleArgument, Symbol, SymbolTable};
use crate::types::{LiteralClass, RegisterClass, StorageType};

/// A module function.
#[derive(Debug)]
pub struct FunctionEntry<'ast> {
    pub name: Ident<'ast>,
    pub decl: &'ast FunctionDecl<'ast>,
    pub signature: Signature,
    /// Accepted as the change-heap function; never compiled or called.
    pub change_heap: bool,
}

/// A foreign function binding.
#[derive(Debug, Clone, Copy)]
pub struct ImportEntry<'ast> {
    pub name: Ident<'ast>,
    pub field: &'ast str,
}

/// A foreign value binding.
#[derive(Debug, Clone, Copy)]
pub struct ConstantImportEntry<'ast> {
    pub name: Ident<'ast>,
    pub field: &'ast str,
    pub storage: StorageType,
    pub slot: u32,
}

/// A mutable module variable.
#[derive(Debug, Clone, Copy)]
pub struct GlobalEntry<'ast> {
    pub name: Ident<'ast>,
    pub storage: StorageType,
    pub slot: u32,
    pub init: ConstValue,
}

/// A function-pointer table.
#[derive(Debug)]
pub struct TableEntry<'ast> {
    pub name: Ident<'ast>,
    pub size: u32,
    pub signature: Signature,
    pub elements: &'ast [&'ast Expr<'ast>],
    /// Filled in by table validation.
    pub functions: Vec<u32>,
}

/// A heap view, in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct ViewEntry<'ast> {
    pub name: Ident<'ast>,
    pub kind: ViewKind,
}

/// Module-wide compilation state.
#[derive(Debug)]
pub struct ModuleContext<'ast> {
    pub options: CompilerOptions,
    pub symbols: SymbolTable<'ast>,
    pub module_args: [Option<Ident<'ast>>; 3],
    pub functions: Vec<FunctionEntry<'ast>>,
    pub imports: Vec<ImportEntry<'ast>>,
    pub constant_imports: Vec<ConstantImportEntry<'ast>>,
    pub globals: Vec<GlobalEntry<'ast>>,
    pub tables: Vec<TableEntry<'ast>>,
    pub views: Vec<ViewEntry<'ast>>,
    pub flags: ModuleFlags,
    pub max_heap_access: u32,
    /// Stdlib members bound, in declaration order.
    pub builtins: Vec<String>,
    /// Slots handed out per storage class.
    var_slots: [u32; 4],
}

impl<'ast> ModuleContext<'ast> {
    pub fn new(options: &CompilerOptions) -> Self {
        Self {
            options: options.clone(),
            symbols: SymbolTable::new(),
            module_args: [None; 3],
            functions: Vec::new(),
            imports: Vec::new(),
            constant_imports: Vec::new(),
            globals: Vec::new(),
            tables: Vec::new(),
            views: Vec::new(),
            flags: ModuleFlags::empty(),
            max_heap_access: 0,
            builtins: Vec::new(),
            var_slots: [0; 4],
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name)
    }

    /// Name bound to a module parameter.
    pub fn module_arg(&self, arg: ModuleArgument) -> Option<Ident<'ast>> {
        self.module_args[arg as usize]
    }

    /// Whether `name` is the given module parameter.
    pub fn is_module_arg(&self, name: &str, arg: ModuleArgument) -> bool {
        self.module_arg(arg).is_some_and(|ident| ident.name == name)
    }

    pub fn is_heap_resizable(&self) -> bool {
        self.flags.contains(ModuleFlags::USES_CHANGE_HEAP)
    }

    /// Hand out the next layout slot of a storage class.
    pub fn alloc_slot(&mut self, storage: StorageType) -> u32 {
        let counter = &mut self.var_slots[class_index(storage.register_class())];
        let slot = *counter;
        *counter += 1;
        slot
    }

    pub fn var_slots(&self, class: RegisterClass) -> u32 {
        self.var_slots[class_index(class)]
    }

    pub fn record_heap_access(&mut self, byte_offset: u32) {
        self.flags |= ModuleFlags::USES_HEAP_BUFFER;
        self.max_heap_access = self.max_heap_access.max(byte_offset);
    }

    pub fn note_builtin(&mut self, name: String) {
        if !self.builtins.contains(&name) {
            self.builtins.push(name);
        }
    }

    /// Compile-time value of a variable initializer.
    ///
    /// Accepts a numeric literal, a module `const`, a Math constant,
    /// `fround` of a literal, or a SIMD constructor of literals.
    pub fn constant_initializer(&self, init: &Expr<'ast>) -> Option<ConstValue> {
        match *init {
            Expr::Literal(_) => ConstValue::of_literal(init),
            Expr::Ident(ident) => match self.lookup(ident.name)? {
                Symbol::Variable(var) => var.constant(),
                Symbol::MathConstant(constant) => Some(ConstValue::Double(constant.value())),
                _ => None,
            },
            Expr::Call(call) => match self.lookup(call.callee.as_ident()?.name)? {
                Symbol::MathBuiltin(MathBuiltin::Fround) if call.args.len() == 1 => {
                    let value = LiteralClass::of_expr(call.args[0]).as_f64()?;
                    Some(ConstValue::Float(value as f32))
                }
                Symbol::SimdBuiltin(simd) if simd.op == SimdOp::Constructor => {
                    ConstValue::simd_of_literals(simd.ty, call.args)
                }
                _ => None,
            },
            _ => None,
        }
    }

    pub fn layout_counts(&self) -> LayoutCounts {
        LayoutCounts {
            double_vars: self.var_slots(RegisterClass::Double),
            functions: self.functions.len() as u32,
            imports: self.imports.len() as u32,
            tables: self.tables.len() as u32,
            float_vars: self.var_slots(RegisterClass::Float),
            int_vars: self.var_slots(RegisterClass::Int),
            simd_vars: self.var_slots(RegisterClass::Simd),
        }
    }

    pub fn var_count(&self) -> u32 {
        self.var_slots.iter().sum()
    }
}

fn class_index(class: RegisterClass) -> usize {
    match class {
        RegisterClass::Int => 0,
        RegisterClass::Float => 1,
        RegisterClass::Double => 2,
        RegisterClass::Simd => 3,
    }
}
