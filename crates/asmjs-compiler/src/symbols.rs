//! Module and function symbol tables.
//!
//! Every name an asm.js module can mention resolves to a [`Symbol`]. The
//! module table is filled by the declaration pass and lives for the whole
//! compile; each function gets its own table for arguments and locals that
//! is consulted first and dropped with the function.

use asmjs_core::{CompilationError, Span};
use asmjs_parser::ast::{Expr, Ident};
use rustc_hash::FxHashMap;

use crate::builtins::{MathBuiltin, MathConstant, SimdBuiltin, TypedArrayBuiltin, ViewKind};
use crate::registers::Location;
use crate::types::{AsmType, LaneValue, LiteralClass, SimdBits, SimdType, StorageType};

/// A compile-time constant value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i32),
    Float(f32),
    Double(f64),
    Simd(SimdType, SimdBits),
}

impl ConstValue {
    pub fn storage_type(&self) -> StorageType {
        match self {
            ConstValue::Int(_) => StorageType::Int,
            ConstValue::Float(_) => StorageType::Float,
            ConstValue::Double(_) => StorageType::Double,
            ConstValue::Simd(ty, _) => StorageType::Simd(*ty),
        }
    }

    /// Whether the value is all zero bits, which registers start out as.
    pub fn is_zero(&self) -> bool {
        match *self {
            ConstValue::Int(v) => v == 0,
            ConstValue::Float(v) => v.to_bits() == 0,
            ConstValue::Double(v) => v.to_bits() == 0,
            ConstValue::Simd(_, bits) => bits.is_zero(),
        }
    }

    /// Value of a numeric literal: int literals keep their bit pattern,
    /// everything else is a double.
    pub fn of_literal(expr: &Expr<'_>) -> Option<Self> {
        let class = LiteralClass::of_expr(expr);
        match class {
            LiteralClass::Double(v) => Some(ConstValue::Double(v)),
            _ => class.int_bits().map(ConstValue::Int),
        }
    }

    /// Value of a SIMD constructor applied to numeric literals.
    pub fn simd_of_literals(ty: SimdType, args: &[&Expr<'_>]) -> Option<Self> {
        if args.len() != ty.lane_count() as usize {
            return None;
        }
        let lanes = args
            .iter()
            .map(|arg| {
                let class = LiteralClass::of_expr(arg);
                match class {
                    LiteralClass::Double(v) => Some(LaneValue::Float(v)),
                    _ => class.int_bits().map(LaneValue::Int),
                }
            })
            .collect::<Option<Vec<_>>>()?;
        Some(ConstValue::Simd(ty, ty.pack_lanes(&lanes)))
    }
}

/// Where a variable's value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarHome {
    /// Module variable, index into its storage class's layout region.
    Slot(u32),
    /// Function local, a named register.
    Register(Location),
    /// Module `const`, folded into the constant pools of each function.
    Folded,
}

/// A module or local variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    pub storage: StorageType,
    pub home: VarHome,
    pub mutable: bool,
    /// Initial value, or the value itself for constants.
    pub value: Option<ConstValue>,
}

impl Variable {
    pub fn asm_type(&self) -> AsmType {
        self.storage.to_asm_type()
    }

    /// The folded value of a module `const`.
    pub fn constant(&self) -> Option<ConstValue> {
        match self.home {
            VarHome::Folded => self.value,
            _ => None,
        }
    }
}

/// A function argument, bound by its coercion statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argument {
    pub index: u32,
    pub storage: StorageType,
    pub loc: Location,
}

/// A value read once from the foreign object at link time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantImport {
    pub storage: StorageType,
    pub slot: u32,
    /// Index into the module's constant import list.
    pub index: u32,
}

/// The three positional module parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleArgument {
    Stdlib,
    Foreign,
    Heap,
}

impl ModuleArgument {
    pub const ALL: [ModuleArgument; 3] = [
        ModuleArgument::Stdlib,
        ModuleArgument::Foreign,
        ModuleArgument::Heap,
    ];
}

/// What a name refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Symbol {
    Variable(Variable),
    Argument(Argument),
    ConstantImport(ConstantImport),
    /// Index into the module's function list.
    ModuleFunction(u32),
    /// Index into the module's import list.
    ImportFunction(u32),
    MathBuiltin(MathBuiltin),
    SimdBuiltin(SimdBuiltin),
    TypedArrayBuiltin(TypedArrayBuiltin),
    ArrayView(ViewKind),
    /// Index into the module's table list.
    FunctionPointerTable(u32),
    MathConstant(MathConstant),
    ModuleArgument(ModuleArgument),
    /// The module function's own name.
    ClosureAlias,
}

impl Symbol {
    /// Short description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Symbol::Variable(_) => "variable",
            Symbol::Argument(_) => "argument",
            Symbol::ConstantImport(_) => "imported constant",
            Symbol::ModuleFunction(_) => "function",
            Symbol::ImportFunction(_) => "imported function",
            Symbol::MathBuiltin(_) => "Math builtin",
            Symbol::SimdBuiltin(_) => "SIMD builtin",
            Symbol::TypedArrayBuiltin(_) => "typed array builtin",
            Symbol::ArrayView(_) => "heap view",
            Symbol::FunctionPointerTable(_) => "function table",
            Symbol::MathConstant(_) => "Math constant",
            Symbol::ModuleArgument(_) => "module argument",
            Symbol::ClosureAlias => "module name",
        }
    }
}

/// A scope of uniquely named symbols.
#[derive(Debug, Default)]
pub struct SymbolTable<'ast> {
    symbols: FxHashMap<&'ast str, Symbol>,
}

impl<'ast> SymbolTable<'ast> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, failing if the scope already has it.
    pub fn define(&mut self, name: Ident<'ast>, symbol: Symbol) -> Result<(), CompilationError> {
        self.define_at(name.name, symbol, name.span)
    }

    pub fn define_at(
        &mut self,
        name: &'ast str,
        symbol: Symbol,
        span: Span,
    ) -> Result<(), CompilationError> {
        if self.symbols.contains_key(name) {
            return Err(CompilationError::structure(
                span,
                format!("'{name}' is already defined"),
            ));
        }
        self.symbols.insert(name, symbol);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RegisterClass;

    fn ident(name: &str) -> Ident<'_> {
        Ident::new(name, Span::new(1, 1, name.len() as u32))
    }

    #[test]
    fn define_and_lookup() {
        let mut table = SymbolTable::new();
        table
            .define(ident("f"), Symbol::ModuleFunction(0))
            .unwrap();
        assert_eq!(table.get("f"), Some(Symbol::ModuleFunction(0)));
        assert_eq!(table.get("g"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn redefinition_is_an_error() {
        let mut table = SymbolTable::new();
        table.define(ident("x"), Symbol::ClosureAlias).unwrap();
        let err = table
            .define(ident("x"), Symbol::ModuleFunction(1))
            .unwrap_err();
        assert!(err.message().contains("already defined"));
    }

    #[test]
    fn folded_constants() {
        let constant = Variable {
            storage: StorageType::Int,
            home: VarHome::Folded,
            mutable: false,
            value: Some(ConstValue::Int(7)),
        };
        assert_eq!(constant.constant(), Some(ConstValue::Int(7)));
        assert_eq!(constant.asm_type(), AsmType::Int);

        let local = Variable {
            home: VarHome::Register(Location::new(RegisterClass::Int, 3)),
            mutable: true,
            ..constant
        };
        assert_eq!(local.constant(), None);
    }

    #[test]
    fn zero_values() {
        assert!(ConstValue::Int(0).is_zero());
        assert!(ConstValue::Double(0.0).is_zero());
        assert!(!ConstValue::Double(-0.0).is_zero());
        assert!(ConstValue::Simd(SimdType::Int32x4, SimdBits::default()).is_zero());
        assert_eq!(ConstValue::Float(1.5).storage_type(), StorageType::Float);
    }

    #[test]
    fn literal_values() {
        let arena = bumpalo::Bump::new();
        let int = asmjs_parser::Parser::expression("42", &arena).unwrap();
        let unsigned = asmjs_parser::Parser::expression("4294967295", &arena).unwrap();
        let double = asmjs_parser::Parser::expression("1.5", &arena).unwrap();
        let name = asmjs_parser::Parser::expression("x", &arena).unwrap();
        assert_eq!(ConstValue::of_literal(int), Some(ConstValue::Int(42)));
        assert_eq!(ConstValue::of_literal(unsigned), Some(ConstValue::Int(-1)));
        assert_eq!(ConstValue::of_literal(double), Some(ConstValue::Double(1.5)));
        assert_eq!(ConstValue::of_literal(name), None);
    }

    #[test]
    fn simd_literal_values() {
        let arena = bumpalo::Bump::new();
        let call = asmjs_parser::Parser::expression("i4(1, 2, 3, 4)", &arena).unwrap();
        let Expr::Call(call) = *call else {
            panic!("expected a call");
        };
        assert_eq!(
            ConstValue::simd_of_literals(SimdType::Int32x4, call.args),
            Some(ConstValue::Simd(SimdType::Int32x4, SimdBits([1, 2, 3, 4])))
        );
        assert_eq!(ConstValue::simd_of_literals(SimdType::Int16x8, call.args), None);
    }
}
