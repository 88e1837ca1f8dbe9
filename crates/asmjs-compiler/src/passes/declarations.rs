//! Module-level declarations.
//!
//! The module body is a fixed sequence of sections:
//!
//! ```text
//! var/const ...      globals, imports, stdlib bindings, heap views
//! function ...       module functions
//! var t = [f, g];    function-pointer tables
//! return ...;        exports
//! ```
//!
//! Every name is declared before any function body compiles, so bodies may
//! call functions and tables declared after them.

use asmjs_core::CompilationError;
use asmjs_parser::ast::{
    Expr, FunctionDecl, Ident, MemberExpr, NewExpr, ReturnStmt, Stmt, VarDeclarator, VarKind,
};

use crate::builtins::{MathBuiltin, MathConstant, SimdBuiltin, SimdOp, TypedArrayBuiltin, ViewKind};
use crate::context::{
    ConstantImportEntry, FunctionEntry, GlobalEntry, ImportEntry, TableEntry, ViewEntry,
};
use crate::output::ModuleFlags;
use crate::signature::Signature;
use crate::symbols::{ConstValue, ConstantImport, ModuleArgument, Symbol, VarHome, Variable};
use crate::types::{SimdType, StorageType, SyntacticCoercion};

use super::{ModuleCompiler, Result};

/// Names no module-level declaration may take.
const RESERVED_NAMES: [&str; 2] = ["arguments", "eval"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Globals,
    Functions,
    Tables,
}

impl<'ast> ModuleCompiler<'ast> {
    /// Declare everything in the module body. Returns the export statement.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn declare(&mut self, stmts: &'ast [Stmt<'ast>]) -> Result<&'ast ReturnStmt<'ast>> {
        let Some((Stmt::Return(export), body)) = stmts.split_last() else {
            let span = stmts.last().map_or(self.decl.body.span, Stmt::span);
            return Err(CompilationError::structure(
                span,
                "An asm.js module must end with a return statement",
            ));
        };

        let mut section = Section::Globals;
        for stmt in body {
            match stmt {
                Stmt::Empty(_) => {}
                Stmt::VarDecl(decl) if section == Section::Globals => {
                    for var in decl.vars {
                        self.declare_global(decl.kind, var)?;
                    }
                }
                Stmt::VarDecl(decl) => {
                    section = Section::Tables;
                    for var in decl.vars {
                        self.declare_table(var)?;
                    }
                }
                Stmt::Function(function) if section != Section::Tables => {
                    section = Section::Functions;
                    self.declare_function(*function)?;
                }
                Stmt::Function(function) => {
                    return Err(CompilationError::structure(
                        function.span,
                        "Function declarations must precede function tables",
                    ));
                }
                Stmt::Return(ret) => {
                    return Err(CompilationError::structure(
                        ret.span,
                        "The module return must be its last statement",
                    ));
                }
                other => {
                    return Err(CompilationError::structure(
                        other.span(),
                        "Only variable, function and function table declarations are allowed \
                         at module level",
                    ));
                }
            }
        }
        Ok(export)
    }

    fn check_module_name(&self, name: Ident<'ast>) -> Result<()> {
        if RESERVED_NAMES.contains(&name.name) {
            return Err(CompilationError::structure(
                name.span,
                format!("'{name}' cannot be declared in an asm.js module"),
            ));
        }
        Ok(())
    }

    // ==========================================================================
    // Globals
    // ==========================================================================

    fn declare_global(&mut self, kind: VarKind, var: &'ast VarDeclarator<'ast>) -> Result<()> {
        let name = var.name;
        self.check_module_name(name)?;
        let Some(init) = var.init else {
            return Err(CompilationError::type_mismatch(
                var.span,
                format!("Module variable '{name}' must be initialized"),
            ));
        };

        if let Some(value) = self.ctx.constant_initializer(init) {
            return self.declare_value(kind, name, value);
        }

        match *init {
            Expr::New(new) => self.declare_view(name, new),
            Expr::Member(member) => self.declare_member(name, member),
            Expr::Array(array) => Err(CompilationError::structure(
                array.span,
                "Function tables must follow the function declarations",
            )),
            _ => match SyntacticCoercion::of(init) {
                Some(coercion) => self.declare_constant_import(kind, name, coercion),
                None => Err(invalid_global(name, init)),
            },
        }
    }

    /// `var x = <literal>` or `const x = <literal>`.
    fn declare_value(&mut self, kind: VarKind, name: Ident<'ast>, value: ConstValue) -> Result<()> {
        let storage = value.storage_type();
        let variable = match kind {
            VarKind::Const => Variable {
                storage,
                home: VarHome::Folded,
                mutable: false,
                value: Some(value),
            },
            VarKind::Var => {
                let slot = self.ctx.alloc_slot(storage);
                self.ctx.globals.push(GlobalEntry {
                    name,
                    storage,
                    slot,
                    init: value,
                });
                Variable {
                    storage,
                    home: VarHome::Slot(slot),
                    mutable: true,
                    value: Some(value),
                }
            }
        };
        self.ctx.symbols.define(name, Symbol::Variable(variable))
    }

    /// `var x = foreign.y|0`, `+foreign.y` or `fround(foreign.y)`.
    fn declare_constant_import(
        &mut self,
        kind: VarKind,
        name: Ident<'ast>,
        coercion: SyntacticCoercion<'ast>,
    ) -> Result<()> {
        let operand = coercion.operand();
        let field = match *operand {
            Expr::Member(member) => self.foreign_field(member),
            _ => None,
        };
        let Some(field) = field else {
            return Err(CompilationError::type_mismatch(
                operand.span(),
                format!("Initializer of '{name}' must coerce a foreign import"),
            ));
        };

        let storage = match coercion {
            SyntacticCoercion::ToInt32(_) => StorageType::Int,
            SyntacticCoercion::ToNumber(_) => StorageType::Double,
            SyntacticCoercion::Call { callee, .. } => match self.ctx.lookup(callee.name) {
                Some(Symbol::MathBuiltin(MathBuiltin::Fround)) => StorageType::Float,
                _ => {
                    return Err(CompilationError::type_mismatch(
                        callee.span,
                        format!("Foreign import '{field}' can only be coerced with |0, + or fround"),
                    ));
                }
            },
        };
        if kind == VarKind::Const {
            return Err(CompilationError::structure(
                name.span,
                format!("Imported value '{name}' must be declared with var"),
            ));
        }

        let slot = self.ctx.alloc_slot(storage);
        let index = self.ctx.constant_imports.len() as u32;
        self.ctx.constant_imports.push(ConstantImportEntry {
            name,
            field,
            storage,
            slot,
        });
        self.ctx.symbols.define(
            name,
            Symbol::ConstantImport(ConstantImport {
                storage,
                slot,
                index,
            }),
        )
    }

    /// `foreign.y`, `stdlib.Math.name`, `stdlib.SIMD.T[.op]`, `stdlib.X` or
    /// `T.op` on a bound SIMD constructor.
    fn declare_member(&mut self, name: Ident<'ast>, member: &'ast MemberExpr<'ast>) -> Result<()> {
        if let Some(field) = self.foreign_field(member) {
            let index = self.ctx.imports.len() as u32;
            self.ctx.imports.push(ImportEntry { name, field });
            return self.ctx.symbols.define(name, Symbol::ImportFunction(index));
        }

        let path = member_path(member).ok_or_else(|| unknown_member(member))?;
        let symbol = match self.ctx.lookup(path[0].name) {
            Some(Symbol::ModuleArgument(ModuleArgument::Stdlib)) => {
                self.stdlib_member(member, &path[1..])?
            }
            Some(Symbol::SimdBuiltin(simd)) if simd.op == SimdOp::Constructor && path.len() == 2 => {
                Symbol::SimdBuiltin(self.simd_member(member, simd.ty, path[1].name)?)
            }
            _ => return Err(unknown_member(member)),
        };
        self.ctx.symbols.define(name, symbol)
    }

    fn stdlib_member(&mut self, member: &MemberExpr<'ast>, path: &[Ident<'ast>]) -> Result<Symbol> {
        let names: Vec<&str> = path.iter().map(|ident| ident.name).collect();
        match names.as_slice() {
            ["Math", field] => {
                if let Some(builtin) = MathBuiltin::from_name(field) {
                    self.ctx.note_builtin(format!("Math.{field}"));
                    return Ok(Symbol::MathBuiltin(builtin));
                }
                if let Some(constant) = MathConstant::from_math_name(field) {
                    self.ctx.note_builtin(format!("Math.{field}"));
                    return Ok(Symbol::MathConstant(constant));
                }
                Err(CompilationError::link(
                    member.span,
                    format!("'Math.{field}' is not a Math builtin"),
                ))
            }
            ["SIMD", ty] => {
                let ty = self.simd_type(member, ty)?;
                self.ctx.note_builtin(format!("SIMD.{}", ty.name()));
                Ok(Symbol::SimdBuiltin(SimdBuiltin::constructor(ty)))
            }
            ["SIMD", ty, op] => {
                let ty = self.simd_type(member, ty)?;
                Ok(Symbol::SimdBuiltin(self.simd_member(member, ty, op)?))
            }
            [field] => {
                if let Some(builtin) = TypedArrayBuiltin::from_stdlib_name(field) {
                    self.ctx.note_builtin(builtin.name().to_string());
                    return Ok(Symbol::TypedArrayBuiltin(builtin));
                }
                if let Some(constant) = MathConstant::from_stdlib_name(field) {
                    self.ctx.note_builtin(constant.name().to_string());
                    return Ok(Symbol::MathConstant(constant));
                }
                Err(unknown_member(member))
            }
            _ => Err(unknown_member(member)),
        }
    }

    fn simd_type(&mut self, member: &MemberExpr<'ast>, name: &str) -> Result<SimdType> {
        if !self.ctx.options.simd {
            return Err(CompilationError::link(
                member.span,
                "SIMD is not enabled for this compile",
            ));
        }
        let ty = SimdType::from_name(name).ok_or_else(|| {
            CompilationError::link(member.span, format!("'SIMD.{name}' is not a SIMD type"))
        })?;
        self.ctx.flags |= ModuleFlags::SIMD_ENABLED;
        Ok(ty)
    }

    fn simd_member(&mut self, member: &MemberExpr<'ast>, ty: SimdType, op: &str) -> Result<SimdBuiltin> {
        let op = SimdOp::from_name(ty, op).ok_or_else(|| {
            CompilationError::link(
                member.span,
                format!("'{op}' is not an operation of {}", ty.name()),
            )
        })?;
        let builtin = SimdBuiltin::new(ty, op);
        self.ctx.note_builtin(format!("SIMD.{}", builtin.display_name()));
        Ok(builtin)
    }

    /// `new stdlib.Int32Array(heap)` or `new I32(heap)` with a bound constructor.
    fn declare_view(&mut self, name: Ident<'ast>, new: &'ast NewExpr<'ast>) -> Result<()> {
        let heap_arg = match new.args {
            [arg] => arg.as_ident(),
            _ => None,
        };
        if !heap_arg.is_some_and(|arg| self.ctx.is_module_arg(arg.name, ModuleArgument::Heap)) {
            return Err(CompilationError::structure(
                new.span,
                "A heap view must be constructed from the module's heap parameter",
            ));
        }

        let kind = self.view_constructor(new.callee).ok_or_else(|| {
            CompilationError::type_mismatch(
                new.callee.span(),
                "Heap view constructor must be a typed array constructor",
            )
        })?;
        self.ctx.views.push(ViewEntry { name, kind });
        self.ctx.symbols.define(name, Symbol::ArrayView(kind))
    }

    fn view_constructor(&mut self, callee: &Expr<'ast>) -> Option<ViewKind> {
        match *callee {
            Expr::Ident(ident) => match self.ctx.lookup(ident.name)? {
                Symbol::TypedArrayBuiltin(TypedArrayBuiltin::View(kind)) => Some(kind),
                _ => None,
            },
            Expr::Member(member) => {
                let path = member_path(member)?;
                let [base, ctor] = path.as_slice() else {
                    return None;
                };
                if !self.ctx.is_module_arg(base.name, ModuleArgument::Stdlib) {
                    return None;
                }
                let kind = ViewKind::from_constructor(ctor.name)?;
                self.ctx.note_builtin(kind.constructor().to_string());
                Some(kind)
            }
            _ => None,
        }
    }

    /// The field name of `foreign.name`.
    fn foreign_field(&self, member: &MemberExpr<'ast>) -> Option<&'ast str> {
        let base = member.object.as_ident()?;
        self.ctx
            .is_module_arg(base.name, ModuleArgument::Foreign)
            .then_some(member.member.name)
    }

    // ==========================================================================
    // Functions and tables
    // ==========================================================================

    fn declare_function(&mut self, function: &'ast FunctionDecl<'ast>) -> Result<()> {
        let Some(name) = function.name else {
            return Err(CompilationError::structure(
                function.span,
                "Module functions must be named",
            ));
        };
        if function.is_generator || function.is_async {
            return Err(CompilationError::structure(
                function.span,
                format!("'{name}' cannot be a generator or async function"),
            ));
        }
        self.check_module_name(name)?;

        let index = self.ctx.functions.len() as u32;
        self.ctx.symbols.define(name, Symbol::ModuleFunction(index))?;
        self.ctx.functions.push(FunctionEntry {
            name,
            decl: function,
            signature: Signature::new(),
            change_heap: false,
        });
        Ok(())
    }

    /// `var t = [f, g, ...]`. Entries are checked once every function is
    /// compiled.
    fn declare_table(&mut self, var: &'ast VarDeclarator<'ast>) -> Result<()> {
        let name = var.name;
        self.check_module_name(name)?;
        let Some(Expr::Array(array)) = var.init.copied() else {
            return Err(CompilationError::structure(
                var.span,
                "Only function tables may follow the function declarations",
            ));
        };

        let size = array.elements.len() as u32;
        if !size.is_power_of_two() {
            return Err(CompilationError::out_of_range(
                array.span,
                format!("Function table '{name}' has {size} elements; its size must be a power of two"),
            ));
        }

        let index = self.ctx.tables.len() as u32;
        self.ctx
            .symbols
            .define(name, Symbol::FunctionPointerTable(index))?;
        self.ctx.tables.push(TableEntry {
            name,
            size,
            signature: Signature::new(),
            elements: array.elements,
            functions: Vec::new(),
        });
        Ok(())
    }
}

/// `a.b.c` as `[a, b, c]`.
fn member_path<'ast>(member: &MemberExpr<'ast>) -> Option<Vec<Ident<'ast>>> {
    let mut path = vec![member.member];
    let mut object = member.object;
    loop {
        match *object {
            Expr::Member(inner) => {
                path.push(inner.member);
                object = inner.object;
            }
            Expr::Ident(base) => {
                path.push(base);
                break;
            }
            _ => return None,
        }
    }
    path.reverse();
    Some(path)
}

fn unknown_member(member: &MemberExpr<'_>) -> CompilationError {
    CompilationError::link(
        member.span,
        "Module-level property access must name a standard library member or a foreign import",
    )
}

fn invalid_global(name: Ident<'_>, init: &Expr<'_>) -> CompilationError {
    CompilationError::type_mismatch(
        init.span(),
        format!(
            "Initializer of module variable '{name}' must be a numeric literal, \
             an import or a standard library member"
        ),
    )
}
