//! Expression lowering.
//!
//! Every expression is lowered into a register and reported as an
//! [`ExprInfo`]: its asm.js type and the register holding the value.
//! Operands are released as soon as the instruction consuming them has been
//! emitted, so temporaries are recycled in stack order.
//!
//! Calls are special: the type of a call is decided by the coercion around
//! it (`f()|0`, `+f()`, `fround(f())`), so a bare call lowered here is
//! `void`. The coercion sites recognize the call shape themselves and pass
//! the expected return type down to [`FunctionCompiler::compile_call`].

mod assignment;
mod binary;
mod bitwise;
mod calls;
mod comparison;
mod heap;
mod identifiers;
mod literals;
mod math;
mod simd;
mod ternary;
mod unary;

use asmjs_core::CompilationError;
use asmjs_parser::ast::{CallExpr, CommaExpr, Expr};

use crate::expr_info::ExprInfo;
use crate::function::FunctionCompiler;
use crate::symbols::Symbol;
use crate::types::{AsmType, ReturnType};

pub(crate) use heap::HeapAddress;

type Result<T> = std::result::Result<T, CompilationError>;

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// Lower an expression and report its type and register.
    pub(crate) fn compile_expr(&mut self, expr: &Expr<'ast>) -> Result<ExprInfo> {
        match *expr {
            Expr::Literal(_) => self.compile_literal(expr),
            Expr::Ident(ident) => self.compile_ident(ident),
            Expr::Binary(binary) => self.compile_binary(binary),
            Expr::Unary(unary) => self.compile_unary(unary),
            Expr::Assign(assign) => self.compile_assign(assign),
            Expr::Ternary(ternary) => self.compile_ternary(ternary),
            Expr::Call(call) => self.compile_call(call, ReturnType::Void),
            Expr::Index(index) => self.compile_heap_load(index),
            Expr::Comma(comma) => self.compile_comma(comma),
            Expr::Member(member) => Err(CompilationError::structure(
                member.span,
                "Property access is only allowed in module-level imports",
            )),
            Expr::New(new) => Err(CompilationError::structure(
                new.span,
                "'new' is only allowed in heap view declarations",
            )),
            Expr::Array(array) => Err(CompilationError::structure(
                array.span,
                "Array literals are only allowed in function table declarations",
            )),
            Expr::Object(object) => Err(CompilationError::structure(
                object.span,
                "Object literals are only allowed in the export statement",
            )),
        }
    }

    /// Lower an expression whose value is discarded.
    ///
    /// Calls in this position return `void`.
    pub(crate) fn compile_discarded(&mut self, expr: &Expr<'ast>) -> Result<()> {
        let info = self.compile_expr(expr)?;
        self.release(info);
        Ok(())
    }

    /// Every element but the last is evaluated for its effects.
    fn compile_comma(&mut self, comma: &CommaExpr<'ast>) -> Result<ExprInfo> {
        let Some((last, rest)) = comma.exprs.split_last() else {
            return Err(CompilationError::structure(comma.span, "Empty comma expression"));
        };
        for expr in rest {
            self.compile_discarded(expr)?;
        }
        self.compile_expr(last)
    }

    /// The call in `expr`, if it invokes a module function, a foreign
    /// function or a function table. Builtin calls are typed by their
    /// overloads and are not matched.
    pub(crate) fn user_call(&self, expr: &Expr<'ast>) -> Option<&'ast CallExpr<'ast>> {
        let Expr::Call(call) = *expr else {
            return None;
        };
        match *call.callee {
            Expr::Ident(ident) => matches!(
                self.lookup(ident.name),
                Some(Symbol::ModuleFunction(_) | Symbol::ImportFunction(_))
            )
            .then_some(call),
            Expr::Index(index) => {
                let table = index.object.as_ident()?;
                matches!(self.lookup(table.name), Some(Symbol::FunctionPointerTable(_)))
                    .then_some(call)
            }
            _ => None,
        }
    }

    /// Fail unless `info.ty ⊑ expected`.
    pub(crate) fn expect_type(
        &self,
        expr: &Expr<'ast>,
        info: ExprInfo,
        expected: AsmType,
        what: &str,
    ) -> Result<()> {
        if info.ty.is_sub_type(expected) {
            Ok(())
        } else {
            Err(CompilationError::type_mismatch(
                expr.span(),
                format!("{what} must be of type {expected}, got {}", info.ty),
            ))
        }
    }
}
