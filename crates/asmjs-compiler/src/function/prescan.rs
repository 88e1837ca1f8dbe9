//! Constant collection.
//!
//! Walks the body once before anything is emitted and interns every
//! constant the lowering will ask for, so that the constant ranges of the
//! register spaces are final before named slots are handed out.

use asmjs_core::Span;
use asmjs_parser::ast::{CallExpr, Expr, Stmt};

use crate::builtins::MathBuiltin;
use crate::symbols::{ConstValue, Symbol};
use crate::types::{LiteralClass, SimdType};

use super::{FunctionCompiler, Result, register_error};

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(super) fn collect_constants(&mut self, stmts: &'ast [Stmt<'ast>]) -> Result<()> {
        stmts.iter().try_for_each(|stmt| self.collect_stmt(stmt))
    }

    fn collect_stmt(&mut self, stmt: &Stmt<'ast>) -> Result<()> {
        match *stmt {
            Stmt::Expr(s) => self.collect_expr(s.expr),
            Stmt::VarDecl(decl) => {
                for var in decl.vars {
                    let value = var.init.and_then(|init| self.ctx.constant_initializer(init));
                    if let Some(value) = value.filter(|value| !value.is_zero()) {
                        self.intern(value, var.span)?;
                    }
                }
                Ok(())
            }
            Stmt::Return(ret) => match ret.value {
                Some(value) => self.collect_expr(value),
                None => Ok(()),
            },
            Stmt::If(s) => {
                self.collect_expr(s.condition)?;
                self.collect_stmt(&s.then_stmt)?;
                match &s.else_stmt {
                    Some(else_stmt) => self.collect_stmt(else_stmt),
                    None => Ok(()),
                }
            }
            Stmt::While(s) => {
                self.collect_expr(s.condition)?;
                self.collect_stmt(&s.body)
            }
            Stmt::DoWhile(s) => {
                self.collect_stmt(&s.body)?;
                self.collect_expr(s.condition)
            }
            Stmt::For(s) => {
                for expr in [s.init, s.condition, s.update].into_iter().flatten() {
                    self.collect_expr(expr)?;
                }
                self.collect_stmt(&s.body)
            }
            Stmt::Switch(s) => {
                self.collect_expr(s.expr)?;
                for case in s.cases {
                    if let Some(test) = case.test {
                        self.collect_expr(test)?;
                    }
                    self.collect_constants(case.body)?;
                }
                Ok(())
            }
            Stmt::Block(block) => self.collect_constants(block.stmts),
            Stmt::Labeled(s) => self.collect_stmt(&s.body),
            Stmt::Function(_) | Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => Ok(()),
        }
    }

    fn collect_expr(&mut self, expr: &Expr<'ast>) -> Result<()> {
        match *expr {
            Expr::Literal(lit) => match ConstValue::of_literal(expr) {
                Some(value) => self.intern(value, lit.span),
                None => Ok(()),
            },
            Expr::Ident(ident) => match self.ctx.lookup(ident.name) {
                Some(Symbol::Variable(var)) => match var.constant() {
                    Some(value) => self.intern(value, ident.span),
                    None => Ok(()),
                },
                Some(Symbol::MathConstant(constant)) => {
                    self.intern(ConstValue::Double(constant.value()), ident.span)
                }
                _ => Ok(()),
            },
            Expr::Binary(b) => {
                self.collect_expr(b.left)?;
                self.collect_expr(b.right)
            }
            Expr::Unary(u) => self.collect_expr(u.operand),
            Expr::Assign(a) => {
                self.collect_expr(a.target)?;
                self.collect_expr(a.value)
            }
            Expr::Ternary(t) => {
                self.collect_expr(t.condition)?;
                self.collect_expr(t.then_expr)?;
                self.collect_expr(t.else_expr)
            }
            Expr::Call(call) => self.collect_call(call),
            Expr::Index(ix) => {
                self.collect_expr(ix.object)?;
                self.collect_expr(ix.index)
            }
            Expr::Comma(c) => c.exprs.iter().try_for_each(|e| self.collect_expr(e)),
            // Rejected during lowering.
            Expr::Member(_) | Expr::New(_) | Expr::Array(_) | Expr::Object(_) => Ok(()),
        }
    }

    fn collect_call(&mut self, call: &CallExpr<'ast>) -> Result<()> {
        let builtin = call
            .callee
            .as_ident()
            .and_then(|callee| self.ctx.lookup(callee.name));
        match builtin {
            Some(Symbol::MathBuiltin(MathBuiltin::Fround)) if call.args.len() == 1 => {
                if let Some(value) = LiteralClass::of_expr(call.args[0]).as_f64() {
                    return self.intern(ConstValue::Float(value as f32), call.span);
                }
            }
            Some(Symbol::SimdBuiltin(simd)) if simd.ty == SimdType::Float32x4 => {
                for arg in call.args {
                    match LiteralClass::of_expr(arg) {
                        LiteralClass::Double(value) => {
                            self.intern(ConstValue::Float(value as f32), arg.span())?
                        }
                        _ => self.collect_expr(arg)?,
                    }
                }
                return Ok(());
            }
            _ => {}
        }
        self.collect_expr(call.callee)?;
        call.args.iter().try_for_each(|arg| self.collect_expr(arg))
    }

    fn intern(&mut self, value: ConstValue, span: Span) -> Result<()> {
        let interned = match value {
            ConstValue::Int(v) => self.registers.intern_int(v),
            ConstValue::Float(v) => self.registers.intern_float(v),
            ConstValue::Double(v) => self.registers.intern_double(v),
            ConstValue::Simd(_, bits) => self.registers.intern_simd(bits),
        };
        interned.map(|_| ()).map_err(|err| register_error(span, err))
    }
}
