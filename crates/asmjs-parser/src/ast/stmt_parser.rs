//! Statement parsing functions.
//!
//! Implements parsing of all statement types including control flow,
//! loops, variable and function declarations, and blocks.

use asmjs_core::ParseError;
use bumpalo::collections::Vec as BVec;

use super::parser::Parser;
use crate::ast::stmt::*;
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse a statement.
    ///
    /// This is the main entry point for statement parsing and dispatches
    /// to specific statement parsers based on the current token.
    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = self.peek();

        match token.kind {
            // Declarations
            TokenKind::Function | TokenKind::Async => self.parse_function_decl(),
            TokenKind::Var | TokenKind::Const => self.parse_var_decl(),

            // Control flow statements
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Switch => self.parse_switch(),

            // Jump statements
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => {
                let jump = self.parse_jump(TokenKind::Break)?;
                Ok(Stmt::Break(jump))
            }
            TokenKind::Continue => {
                let jump = self.parse_jump(TokenKind::Continue)?;
                Ok(Stmt::Continue(jump))
            }

            TokenKind::LeftBrace => {
                let block = self.parse_block()?;
                Ok(Stmt::Block(block))
            }

            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Empty(token.span))
            }

            TokenKind::Identifier if self.peek_nth(1).kind == TokenKind::Colon => {
                self.parse_labeled()
            }

            _ => self.parse_expr_stmt(),
        }
    }

    /// Parse an expression statement.
    ///
    /// Grammar: `EXPR ';'`
    pub fn parse_expr_stmt(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let expr = self.parse_full_expr()?;
        self.consume_semicolon(self.previous_span())?;
        Ok(Stmt::Expr(ExprStmt {
            expr,
            span: expr.span(),
        }))
    }

    /// Parse a variable declaration.
    ///
    /// Grammar: `('var' | 'const') IDENT ('=' EXPR)? (',' IDENT ('=' EXPR)?)* ';'`
    pub fn parse_var_decl(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.advance();
        let kind = if keyword.kind == TokenKind::Const {
            VarKind::Const
        } else {
            VarKind::Var
        };

        let mut vars = BVec::new_in(self.arena);
        loop {
            let name = self.expect_ident()?;
            let init = if self.eat(TokenKind::Equal) {
                Some(self.parse_expr(0)?)
            } else {
                None
            };
            let span = match init {
                Some(init) => name.span.merge(init.span()),
                None => name.span,
            };
            vars.push(VarDeclarator { name, init, span });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        let span = keyword.span.merge(self.previous_span());
        self.consume_semicolon(self.previous_span())?;
        Ok(Stmt::VarDecl(VarDeclStmt {
            kind,
            vars: vars.into_bump_slice(),
            span,
        }))
    }

    /// Parse a function declaration.
    ///
    /// Grammar: `'async'? 'function' '*'? IDENT? '(' PARAMS ')' BLOCK`
    pub fn parse_function_decl(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.peek().span;
        let is_async = self.eat(TokenKind::Async);
        self.expect(TokenKind::Function)?;
        let is_generator = self.eat(TokenKind::Star);
        let name = if self.check(TokenKind::Identifier) {
            Some(self.expect_ident()?)
        } else {
            None
        };

        self.expect(TokenKind::LeftParen)?;
        let mut params = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                let param_start = self.peek().span;
                let is_rest = self.eat(TokenKind::DotDotDot);
                let name = self.expect_ident()?;
                let default = if self.eat(TokenKind::Equal) {
                    Some(self.parse_expr(0)?)
                } else {
                    None
                };
                params.push(Param {
                    name,
                    default,
                    is_rest,
                    span: param_start.merge(self.previous_span()),
                });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;

        let body = self.parse_block()?;
        let decl = self.arena.alloc(FunctionDecl {
            name,
            params: params.into_bump_slice(),
            body,
            is_generator,
            is_async,
            span: start.merge(body.span),
        });
        Ok(Stmt::Function(decl))
    }

    /// Parse a return statement.
    ///
    /// Grammar: `'return' EXPR? ';'`
    pub fn parse_return(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.expect(TokenKind::Return)?;

        let next = self.peek();
        let has_value = !matches!(
            next.kind,
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
        ) && next.span.line == keyword.span.line;

        let value = if has_value {
            Some(self.parse_full_expr()?)
        } else {
            None
        };

        let span = keyword.span.merge(self.previous_span());
        self.consume_semicolon(self.previous_span())?;
        Ok(Stmt::Return(ReturnStmt { value, span }))
    }

    /// Parse `break` or `continue` with an optional same-line label.
    fn parse_jump(&mut self, kind: TokenKind) -> Result<JumpStmt<'ast>, ParseError> {
        let keyword = self.expect(kind)?;
        let next = self.peek();
        let label = if next.kind == TokenKind::Identifier && next.span.line == keyword.span.line {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let span = keyword.span.merge(self.previous_span());
        self.consume_semicolon(self.previous_span())?;
        Ok(JumpStmt { label, span })
    }

    /// Parse a block statement.
    ///
    /// Grammar: `'{' STATEMENT* '}'`
    pub fn parse_block(&mut self) -> Result<Block<'ast>, ParseError> {
        let open = self.expect(TokenKind::LeftBrace)?;

        let mut stmts = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            stmts.push(self.parse_statement()?);
        }

        let close = self.expect(TokenKind::RightBrace)?;
        Ok(Block {
            stmts: stmts.into_bump_slice(),
            span: open.span.merge(close.span),
        })
    }

    /// Parse an if statement.
    ///
    /// Grammar: `'if' '(' EXPR ')' STATEMENT ('else' STATEMENT)?`
    pub fn parse_if(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.expect(TokenKind::If)?;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_full_expr()?;
        self.expect(TokenKind::RightParen)?;

        let then_stmt = self.parse_statement()?;
        let else_stmt = if self.eat(TokenKind::Else) {
            Some(self.parse_statement()?)
        } else {
            None
        };

        let end = else_stmt.map_or(then_stmt.span(), |s| s.span());
        Ok(Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_stmt,
            else_stmt,
            span: keyword.span.merge(end),
        })))
    }

    /// Parse a while loop.
    ///
    /// Grammar: `'while' '(' EXPR ')' STATEMENT`
    pub fn parse_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.expect(TokenKind::While)?;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_full_expr()?;
        self.expect(TokenKind::RightParen)?;
        let body = self.parse_statement()?;

        Ok(Stmt::While(self.arena.alloc(WhileStmt {
            condition,
            body,
            span: keyword.span.merge(body.span()),
        })))
    }

    /// Parse a do-while loop.
    ///
    /// Grammar: `'do' STATEMENT 'while' '(' EXPR ')' ';'`
    pub fn parse_do_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.expect(TokenKind::Do)?;
        let body = self.parse_statement()?;
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_full_expr()?;
        let close = self.expect(TokenKind::RightParen)?;
        // The trailing semicolon of do-while is always optional.
        self.eat(TokenKind::Semicolon);

        Ok(Stmt::DoWhile(self.arena.alloc(DoWhileStmt {
            body,
            condition,
            span: keyword.span.merge(close.span),
        })))
    }

    /// Parse a for loop.
    ///
    /// Grammar: `'for' '(' EXPR? ';' EXPR? ';' EXPR? ')' STATEMENT`
    pub fn parse_for(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.expect(TokenKind::For)?;
        self.expect(TokenKind::LeftParen)?;

        let init = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_full_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_full_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let update = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_full_expr()?)
        };
        self.expect(TokenKind::RightParen)?;

        let body = self.parse_statement()?;
        Ok(Stmt::For(self.arena.alloc(ForStmt {
            init,
            condition,
            update,
            body,
            span: keyword.span.merge(body.span()),
        })))
    }

    /// Parse a switch statement.
    ///
    /// Grammar: `'switch' '(' EXPR ')' '{' CASE* '}'`
    pub fn parse_switch(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.expect(TokenKind::Switch)?;
        self.expect(TokenKind::LeftParen)?;
        let expr = self.parse_full_expr()?;
        self.expect(TokenKind::RightParen)?;
        self.expect(TokenKind::LeftBrace)?;

        let mut cases = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            cases.push(self.parse_switch_case()?);
        }
        let close = self.expect(TokenKind::RightBrace)?;

        Ok(Stmt::Switch(self.arena.alloc(SwitchStmt {
            expr,
            cases: cases.into_bump_slice(),
            span: keyword.span.merge(close.span),
        })))
    }

    fn parse_switch_case(&mut self) -> Result<SwitchCase<'ast>, ParseError> {
        let start = self.peek();
        let test = if self.eat(TokenKind::Default) {
            None
        } else {
            self.expect(TokenKind::Case)?;
            Some(self.parse_full_expr()?)
        };
        self.expect(TokenKind::Colon)?;

        let mut body = BVec::new_in(self.arena);
        while !matches!(
            self.peek().kind,
            TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
        ) {
            body.push(self.parse_statement()?);
        }

        Ok(SwitchCase {
            test,
            body: body.into_bump_slice(),
            span: start.span.merge(self.previous_span()),
        })
    }

    /// Parse `label: statement`.
    fn parse_labeled(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let label = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_statement()?;
        Ok(Stmt::Labeled(self.arena.alloc(LabeledStmt {
            label,
            body,
            span: label.span.merge(body.span()),
        })))
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;

    use super::*;
    use crate::ast::{Expr, LiteralKind};

    fn parse<'ast>(source: &str, arena: &'ast Bump) -> Stmt<'ast> {
        Parser::statement(source, arena).unwrap()
    }

    #[test]
    fn parse_var_decl_multiple() {
        let arena = Bump::new();
        let Stmt::VarDecl(decl) = parse("var i = 0, d = 0.0;", &arena) else {
            panic!("expected var decl");
        };
        assert_eq!(decl.kind, VarKind::Var);
        assert_eq!(decl.vars.len(), 2);
        assert_eq!(decl.vars[1].name.name, "d");
    }

    #[test]
    fn parse_const_decl() {
        let arena = Bump::new();
        let Stmt::VarDecl(decl) = parse("const LIMIT = 100;", &arena) else {
            panic!("expected var decl");
        };
        assert_eq!(decl.kind, VarKind::Const);
    }

    #[test]
    fn parse_function_with_params() {
        let arena = Bump::new();
        let Stmt::Function(func) = parse("function f(a, b) { a = a|0; return; }", &arena) else {
            panic!("expected function");
        };
        assert_eq!(func.name.unwrap().name, "f");
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.body.stmts.len(), 2);
        assert!(!func.is_generator && !func.is_async);
    }

    #[test]
    fn parse_rest_and_default_params() {
        let arena = Bump::new();
        let Stmt::Function(func) = parse("function f(a = 1, ...b) {}", &arena) else {
            panic!("expected function");
        };
        assert!(func.params[0].default.is_some());
        assert!(func.params[1].is_rest);
    }

    #[test]
    fn parse_return_void() {
        let arena = Bump::new();
        let Stmt::Return(ret) = parse("return;", &arena) else {
            panic!("expected return");
        };
        assert!(ret.value.is_none());
    }

    #[test]
    fn parse_return_object() {
        let arena = Bump::new();
        let Stmt::Return(ret) = parse("return { f: f };", &arena) else {
            panic!("expected return");
        };
        assert!(matches!(ret.value, Some(Expr::Object(_))));
    }

    #[test]
    fn parse_if_else() {
        let arena = Bump::new();
        let Stmt::If(stmt) = parse("if (x) return 1; else return 2;", &arena) else {
            panic!("expected if");
        };
        assert!(stmt.else_stmt.is_some());
    }

    #[test]
    fn parse_loops() {
        let arena = Bump::new();
        assert!(matches!(parse("while (i) i = i - 1|0;", &arena), Stmt::While(_)));
        assert!(matches!(parse("do { } while (0)", &arena), Stmt::DoWhile(_)));
        let Stmt::For(stmt) = parse("for (;;) break;", &arena) else {
            panic!("expected for");
        };
        assert!(stmt.init.is_none() && stmt.condition.is_none() && stmt.update.is_none());
    }

    #[test]
    fn parse_switch_cases() {
        let arena = Bump::new();
        let source = "switch (x|0) { case 1: y = 1; break; case -2: y = 2; default: y = 3; }";
        let Stmt::Switch(stmt) = parse(source, &arena) else {
            panic!("expected switch");
        };
        assert_eq!(stmt.cases.len(), 3);
        assert_eq!(stmt.cases[0].body.len(), 2);
        assert!(matches!(
            stmt.cases[1].test,
            Some(Expr::Literal(lit)) if lit.kind == LiteralKind::Int(-2)
        ));
        assert!(stmt.cases[2].is_default());
    }

    #[test]
    fn parse_labeled_break() {
        let arena = Bump::new();
        let Stmt::Labeled(stmt) = parse("outer: while (1) { break outer; }", &arena) else {
            panic!("expected labelled statement");
        };
        assert_eq!(stmt.label.name, "outer");
        let Stmt::While(inner) = stmt.body else {
            panic!("expected while");
        };
        let Stmt::Block(block) = inner.body else {
            panic!("expected block");
        };
        assert!(matches!(block.stmts[0], Stmt::Break(j) if j.label.is_some()));
    }

    #[test]
    fn parse_empty_statement() {
        let arena = Bump::new();
        assert!(matches!(parse(";", &arena), Stmt::Empty(_)));
    }

    #[test]
    fn missing_semicolon_on_same_line() {
        let arena = Bump::new();
        assert!(Parser::statement("x = 1 y = 2", &arena).is_err());
    }
}
