//! Expression parsing using Pratt parsing (precedence climbing).
//!
//! This module implements expression parsing with proper operator precedence
//! and associativity using the Pratt parsing algorithm.

use asmjs_core::{ParseError, ParseErrorKind};
use bumpalo::collections::Vec as BVec;

use super::parser::Parser;
use crate::ast::expr::*;
use crate::ast::{ASSIGN_BINDING_POWER, BinaryOp, Ident, POSTFIX_BINDING_POWER, UnaryOp};
use crate::lexer::{Token, TokenKind};

impl<'ast> Parser<'ast> {
    /// Parse a full expression, including comma sequences.
    pub fn parse_full_expr(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let first = self.parse_expr(0)?;
        if !self.check(TokenKind::Comma) {
            return Ok(first);
        }

        let mut exprs = BVec::new_in(self.arena);
        exprs.push(first);
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_expr(0)?);
        }
        let span = first.span().merge(self.previous_span());
        Ok(self.arena.alloc(Expr::Comma(self.arena.alloc(CommaExpr {
            exprs: exprs.into_bump_slice(),
            span,
        }))))
    }

    /// Parse an expression with a minimum binding power.
    ///
    /// This is the core of the Pratt parser. It handles operator precedence
    /// by only consuming operators with sufficient binding power. Commas are
    /// never consumed here.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            // Member access, calls and indexing bind tightest
            if self.check(TokenKind::Dot) {
                if POSTFIX_BINDING_POWER < min_bp {
                    break;
                }
                lhs = self.parse_member_access(lhs)?;
                continue;
            }

            if self.check(TokenKind::LeftParen) {
                if POSTFIX_BINDING_POWER < min_bp {
                    break;
                }
                lhs = self.parse_call(lhs)?;
                continue;
            }

            if self.check(TokenKind::LeftBracket) {
                if POSTFIX_BINDING_POWER < min_bp {
                    break;
                }
                lhs = self.parse_index(lhs)?;
                continue;
            }

            if self.check(TokenKind::Question) {
                if 2 < min_bp {
                    break;
                }
                lhs = self.parse_ternary(lhs)?;
                continue;
            }

            if self.check(TokenKind::Equal) {
                let (l_bp, r_bp) = ASSIGN_BINDING_POWER;
                if l_bp < min_bp {
                    break;
                }
                if !matches!(lhs, Expr::Ident(_) | Expr::Index(_) | Expr::Member(_)) {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidAssignmentTarget,
                        lhs.span(),
                        "invalid assignment target",
                    ));
                }

                self.advance();
                let rhs = self.parse_expr(r_bp)?;
                let span = lhs.span().merge(rhs.span());
                lhs = self.arena.alloc(Expr::Assign(self.arena.alloc(AssignExpr {
                    target: lhs,
                    value: rhs,
                    span,
                })));
                continue;
            }

            if let Some(bin_op) = BinaryOp::from_token(self.peek().kind) {
                let (l_bp, r_bp) = bin_op.binding_power();
                if l_bp < min_bp {
                    break;
                }

                self.advance();
                let rhs = self.parse_expr(r_bp)?;
                let span = lhs.span().merge(rhs.span());
                lhs = self.arena.alloc(Expr::Binary(self.arena.alloc(BinaryExpr {
                    left: lhs,
                    op: bin_op,
                    right: rhs,
                    span,
                })));
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    /// Parse a prefix expression (the start of an expression).
    fn parse_prefix(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = self.peek();

        match token.kind {
            TokenKind::IntLiteral | TokenKind::FloatLiteral => {
                self.advance();
                let kind = parse_number(token)?;
                Ok(self.alloc_literal(kind, token))
            }

            TokenKind::StringLiteral => {
                self.advance();
                let inner = &token.lexeme[1..token.lexeme.len().saturating_sub(1).max(1)];
                Ok(self.alloc_literal(LiteralKind::Str(inner), token))
            }

            TokenKind::True | TokenKind::False => {
                self.advance();
                let kind = LiteralKind::Bool(token.kind == TokenKind::True);
                Ok(self.alloc_literal(kind, token))
            }

            TokenKind::Identifier => {
                self.advance();
                Ok(self
                    .arena
                    .alloc(Expr::Ident(Ident::new(token.lexeme, token.span))))
            }

            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_full_expr()?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }

            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_object_literal(),
            TokenKind::New => self.parse_new(),

            TokenKind::Minus
                if matches!(
                    self.peek_nth(1).kind,
                    TokenKind::IntLiteral | TokenKind::FloatLiteral
                ) =>
            {
                // Negative numeric literals are folded: `-1`, `-0`, `-2147483648`
                self.advance();
                let number = self.advance();
                let kind = negate(parse_number(number)?);
                let span = token.span.merge(number.span);
                Ok(self.arena.alloc(Expr::Literal(LiteralExpr { kind, span })))
            }

            _ => {
                if let Some(op) = UnaryOp::from_token(token.kind) {
                    self.advance();
                    let operand = self.parse_expr(UnaryOp::binding_power())?;
                    let span = token.span.merge(operand.span());
                    return Ok(self.arena.alloc(Expr::Unary(self.arena.alloc(UnaryExpr {
                        op,
                        operand,
                        span,
                    }))));
                }

                if token.is_eof() {
                    Err(ParseError::unexpected_eof(token.span))
                } else {
                    Err(ParseError::expected_expression(token.span, token.lexeme))
                }
            }
        }
    }

    fn alloc_literal(&self, kind: LiteralKind<'ast>, token: Token<'ast>) -> &'ast Expr<'ast> {
        self.arena.alloc(Expr::Literal(LiteralExpr {
            kind,
            span: token.span,
        }))
    }

    /// Parse a member access after the object expression.
    fn parse_member_access(
        &mut self,
        object: &'ast Expr<'ast>,
    ) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::Dot)?;
        let member = self.parse_property_name()?;
        let span = object.span().merge(member.span);
        Ok(self.arena.alloc(Expr::Member(self.arena.alloc(MemberExpr {
            object,
            member,
            span,
        }))))
    }

    /// Parse a call's argument list after the callee expression.
    fn parse_call(&mut self, callee: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        let args = self.parse_arguments()?;
        let span = callee.span().merge(self.previous_span());
        Ok(self.arena.alloc(Expr::Call(self.arena.alloc(CallExpr {
            callee,
            args,
            span,
        }))))
    }

    /// Parse `( expr, ... )`.
    fn parse_arguments(&mut self) -> Result<&'ast [&'ast Expr<'ast>], ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expr(0)?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(args.into_bump_slice())
    }

    fn parse_index(&mut self, object: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftBracket)?;
        let index = self.parse_full_expr()?;
        let close = self.expect(TokenKind::RightBracket)?;
        let span = object.span().merge(close.span);
        Ok(self.arena.alloc(Expr::Index(self.arena.alloc(IndexExpr {
            object,
            index,
            span,
        }))))
    }

    fn parse_ternary(
        &mut self,
        condition: &'ast Expr<'ast>,
    ) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::Question)?;
        let then_expr = self.parse_expr(0)?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_expr(1)?;
        let span = condition.span().merge(else_expr.span());
        Ok(self.arena.alloc(Expr::Ternary(self.arena.alloc(TernaryExpr {
            condition,
            then_expr,
            else_expr,
            span,
        }))))
    }

    /// Parse `new Callee(args)`.
    ///
    /// The callee is a name optionally followed by member accesses; the
    /// argument list binds to the `new`, not to an inner call.
    fn parse_new(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let new_token = self.expect(TokenKind::New)?;
        let name = self.expect_ident()?;
        let mut callee: &'ast Expr<'ast> = self.arena.alloc(Expr::Ident(name));
        while self.check(TokenKind::Dot) {
            callee = self.parse_member_access(callee)?;
        }

        let args = if self.check(TokenKind::LeftParen) {
            self.parse_arguments()?
        } else {
            &[]
        };
        let span = new_token.span.merge(self.previous_span());
        Ok(self.arena.alloc(Expr::New(self.arena.alloc(NewExpr {
            callee,
            args,
            span,
        }))))
    }

    fn parse_array_literal(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let open = self.expect(TokenKind::LeftBracket)?;
        let mut elements = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBracket) {
            elements.push(self.parse_expr(0)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(TokenKind::RightBracket)?;
        Ok(self.arena.alloc(Expr::Array(ArrayExpr {
            elements: elements.into_bump_slice(),
            span: open.span.merge(close.span),
        })))
    }

    fn parse_object_literal(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let mut properties = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) {
            let key = if self.check(TokenKind::StringLiteral) {
                let token = self.advance();
                let inner = &token.lexeme[1..token.lexeme.len().saturating_sub(1).max(1)];
                Ident::new(inner, token.span)
            } else {
                self.parse_property_name()?
            };
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expr(0)?;
            properties.push(Property {
                key,
                value,
                span: key.span.merge(value.span()),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(TokenKind::RightBrace)?;
        Ok(self.arena.alloc(Expr::Object(ObjectExpr {
            properties: properties.into_bump_slice(),
            span: open.span.merge(close.span),
        })))
    }

    /// Property names may be identifiers or keywords (`x.default`).
    fn parse_property_name(&mut self) -> Result<Ident<'ast>, ParseError> {
        let token = self.peek();
        if token.kind == TokenKind::Identifier || token.kind.is_keyword() {
            self.advance();
            return Ok(Ident::new(token.lexeme, token.span));
        }
        Err(ParseError::expected_identifier(token.span, token.lexeme))
    }
}

/// Convert a numeric token into a literal.
///
/// Integer-syntax values that fit an `i32` become [`LiteralKind::Int`];
/// larger ones keep `maybe_int` so the compiler can classify them as
/// unsigned.
fn parse_number<'ast>(token: Token<'ast>) -> Result<LiteralKind<'ast>, ParseError> {
    let invalid = || {
        ParseError::new(
            ParseErrorKind::InvalidLiteral,
            token.span,
            format!("invalid numeric literal '{}'", token.lexeme),
        )
    };

    match token.kind {
        TokenKind::IntLiteral => {
            let lexeme = token.lexeme;
            let value = if let Some(hex) = lexeme
                .strip_prefix("0x")
                .or_else(|| lexeme.strip_prefix("0X"))
            {
                u64::from_str_radix(hex, 16).map(|v| v as f64).ok()
            } else {
                lexeme
                    .parse::<u64>()
                    .map(|v| v as f64)
                    .ok()
                    .or_else(|| lexeme.parse::<f64>().ok())
            }
            .ok_or_else(invalid)?;

            if value <= i32::MAX as f64 {
                Ok(LiteralKind::Int(value as i32))
            } else {
                Ok(LiteralKind::Float {
                    value,
                    maybe_int: true,
                })
            }
        }
        TokenKind::FloatLiteral => {
            let value = token.lexeme.parse::<f64>().map_err(|_| invalid())?;
            Ok(LiteralKind::Float {
                value,
                maybe_int: false,
            })
        }
        _ => Err(invalid()),
    }
}

/// Fold a unary minus into a numeric literal.
fn negate(kind: LiteralKind<'_>) -> LiteralKind<'_> {
    match kind {
        LiteralKind::Int(0) => LiteralKind::Float {
            value: -0.0,
            maybe_int: false,
        },
        LiteralKind::Int(v) => LiteralKind::Int(-v),
        LiteralKind::Float { value, maybe_int } => LiteralKind::Float {
            value: -value,
            maybe_int,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;

    use super::*;

    fn parse<'ast>(source: &str, arena: &'ast Bump) -> &'ast Expr<'ast> {
        Parser::expression(source, arena).unwrap()
    }

    #[test]
    fn int_coercion_shape() {
        let arena = Bump::new();
        let expr = parse("x|0", &arena);
        match expr {
            Expr::Binary(bin) => {
                assert_eq!(bin.op, BinaryOp::BitwiseOr);
                assert!(matches!(bin.left, Expr::Ident(id) if id.name == "x"));
                assert!(matches!(
                    bin.right,
                    Expr::Literal(LiteralExpr {
                        kind: LiteralKind::Int(0),
                        ..
                    })
                ));
            }
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn precedence_mul_over_add() {
        let arena = Bump::new();
        let expr = parse("a + b * c", &arena);
        let Expr::Binary(bin) = expr else {
            panic!("expected binary");
        };
        assert_eq!(bin.op, BinaryOp::Add);
        assert!(matches!(bin.right, Expr::Binary(b) if b.op == BinaryOp::Mul));
    }

    #[test]
    fn shift_binds_tighter_than_bitwise_or() {
        let arena = Bump::new();
        let expr = parse("HEAP32[i >> 2] | 0", &arena);
        let Expr::Binary(bin) = expr else {
            panic!("expected binary");
        };
        assert_eq!(bin.op, BinaryOp::BitwiseOr);
        let Expr::Index(index) = bin.left else {
            panic!("expected index");
        };
        assert!(matches!(index.index, Expr::Binary(b) if b.op == BinaryOp::ShiftRight));
    }

    #[test]
    fn negative_literals_fold() {
        let arena = Bump::new();
        assert!(matches!(
            parse("-5", &arena),
            Expr::Literal(LiteralExpr {
                kind: LiteralKind::Int(-5),
                ..
            })
        ));
        match parse("-0", &arena) {
            Expr::Literal(LiteralExpr {
                kind: LiteralKind::Float { value, maybe_int },
                ..
            }) => {
                assert!(*value == 0.0 && value.is_sign_negative());
                assert!(!maybe_int);
            }
            other => panic!("expected float literal, got {other:?}"),
        }
        assert!(matches!(
            parse("-2147483648", &arena),
            Expr::Literal(LiteralExpr {
                kind: LiteralKind::Float {
                    value: -2147483648.0,
                    maybe_int: true
                },
                ..
            })
        ));
    }

    #[test]
    fn large_integers_are_maybe_int() {
        let arena = Bump::new();
        assert!(matches!(
            parse("0x80000000", &arena),
            Expr::Literal(LiteralExpr {
                kind: LiteralKind::Float {
                    value: 2147483648.0,
                    maybe_int: true
                },
                ..
            })
        ));
        assert!(matches!(
            parse("1.0", &arena),
            Expr::Literal(LiteralExpr {
                kind: LiteralKind::Float {
                    value: 1.0,
                    maybe_int: false
                },
                ..
            })
        ));
    }

    #[test]
    fn unary_minus_on_name_stays_unary() {
        let arena = Bump::new();
        assert!(matches!(
            parse("-x", &arena),
            Expr::Unary(u) if u.op == UnaryOp::Neg
        ));
    }

    #[test]
    fn member_call_chain() {
        let arena = Bump::new();
        let expr = parse("stdlib.Math.imul(a, b)", &arena);
        let Expr::Call(call) = expr else {
            panic!("expected call");
        };
        assert_eq!(call.args.len(), 2);
        let Expr::Member(member) = call.callee else {
            panic!("expected member");
        };
        assert_eq!(member.member.name, "imul");
    }

    #[test]
    fn new_binds_arguments() {
        let arena = Bump::new();
        let expr = parse("new stdlib.Int32Array(heap)", &arena);
        let Expr::New(new) = expr else {
            panic!("expected new");
        };
        assert!(matches!(new.callee, Expr::Member(_)));
        assert_eq!(new.args.len(), 1);
    }

    #[test]
    fn assignment_is_right_associative() {
        let arena = Bump::new();
        let expr = parse("a = b = 1", &arena);
        let Expr::Assign(outer) = expr else {
            panic!("expected assignment");
        };
        assert!(matches!(outer.value, Expr::Assign(_)));
    }

    #[test]
    fn invalid_assignment_target() {
        let arena = Bump::new();
        let err = Parser::expression("1 = x", &arena).unwrap_err();
        assert_eq!(
            err.first().unwrap().kind,
            ParseErrorKind::InvalidAssignmentTarget
        );
    }

    #[test]
    fn ternary_and_comma() {
        let arena = Bump::new();
        assert!(matches!(parse("c ? 1 : 2", &arena), Expr::Ternary(_)));
        assert!(matches!(parse("a = 1, b = 2", &arena), Expr::Comma(c) if c.exprs.len() == 2));
    }

    #[test]
    fn object_literal_exports() {
        let arena = Bump::new();
        let expr = parse("{ add: add, 'sub': sub }", &arena);
        let Expr::Object(object) = expr else {
            panic!("expected object");
        };
        assert_eq!(object.properties.len(), 2);
        assert_eq!(object.properties[1].key.name, "sub");
    }

    #[test]
    fn missing_operand_is_error() {
        let arena = Bump::new();
        assert!(Parser::expression("1 +", &arena).is_err());
    }
}
