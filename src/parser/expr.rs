//! Expression parsing by precedence climbing.
//!
//! A single lexeme-keyed table drives all binary operators. `=` is an
//! ordinary left-associative entry at precedence 30, which makes chained
//! assignment bind as `(a = b) = 1`; that matches the language's documented
//! behavior rather than mainstream right-associativity.

use super::Parser;
use crate::ast::{DefineKind, Expr, ExprKind};
use crate::error::{Error, ParseErrorKind};
use crate::token::TokenType;

impl<'src, 'i, 'a> Parser<'src, 'i, 'a> {
    /// primary, then climb while operators bind at least as tight as the
    /// caller requires.
    pub(crate) fn parse_expression(&mut self) -> Result<&'a Expr<'a>, Error> {
        let lhs = self.parse_primary()?;
        self.parse_binary_rhs(0, lhs)
    }

    /// Precedence of the current token as a binary operator, or -1.
    fn cur_prec(&self) -> i32 {
        let t = self.current();
        match t.kind {
            TokenType::SingleChar | TokenType::OpCompare => {
                self.precedence.get(&t.lexeme).copied().unwrap_or(-1)
            }
            _ => -1,
        }
    }

    fn parse_binary_rhs(
        &mut self,
        min_prec: i32,
        mut lhs: &'a Expr<'a>,
    ) -> Result<&'a Expr<'a>, Error> {
        loop {
            let tok_prec = self.cur_prec();
            if tok_prec < min_prec {
                return Ok(lhs);
            }

            let op = self.current().lexeme;
            self.advance()?; // eat the operator

            let mut rhs = self.parse_primary()?;

            // If the next operator binds tighter, let it take rhs first.
            let next_prec = self.cur_prec();
            if tok_prec < next_prec {
                rhs = self.parse_binary_rhs(tok_prec + 1, rhs)?;
            }

            lhs = self
                .arena
                .alloc(Expr::new(ExprKind::Binary { op, lhs, rhs }, lhs.line));
        }
    }

    /// Literals, names, calls, parens, prefix operators, and every
    /// keyword-led statement form (so `var x = 1` can sit in a `for`
    /// header and a block can appear wherever an expression can).
    fn parse_primary(&mut self) -> Result<&'a Expr<'a>, Error> {
        let t = self.current();
        match t.kind {
            TokenType::Identifier => self.parse_identifier(),
            TokenType::Integer => {
                let value = self
                    .lexer
                    .resolve(t.lexeme)
                    .parse::<i64>()
                    .map_err(|_| self.err(ParseErrorKind::InvalidNumber))?;
                self.advance()?;
                Ok(self.arena.alloc(Expr::new(ExprKind::Integer(value), t.line)))
            }
            TokenType::Float => {
                let value = self
                    .lexer
                    .resolve(t.lexeme)
                    .parse::<f64>()
                    .map_err(|_| self.err(ParseErrorKind::InvalidNumber))?;
                self.advance()?;
                Ok(self.arena.alloc(Expr::new(ExprKind::Float(value), t.line)))
            }
            TokenType::Str => {
                self.advance()?;
                Ok(self.arena.alloc(Expr::new(ExprKind::Str(t.lexeme), t.line)))
            }
            TokenType::VarOrLet => self.parse_var_decl(),
            TokenType::Function => self.parse_function(),
            TokenType::If => self.parse_if(),
            TokenType::While => self.parse_while(),
            TokenType::Do => self.parse_do_while(),
            TokenType::For => self.parse_for(),
            TokenType::Return => self.parse_return(),
            TokenType::Break => {
                self.advance()?;
                Ok(self.arena.alloc(Expr::new(ExprKind::Break, t.line)))
            }
            TokenType::Continue => {
                self.advance()?;
                Ok(self.arena.alloc(Expr::new(ExprKind::Continue, t.line)))
            }
            TokenType::SingleChar => {
                if t.lexeme == self.marks.lparen {
                    return self.parse_paren_expr();
                }
                let is_prefix_op = matches!(self.lexer.resolve(t.lexeme), "+" | "-" | "!" | "~");
                if is_prefix_op {
                    self.advance()?;
                    let operand = self.parse_primary()?;
                    return Ok(self.arena.alloc(Expr::new(
                        ExprKind::Unary {
                            op: t.lexeme,
                            operand,
                        },
                        t.line,
                    )));
                }
                Err(self.err(ParseErrorKind::UnknownToken))
            }
            TokenType::Eof => Err(self.err(ParseErrorKind::UnexpectedEof)),
            _ => Err(self.err(ParseErrorKind::UnknownToken)),
        }
    }

    /// An identifier alone is a variable reference; followed by `(` it is a
    /// call.
    fn parse_identifier(&mut self) -> Result<&'a Expr<'a>, Error> {
        let t = self.current();
        self.advance()?;

        if self.at_punct(self.marks.lparen) {
            let args = self.parse_paren_list()?;
            let args = self.arena.alloc_list(&args);
            Ok(self.arena.alloc(Expr::new(
                ExprKind::Call {
                    callee: t.lexeme,
                    args,
                },
                t.line,
            )))
        } else {
            Ok(self.arena.alloc(Expr::new(
                ExprKind::Variable {
                    define: DefineKind::None,
                    name: t.lexeme,
                },
                t.line,
            )))
        }
    }

    /// `var x` / `let x` as a primary; any `= init` extends it through the
    /// ordinary climbing loop above.
    fn parse_var_decl(&mut self) -> Result<&'a Expr<'a>, Error> {
        let t = self.current();
        let define = if self.lexer.resolve(t.lexeme) == "var" {
            DefineKind::Var
        } else {
            DefineKind::Let
        };
        self.advance()?; // eat 'var' / 'let'

        if self.current().kind != TokenType::Identifier {
            return Err(self.err(ParseErrorKind::ExpectedIdentifier));
        }
        let name = self.current().lexeme;
        self.advance()?;

        Ok(self
            .arena
            .alloc(Expr::new(ExprKind::Variable { define, name }, t.line)))
    }

    /// `( expression )`; the inner node is returned as-is.
    fn parse_paren_expr(&mut self) -> Result<&'a Expr<'a>, Error> {
        self.advance()?; // eat '('
        let inner = self.parse_expression()?;
        self.expect_punct(self.marks.rparen, "')'")?;
        Ok(inner)
    }
}
