//! Recursive-descent parser over the lexer's token stream.
//!
//! Statement dispatch lives here; expression parsing (precedence climbing)
//! is in the `expr` submodule. The parser owns the lexer, pulls one token at
//! a time, and allocates every node from the caller's [`AstArena`].

mod expr;

use std::collections::HashMap;

use crate::arena::AstArena;
use crate::ast::{Expr, ExprKind, Program};
use crate::error::{Error, ParseError, ParseErrorKind};
use crate::intern::{Interner, Symbol};
use crate::lexer::Lexer;
use crate::token::{Token, TokenType};

/// Precedence of `,` as the sequencing operator. The entry is removed while
/// argument lists are being parsed and restored afterwards.
const COMMA_PREC: i32 = 1;

/// Pre-interned punctuation the parser tests against constantly.
struct Marks {
    lparen: Symbol,
    rparen: Symbol,
    lbrace: Symbol,
    rbrace: Symbol,
    semi: Symbol,
    comma: Symbol,
}

pub struct Parser<'src, 'i, 'a> {
    lexer: Lexer<'src, 'i>,
    arena: &'a AstArena,
    precedence: HashMap<Symbol, i32>,
    marks: Marks,
}

impl<'src, 'i, 'a> Parser<'src, 'i, 'a> {
    pub fn new(source: &'src str, interner: &'i mut Interner, arena: &'a AstArena) -> Self {
        let mut precedence = HashMap::new();
        for (op, prec) in [
            ("=", 30),
            ("&&", 40),
            ("||", 40),
            (">>", 40),
            ("<<", 40),
            (">", 60),
            ("<", 60),
            (">=", 60),
            ("<=", 60),
            ("==", 60),
            ("!=", 60),
            ("&", 80),
            ("|", 80),
            ("^", 80),
            ("+", 90),
            ("-", 90),
            ("*", 100),
            ("/", 100),
            ("%", 100),
            (",", COMMA_PREC),
        ] {
            precedence.insert(interner.intern(op), prec);
        }

        let marks = Marks {
            lparen: interner.intern("("),
            rparen: interner.intern(")"),
            lbrace: interner.intern("{"),
            rbrace: interner.intern("}"),
            semi: interner.intern(";"),
            comma: interner.intern(","),
        };

        Parser {
            lexer: Lexer::new(source, interner),
            arena,
            precedence,
            marks,
        }
    }

    /// Consume the whole token stream and return the ordered top-level nodes.
    pub fn parse(&mut self) -> Result<Program<'a>, Error> {
        self.advance()?; // prime the first token
        let mut program = Vec::new();
        loop {
            self.skip_semicolons()?;
            if self.current().is_eof() {
                break;
            }
            program.push(self.parse_one()?);
        }
        Ok(program)
    }

    /// Parse one statement, dispatching on the current token kind.
    fn parse_one(&mut self) -> Result<&'a Expr<'a>, Error> {
        match self.current().kind {
            TokenType::Function => self.parse_function(),
            TokenType::If => self.parse_if(),
            TokenType::While => self.parse_while(),
            TokenType::Do => self.parse_do_while(),
            TokenType::For => self.parse_for(),
            TokenType::Return => self.parse_return(),
            TokenType::Break => {
                let line = self.current().line;
                self.advance()?;
                Ok(self.arena.alloc(Expr::new(ExprKind::Break, line)))
            }
            TokenType::Continue => {
                let line = self.current().line;
                self.advance()?;
                Ok(self.arena.alloc(Expr::new(ExprKind::Continue, line)))
            }
            TokenType::SingleChar if self.current().lexeme == self.marks.lbrace => {
                self.parse_block()
            }
            // Variable declarations and plain expressions both go through
            // the expression parser; `var x` is a primary that `=` extends.
            _ => self.parse_expression(),
        }
    }

    /// `function` IDENT? `(` params `)` block; body absent for a bare
    /// declaration.
    pub(crate) fn parse_function(&mut self) -> Result<&'a Expr<'a>, Error> {
        let line = self.current().line;
        self.advance()?; // eat 'function'
        let proto = self.parse_prototype()?;
        let body = if self.at_punct(self.marks.lbrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(self
            .arena
            .alloc(Expr::new(ExprKind::Function { proto, body }, line)))
    }

    fn parse_prototype(&mut self) -> Result<&'a Expr<'a>, Error> {
        let line = self.current().line;
        let mut name = Symbol::EMPTY;
        if self.current().kind == TokenType::Identifier {
            name = self.current().lexeme;
            self.advance()?;
        }
        let params = self.parse_paren_list()?;
        let params = self.arena.alloc_list(&params);
        Ok(self
            .arena
            .alloc(Expr::new(ExprKind::Prototype { name, params }, line)))
    }

    pub(crate) fn parse_if(&mut self) -> Result<&'a Expr<'a>, Error> {
        let line = self.current().line;
        self.advance()?; // eat 'if'
        self.expect_punct(self.marks.lparen, "'('")?;
        let cond = self.parse_expression()?;
        self.expect_punct(self.marks.rparen, "')'")?;

        let then_block = if self.at_punct(self.marks.semi) {
            self.advance()?;
            None
        } else {
            Some(self.parse_block_or_single()?)
        };

        // A single-statement branch ends in ';'; eat separators before
        // looking for the else keyword.
        self.skip_semicolons()?;

        let mut else_block = None;
        let mut else_if = None;
        if self.current().kind == TokenType::Else {
            self.advance()?;
            if self.current().kind == TokenType::If {
                else_if = Some(self.parse_if()?);
            } else if self.at_punct(self.marks.semi) {
                self.advance()?;
            } else {
                else_block = Some(self.parse_block_or_single()?);
            }
        }

        Ok(self.arena.alloc(Expr::new(
            ExprKind::If {
                cond,
                then_block,
                else_block,
                else_if,
            },
            line,
        )))
    }

    pub(crate) fn parse_while(&mut self) -> Result<&'a Expr<'a>, Error> {
        let line = self.current().line;
        self.advance()?; // eat 'while'
        self.expect_punct(self.marks.lparen, "'('")?;
        let cond = self.parse_expression()?;
        self.expect_punct(self.marks.rparen, "')'")?;

        let body = if self.at_punct(self.marks.semi) {
            self.advance()?;
            None
        } else {
            Some(self.parse_block_or_single()?)
        };

        Ok(self
            .arena
            .alloc(Expr::new(ExprKind::While { cond, body }, line)))
    }

    pub(crate) fn parse_do_while(&mut self) -> Result<&'a Expr<'a>, Error> {
        let line = self.current().line;
        self.advance()?; // eat 'do'
        let body = self.parse_block_or_single()?;

        if self.current().kind != TokenType::While {
            return Err(self.err(ParseErrorKind::Expected { what: "'while'" }));
        }
        self.advance()?;
        self.expect_punct(self.marks.lparen, "'('")?;
        let cond = self.parse_expression()?;
        self.expect_punct(self.marks.rparen, "')'")?;
        // the trailing ';' is consumed by the statement loop

        Ok(self
            .arena
            .alloc(Expr::new(ExprKind::DoWhile { body, cond }, line)))
    }

    /// `for (init; test; step) body` with exactly three control expressions;
    /// the init slot goes through statement dispatch so `var`/`let`
    /// declarations work there.
    pub(crate) fn parse_for(&mut self) -> Result<&'a Expr<'a>, Error> {
        let line = self.current().line;
        self.advance()?; // eat 'for'
        self.expect_punct(self.marks.lparen, "'('")?;
        let init = self.parse_one()?;
        self.expect_punct(self.marks.semi, "';'")?;
        let test = self.parse_expression()?;
        self.expect_punct(self.marks.semi, "';'")?;
        let step = self.parse_expression()?;
        self.expect_punct(self.marks.rparen, "')'")?;

        let body = if self.at_punct(self.marks.semi) {
            self.advance()?;
            None
        } else {
            Some(self.parse_block_or_single()?)
        };

        Ok(self.arena.alloc(Expr::new(
            ExprKind::For {
                init,
                test,
                step,
                body,
            },
            line,
        )))
    }

    pub(crate) fn parse_return(&mut self) -> Result<&'a Expr<'a>, Error> {
        let line = self.current().line;
        self.advance()?; // eat 'return'
        let value = if self.at_punct(self.marks.semi)
            || self.at_punct(self.marks.rbrace)
            || self.current().is_eof()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Ok(self
            .arena
            .alloc(Expr::new(ExprKind::Return { value }, line)))
    }

    /// `{ statements }`.
    fn parse_block(&mut self) -> Result<&'a Expr<'a>, Error> {
        let line = self.current().line;
        self.expect_punct(self.marks.lbrace, "'{'")?;

        let mut statements = Vec::new();
        loop {
            self.skip_semicolons()?;
            if self.at_punct(self.marks.rbrace) {
                break;
            }
            if self.current().is_eof() {
                return Err(self.err(ParseErrorKind::Expected { what: "'}'" }));
            }
            statements.push(self.parse_one()?);
        }
        self.advance()?; // eat '}'

        let statements = self.arena.alloc_list(&statements);
        Ok(self
            .arena
            .alloc(Expr::new(ExprKind::Block { statements }, line)))
    }

    /// A braced block, or a single statement wrapped in a one-element block.
    fn parse_block_or_single(&mut self) -> Result<&'a Expr<'a>, Error> {
        if self.at_punct(self.marks.lbrace) {
            return self.parse_block();
        }
        let line = self.current().line;
        let stmt = self.parse_one()?;
        let statements = self.arena.alloc_list(&[stmt]);
        Ok(self
            .arena
            .alloc(Expr::new(ExprKind::Block { statements }, line)))
    }

    /// `( expr, expr, ... )` for call arguments and prototype parameters.
    ///
    /// The `,` precedence entry is removed for the duration so a comma ends
    /// an item instead of extending it as the sequencing operator. Only the
    /// outermost list restores the entry, so nested calls inside an argument
    /// stay separator-mode until the whole list closes.
    fn parse_paren_list(&mut self) -> Result<Vec<&'a Expr<'a>>, Error> {
        self.expect_punct(self.marks.lparen, "'('")?;
        let removed = self.precedence.remove(&self.marks.comma);
        let result = self.parse_list_items();
        if let Some(prec) = removed {
            self.precedence.insert(self.marks.comma, prec);
        }
        result
    }

    fn parse_list_items(&mut self) -> Result<Vec<&'a Expr<'a>>, Error> {
        let mut items = Vec::new();
        if !self.at_punct(self.marks.rparen) {
            loop {
                items.push(self.parse_expression()?);
                if self.at_punct(self.marks.rparen) {
                    break;
                }
                if !self.at_punct(self.marks.comma) {
                    return Err(self.err(ParseErrorKind::Expected { what: "','" }));
                }
                self.advance()?;
            }
        }
        self.advance()?; // eat ')'
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn current(&self) -> Token {
        self.lexer.current()
    }

    fn advance(&mut self) -> Result<(), Error> {
        self.lexer.next_token()?;
        Ok(())
    }

    fn skip_semicolons(&mut self) -> Result<(), Error> {
        while self.at_punct(self.marks.semi) {
            self.advance()?;
        }
        Ok(())
    }

    /// True when the current token is the given punctuation character.
    /// Kind is checked so a string literal containing "=" never matches.
    fn at_punct(&self, sym: Symbol) -> bool {
        let t = self.current();
        t.kind == TokenType::SingleChar && t.lexeme == sym
    }

    fn expect_punct(&mut self, sym: Symbol, what: &'static str) -> Result<(), Error> {
        if self.at_punct(sym) {
            self.advance()?;
            Ok(())
        } else {
            Err(self.err(ParseErrorKind::Expected { what }))
        }
    }

    fn err(&self, kind: ParseErrorKind) -> Error {
        let t = self.current();
        let token = if t.is_eof() {
            "<eof>".to_string()
        } else {
            self.lexer.resolve(t.lexeme).to_string()
        };
        ParseError::new(kind, t.line, t.span, token).into()
    }
}
