//! Interner-aware display of AST nodes.
//!
//! Symbols are bare indices without the interner, so rendering goes through
//! a [`DisplayWith`] adapter. The `Expr` implementation produces canonical
//! source text the parser accepts back: binary expressions are fully
//! parenthesized, so operator structure survives a round trip even though
//! the original spelling does not.

use std::fmt;

use crate::ast::{DefineKind, Expr, ExprKind, Program};
use crate::intern::{Interner, Symbol};

pub trait DisplayWith {
    fn fmt_with(&self, interner: &Interner, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn with<'x>(&'x self, interner: &'x Interner) -> WithInterner<'x, Self> {
        WithInterner {
            target: self,
            interner,
        }
    }
}

pub struct WithInterner<'x, T: ?Sized> {
    pub target: &'x T,
    pub interner: &'x Interner,
}

impl<'x, T: DisplayWith> fmt::Display for WithInterner<'x, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.target.fmt_with(self.interner, f)
    }
}

impl DisplayWith for Symbol {
    fn fmt_with(&self, interner: &Interner, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", interner.resolve(*self))
    }
}

impl<'a> DisplayWith for Expr<'a> {
    fn fmt_with(&self, interner: &Interner, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Integer(v) => write!(f, "{}", v),
            ExprKind::Float(v) => {
                // keep a decimal point so the rendering re-lexes as a float
                if v.is_finite() && v.fract() == 0.0 {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            ExprKind::Str(s) => {
                write!(f, "\"")?;
                for c in interner.resolve(*s).chars() {
                    match c {
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            ExprKind::Variable { define, name } => {
                match define {
                    DefineKind::None => {}
                    DefineKind::Var => write!(f, "var ")?,
                    DefineKind::Let => write!(f, "let ")?,
                }
                write!(f, "{}", interner.resolve(*name))
            }
            ExprKind::Unary { op, operand } => {
                write!(f, "{}", interner.resolve(*op))?;
                match operand.kind {
                    ExprKind::Binary { .. } => write!(f, "({})", operand.with(interner)),
                    _ => write!(f, "{}", operand.with(interner)),
                }
            }
            ExprKind::Binary { op, lhs, rhs } => write!(
                f,
                "({} {} {})",
                lhs.with(interner),
                interner.resolve(*op),
                rhs.with(interner)
            ),
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", interner.resolve(*callee))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg.with(interner))?;
                }
                write!(f, ")")
            }
            ExprKind::Prototype { name, params } => {
                write!(f, "{}(", interner.resolve(*name))?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param.with(interner))?;
                }
                write!(f, ")")
            }
            ExprKind::Function { proto, body } => {
                write!(f, "function {}", proto.with(interner))?;
                match body {
                    Some(b) => write!(f, " {}", b.with(interner)),
                    None => write!(f, ";"),
                }
            }
            ExprKind::Block { statements } => {
                write!(f, "{{")?;
                for stmt in statements.iter() {
                    write!(f, " {};", stmt.with(interner))?;
                }
                write!(f, " }}")
            }
            ExprKind::Return { value } => match value {
                Some(v) => write!(f, "return {}", v.with(interner)),
                None => write!(f, "return"),
            },
            ExprKind::Break => write!(f, "break"),
            ExprKind::Continue => write!(f, "continue"),
            ExprKind::If {
                cond,
                then_block,
                else_block,
                else_if,
            } => {
                write!(f, "if ({})", cond.with(interner))?;
                match then_block {
                    Some(b) => write!(f, " {}", b.with(interner))?,
                    None => write!(f, ";")?,
                }
                if let Some(chain) = else_if {
                    write!(f, " else {}", chain.with(interner))?;
                } else if let Some(b) = else_block {
                    write!(f, " else {}", b.with(interner))?;
                }
                Ok(())
            }
            ExprKind::While { cond, body } => {
                write!(f, "while ({})", cond.with(interner))?;
                match body {
                    Some(b) => write!(f, " {}", b.with(interner)),
                    None => write!(f, ";"),
                }
            }
            ExprKind::DoWhile { body, cond } => {
                write!(
                    f,
                    "do {} while ({});",
                    body.with(interner),
                    cond.with(interner)
                )
            }
            ExprKind::For {
                init,
                test,
                step,
                body,
            } => {
                write!(
                    f,
                    "for ({}; {}; {})",
                    init.with(interner),
                    test.with(interner),
                    step.with(interner)
                )?;
                match body {
                    Some(b) => write!(f, " {}", b.with(interner)),
                    None => write!(f, ";"),
                }
            }
        }
    }
}

/// Canonical source for a whole program, one top-level statement per line.
pub fn render_program(program: &Program<'_>, interner: &Interner) -> String {
    let mut out = String::new();
    for &expr in program.iter() {
        out.push_str(&format!("{};\n", expr.with(interner)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::AstArena;
    use crate::parser::Parser;

    fn canonical(source: &str) -> String {
        let arena = AstArena::new();
        let mut interner = Interner::new();
        let program = Parser::new(source, &mut interner, &arena)
            .parse()
            .expect("parse failed");
        render_program(&program, &interner)
    }

    #[test]
    fn renders_precedence_explicitly() {
        assert_eq!(canonical("print(1 + 2 * 3);"), "print((1 + (2 * 3)));\n");
    }

    #[test]
    fn renders_declarations_and_strings() {
        assert_eq!(
            canonical("var msg = \"hi\\n\";"),
            "(var msg = \"hi\\n\");\n"
        );
    }

    #[test]
    fn renders_float_with_decimal_point() {
        assert_eq!(canonical("x = 3.0;"), "(x = 3.0);\n");
    }

    #[test]
    fn renders_control_flow() {
        let out = canonical("if (x > 1) { y = 2; } else { y = 3; }");
        assert_eq!(out, "if ((x > 1)) { (y = 2); } else { (y = 3); };\n");
    }

    #[test]
    fn renders_functions() {
        let out = canonical("function f(a, b = 10) { return a + b; }");
        assert_eq!(out, "function f(a, (b = 10)) { return (a + b); };\n");
    }

    #[test]
    fn rendering_reparses_to_same_rendering() {
        let source = "\
var s = 0;
function step(n, d = 1) { return n + d; }
for (let i = 0; i < 10; i = step(i)) {
  if (i == 5) break;
  if (i % 2 == 0) continue;
  s = s + i;
}
do { s = s - 1; } while (s > 3);
while (s < 100) { s = s * 2, s; }
print(\"s\", s, -s, !s, ~s, 1.5 + s);
";
        let first = canonical(source);
        let second = canonical(&first);
        assert_eq!(first, second);
    }
}
