use crate::intern::Symbol;

/// Which declaration keyword introduced a variable node, if any.
///
/// The distinction only matters on the left side of `=`: `var` binds in the
/// top-level scope, `let` in the innermost scope, and a bare name in whatever
/// scope already owns it (or the innermost when nothing does).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineKind {
    None,
    Var,
    Let,
}

/// A parsed program: the ordered top-level expressions of the source file.
pub type Program<'a> = Vec<&'a Expr<'a>>;

/// An AST node. Every node records the source line its first token began on;
/// runtime diagnostics report the line of the deepest node being evaluated.
#[derive(Debug)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub line: u32,
}

/// The single tagged variant covering every syntactic form.
///
/// Statements and expressions share one type: keyword-led forms are accepted
/// in primary position, which is what lets `var i = 0` sit in a `for` header.
#[derive(Debug)]
pub enum ExprKind<'a> {
    /// Integer literal: `42`
    Integer(i64),

    /// Float literal: `3.14`
    Float(f64),

    /// String literal (escapes already processed): `"hello"` or `'hello'`
    Str(Symbol),

    /// Name reference or declaration: `x`, `var x`, `let x`
    Variable { define: DefineKind, name: Symbol },

    /// Prefix operator: `-x`, `!ok`, `~bits`, `+n`
    Unary { op: Symbol, operand: &'a Expr<'a> },

    /// Infix operator, including `=` and the `,` sequencing operator
    Binary {
        op: Symbol,
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
    },

    /// Call by name: `f(1, 2)`
    Call {
        callee: Symbol,
        args: &'a [&'a Expr<'a>],
    },

    /// Function header: name plus parameter expressions. A parameter is a
    /// `Variable` or an assignment supplying its default, e.g. `b = 10`.
    Prototype {
        name: Symbol,
        params: &'a [&'a Expr<'a>],
    },

    /// `function name(params) { body }`; body absent for a bare declaration
    Function {
        proto: &'a Expr<'a>,
        body: Option<&'a Expr<'a>>,
    },

    /// `{ statements }`
    Block { statements: &'a [&'a Expr<'a>] },

    /// `return;` or `return expr;`
    Return { value: Option<&'a Expr<'a>> },

    /// `break;`
    Break,

    /// `continue;`
    Continue,

    /// `if (cond) ... else ...`. At most one of `else_block`/`else_if` is
    /// set; an `else if` chain nests through `else_if`.
    If {
        cond: &'a Expr<'a>,
        then_block: Option<&'a Expr<'a>>,
        else_block: Option<&'a Expr<'a>>,
        else_if: Option<&'a Expr<'a>>,
    },

    /// `while (cond) body`; `while (cond);` has no body
    While {
        cond: &'a Expr<'a>,
        body: Option<&'a Expr<'a>>,
    },

    /// `do body while (cond);`
    DoWhile {
        body: &'a Expr<'a>,
        cond: &'a Expr<'a>,
    },

    /// `for (init; test; step) body`
    For {
        init: &'a Expr<'a>,
        test: &'a Expr<'a>,
        step: &'a Expr<'a>,
        body: Option<&'a Expr<'a>>,
    },
}

impl<'a> Expr<'a> {
    pub fn new(kind: ExprKind<'a>, line: u32) -> Self {
        Expr { kind, line }
    }

    /// Human-readable node name for diagnostics.
    pub fn node_name(&self) -> &'static str {
        match self.kind {
            ExprKind::Integer(_) => "integer",
            ExprKind::Float(_) => "float",
            ExprKind::Str(_) => "string",
            ExprKind::Variable { .. } => "variable",
            ExprKind::Unary { .. } => "unary_op",
            ExprKind::Binary { .. } => "binary_op",
            ExprKind::Call { .. } => "call",
            ExprKind::Prototype { .. } => "prototype",
            ExprKind::Function { .. } => "function",
            ExprKind::Block { .. } => "block",
            ExprKind::Return { .. } => "return",
            ExprKind::Break => "break",
            ExprKind::Continue => "continue",
            ExprKind::If { .. } => "if_else",
            ExprKind::While { .. } => "while",
            ExprKind::DoWhile { .. } => "do_while",
            ExprKind::For { .. } => "for",
        }
    }

    /// The name of a `Variable` node. The parameter binder uses this after
    /// peeling a default-value assignment off a prototype entry.
    pub fn variable_name(&self) -> Option<Symbol> {
        match self.kind {
            ExprKind::Variable { name, .. } => Some(name),
            _ => None,
        }
    }
}
