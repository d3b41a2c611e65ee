mod expr;

pub use expr::{DefineKind, Expr, ExprKind, Program};
