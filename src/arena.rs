use bumpalo::Bump;

use crate::ast::Expr;

/// Backing store for one parsed program.
///
/// Nodes and child-reference lists share a single bump region: the AST is
/// built in one pass, read-only afterwards, and discarded as a whole, so
/// there is nothing to free individually and no variant of `ExprKind` owns
/// a `Drop` type. The evaluator holds plain `&'a` references into the
/// region, which lets scope bindings and function values alias nodes
/// without reference counting.
pub struct AstArena {
    bump: Bump,
}

impl AstArena {
    pub fn new() -> Self {
        AstArena { bump: Bump::new() }
    }

    /// Pre-size the first chunk; the tree for a script comes out on the
    /// order of the source length.
    pub fn with_capacity(bytes: usize) -> Self {
        AstArena {
            bump: Bump::with_capacity(bytes),
        }
    }

    pub fn alloc<'a>(&'a self, expr: Expr<'a>) -> &'a Expr<'a> {
        self.bump.alloc(expr)
    }

    /// Store a child list (block statements, call arguments, prototype
    /// parameters). `&Expr` is `Copy`, so the slice is copied in directly.
    pub fn alloc_list<'a>(&'a self, items: &[&'a Expr<'a>]) -> &'a [&'a Expr<'a>] {
        self.bump.alloc_slice_copy(items)
    }
}

impl Default for AstArena {
    fn default() -> Self {
        Self::new()
    }
}
