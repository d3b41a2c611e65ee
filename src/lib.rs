//! NanoJS: a tree-walking interpreter for a tiny JavaScript-flavored
//! scripting language.
//!
//! The pipeline has three stages: the [`lexer`] turns source text into
//! tokens, the [`parser`] builds an arena-allocated AST by precedence
//! climbing, and the [`interpreter`] walks the tree with a dynamic scope
//! chain. The only built-in is `print`.
//!
//! ```
//! let result = nanojs::run_source("var x = 2; print(x * 21);");
//! assert_eq!(result.lines, vec!["42"]);
//! assert!(result.error.is_none());
//! ```

pub mod arena;
pub mod ast;
pub mod builtins;
pub mod cli;
pub mod debug;
pub mod error;
pub mod intern;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod style;
pub mod suggest;
pub mod token;

pub use arena::AstArena;
pub use ast::{DefineKind, Expr, ExprKind, Program};
pub use builtins::{BufferSink, Builtin, PrintSink, StdoutSink};
pub use debug::{render_program, DisplayWith, WithInterner};
pub use error::{
    Error, EvalError, EvalErrorKind, LexError, LexErrorKind, ParseError, ParseErrorKind,
};
pub use intern::{Interner, Symbol};
pub use interpreter::{Interpreter, Outcome, Value};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Span, Token, TokenType};

/// Parse a source text into a program whose nodes live in `arena`.
pub fn parse<'a>(
    source: &str,
    interner: &mut Interner,
    arena: &'a AstArena,
) -> Result<Program<'a>, Error> {
    Parser::new(source, interner, arena).parse()
}

/// Evaluate a parsed program, writing `print` output to stdout.
pub fn evaluate<'a>(program: &Program<'a>, interner: &Interner) -> Result<(), Error> {
    let mut interp = Interpreter::new(interner, StdoutSink);
    interp.run(program).map_err(Error::from)
}

/// Outcome of [`run_source`]: the collected `print` lines, and the rendered
/// error if one stopped the run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub lines: Vec<String>,
    pub error: Option<String>,
}

/// Run a source text through the whole pipeline, collecting output instead
/// of printing it. Intended for embedding and tests.
pub fn run_source(source: &str) -> RunResult {
    let arena = AstArena::with_capacity(source.len());
    let mut interner = Interner::new();

    let program = match parse(source, &mut interner, &arena) {
        Ok(p) => p,
        Err(e) => {
            return RunResult {
                lines: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    };

    let mut interp = Interpreter::new(&interner, BufferSink::default());
    let error = interp.run(&program).err().map(|e| e.to_string());
    RunResult {
        lines: interp.out.lines,
        error,
    }
}
