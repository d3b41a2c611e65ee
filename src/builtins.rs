//! Built-in function registry and print output sinks.
//!
//! The registry is a name → handler table owned by the interpreter. The only
//! built-in is `print`; its output goes through a [`PrintSink`] so embedders
//! and tests can capture lines instead of writing to stdout.

use std::collections::HashMap;
use std::io::{self, Write};

use crate::intern::{Interner, Symbol};

/// Destination for `print` output. Called once per output line, without the
/// trailing newline.
pub trait PrintSink {
    fn write_line(&mut self, line: &str);
}

/// Default sink: one line per call to stdout.
pub struct StdoutSink;

impl PrintSink for StdoutSink {
    fn write_line(&mut self, line: &str) {
        // A closed pipe must not panic the interpreter.
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{}", line);
    }
}

/// Collects output lines in memory; used by `run_source` and the tests.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub lines: Vec<String>,
}

impl PrintSink for BufferSink {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Handler tags for the built-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
}

/// Build the name → handler table for a finished parse.
///
/// Lookup is by interned symbol; a built-in name that never occurs in the
/// source has no symbol and needs no entry.
pub fn registry(interner: &Interner) -> HashMap<Symbol, Builtin> {
    let mut table = HashMap::new();
    if let Some(sym) = interner.lookup("print") {
        table.insert(sym, Builtin::Print);
    }
    table
}
