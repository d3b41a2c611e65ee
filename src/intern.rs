use std::collections::HashMap;
use std::rc::Rc;

/// Interned string handle.
///
/// Identifiers, string literals, and operator lexemes become 4-byte symbols
/// at lex time; scopes, the precedence table, and the builtin registry all
/// key on the symbol instead of the text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    /// The empty string; anonymous function names and EOF lexemes.
    pub const EMPTY: Symbol = Symbol(0);
}

impl Default for Symbol {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Symbol table for one parse.
///
/// Each distinct string is stored once as an `Rc<str>` shared between the
/// lookup map and the resolution table, so interning costs one allocation
/// per unique string. The interpreter runs single-threaded, which is what
/// makes `Rc` the right ownership here.
pub struct Interner {
    map: HashMap<Rc<str>, Symbol>,
    strings: Vec<Rc<str>>,
}

impl Interner {
    pub fn new() -> Self {
        // slot 0 is the empty string, so intern("") is Symbol::EMPTY
        let empty: Rc<str> = Rc::from("");
        let mut map = HashMap::new();
        map.insert(Rc::clone(&empty), Symbol::EMPTY);
        Interner {
            map,
            strings: vec![empty],
        }
    }

    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&sym) = self.map.get(text) {
            return sym;
        }
        let stored: Rc<str> = Rc::from(text);
        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(Rc::clone(&stored));
        self.map.insert(stored, sym);
        sym
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }

    /// The symbol for an already-interned string, without creating one.
    /// The builtin registry uses this after parsing: a name that never
    /// occurred in the source has no symbol.
    pub fn lookup(&self, text: &str) -> Option<Symbol> {
        self.map.get(text).copied()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
