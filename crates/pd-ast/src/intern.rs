//! String intern table shared by the lexer, parser and generator.
//!
//! Every distinct identifier or string-literal body is stored once and
//! referred to by a [`Symbol`]. Nothing is ever removed for the lifetime of
//! a compilation unit.

use serde::Serialize;
use std::collections::HashMap;

/// Handle into an [`Interner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Symbol(u32);

impl Symbol {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct Interner {
    #[serde(skip)]
    map: HashMap<String, Symbol>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&sym) = self.map.get(text) {
            return sym;
        }
        // at most one new string per token, and token counts are clamped to u32
        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(text.to_string());
        self.map.insert(text.to_string(), sym);
        sym
    }

    /// Lookup without inserting.
    pub fn get(&self, text: &str) -> Option<Symbol> {
        self.map.get(text).copied()
    }

    /// Panics if `sym` was produced by a different interner.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.index()]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_symbol() {
        let mut i = Interner::new();
        let a = i.intern("main");
        let b = i.intern("print");
        let c = i.intern("main");
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(i.len(), 2);
        assert_eq!(i.resolve(b), "print");
    }

    #[test]
    fn get_does_not_insert() {
        let mut i = Interner::new();
        assert!(i.get("x").is_none());
        let x = i.intern("x");
        assert_eq!(i.get("x"), Some(x));
        assert_eq!(i.len(), 1);
    }
}
