//! # Symbol Tables
//!
//! Small, insertion-ordered symbol tables backed by `Vec` rather than
//! `HashMap`. Function bodies and signature lists in practice hold at most
//! a handful of entries, so a linear scan avoids hashing overhead and the
//! string duplication a `HashMap<String, _>` key would otherwise force.

use crate::parser::ast::Type;

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    /// Offset from `rbp`, always <= 0 (negative: below the frame pointer).
    pub stack_offset: i64,
    pub is_param: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: Symbol) {
        self.entries.push(symbol);
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.entries.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter()
    }
}

#[derive(Debug, Clone)]
pub struct FunctionSig {
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
}
