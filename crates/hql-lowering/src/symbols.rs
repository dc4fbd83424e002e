//! Compilation-scoped symbol table.
//!
//! A hint map from names to declaration kinds. The only consumer is the
//! call-vs-access disambiguation: a two-element list `(sym arg)` is a call
//! when `sym` is known callable, a collection access otherwise.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Fn,
    Variable,
    Class,
    Enum,
    Import,
}

impl SymbolKind {
    /// Whether a `(name arg)` form with this head should lower to a call.
    #[must_use]
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            SymbolKind::Function | SymbolKind::Fn | SymbolKind::Class | SymbolKind::Import
        )
    }
}

/// Per-compilation name-to-kind map.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: FxHashMap<String, SymbolKind>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: impl Into<String>, kind: SymbolKind) {
        self.entries.insert(name.into(), kind);
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<SymbolKind> {
        self.entries.get(name).copied()
    }

    #[must_use]
    pub fn is_callable(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(SymbolKind::is_callable)
    }
}
