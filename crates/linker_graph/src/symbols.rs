//! Symbol table shared by every file in one linking invocation
//!
//! Symbols are addressed by [`Ref`] (file identity plus in-file index). Merging
//! two symbols never moves data around: the merged symbol just gets a link to
//! the symbol it was merged into, and callers resolve a reference by following
//! links until they reach a symbol without one.

use crate::types::{Ref, SourceIndex};

/// What kind of binding a symbol is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymbolKind {
    /// A global that was referenced but never declared
    Unbound,
    /// `var` declarations and function parameters
    Hoisted,
    HoistedFunction,
    Class,
    Const,
    /// A binding introduced by an import statement
    Import,
    /// CommonJS `exports` / `module` objects and other wrapper bindings
    WrapperObject,
    #[default]
    Other,
}

/// A named binding belonging to exactly one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub original_name: String,
    /// The symbol this one was merged into, if any
    pub link: Option<Ref>,
    /// Rough number of uses, used as a tie breaker when renaming
    pub use_count_estimate: u32,
}

impl Symbol {
    pub fn new(kind: SymbolKind, original_name: impl Into<String>) -> Self {
        Self {
            kind,
            original_name: original_name.into(),
            link: None,
            use_count_estimate: 0,
        }
    }
}

/// Per-file symbol lists, indexed by source index
#[derive(Debug, Clone, Default)]
pub struct SymbolMap {
    symbols_for_source: Vec<Vec<Symbol>>,
}

impl SymbolMap {
    /// Create a symbol map with an empty slot for every file in the input pool
    pub fn new(file_count: usize) -> Self {
        Self {
            symbols_for_source: vec![Vec::new(); file_count],
        }
    }

    pub fn symbols_for_source(&self, source_index: SourceIndex) -> &[Symbol] {
        self.slot(source_index)
    }

    pub(crate) fn symbols_for_source_mut(&mut self, source_index: SourceIndex) -> &mut Vec<Symbol> {
        let len = self.symbols_for_source.len();
        self.symbols_for_source
            .get_mut(source_index.as_usize())
            .unwrap_or_else(|| {
                panic!(
                    "internal error: source index {source_index} is outside the symbol map \
                     ({len} files)"
                )
            })
    }

    pub(crate) fn set_symbols_for_source(
        &mut self,
        source_index: SourceIndex,
        symbols: Vec<Symbol>,
    ) {
        *self.symbols_for_source_mut(source_index) = symbols;
    }

    pub fn contains(&self, r: Ref) -> bool {
        self.symbols_for_source
            .get(r.source_index.as_usize())
            .is_some_and(|symbols| (r.inner_index as usize) < symbols.len())
    }

    pub fn get(&self, r: Ref) -> &Symbol {
        self.slot(r.source_index)
            .get(r.inner_index as usize)
            .unwrap_or_else(|| panic!("internal error: symbol {r:?} does not exist"))
    }

    pub fn get_mut(&mut self, r: Ref) -> &mut Symbol {
        self.symbols_for_source_mut(r.source_index)
            .get_mut(r.inner_index as usize)
            .unwrap_or_else(|| panic!("internal error: symbol {r:?} does not exist"))
    }

    /// Follow the link chain starting at `r` and return the symbol it resolves to
    pub fn follow(&self, r: Ref) -> Ref {
        let mut current = r;
        while let Some(next) = self.get(current).link {
            current = next;
        }
        current
    }

    /// Merge `old` into `new` so that both resolve to the same symbol
    ///
    /// Returns the reference both now resolve to. Every symbol visited on
    /// either chain is relinked directly to that root.
    pub fn merge(&mut self, old: Ref, new: Ref) -> Ref {
        let old_root = self.follow(old);
        let new_root = self.follow(new);
        if old_root == new_root {
            return new_root;
        }

        let old_uses = self.get(old_root).use_count_estimate;
        self.get_mut(new_root).use_count_estimate += old_uses;
        self.get_mut(old_root).link = Some(new_root);

        for start in [old, new] {
            let mut current = start;
            while current != new_root {
                let symbol = self.get_mut(current);
                let next = symbol.link.unwrap_or(new_root);
                symbol.link = Some(new_root);
                current = next;
            }
        }

        log::trace!("Merged symbol {old:?} into {new_root:?}");
        new_root
    }

    fn slot(&self, source_index: SourceIndex) -> &[Symbol] {
        self.symbols_for_source
            .get(source_index.as_usize())
            .unwrap_or_else(|| {
                panic!(
                    "internal error: source index {source_index} is outside the symbol map \
                     ({} files)",
                    self.symbols_for_source.len()
                )
            })
    }
}
