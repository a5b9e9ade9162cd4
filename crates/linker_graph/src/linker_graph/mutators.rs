//! Post-construction writes to the linker graph
//!
//! Later passes (for example the ones generating runtime helper imports) use
//! these to add parts, mint symbols, and record cross-file uses. None of this
//! is synchronized: call it from single-threaded passes only.

use super::{ImportData, LinkerGraph};
use crate::{
    ast::{Dependency, Part},
    symbols::{Symbol, SymbolKind},
    types::{Ref, SourceIndex},
};

impl LinkerGraph {
    /// Append a part to a JS file and return its index
    ///
    /// Top-level symbols the part declares are added to the file's
    /// declaring-parts overlay, seeded from the parser's table the first time a
    /// symbol is seen, so the parser's table itself is never modified.
    pub fn add_part_to_file(&mut self, source_index: SourceIndex, part: Part) -> u32 {
        for declared in part.declared_symbols.iter().filter(|d| d.is_top_level) {
            let r = declared.symbol_ref;
            assert!(
                r.source_index == source_index,
                "internal error: part added to file {source_index} declares {r:?}, which belongs \
                 to another file"
            );
            assert!(
                self.symbols.contains(r),
                "internal error: part added to file {source_index} declares missing symbol {r:?}"
            );
        }

        let repr = self.js_repr_mut(source_index);
        let part_index = repr.parts.len() as u32;
        for declared in part.declared_symbols.iter().filter(|d| d.is_top_level) {
            repr.add_top_level_symbol_part(declared.symbol_ref, part_index);
        }

        repr.parts.push(part);
        log::trace!("Added part {part_index} to file {source_index}");
        part_index
    }

    /// Mint a new symbol in a JS file
    ///
    /// The symbol is also recorded in the module scope's generated list so
    /// renaming knows it has no position in the source.
    pub fn generate_new_symbol(
        &mut self,
        source_index: SourceIndex,
        kind: SymbolKind,
        original_name: &str,
    ) -> Ref {
        let inner_index = self.symbols.symbols_for_source(source_index).len() as u32;
        let r = Ref::new(source_index, inner_index);

        self.js_repr_mut(source_index).module_scope.generated.push(r);
        self.symbols
            .symbols_for_source_mut(source_index)
            .push(Symbol::new(kind, original_name));

        log::trace!("Generated symbol {original_name:?} as {r:?}");
        r
    }

    /// Record that a part uses `symbol_ref`, which lives in
    /// `source_index_to_import_from`
    ///
    /// Adds a dependency edge from the using part to every part declaring the
    /// symbol, so tree shaking pulls those parts in whenever the user is live.
    /// A use count of zero records nothing.
    pub fn generate_symbol_import_and_use(
        &mut self,
        source_index: SourceIndex,
        part_index: u32,
        symbol_ref: Ref,
        use_count: u32,
        source_index_to_import_from: SourceIndex,
    ) {
        if use_count == 0 {
            return;
        }

        assert!(
            self.symbols.contains(symbol_ref),
            "internal error: use of missing symbol {symbol_ref:?} in file {source_index}"
        );

        let declaring_parts = self
            .js_repr(source_index_to_import_from)
            .top_level_symbol_to_parts(symbol_ref)
            .to_vec();

        let repr = self.js_repr_mut(source_index);
        let wrapper = repr.wrapper_ref_kind(symbol_ref);
        let part_count = repr.parts.len();
        let part = repr.parts.get_mut(part_index as usize).unwrap_or_else(|| {
            panic!(
                "internal error: part {part_index} does not exist in file {source_index} \
                 ({part_count} parts)"
            )
        });

        part.symbol_uses.entry(symbol_ref).or_default().count_estimate += use_count;

        // Keep the module-format wrapper flags in sync, e.g. CommonJS `exports`
        if let Some(wrapper) = wrapper {
            repr.used_wrapper_refs.insert(wrapper);
        }

        if source_index_to_import_from != source_index {
            repr.meta.imports_to_bind.insert(
                symbol_ref,
                ImportData {
                    source_index: source_index_to_import_from,
                    symbol_ref,
                },
            );
        }

        part.dependencies
            .extend(declaring_parts.into_iter().map(|declaring_part| Dependency {
                source_index: source_index_to_import_from,
                part_index: declaring_part,
            }));
    }

    /// Record a use of a helper exported by the runtime file
    pub fn generate_runtime_symbol_import_and_use(
        &mut self,
        source_index: SourceIndex,
        part_index: u32,
        name: &str,
        use_count: u32,
    ) {
        if use_count == 0 {
            return;
        }

        let symbol_ref = self
            .js_repr(SourceIndex::RUNTIME)
            .named_exports
            .get(name)
            .map(|export| export.symbol_ref)
            .unwrap_or_else(|| panic!("internal error: runtime does not export {name:?}"));

        self.generate_symbol_import_and_use(
            source_index,
            part_index,
            symbol_ref,
            use_count,
            SourceIndex::RUNTIME,
        );
    }
}
