//! The linker graph: the set of files one linking invocation operates on
//!
//! Each linker gets its own graph (a single linker when code splitting is on,
//! one per entry point otherwise). The input files it is built from are shared
//! between invocations and cached across incremental builds, so construction
//! clones the fields later passes mutate and leaves everything else shared.
//!
//! Construction has one parallel phase, cloning every reachable file, followed
//! by a serial phase that promotes dynamic imports to entry points in a
//! deterministic order, sizes the entry bitsets, and merges cross-file tables.

use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::{
    ast::{ConstValue, InputFile, TsEnumValue},
    bitset::BitSet,
    symbols::SymbolMap,
    types::{Ref, SourceIndex},
};

mod clone;
pub mod file;
mod mutators;


pub use file::{
    CssRepr, EntryPoint, EntryPointKind, ExportData, ImportData, JsRepr, JsReprMeta, LinkerFile,
    LinkerRepr,
};

#[derive(Debug)]
pub struct LinkerGraph {
    /// Indexed by source index. Only reachable files are populated.
    files: Vec<Option<LinkerFile>>,
    entry_points: Vec<EntryPoint>,
    symbols: SymbolMap,

    /// Cross-module inlining of TypeScript enum constants
    ts_enums: FxHashMap<Ref, FxHashMap<String, TsEnumValue>>,

    /// Cross-module inlining of detected constants
    const_values: FxHashMap<Ref, ConstValue>,

    /// Every file reachable from an entry point, in a deterministic order.
    /// Iterate this instead of `files` so incremental builds only touch the
    /// files they need.
    reachable_files: Vec<SourceIndex>,

    /// Maps unstable source indices to their position in `reachable_files`.
    /// Use this as the sort key for anything containing a source index.
    stable_source_indices: Vec<u32>,
}

impl LinkerGraph {
    /// Build the graph for one linking invocation
    ///
    /// `reachable_files` must be produced deterministically (for example by
    /// [`find_reachable_files`](crate::reachability::find_reachable_files));
    /// the resulting entry point order depends only on it, never on the raw
    /// source index values.
    pub fn clone_from_inputs(
        input_files: &[InputFile],
        reachable_files: &[SourceIndex],
        original_entry_points: &[EntryPoint],
        code_splitting: bool,
    ) -> Self {
        let mut entry_points = original_entry_points.to_vec();
        let mut symbols = SymbolMap::new(input_files.len());
        let mut files: Vec<Option<LinkerFile>> = Vec::new();
        files.resize_with(input_files.len(), || None);

        // Mark user-specified entry points before cloning so promotion can tell
        // them apart from newly discovered dynamic entries
        let entry_point_kinds = user_entry_point_kinds(input_files.len(), original_entry_points);
        let stable_source_indices = stable_source_indices(input_files.len(), reachable_files);

        log::debug!(
            "Cloning {} reachable files ({} entry points, code splitting: {code_splitting})",
            reachable_files.len(),
            entry_points.len()
        );

        let dynamic_import_entry_points = Mutex::new(Vec::new());
        let cloned: Vec<_> = reachable_files
            .par_iter()
            .map(|&source_index| {
                let input_file = input_files.get(source_index.as_usize()).unwrap_or_else(|| {
                    panic!("internal error: reachable file {source_index} is not in the input pool")
                });
                let cloned = clone::clone_input_file(
                    source_index,
                    input_file,
                    entry_point_kinds[source_index.as_usize()],
                    code_splitting,
                );
                if !cloned.dynamic_entry_points.is_empty() {
                    dynamic_import_entry_points
                        .lock()
                        .extend_from_slice(&cloned.dynamic_entry_points);
                }
                (source_index, cloned)
            })
            .collect();

        for (source_index, cloned) in cloned {
            symbols.set_symbols_for_source(source_index, cloned.symbols);
            files[source_index.as_usize()] = Some(cloned.file);
        }

        // Promote dynamic imports after the parallel phase has joined
        let mut stable_entry_points = promote_dynamic_entry_points(
            &mut files,
            dynamic_import_entry_points.into_inner(),
            &stable_source_indices,
        );

        // Source indices are not deterministic, stable indices are
        stable_entry_points.sort_unstable();
        for stable_index in stable_entry_points {
            entry_points.push(EntryPoint {
                source_index: reachable_files[stable_index as usize],
                ..EntryPoint::default()
            });
        }

        let (ts_enums, const_values) =
            finalize_files(&mut files, reachable_files, entry_points.len());

        log::debug!(
            "Linker graph ready: {} entry points ({} from dynamic imports), {} enums, {} \
             constants",
            entry_points.len(),
            entry_points.len() - original_entry_points.len(),
            ts_enums.len(),
            const_values.len()
        );

        Self {
            files,
            entry_points,
            symbols,
            ts_enums,
            const_values,
            reachable_files: reachable_files.to_vec(),
            stable_source_indices,
        }
    }

    /// Entry points, read-only so later passes cannot add or remove them
    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// All file slots, indexed by source index. Unreachable files are `None`.
    pub fn files(&self) -> &[Option<LinkerFile>] {
        &self.files
    }

    pub fn file(&self, source_index: SourceIndex) -> &LinkerFile {
        self.files
            .get(source_index.as_usize())
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("internal error: file {source_index} is not reachable"))
    }

    pub fn file_mut(&mut self, source_index: SourceIndex) -> &mut LinkerFile {
        self.files
            .get_mut(source_index.as_usize())
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("internal error: file {source_index} is not reachable"))
    }

    pub fn symbols(&self) -> &SymbolMap {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolMap {
        &mut self.symbols
    }

    pub fn reachable_files(&self) -> &[SourceIndex] {
        &self.reachable_files
    }

    /// Position of a reachable file in the deterministic file order
    pub fn stable_source_index(&self, source_index: SourceIndex) -> u32 {
        match self.stable_source_indices.get(source_index.as_usize()) {
            Some(&stable) if stable != u32::MAX => stable,
            _ => panic!("internal error: file {source_index} has no stable index"),
        }
    }

    pub fn ts_enums(&self) -> &FxHashMap<Ref, FxHashMap<String, TsEnumValue>> {
        &self.ts_enums
    }

    pub fn const_values(&self) -> &FxHashMap<Ref, ConstValue> {
        &self.const_values
    }

    /// The JS representation of a file. CSS files have no part or symbol model,
    /// so asking for one is a contract violation.
    pub fn js_repr(&self, source_index: SourceIndex) -> &JsRepr {
        self.file(source_index)
            .repr
            .as_js()
            .unwrap_or_else(|| panic!("internal error: file {source_index} is not a JS file"))
    }

    pub fn js_repr_mut(&mut self, source_index: SourceIndex) -> &mut JsRepr {
        self.file_mut(source_index)
            .repr
            .as_js_mut()
            .unwrap_or_else(|| panic!("internal error: file {source_index} is not a JS file"))
    }
}

fn user_entry_point_kinds(file_count: usize, entry_points: &[EntryPoint]) -> Vec<EntryPointKind> {
    let mut kinds = vec![EntryPointKind::None; file_count];
    for entry_point in entry_points {
        let source_index = entry_point.source_index;
        let kind = kinds.get_mut(source_index.as_usize()).unwrap_or_else(|| {
            panic!("internal error: entry point {source_index} is not in the input pool")
        });
        *kind = EntryPointKind::UserSpecified;
    }
    kinds
}

/// Position of every reachable file in `reachable_files`, `u32::MAX` for the rest
fn stable_source_indices(file_count: usize, reachable_files: &[SourceIndex]) -> Vec<u32> {
    let mut stable_source_indices = vec![u32::MAX; file_count];
    for (stable_index, source_index) in reachable_files.iter().enumerate() {
        let slot = stable_source_indices
            .get_mut(source_index.as_usize())
            .unwrap_or_else(|| {
                panic!("internal error: reachable file {source_index} is not in the input pool")
            });
        *slot = stable_index as u32;
    }
    stable_source_indices
}

/// Mark dynamic import targets that are not already entry points and return
/// their stable indices. A file imported dynamically by several files is only
/// promoted once.
fn promote_dynamic_entry_points(
    files: &mut [Option<LinkerFile>],
    candidates: Vec<SourceIndex>,
    stable_source_indices: &[u32],
) -> Vec<u32> {
    let mut stable_entry_points = Vec::new();
    for source_index in candidates {
        let file = files
            .get_mut(source_index.as_usize())
            .and_then(Option::as_mut)
            .unwrap_or_else(|| {
                panic!("internal error: dynamic import target {source_index} is not reachable")
            });
        if file.entry_point_kind == EntryPointKind::None {
            file.entry_point_kind = EntryPointKind::DynamicImport;
            stable_entry_points.push(stable_source_indices[source_index.as_usize()]);
        }
    }
    stable_entry_points
}

/// Size every entry bitset now that the entry point count is known, and merge
/// the per-file enum and constant tables into graph-wide ones
fn finalize_files(
    files: &mut [Option<LinkerFile>],
    reachable_files: &[SourceIndex],
    bit_count: usize,
) -> (
    FxHashMap<Ref, FxHashMap<String, TsEnumValue>>,
    FxHashMap<Ref, ConstValue>,
) {
    let mut ts_enums = FxHashMap::default();
    let mut const_values = FxHashMap::default();
    for source_index in reachable_files {
        let Some(file) = files[source_index.as_usize()].as_mut() else {
            continue;
        };
        file.entry_bits = BitSet::new(bit_count);

        if let LinkerRepr::Js(repr) = &file.repr {
            if let Some(enums) = repr.ts_enums() {
                ts_enums.extend(enums.iter().map(|(r, values)| (*r, values.clone())));
            }
            if let Some(values) = repr.const_values() {
                const_values.extend(values.iter().map(|(r, value)| (*r, *value)));
            }
        }
    }
    (ts_enums, const_values)
}
