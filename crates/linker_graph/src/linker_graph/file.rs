//! Per-invocation file wrappers owned by the linker graph

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    ast::{
        ConstValue, ImportRecord, JsAst, NamedExport, NamedImport, Part, Scope, TsEnumValue,
        WrapperRef,
    },
    bitset::BitSet,
    line_column::LineColumnTracker,
    types::{Loc, Ref, Source, SourceIndex},
};

/// Why a file is an entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryPointKind {
    #[default]
    None,
    UserSpecified,
    /// Promoted from the target of an `import()` while code splitting
    DynamicImport,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryPoint {
    pub source_index: SourceIndex,
    /// Absolute or relative output path. Relative paths are later joined onto
    /// the output directory.
    pub output_path: String,
    /// Auto-generated paths are the only ones considered when computing the
    /// default output base directory
    pub output_path_was_auto_generated: bool,
}

impl EntryPoint {
    pub fn new(source_index: SourceIndex, output_path: impl Into<String>) -> Self {
        Self {
            source_index,
            output_path: output_path.into(),
            output_path_was_auto_generated: false,
        }
    }
}

/// The resolved target of one export alias
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportData {
    pub symbol_ref: Ref,
    /// The file the export was declared in. Re-exports point at another file.
    pub source_index: SourceIndex,
    pub name_loc: Loc,
}

/// A cross-file binding that later passes must link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportData {
    pub source_index: SourceIndex,
    pub symbol_ref: Ref,
}

/// Linker-only metadata attached to every JS file
#[derive(Debug, Clone, Default)]
pub struct JsReprMeta {
    pub resolved_exports: IndexMap<String, ExportData>,
    pub is_probably_typescript_type: FxHashSet<Ref>,
    pub imports_to_bind: FxHashMap<Ref, ImportData>,
    /// Declaring parts for top-level symbols that gained parts after parsing.
    /// Entries here replace the parser's list for that symbol.
    pub top_level_symbol_to_parts_overlay: FxHashMap<Ref, Vec<u32>>,
}

/// Mutable view of a JS file for one linking invocation
///
/// Every field a linking pass may change lives directly on this struct as an
/// owned copy. The parse output it was cloned from stays shared with the parse
/// cache, and only its never-mutated tables can be read through this struct:
///
/// ```compile_fail
/// fn stale_parts(repr: &linker_graph::linker_graph::JsRepr) -> usize {
///     repr.ast.parts.len()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsRepr {
    ast: Arc<JsAst>,
    pub parts: Vec<Part>,
    pub import_records: Vec<ImportRecord>,
    pub named_imports: FxHashMap<Ref, NamedImport>,
    pub named_exports: IndexMap<String, NamedExport>,
    pub module_scope: Scope,
    pub used_wrapper_refs: FxHashSet<WrapperRef>,
    pub meta: JsReprMeta,
}

impl JsRepr {
    /// Clone the mutable half of `ast`. `import_records` replaces the parser's
    /// records, which the caller may already have rewritten.
    pub(super) fn new(
        ast: Arc<JsAst>,
        import_records: Vec<ImportRecord>,
        meta: JsReprMeta,
    ) -> Self {
        Self {
            parts: ast.parts.clone(),
            import_records,
            named_imports: ast.named_imports.clone(),
            named_exports: ast.named_exports.clone(),
            module_scope: ast.module_scope.clone(),
            used_wrapper_refs: ast.used_wrapper_refs.iter().copied().collect(),
            meta,
            ast,
        }
    }

    /// All parts declaring the top-level symbol `r`, including parts added by
    /// the linker
    pub fn top_level_symbol_to_parts(&self, r: Ref) -> &[u32] {
        self.meta
            .top_level_symbol_to_parts_overlay
            .get(&r)
            .or_else(|| self.ast.top_level_symbol_to_parts_from_parser.get(&r))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Declaring parts as the parser saw them, ignoring parts added since
    pub fn parser_top_level_symbol_to_parts(&self, r: Ref) -> &[u32] {
        self.ast
            .top_level_symbol_to_parts_from_parser
            .get(&r)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Record that `part_index` declares the top-level symbol `r`
    ///
    /// The first time a symbol gains a part its overlay entry is seeded from
    /// the parser's list, which itself is never modified.
    pub(super) fn add_top_level_symbol_part(&mut self, r: Ref, part_index: u32) {
        let ast = &self.ast;
        self.meta
            .top_level_symbol_to_parts_overlay
            .entry(r)
            .or_insert_with(|| {
                ast.top_level_symbol_to_parts_from_parser
                    .get(&r)
                    .cloned()
                    .unwrap_or_default()
            })
            .push(part_index);
    }

    pub fn wrapper_ref_kind(&self, r: Ref) -> Option<WrapperRef> {
        self.ast.wrapper_ref_kind(r)
    }

    pub fn ts_enums(&self) -> Option<&FxHashMap<Ref, FxHashMap<String, TsEnumValue>>> {
        self.ast.ts_enums.as_ref()
    }

    pub fn const_values(&self) -> Option<&FxHashMap<Ref, ConstValue>> {
        self.ast.const_values.as_ref()
    }

    pub fn uses_exports_ref(&self) -> bool {
        self.used_wrapper_refs.contains(&WrapperRef::Exports)
    }

    pub fn uses_module_ref(&self) -> bool {
        self.used_wrapper_refs.contains(&WrapperRef::Module)
    }
}

#[derive(Debug, Clone)]
pub struct CssRepr {
    pub import_records: Vec<ImportRecord>,
}

#[derive(Debug, Clone)]
pub enum LinkerRepr {
    Js(Box<JsRepr>),
    Css(CssRepr),
}

impl LinkerRepr {
    pub fn import_records(&self) -> &[ImportRecord] {
        match self {
            Self::Js(repr) => &repr.import_records,
            Self::Css(repr) => &repr.import_records,
        }
    }

    pub fn as_js(&self) -> Option<&JsRepr> {
        match self {
            Self::Js(repr) => Some(repr.as_ref()),
            Self::Css(_) => None,
        }
    }

    pub fn as_js_mut(&mut self) -> Option<&mut JsRepr> {
        match self {
            Self::Js(repr) => Some(repr.as_mut()),
            Self::Css(_) => None,
        }
    }
}

/// A reachable file as seen by one linking invocation
#[derive(Debug)]
pub struct LinkerFile {
    /// Entry points that can reach this file. Sized once the final entry point
    /// count is known; filled in by chunking.
    pub entry_bits: BitSet,
    pub source: Arc<Source>,
    pub repr: LinkerRepr,
    /// Fewest import edges between an entry point and this file
    pub distance_from_entry_point: u32,
    /// Index of this file's entry point chunk, when it is an entry point
    pub entry_point_chunk_index: Option<u32>,
    /// Set by tree shaking
    pub is_live: bool,
    pub(crate) entry_point_kind: EntryPointKind,
    lazy_line_column_tracker: OnceCell<LineColumnTracker>,
}

impl LinkerFile {
    pub(crate) fn new(
        source: Arc<Source>,
        repr: LinkerRepr,
        entry_point_kind: EntryPointKind,
    ) -> Self {
        Self {
            entry_bits: BitSet::default(),
            source,
            repr,
            distance_from_entry_point: u32::MAX,
            entry_point_chunk_index: None,
            is_live: false,
            entry_point_kind,
            lazy_line_column_tracker: OnceCell::new(),
        }
    }

    pub fn entry_point_kind(&self) -> EntryPointKind {
        self.entry_point_kind
    }

    /// Dynamically-imported files may also be user-specified entry points, in
    /// which case they keep the user-specified kind
    pub fn is_entry_point(&self) -> bool {
        self.entry_point_kind != EntryPointKind::None
    }

    pub fn is_user_specified_entry_point(&self) -> bool {
        self.entry_point_kind == EntryPointKind::UserSpecified
    }

    /// Line table for diagnostics, built on first use
    pub fn line_column_tracker(&self) -> &LineColumnTracker {
        self.lazy_line_column_tracker
            .get_or_init(|| LineColumnTracker::new(&self.source))
    }
}
