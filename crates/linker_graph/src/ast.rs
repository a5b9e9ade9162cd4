//! Parser output consumed by the linker
//!
//! Everything in this module is produced by the parse stage and stored in the
//! shared parse cache. The linker never mutates these values: any field a
//! linking pass needs to change is cloned into the per-invocation
//! [`LinkerFile`](crate::linker_graph::LinkerFile) first.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::{
    symbols::Symbol,
    types::{Loc, Range, Ref, Source, SourceIndex},
};

/// One parsed module from the input pool
#[derive(Debug, Clone)]
pub struct InputFile {
    pub source: Arc<Source>,
    pub repr: InputRepr,
}

impl InputFile {
    pub fn js(source: Source, ast: JsAst) -> Self {
        Self {
            source: Arc::new(source),
            repr: InputRepr::Js(Arc::new(ast)),
        }
    }

    pub fn css(source: Source, ast: CssAst) -> Self {
        Self {
            source: Arc::new(source),
            repr: InputRepr::Css(Arc::new(ast)),
        }
    }

    pub fn js_ast(&self) -> Option<&Arc<JsAst>> {
        match &self.repr {
            InputRepr::Js(ast) => Some(ast),
            InputRepr::Css(_) => None,
        }
    }

    pub fn import_records(&self) -> &[ImportRecord] {
        match &self.repr {
            InputRepr::Js(ast) => &ast.import_records,
            InputRepr::Css(ast) => &ast.import_records,
        }
    }
}

/// The language-specific half of an input file
#[derive(Debug, Clone)]
pub enum InputRepr {
    Js(Arc<JsAst>),
    Css(Arc<CssAst>),
}

/// How an import record was written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImportKind {
    /// `import` or `export ... from`
    #[default]
    Stmt,
    /// `require()`
    Require,
    /// `import()`
    Dynamic,
    /// `require.resolve()`
    RequireResolve,
    /// CSS `@import`
    At,
    /// CSS `url()`
    Url,
    /// A file the user listed as an entry point
    EntryPoint,
}

/// One `key: value` pair from an import assertion such as `{ type: 'json' }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertEntry {
    pub key: String,
    pub value: String,
}

/// A static or dynamic reference from one file to another
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportRecord {
    pub kind: ImportKind,
    pub path: String,
    pub range: Range,
    /// The file this record resolved to, if it resolved to a file in the pool
    pub source_index: Option<SourceIndex>,
    pub assertions: Option<Vec<AssertEntry>>,
}

impl ImportRecord {
    pub fn new(
        kind: ImportKind,
        path: impl Into<String>,
        source_index: Option<SourceIndex>,
    ) -> Self {
        Self {
            kind,
            path: path.into(),
            source_index,
            ..Default::default()
        }
    }
}

/// A symbol declared by a part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredSymbol {
    pub symbol_ref: Ref,
    pub is_top_level: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolUse {
    pub count_estimate: u32,
}

/// An edge from a part to a part (possibly in another file) that must be
/// included whenever the first part is included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub source_index: SourceIndex,
    pub part_index: u32,
}

/// A group of top-level statements; the unit of tree shaking
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Part {
    pub declared_symbols: Vec<DeclaredSymbol>,
    /// Symbols referenced by this part. Always present, possibly empty.
    pub symbol_uses: FxHashMap<Ref, SymbolUse>,
    pub dependencies: Vec<Dependency>,
    pub import_record_indices: Vec<u32>,
    pub can_be_removed_if_unused: bool,
    /// Set by tree shaking
    pub is_live: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    /// The exported name this binding imports, e.g. `foo` in `import { foo as bar }`
    pub alias: String,
    pub alias_loc: Loc,
    pub import_record_index: u32,
    pub is_exported: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedExport {
    pub symbol_ref: Ref,
    pub alias_loc: Loc,
}

/// Module-level scope of a JS file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scope {
    pub members: FxHashMap<String, Ref>,
    /// Symbols created after parsing, which have no position in the source
    pub generated: Vec<Ref>,
}

/// Module-format objects the linker tracks reads of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperRef {
    /// CommonJS `exports`
    Exports,
    /// CommonJS `module`
    Module,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TsEnumValue {
    String(String),
    Number(f64),
}

/// A value the parser proved constant and that may be inlined across files
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Null,
    Undefined,
    True,
    False,
    Number(f64),
}

/// Parser output for a JavaScript or TypeScript file
#[derive(Debug, Clone, Default)]
pub struct JsAst {
    pub parts: Vec<Part>,
    pub symbols: Vec<Symbol>,
    pub import_records: Vec<ImportRecord>,
    pub named_imports: FxHashMap<Ref, NamedImport>,
    /// Exports keyed by alias, in source order
    pub named_exports: IndexMap<String, NamedExport>,
    pub module_scope: Scope,
    /// Wrapper objects declared for this file's module format
    pub wrapper_refs: Vec<(WrapperRef, Ref)>,
    /// Wrapper objects the parsed source already reads
    pub used_wrapper_refs: Vec<WrapperRef>,
    pub top_level_symbol_to_parts_from_parser: FxHashMap<Ref, Vec<u32>>,
    pub ts_enums: Option<FxHashMap<Ref, FxHashMap<String, TsEnumValue>>>,
    pub const_values: Option<FxHashMap<Ref, ConstValue>>,
}

impl JsAst {
    /// Which wrapper object `r` is, if any
    pub fn wrapper_ref_kind(&self, r: Ref) -> Option<WrapperRef> {
        self.wrapper_refs
            .iter()
            .find(|(_, wrapper)| *wrapper == r)
            .map(|(kind, _)| *kind)
    }
}

/// Parser output for a CSS file. CSS has no part or symbol model.
#[derive(Debug, Clone, Default)]
pub struct CssAst {
    pub import_records: Vec<ImportRecord>,
}
