//! Cloning of input files into per-invocation linker files
//!
//! Input files are shared between linker invocations and stored in the
//! incremental build cache. Cloning copies exactly the fields later passes
//! mutate; everything else stays behind the shared `Arc`.

use std::sync::Arc;

use indexmap::IndexMap;

use super::file::{CssRepr, EntryPointKind, ExportData, JsRepr, JsReprMeta, LinkerFile, LinkerRepr};
use crate::{
    ast::{CssAst, ImportKind, InputFile, InputRepr, JsAst},
    symbols::Symbol,
    types::SourceIndex,
};

/// Result of cloning one input file
#[derive(Debug)]
pub(super) struct ClonedFile {
    pub(super) file: LinkerFile,
    /// The file's symbols, to be installed in the graph-wide symbol map
    pub(super) symbols: Vec<Symbol>,
    /// Targets of dynamic imports that should become entry points
    pub(super) dynamic_entry_points: Vec<SourceIndex>,
}

pub(super) fn clone_input_file(
    source_index: SourceIndex,
    input_file: &InputFile,
    entry_point_kind: EntryPointKind,
    code_splitting: bool,
) -> ClonedFile {
    let mut dynamic_entry_points = Vec::new();
    let (repr, symbols) = match &input_file.repr {
        InputRepr::Js(ast) => {
            let repr = clone_js_repr(source_index, ast, code_splitting, &mut dynamic_entry_points);
            (LinkerRepr::Js(Box::new(repr)), ast.symbols.clone())
        }
        InputRepr::Css(ast) => (LinkerRepr::Css(clone_css_repr(ast)), Vec::new()),
    };

    log::trace!(
        "Cloned {} ({} symbols, {} dynamic entry candidates)",
        input_file.source.pretty_path,
        symbols.len(),
        dynamic_entry_points.len()
    );

    ClonedFile {
        file: LinkerFile::new(Arc::clone(&input_file.source), repr, entry_point_kind),
        symbols,
        dynamic_entry_points,
    }
}

fn clone_js_repr(
    source_index: SourceIndex,
    ast: &Arc<JsAst>,
    code_splitting: bool,
    dynamic_entry_points: &mut Vec<SourceIndex>,
) -> JsRepr {
    let mut import_records = ast.import_records.clone();
    if code_splitting {
        for record in &mut import_records {
            if record.kind != ImportKind::Dynamic {
                continue;
            }
            if let Some(target) = record.source_index {
                dynamic_entry_points.push(target);

                // The target is emitted as its own entry point, so an assertion
                // like `{ type: 'json' }` no longer describes what gets loaded
                record.assertions = None;
            }
        }
    }

    let resolved_exports: IndexMap<_, _> = ast
        .named_exports
        .iter()
        .map(|(alias, export)| {
            (
                alias.clone(),
                ExportData {
                    symbol_ref: export.symbol_ref,
                    source_index,
                    name_loc: export.alias_loc,
                },
            )
        })
        .collect();

    JsRepr::new(
        Arc::clone(ast),
        import_records,
        JsReprMeta {
            resolved_exports,
            ..JsReprMeta::default()
        },
    )
}

fn clone_css_repr(ast: &CssAst) -> CssRepr {
    CssRepr {
        import_records: ast.import_records.clone(),
    }
}
