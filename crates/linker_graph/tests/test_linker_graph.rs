use linker_graph::{
    EntryPoint, EntryPointKind, LinkerConfig, LinkerGraph, Ref, SourceIndex,
    ast::{
        ConstValue, DeclaredSymbol, ImportKind, ImportRecord, InputFile, JsAst, NamedExport, Part,
        TsEnumValue,
    },
    build_linker_graph,
    symbols::{Symbol, SymbolKind},
    types::{Loc, Source},
};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Logical files of the test project. `main` imports `lib` and dynamically
/// imports `lazy_b` then `lazy_a`; `lib` also dynamically imports `lazy_a`.
const RUNTIME: usize = 0;
const MAIN: usize = 1;
const LIB: usize = 2;
const LAZY_A: usize = 3;
const LAZY_B: usize = 4;
const SHARED: usize = 5;
const UNUSED: usize = 6;

const NAMES: [&str; 7] = [
    "<runtime>",
    "main.js",
    "lib.js",
    "lazy_a.js",
    "lazy_b.js",
    "shared.js",
    "unused.js",
];

/// Build the project with logical file `k` stored at source index `layout[k]`
fn project(layout: &[u32; 7]) -> (Vec<InputFile>, Vec<EntryPoint>) {
    let at = |logical: usize| SourceIndex::new(layout[logical]);
    let record = |kind, logical: usize| {
        ImportRecord::new(kind, format!("./{}", NAMES[logical]), Some(at(logical)))
    };

    let mut asts: Vec<JsAst> = (0..NAMES.len())
        .map(|logical| JsAst {
            symbols: vec![Symbol::new(SymbolKind::Const, format!("value{logical}"))],
            parts: vec![Part {
                declared_symbols: vec![DeclaredSymbol {
                    symbol_ref: Ref::new(at(logical), 0),
                    is_top_level: true,
                }],
                ..Part::default()
            }],
            ..JsAst::default()
        })
        .collect();

    asts[MAIN].import_records = vec![
        record(ImportKind::Stmt, LIB),
        record(ImportKind::Dynamic, LAZY_B),
        record(ImportKind::Dynamic, LAZY_A),
    ];
    asts[LIB].import_records = vec![
        record(ImportKind::Dynamic, LAZY_A),
        record(ImportKind::Stmt, SHARED),
    ];
    asts[LAZY_A].import_records = vec![record(ImportKind::Stmt, SHARED)];
    asts[UNUSED].import_records = vec![record(ImportKind::Dynamic, LAZY_B)];

    asts[LAZY_A].const_values = Some(FxHashMap::from_iter([(
        Ref::new(at(LAZY_A), 0),
        ConstValue::Number(42.0),
    )]));
    asts[LAZY_B].ts_enums = Some(FxHashMap::from_iter([(
        Ref::new(at(LAZY_B), 0),
        FxHashMap::from_iter([("Red".to_owned(), TsEnumValue::Number(0.0))]),
    )]));
    asts[RUNTIME].named_exports.insert(
        "__toESM".to_owned(),
        NamedExport {
            symbol_ref: Ref::new(at(RUNTIME), 0),
            alias_loc: Loc::new(0),
        },
    );
    for (logical, ast) in asts.iter_mut().enumerate() {
        ast.top_level_symbol_to_parts_from_parser
            .insert(Ref::new(at(logical), 0), vec![0]);
    }

    let mut slots: Vec<Option<InputFile>> = vec![None; NAMES.len()];
    for (logical, ast) in asts.into_iter().enumerate() {
        let source = Source::new(at(logical), NAMES[logical], "");
        slots[at(logical).as_usize()] = Some(InputFile::js(source, ast));
    }
    let files = slots.into_iter().map(Option::unwrap).collect();

    (files, vec![EntryPoint::new(at(MAIN), "out/main.js")])
}

fn path_of(graph: &LinkerGraph, source_index: SourceIndex) -> &str {
    &graph.file(source_index).source.pretty_path
}

fn entry_paths(graph: &LinkerGraph) -> Vec<&str> {
    graph
        .entry_points()
        .iter()
        .map(|entry| path_of(graph, entry.source_index))
        .collect()
}

#[test]
fn test_end_to_end_promotes_dynamic_imports() {
    init_logger();
    let (files, entry_points) = project(&[0, 1, 2, 3, 4, 5, 6]);
    let graph = build_linker_graph(&LinkerConfig::default(), &files, &entry_points).unwrap();

    assert_eq!(entry_paths(&graph), vec!["main.js", "lazy_a.js", "lazy_b.js"]);
    assert_eq!(graph.entry_points()[0].output_path, "out/main.js");
    assert_eq!(graph.entry_points()[1].output_path, "");

    let reachable: Vec<_> = graph
        .reachable_files()
        .iter()
        .map(|source_index| path_of(&graph, *source_index))
        .collect();
    assert_eq!(
        reachable,
        vec!["<runtime>", "shared.js", "lazy_a.js", "lib.js", "lazy_b.js", "main.js"]
    );

    // Nothing imports it, so it is never cloned
    assert!(graph.files()[UNUSED].is_none());
    assert_eq!(
        graph.file(SourceIndex::new(4)).entry_point_kind(),
        EntryPointKind::DynamicImport
    );
    for source_index in graph.reachable_files() {
        assert_eq!(graph.file(*source_index).entry_bits.bit_count(), 3);
    }
}

#[test]
fn test_without_code_splitting_entries_are_untouched() {
    init_logger();
    let (files, entry_points) = project(&[0, 1, 2, 3, 4, 5, 6]);
    let config = LinkerConfig {
        code_splitting: false,
        ..LinkerConfig::default()
    };
    let graph = build_linker_graph(&config, &files, &entry_points).unwrap();

    assert_eq!(entry_paths(&graph), vec!["main.js"]);
    assert!(
        graph
            .reachable_files()
            .iter()
            .all(|source_index| !graph.file(*source_index).is_entry_point()
                || graph.file(*source_index).is_user_specified_entry_point())
    );
}

#[test]
fn test_entry_order_independent_of_source_indices() {
    init_logger();
    let layouts = [
        [0, 1, 2, 3, 4, 5, 6],
        [0, 6, 5, 4, 3, 2, 1],
        [0, 3, 1, 6, 2, 4, 5],
        [0, 2, 4, 6, 1, 3, 5],
    ];

    let mut observed = Vec::new();
    for (i, layout) in layouts.iter().enumerate() {
        let (files, entry_points) = project(layout);
        let config = LinkerConfig {
            threads: (i % 2 == 0).then_some(3),
            ..LinkerConfig::default()
        };
        let graph = build_linker_graph(&config, &files, &entry_points).unwrap();

        let stable_entries: Vec<_> = graph
            .entry_points()
            .iter()
            .map(|entry| {
                (
                    graph.stable_source_index(entry.source_index),
                    path_of(&graph, entry.source_index).to_owned(),
                )
            })
            .collect();

        let mut enums: Vec<_> = graph
            .ts_enums()
            .iter()
            .map(|(r, values)| (path_of(&graph, r.source_index).to_owned(), values.clone()))
            .collect();
        enums.sort_by(|a, b| a.0.cmp(&b.0));
        let mut constants: Vec<_> = graph
            .const_values()
            .iter()
            .map(|(r, value)| (path_of(&graph, r.source_index).to_owned(), *value))
            .collect();
        constants.sort_by(|a, b| a.0.cmp(&b.0));

        observed.push((stable_entries, format!("{enums:?}"), format!("{constants:?}")));
    }

    for other in &observed[1..] {
        assert_eq!(&observed[0], other);
    }
    assert_eq!(observed[0].2, r#"[("lazy_a.js", Number(42.0))]"#);
}

#[test]
fn test_inputs_unchanged_by_construction_and_mutation() {
    init_logger();
    let (files, entry_points) = project(&[0, 1, 2, 3, 4, 5, 6]);
    let before: Vec<JsAst> = files
        .iter()
        .map(|file| (**file.js_ast().unwrap()).clone())
        .collect();

    let main = SourceIndex::new(MAIN as u32);
    let lib = SourceIndex::new(LIB as u32);
    let mut graph = build_linker_graph(&LinkerConfig::default(), &files, &entry_points).unwrap();

    let helper = graph.generate_new_symbol(main, SymbolKind::Other, "helper");
    let part_index = graph.add_part_to_file(
        main,
        Part {
            declared_symbols: vec![DeclaredSymbol {
                symbol_ref: helper,
                is_top_level: true,
            }],
            ..Part::default()
        },
    );
    graph.generate_symbol_import_and_use(main, part_index, Ref::new(lib, 0), 2, lib);
    graph.generate_runtime_symbol_import_and_use(main, 0, "__toESM", 1);
    graph.symbols_mut().get_mut(Ref::new(lib, 0)).use_count_estimate = 9;

    for (file, original) in files.iter().zip(&before) {
        let ast = file.js_ast().unwrap();
        assert_eq!(ast.parts, original.parts);
        assert_eq!(ast.symbols, original.symbols);
        assert_eq!(ast.import_records, original.import_records);
        assert_eq!(ast.named_imports, original.named_imports);
        assert_eq!(ast.named_exports, original.named_exports);
        assert_eq!(ast.module_scope, original.module_scope);
        assert_eq!(
            ast.top_level_symbol_to_parts_from_parser,
            original.top_level_symbol_to_parts_from_parser
        );
    }

    // Parser tables are still read through the clone
    assert_eq!(graph.js_repr(lib).parser_top_level_symbol_to_parts(Ref::new(lib, 0)), &[0]);
    assert_eq!(graph.js_repr(main).parts.len(), 2);
    assert_eq!(graph.js_repr(main).top_level_symbol_to_parts(helper), &[1]);
    assert_eq!(
        graph.js_repr(main).parts[0].symbol_uses.len(),
        1,
        "only the runtime helper is used by the original part"
    );
}

#[test]
fn test_dynamic_import_assertions_removed_in_clone_only() {
    init_logger();
    let (mut files, entry_points) = project(&[0, 1, 2, 3, 4, 5, 6]);
    let mut main = (**files[MAIN].js_ast().unwrap()).clone();
    main.import_records[1].assertions = Some(vec![linker_graph::ast::AssertEntry {
        key: "type".to_owned(),
        value: "json".to_owned(),
    }]);
    files[MAIN] = InputFile::js((*files[MAIN].source).clone(), main);

    let graph = build_linker_graph(&LinkerConfig::default(), &files, &entry_points).unwrap();
    let main_index = SourceIndex::new(MAIN as u32);
    assert_eq!(graph.js_repr(main_index).import_records[1].assertions, None);
    assert!(files[MAIN].import_records()[1].assertions.is_some());
}
