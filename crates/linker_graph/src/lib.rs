//! Per-invocation linking graph for a JavaScript/CSS bundler
//!
//! Parsed files live in a shared, immutable input pool. Each linking
//! invocation builds a [`LinkerGraph`] from that pool: a private, mutable copy
//! of exactly the state linking passes change, plus the entry point list
//! (extended with dynamic imports when code splitting) and the merged
//! cross-file constant tables.

pub mod ast;
pub mod bitset;
pub mod config;
pub mod line_column;
pub mod linker_graph;
pub mod reachability;
pub mod symbols;
pub mod types;

use anyhow::Result;

pub use crate::{
    config::LinkerConfig,
    linker_graph::{EntryPoint, EntryPointKind, LinkerFile, LinkerGraph},
    reachability::find_reachable_files,
    types::{Ref, SourceIndex},
};
use crate::ast::InputFile;

/// Find the reachable files and build the linker graph for them
///
/// Runs inside the configured thread pool when `threads` is set, otherwise on
/// rayon's global pool.
pub fn build_linker_graph(
    config: &LinkerConfig,
    input_files: &[InputFile],
    entry_points: &[EntryPoint],
) -> Result<LinkerGraph> {
    let build = || {
        let reachable_files = find_reachable_files(input_files, entry_points);
        LinkerGraph::clone_from_inputs(
            input_files,
            &reachable_files,
            entry_points,
            config.code_splitting,
        )
    };

    let graph = match config.thread_pool()? {
        Some(pool) => pool.install(build),
        None => build(),
    };

    log::debug!(
        "Built linker graph: {} entry points, {} reachable files",
        graph.entry_points().len(),
        graph.reachable_files().len()
    );
    Ok(graph)
}
