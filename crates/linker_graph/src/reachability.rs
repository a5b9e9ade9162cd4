//! Deterministic ordering of the files reachable from the entry points
//!
//! Source indices are assigned in whatever order parsing finished, so they
//! cannot be used to order anything. The order produced here depends only on
//! the shape of the import graph and the order of the entry points.

use rustc_hash::FxHashSet;

use crate::{ast::InputFile, linker_graph::EntryPoint, types::SourceIndex};

/// Every file reachable from the runtime and the entry points
///
/// Files are visited depth-first, following resolved import records in source
/// order, and each file is emitted after the files it imports. The runtime is
/// always visited first so it is available to every linker.
pub fn find_reachable_files(
    input_files: &[InputFile],
    entry_points: &[EntryPoint],
) -> Vec<SourceIndex> {
    let mut visited = FxHashSet::default();
    let mut order = Vec::new();

    let roots = std::iter::once(SourceIndex::RUNTIME)
        .chain(entry_points.iter().map(|entry_point| entry_point.source_index));
    for root in roots {
        if root.as_usize() < input_files.len() {
            visit(input_files, root, &mut visited, &mut order);
        }
    }

    log::debug!(
        "Found {} reachable files from {} entry points",
        order.len(),
        entry_points.len()
    );
    order
}

/// Post-order walk with an explicit stack of (file, next import record)
fn visit(
    input_files: &[InputFile],
    root: SourceIndex,
    visited: &mut FxHashSet<SourceIndex>,
    order: &mut Vec<SourceIndex>,
) {
    if !visited.insert(root) {
        return;
    }

    let mut stack = vec![(root, 0usize)];
    while let Some((source_index, next_record)) = stack.last_mut() {
        let records = input_files[source_index.as_usize()].import_records();
        let target = records
            .get(*next_record)
            .map(|record| record.source_index);

        match target {
            Some(target) => {
                *next_record += 1;
                if let Some(target) = target
                    && visited.insert(target)
                {
                    stack.push((target, 0));
                }
            }
            None => {
                // Each file must come after its dependencies
                order.push(*source_index);
                stack.pop();
            }
        }
    }
}
