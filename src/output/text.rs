//! Plain text rendering of the views for terminal output.

use crate::aggregator::flat_stats::{Column, FlatView};
use crate::parser::call_tree::CallTree;

/// Indented tree of node labels, root omitted
///
/// Nodes deeper than `max_depth` (top-level functions are depth 1) are
/// skipped. Children keep the order chosen by the annotator.
pub fn render_tree(tree: &CallTree, max_depth: Option<usize>) -> String {
    let mut lines = Vec::new();
    let mut pending: Vec<(usize, _)> = tree.top_level().iter().rev().map(|&id| (1, id)).collect();

    while let Some((depth, id)) = pending.pop() {
        if max_depth.is_some_and(|max| depth > max) {
            continue;
        }
        lines.push(format!("{}{}", "  ".repeat(depth - 1), tree.node(id).label));
        pending.extend(tree.children(id).iter().rev().map(|&child| (depth + 1, child)));
    }

    lines.join("\n")
}

/// Flat statistics as an aligned table in the current sort order
pub fn render_flat_table(view: &FlatView) -> String {
    let name_width = view
        .rows()
        .iter()
        .map(|row| row.cell(Column::Name).chars().count())
        .chain(std::iter::once(Column::Name.title().len()))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(view.rows().len() + 2);
    let mut header = format!("{:<width$}", Column::Name.title(), width = name_width);
    for column in &Column::ALL[1..] {
        header.push_str(&format!("  {:>14}", column.title()));
    }
    lines.push(header.trim_end().to_string());
    lines.push("-".repeat(name_width + 16 * (Column::ALL.len() - 1)));

    for row in view.rows() {
        let mut line = format!("{:<width$}", row.cell(Column::Name), width = name_width);
        for &column in &Column::ALL[1..] {
            line.push_str(&format!("  {:>14}", row.cell(column)));
        }
        lines.push(line);
    }

    lines.join("\n")
}
