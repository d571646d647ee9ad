//! Tree views derived from the annotated call graph.
//!
//! The call graph view is the annotated tree itself. The expensive
//! functions view relabels an independent copy of it with the cost of one
//! invocation of each top-level function.

use super::annotator::sort_children;
use super::format::{node_name, usecs_label, usecs_per_call};
use crate::parser::call_tree::CallTree;
use crate::parser::registry::FunctionRegistry;
use crate::utils::config::AnalysisOptions;
use log::debug;

/// Build the expensive functions view
///
/// **Public** - second tree view
///
/// Every node below a top-level function T is labelled with
/// `usecs_per_cycle * cycles / T.calls`, i.e. divided by the caller's call
/// count rather than its own. Only the top-level functions are re-sorted;
/// deeper levels keep the call graph order.
pub fn expensive_functions(
    call_graph: &CallTree,
    registry: &FunctionRegistry,
    usecs_per_cycle: f64,
    options: &AnalysisOptions,
) -> CallTree {
    let mut tree = call_graph.clone();
    let top_level = tree.top_level().to_vec();

    for &top in &top_level {
        let top_level_calls = tree.node(top).calls;
        for id in tree.preorder_from(top) {
            let node = tree.node(id);
            let usecs = usecs_per_call(usecs_per_cycle, node.cycles, top_level_calls);
            let label = usecs_label(usecs, &node_name(registry, node.kind));
            tree.node_mut(id).label = label;
        }
    }

    let root = tree.root();
    sort_children(&mut tree, root, options.textual_sort_compat, |node| {
        usecs_per_call(usecs_per_cycle, node.cycles, node.calls)
    });

    debug!("Expensive functions view: {} top-level functions", top_level.len());
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::annotator::annotate;
    use crate::parser::call_tree::NodeKind;
    use crate::parser::registry::FunctionId;

    #[test]
    fn test_descendants_use_top_level_divisor() {
        let mut registry = FunctionRegistry::new();
        registry.declare(FunctionId(4), "Tick").unwrap();
        registry.declare(FunctionId(8), "Move").unwrap();
        registry.declare(FunctionId(12), "Init").unwrap();

        let mut tree = CallTree::new();
        let root = tree.root();
        let tick = tree.add_child(root, NodeKind::Call(FunctionId(4)));
        let mov = tree.add_child(tick, NodeKind::Call(FunctionId(8)));
        let init = tree.add_child(root, NodeKind::Call(FunctionId(12)));
        tree.node_mut(tick).cycles = 400;
        tree.node_mut(tick).calls = 4;
        tree.node_mut(mov).cycles = 100;
        tree.node_mut(mov).calls = 8;
        tree.node_mut(init).cycles = 50;
        tree.node_mut(init).calls = 1;

        let options = AnalysisOptions::default();
        annotate(&mut tree, &mut registry, 450, &options);
        let view = expensive_functions(&tree, &registry, 2.0, &options);

        let labels: Vec<&str> = view.top_level().iter().map(|&id| view.node(id).label.as_str()).collect();
        assert_eq!(labels, vec!["   200.00 usec  Tick", "   100.00 usec  Init"]);

        // Move: 2.0 * 100 / Tick's 4 calls, not its own 8; self: 2.0 * 300 / 4
        let tick_children: Vec<&str> = view
            .children(tick)
            .iter()
            .map(|&id| view.node(id).label.as_str())
            .collect();
        assert_eq!(tick_children, vec!["   150.00 usec  self", "    50.00 usec  Move"]);

        // The call graph copy is untouched
        assert_eq!(tree.node(tick).label, "88.89%  Tick");
    }
}
