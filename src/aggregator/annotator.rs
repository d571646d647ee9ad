//! Bottom-up cost annotation of a freshly built call tree.
//!
//! For every call site: exclusive = inclusive - sum(children inclusive).
//! Both are added to the function's registry record, a "self" child holding
//! the exclusive cycles is added to every non-leaf, every node gets its
//! percentage label and siblings are sorted by that label, descending.

use super::format::{descending, node_name, percent_label, percent_of};
use crate::parser::call_tree::{CallNode, CallTree, NodeId, NodeKind};
use crate::parser::registry::FunctionRegistry;
use crate::utils::config::AnalysisOptions;
use crate::utils::error::ParseError;
use log::{debug, warn};

/// Annotate `tree` in place and fill the registry's cycle aggregates
///
/// **Public** - single writer of `FunctionRecord` cycle totals
///
/// Must run exactly once per tree, after decoding finished, because the
/// labels need the final `total_cycles`.
///
/// # Returns
/// One `ParseError::InconsistentCycles` per call site whose children cost
/// more than the call site itself. Their negative exclusive time is kept.
pub fn annotate(
    tree: &mut CallTree,
    registry: &mut FunctionRegistry,
    total_cycles: i64,
    options: &AnalysisOptions,
) -> Vec<ParseError> {
    let mut inconsistencies = Vec::new();
    let order = tree.preorder();

    // Reverse pre-order: children are final before their parent is visited
    for &id in order.iter().rev() {
        let kind = tree.node(id).kind;
        match kind {
            NodeKind::Root => {}
            NodeKind::SelfTime(_) => continue,
            NodeKind::Call(function) => {
                let node = tree.node(id);
                let inclusive = node.cycles;
                let has_children = !node.children.is_empty();
                let child_cycles: i64 = node.children.iter().map(|&c| tree.node(c).cycles).sum();
                let exclusive = inclusive - child_cycles;

                let name = registry.name_of(function);
                if exclusive < 0 {
                    warn!(
                        "{} has {} inclusive cycles but {} in children",
                        name, inclusive, child_cycles
                    );
                    inconsistencies.push(ParseError::InconsistentCycles {
                        function: name.clone(),
                        inclusive,
                        children: child_cycles,
                    });
                }
                if let Some(record) = registry.get_mut(function) {
                    record.incl_cycles += inclusive;
                    record.excl_cycles += exclusive;
                }

                tree.node_mut(id).label = percent_label(percent_of(inclusive, total_cycles), &name);

                if has_children {
                    let self_node = tree.add_child(id, NodeKind::SelfTime(function));
                    let kind = tree.node(self_node).kind;
                    let node = tree.node_mut(self_node);
                    node.cycles = exclusive;
                    node.label = percent_label(
                        percent_of(exclusive, total_cycles),
                        &node_name(registry, kind),
                    );
                }
            }
        }
        sort_children(tree, id, options.textual_sort_compat, |node| node.cycles as f64);
    }

    debug!(
        "Annotated {} call sites ({} inconsistent)",
        order.len().saturating_sub(1),
        inconsistencies.len()
    );
    inconsistencies
}

/// Sort the children of `id` descending by label, or by `value` in numeric mode
pub fn sort_children(
    tree: &mut CallTree,
    id: NodeId,
    textual: bool,
    value: impl Fn(&CallNode) -> f64,
) {
    let mut children = tree.children(id).to_vec();
    if children.len() < 2 {
        return;
    }
    children.sort_by(|&a, &b| {
        let (a, b) = (tree.node(a), tree.node(b));
        descending(textual, (&a.label, value(a)), (&b.label, value(b)))
    });
    tree.node_mut(id).children = children;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::registry::FunctionId;

    fn fixture() -> (CallTree, FunctionRegistry) {
        let mut registry = FunctionRegistry::new();
        registry.declare(FunctionId(4), "Main").unwrap();
        registry.declare(FunctionId(8), "Update").unwrap();
        registry.declare(FunctionId(12), "Render").unwrap();

        let mut tree = CallTree::new();
        let root = tree.root();
        let main = tree.add_child(root, NodeKind::Call(FunctionId(4)));
        let update = tree.add_child(main, NodeKind::Call(FunctionId(8)));
        let render = tree.add_child(main, NodeKind::Call(FunctionId(12)));
        tree.node_mut(main).cycles = 1000;
        tree.node_mut(update).cycles = 100;
        tree.node_mut(render).cycles = 500;
        (tree, registry)
    }

    #[test]
    fn test_exclusive_and_self_nodes() {
        let (mut tree, mut registry) = fixture();
        let issues = annotate(&mut tree, &mut registry, 1000, &AnalysisOptions::default());
        assert!(issues.is_empty());

        let main = tree.top_level()[0];
        let labels: Vec<&str> = tree
            .children(main)
            .iter()
            .map(|&c| tree.node(c).label.as_str())
            .collect();
        assert_eq!(labels, vec!["50.00%  Render", "40.00%  self", "10.00%  Update"]);
        assert_eq!(tree.node(main).label, "100.00%  Main");

        let main_record = registry.get(FunctionId(4)).unwrap();
        assert_eq!(main_record.incl_cycles, 1000);
        assert_eq!(main_record.excl_cycles, 400);
        assert_eq!(registry.get(FunctionId(8)).unwrap().excl_cycles, 100);
        // Self records never accumulate
        assert_eq!(registry.get(FunctionId::SELF).unwrap().incl_cycles, 0);
    }

    #[test]
    fn test_leaves_get_no_self_node() {
        let (mut tree, mut registry) = fixture();
        annotate(&mut tree, &mut registry, 1000, &AnalysisOptions::default());

        let self_nodes = tree
            .preorder()
            .into_iter()
            .filter(|&id| tree.node(id).is_self_time())
            .count();
        assert_eq!(self_nodes, 1);
    }

    #[test]
    fn test_negative_exclusive_is_reported_not_clamped() {
        let (mut tree, mut registry) = fixture();
        let main = tree.top_level()[0];
        tree.node_mut(main).cycles = 0;

        let issues = annotate(&mut tree, &mut registry, 0, &AnalysisOptions::default());
        assert_eq!(
            issues,
            vec![ParseError::InconsistentCycles {
                function: "Main".to_string(),
                inclusive: 0,
                children: 600,
            }]
        );
        assert_eq!(registry.get(FunctionId(4)).unwrap().excl_cycles, -600);
    }

    #[test]
    fn test_numeric_sort_mode() {
        let mut registry = FunctionRegistry::new();
        registry.declare(FunctionId(4), "A").unwrap();
        registry.declare(FunctionId(8), "B").unwrap();
        let mut tree = CallTree::new();
        let root = tree.root();
        let a = tree.add_child(root, NodeKind::Call(FunctionId(4)));
        let b = tree.add_child(root, NodeKind::Call(FunctionId(8)));
        tree.node_mut(a).cycles = 1001;
        tree.node_mut(b).cycles = 900;

        // "100.10%" sorts below "90.00%" as text
        let mut textual = tree.clone();
        annotate(&mut textual, &mut registry.clone(), 1000, &AnalysisOptions::default());
        assert_eq!(textual.top_level(), &[b, a]);

        let numeric = AnalysisOptions::new().with_textual_sort(false);
        annotate(&mut tree, &mut registry, 1000, &numeric);
        assert_eq!(tree.top_level(), &[a, b]);
    }
}
