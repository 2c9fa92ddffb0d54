//! Grouping of identical sheet layouts.
//!
//! A multi-sheet plan often repeats the same layout. Two trees are the same
//! layout when their canonical forms match: axis, value and multiplicity of
//! every node, with sibling order ignored. Labels do not take part.

use std::collections::HashMap;

use crate::tree::{CutTree, NodeId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sheets sharing one layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutGroup {
    /// Tree of the first sheet with this layout.
    pub tree: CutTree,
    /// Placed area of one sheet.
    pub placed_area: f64,
    /// Number of sheets.
    pub count: usize,
    /// Indices of those sheets in the input order.
    pub indices: Vec<usize>,
}

/// Canonical text form of a tree.
pub fn canonical_form(tree: &CutTree) -> String {
    format!(
        "{}x{}:{}",
        tree.usable_width(),
        tree.usable_height(),
        canonical_node(tree, tree.root())
    )
}

fn canonical_node(tree: &CutTree, id: NodeId) -> String {
    let node = &tree[id];
    let mut children: Vec<String> = node
        .children()
        .iter()
        .map(|&c| canonical_node(tree, c))
        .collect();
    children.sort();
    format!(
        "{}:{}:{}[{}]",
        node.axis(),
        node.value(),
        node.multiplicity(),
        children.join(",")
    )
}

/// Groups `trees` by layout, in order of first appearance.
pub fn group_identical_layouts<'a, I>(trees: I) -> Vec<LayoutGroup>
where
    I: IntoIterator<Item = &'a CutTree>,
{
    let mut groups: Vec<LayoutGroup> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (index, tree) in trees.into_iter().enumerate() {
        let key = canonical_form(tree);
        match seen.get(&key) {
            Some(&g) => {
                groups[g].count += 1;
                groups[g].indices.push(index);
            }
            None => {
                seen.insert(key, groups.len());
                groups.push(LayoutGroup {
                    tree: tree.clone(),
                    placed_area: tree.placed_area(),
                    count: 1,
                    indices: vec![index],
                });
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::CutAxis;

    fn sheet(widths: &[f64]) -> CutTree {
        let mut tree = CutTree::new(1000.0, 500.0);
        for &w in widths {
            let x = tree.add_child(tree.root(), CutAxis::X, w, 1);
            let y = tree.add_child(x, CutAxis::Y, 500.0, 1);
            tree.add_child(y, CutAxis::Z, w, 1);
        }
        tree
    }

    #[test]
    fn test_sibling_order_is_ignored() {
        assert_eq!(
            canonical_form(&sheet(&[300.0, 200.0])),
            canonical_form(&sheet(&[200.0, 300.0]))
        );
        assert_ne!(
            canonical_form(&sheet(&[300.0, 200.0])),
            canonical_form(&sheet(&[300.0, 250.0]))
        );
    }

    #[test]
    fn test_groups_count_repeats() {
        let mut labeled = sheet(&[300.0]);
        let leaf = labeled.children(labeled.children(labeled.columns()[0])[0])[0];
        labeled.set_label(leaf, Some("a".into())).unwrap();

        let trees = vec![sheet(&[300.0]), sheet(&[400.0]), labeled, sheet(&[300.0])];
        let groups = group_identical_layouts(&trees);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].indices, vec![0, 2, 3]);
        assert_eq!(groups[1].indices, vec![1]);
        assert_eq!(groups[0].placed_area, 150_000.0);
    }
}
