//! Label annotation.
//!
//! Trees built from unlabeled queues (grouped variants, the GA) carry no
//! labels. Annotation walks the piece leaves in cut order and gives each one
//! the label of an inventory entry with the same rounded dimensions, in
//! either orientation. Every labeled entry can be used `quantity` times.

use std::collections::HashSet;

use crate::piece::PieceItem;
use crate::tree::{CutTree, NodeId};

#[derive(Debug, Clone)]
struct PoolEntry {
    width: i64,
    height: i64,
    label: String,
}

impl PoolEntry {
    fn matches(&self, width: i64, height: i64) -> bool {
        (self.width == width && self.height == height)
            || (self.width == height && self.height == width)
    }
}

fn rounded(value: f64) -> i64 {
    value.round() as i64
}

/// Labels still available for annotation.
#[derive(Debug, Clone, Default)]
pub struct LabelPool {
    entries: Vec<PoolEntry>,
}

impl LabelPool {
    /// One entry per labeled piece of `items`.
    pub fn from_items(items: &[PieceItem]) -> Self {
        let entries = items
            .iter()
            .filter_map(|item| item.label.as_ref().map(|label| (item, label)))
            .flat_map(|(item, label)| {
                (0..item.quantity).map(move |_| PoolEntry {
                    width: rounded(item.width),
                    height: rounded(item.height),
                    label: label.clone(),
                })
            })
            .collect();
        Self { entries }
    }

    /// Number of labels left.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when every label has been used.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels the piece leaves of `tree`, consuming pool entries.
    ///
    /// Leaves that already carry a label keep it and use up a matching entry
    /// with the same label. Returns the number of leaves labeled.
    pub fn annotate(&mut self, tree: &mut CutTree) -> usize {
        if self.entries.is_empty() {
            return 0;
        }

        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut assignments = Vec::new();
        for rect in tree.leaf_rects() {
            if self.entries.is_empty() {
                break;
            }
            if !seen.insert(rect.node) {
                continue;
            }
            let (w, h) = (rounded(rect.width), rounded(rect.height));
            let found = match &rect.label {
                Some(existing) => self
                    .entries
                    .iter()
                    .position(|e| &e.label == existing && e.matches(w, h)),
                None => self.entries.iter().position(|e| e.matches(w, h)),
            };
            if let Some(index) = found {
                let entry = self.entries.remove(index);
                if rect.label.is_none() {
                    assignments.push((rect.node, entry.label));
                }
            }
        }

        let count = assignments.len();
        for (node, label) in assignments {
            if tree.set_label(node, Some(label)).is_err() {
                log::warn!("leaf {} vanished during label annotation", node);
            }
        }
        count
    }
}

/// Labels the piece leaves of `tree` from the labeled entries of `items`.
pub fn annotate_labels(tree: &mut CutTree, items: &[PieceItem]) -> usize {
    LabelPool::from_items(items).annotate(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::CutAxis;

    fn two_piece_tree() -> (CutTree, NodeId, NodeId) {
        let mut tree = CutTree::new(1000.0, 1000.0);
        let x = tree.add_child(tree.root(), CutAxis::X, 600.0, 1);
        let y = tree.add_child(x, CutAxis::Y, 400.0, 1);
        let z = tree.add_child(y, CutAxis::Z, 600.0, 1);
        let first = tree.add_child(z, CutAxis::W, 400.0, 1);
        let y2 = tree.add_child(x, CutAxis::Y, 300.0, 1);
        let z2 = tree.add_child(y2, CutAxis::Z, 200.0, 1);
        let second = tree.add_child(z2, CutAxis::W, 300.0, 1);
        (tree, first, second)
    }

    #[test]
    fn test_labels_match_in_either_orientation() {
        let (mut tree, first, second) = two_piece_tree();
        let items = vec![
            PieceItem::new(1, 300.4, 199.6).with_label("shelf"),
            PieceItem::new(1, 400.0, 600.0).with_label("door"),
        ];
        assert_eq!(annotate_labels(&mut tree, &items), 2);
        assert_eq!(tree[first].label(), Some("door"));
        assert_eq!(tree[second].label(), Some("shelf"));
    }

    #[test]
    fn test_pool_is_consumed() {
        let mut tree = CutTree::new(1000.0, 1000.0);
        let x = tree.add_child(tree.root(), CutAxis::X, 500.0, 1);
        let y = tree.add_child(x, CutAxis::Y, 500.0, 1);
        let a = tree.add_child(y, CutAxis::Z, 250.0, 1);
        let b = tree.add_child(y, CutAxis::Z, 250.0, 1);
        let items = vec![PieceItem::new(1, 250.0, 500.0).with_label("side")];

        assert_eq!(annotate_labels(&mut tree, &items), 1);
        assert_eq!(tree[a].label(), Some("side"));
        assert_eq!(tree[b].label(), None);
    }

    #[test]
    fn test_existing_labels_are_kept() {
        let (mut tree, first, second) = two_piece_tree();
        tree.set_label(first, Some("mine".into())).unwrap();
        let items = vec![
            PieceItem::new(1, 600.0, 400.0).with_label("mine"),
            PieceItem::new(1, 200.0, 300.0).with_label("other"),
        ];
        assert_eq!(annotate_labels(&mut tree, &items), 1);
        assert_eq!(tree[first].label(), Some("mine"));
        assert_eq!(tree[second].label(), Some("other"));
    }

    #[test]
    fn test_pool_spans_several_trees() {
        let (mut a, a_first, _) = two_piece_tree();
        let (mut b, b_first, _) = two_piece_tree();
        let mut pool = LabelPool::from_items(&[PieceItem::new(1, 600.0, 400.0).with_label("door")]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.annotate(&mut a), 1);
        assert_eq!(pool.annotate(&mut b), 0);
        assert!(pool.is_empty());
        assert_eq!(a[a_first].label(), Some("door"));
        assert_eq!(b[b_first].label(), None);
    }

    #[test]
    fn test_unlabeled_inventory_is_a_no_op() {
        let (mut tree, first, _) = two_piece_tree();
        let items = vec![PieceItem::new(2, 600.0, 400.0)];
        assert_eq!(annotate_labels(&mut tree, &items), 0);
        assert_eq!(tree[first].label(), None);
    }
}
