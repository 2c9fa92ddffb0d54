//! Minimum-break constraint.
//!
//! Two parallel cuts that do not coincide must be at least the configured
//! distance apart. The checks cover the four kinds of cut the engine creates:
//!
//! - column widths (`X` values across the sheet),
//! - strip heights (`Y` values within a column),
//! - `Z` cut offsets, compared between different strips of one column,
//! - stacked heights (`W` values within a `Z`).

use crate::tree::{CutAxis, CutTree, NodeId};

/// Minimum distance between non-coincident parallel cuts (0 disables it).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MinBreak {
    distance: f64,
}

impl MinBreak {
    /// Creates the constraint; non-positive distances disable it.
    pub fn new(distance: f64) -> Self {
        Self {
            distance: distance.max(0.0),
        }
    }

    /// Configured distance.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// True when the constraint is enforced.
    pub fn is_active(&self) -> bool {
        self.distance > 0.0
    }

    /// True if two cut positions are distinct but closer than the distance.
    pub fn violates(&self, a: f64, b: f64) -> bool {
        let diff = (a - b).abs();
        diff > 0.0 && diff < self.distance
    }

    /// Checks new sibling values against existing ones and each other.
    pub fn values_clear(&self, existing: &[f64], new: &[f64]) -> bool {
        if !self.is_active() {
            return true;
        }
        for (i, &v) in new.iter().enumerate() {
            if existing.iter().any(|&e| self.violates(e, v)) {
                return false;
            }
            if new[i + 1..].iter().any(|&o| self.violates(o, v)) {
                return false;
            }
        }
        true
    }

    /// Checks new cut offsets against offsets already cut elsewhere.
    /// Offsets within `new` belong to the same strip and are not compared.
    pub fn positions_clear(&self, existing: &[f64], new: &[f64]) -> bool {
        if !self.is_active() {
            return true;
        }
        !new
            .iter()
            .any(|&v| existing.iter().any(|&e| self.violates(e, v)))
    }
}

/// Values of the children of `parent`.
pub fn child_values(tree: &CutTree, parent: NodeId) -> Vec<f64> {
    tree.children(parent).iter().map(|&c| tree[c].value()).collect()
}

/// Cumulative `Z` cut offsets in a strip, one per repeated `Z`.
pub fn strip_z_positions(tree: &CutTree, strip: NodeId) -> Vec<f64> {
    let mut positions = Vec::new();
    let mut acc = 0.0;
    for &z in tree.children(strip) {
        let node = &tree[z];
        for _ in 0..node.multiplicity() {
            acc += node.value();
            positions.push(acc);
        }
    }
    positions
}

/// `Z` cut offsets of every strip in `column` except `exclude`.
pub fn column_z_positions(tree: &CutTree, column: NodeId, exclude: Option<NodeId>) -> Vec<f64> {
    tree.children(column)
        .iter()
        .filter(|&&s| Some(s) != exclude)
        .flat_map(|&s| strip_z_positions(tree, s))
        .collect()
}

/// A pair of parallel cuts closer than the minimum break.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakViolation {
    /// Kind of the offending cuts.
    pub axis: CutAxis,
    /// Node whose children (or strips, for `Z`) hold the two cuts.
    pub scope: NodeId,
    /// First cut value or offset.
    pub first: f64,
    /// Second cut value or offset.
    pub second: f64,
}

/// Lists every minimum-break violation in a finished tree.
pub fn find_violations(tree: &CutTree, min_break: MinBreak) -> Vec<BreakViolation> {
    let mut out = Vec::new();
    if !min_break.is_active() {
        return out;
    }

    let pairwise = |axis: CutAxis, scope: NodeId, values: &[f64], out: &mut Vec<BreakViolation>| {
        for (i, &a) in values.iter().enumerate() {
            for &b in &values[i + 1..] {
                if min_break.violates(a, b) {
                    out.push(BreakViolation {
                        axis,
                        scope,
                        first: a,
                        second: b,
                    });
                }
            }
        }
    };

    let root = tree.root();
    pairwise(CutAxis::X, root, &child_values(tree, root), &mut out);

    for &column in tree.columns() {
        pairwise(CutAxis::Y, column, &child_values(tree, column), &mut out);

        let strips = tree.children(column);
        for (i, &a) in strips.iter().enumerate() {
            let first = strip_z_positions(tree, a);
            for &b in &strips[i + 1..] {
                for &p in &first {
                    for q in strip_z_positions(tree, b) {
                        if min_break.violates(p, q) {
                            out.push(BreakViolation {
                                axis: CutAxis::Z,
                                scope: column,
                                first: p,
                                second: q,
                            });
                        }
                    }
                }
            }
            for &z in tree.children(a) {
                pairwise(CutAxis::W, z, &child_values(tree, z), &mut out);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violates() {
        let mb = MinBreak::new(50.0);
        assert!(mb.violates(1000.0, 1030.0));
        assert!(!mb.violates(1000.0, 1000.0));
        assert!(!mb.violates(1000.0, 1050.0));
        assert!(!MinBreak::new(0.0).violates(1000.0, 1001.0));
    }

    #[test]
    fn test_values_clear_checks_new_pairs() {
        let mb = MinBreak::new(50.0);
        assert!(mb.values_clear(&[400.0], &[400.0, 600.0]));
        assert!(!mb.values_clear(&[400.0], &[420.0]));
        assert!(!mb.values_clear(&[], &[400.0, 420.0]));
        assert!(MinBreak::default().values_clear(&[400.0], &[401.0]));
    }

    #[test]
    fn test_positions_clear_ignores_same_strip() {
        let mb = MinBreak::new(50.0);
        assert!(mb.positions_clear(&[600.0], &[300.0, 320.0]));
        assert!(!mb.positions_clear(&[600.0], &[620.0]));
    }

    #[test]
    fn test_z_positions_expand_multiplicity() {
        let mut tree = CutTree::new(2000.0, 1000.0);
        let x = tree.insert(tree.root(), CutAxis::X, 1000.0, 1).unwrap();
        let y1 = tree.insert(x, CutAxis::Y, 300.0, 1).unwrap();
        tree.insert(y1, CutAxis::Z, 200.0, 2).unwrap();
        let y2 = tree.insert(x, CutAxis::Y, 300.0, 1).unwrap();
        tree.insert(y2, CutAxis::Z, 420.0, 1).unwrap();

        assert_eq!(strip_z_positions(&tree, y1), vec![200.0, 400.0]);
        assert_eq!(column_z_positions(&tree, x, Some(y1)), vec![420.0]);

        let found = find_violations(&tree, MinBreak::new(50.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].axis, CutAxis::Z);
        assert!(find_violations(&tree, MinBreak::new(10.0)).is_empty());
    }

    #[test]
    fn test_find_violations_on_columns() {
        let mut tree = CutTree::new(3000.0, 1200.0);
        tree.insert(tree.root(), CutAxis::X, 1000.0, 1).unwrap();
        tree.insert(tree.root(), CutAxis::X, 1030.0, 1).unwrap();
        let found = find_violations(&tree, MinBreak::new(50.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].axis, CutAxis::X);
    }
}
