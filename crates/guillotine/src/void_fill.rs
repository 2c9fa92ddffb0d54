//! Void filling.
//!
//! After each commit the engine looks for leftover rectangles inside the
//! columns already cut and fills them with later queue pieces. Three kinds
//! of void exist, visited largest first:
//!
//! - the free height at the bottom of a column,
//! - the free width at the end of a strip,
//! - the free height under the stacked `W`s of a `Z`.

use crate::min_break::child_values;
use crate::piece::{Orientation, Piece};
use crate::placement::Session;
use crate::scoring::{score_fit, window, PERFECT_FIT};
use crate::tree::{CutAxis, CutTree, NodeId};

/// Kind of leftover rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoidKind {
    /// Free height at the bottom of a column (`node` is the `X`).
    Column,
    /// Free width at the end of a strip (`node` is the `Y`).
    Strip,
    /// Free height inside a sub-cut (`node` is the `Z`).
    Stack,
}

/// A leftover rectangle of a cut tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Void {
    /// Kind.
    pub kind: VoidKind,
    /// Node owning the free space.
    pub node: NodeId,
    /// Free width.
    pub width: f64,
    /// Free height.
    pub height: f64,
}

impl Void {
    /// Free area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Current free size of the void of `kind` owned by `node`.
pub fn void_size(tree: &CutTree, kind: VoidKind, node: NodeId) -> (f64, f64) {
    let parent_value = |id: NodeId| tree[id].parent().map_or(0.0, |p| tree[p].value());
    match kind {
        VoidKind::Column => (
            tree[node].value(),
            tree.usable_height() - tree.used_along(node),
        ),
        VoidKind::Strip => (
            parent_value(node) - tree.used_along(node),
            tree[node].value(),
        ),
        VoidKind::Stack => (
            tree[node].value(),
            parent_value(node) - tree.used_along(node),
        ),
    }
}

/// Lists every non-empty void, largest area first.
pub fn collect_voids(tree: &CutTree) -> Vec<Void> {
    let mut voids = Vec::new();
    let mut push = |kind: VoidKind, node: NodeId| {
        let (width, height) = void_size(tree, kind, node);
        if width > 0.0 && height > 0.0 {
            voids.push(Void {
                kind,
                node,
                width,
                height,
            });
        }
    };

    for &column in tree.columns() {
        push(VoidKind::Column, column);
        for &strip in tree.children(column) {
            push(VoidKind::Strip, strip);
            for &z in tree.children(strip) {
                // A childless Z is a piece leaf filling the strip height.
                if tree[z].axis() == CutAxis::Z && !tree.children(z).is_empty() {
                    push(VoidKind::Stack, z);
                }
            }
        }
    }

    voids.sort_by(|a, b| b.area().total_cmp(&a.area()));
    voids
}

impl Session<'_> {
    /// Fills every current void with the best-scoring queue pieces.
    pub(crate) fn fill_voids(&mut self) {
        for void in collect_voids(&self.tree) {
            loop {
                if self.queue.is_empty() {
                    return;
                }
                let (width, height) = void_size(&self.tree, void.kind, void.node);
                if width <= 0.0 || height <= 0.0 {
                    break;
                }
                let (index, o) = match self.pick_for_void(&void, width, height) {
                    Some(pick) => pick,
                    None => break,
                };
                let piece = self.queue.remove(index);
                self.place_in_void(&void, width, height, piece, o);
            }
        }
    }

    /// Best of the first few queue pieces that fit the void.
    fn pick_for_void(&self, void: &Void, width: f64, height: f64) -> Option<(usize, Orientation)> {
        let upcoming = window(&self.queue, 0, self.engine.score_lookahead);
        let mut best: Option<(usize, Orientation, f64)> = None;
        let mut fitting = 0;

        for (i, piece) in self.queue.iter().enumerate() {
            let mut fits = false;
            for o in piece.orientations() {
                if o.width > width || o.height > height || !self.void_accepts(void, piece, &o) {
                    continue;
                }
                fits = true;
                let score = score_fit(width, height, o.width, o.height, upcoming);
                if score == PERFECT_FIT {
                    return Some((i, o));
                }
                if best.map_or(true, |(_, _, s)| score < s) {
                    best = Some((i, o, score));
                }
            }
            if fits {
                fitting += 1;
                if fitting >= self.engine.void_candidates {
                    break;
                }
            }
        }

        best.map(|(i, o, _)| (i, o))
    }

    fn void_accepts(&self, void: &Void, piece: &Piece, o: &Orientation) -> bool {
        let placed = piece.oriented(*o);
        match void.kind {
            VoidKind::Column => {
                self.engine
                    .min_break
                    .values_clear(&child_values(&self.tree, void.node), &[o.height])
                    && self.strip_layout_clear(Some(void.node), None, 0.0, &placed, o.width)
            }
            VoidKind::Strip => {
                let column = self.tree[void.node].parent();
                let offset = self.tree.used_along(void.node);
                self.strip_layout_clear(column, Some(void.node), offset, &placed, o.width)
            }
            VoidKind::Stack => self.stack_clear(void.node, &placed),
        }
    }

    fn place_in_void(&mut self, void: &Void, width: f64, height: f64, piece: Piece, o: Orientation) {
        match void.kind {
            VoidKind::Column => {
                let column = void.node;
                let strip_height = self
                    .strip_height(Some(column), width, height, &o, 0)
                    .unwrap_or(o.height);
                let strip = self.tree.add_child(column, CutAxis::Y, strip_height, 1);
                let placed = piece.oriented(o);
                self.place_in_strip(strip, &placed, o.width);
                self.lateral_fill(column, strip, o.height);
            }
            VoidKind::Strip => match self.tree[void.node].parent() {
                Some(column) => {
                    self.place_lateral(column, void.node, piece, o);
                }
                None => self.unplaced.push(piece),
            },
            VoidKind::Stack => {
                let placed = piece.oriented(o);
                self.stack_in_z(void.node, &placed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::PlacementEngine;
    use u_cutplan_core::Config;

    fn partial_tree(height: f64) -> (CutTree, NodeId, NodeId, NodeId) {
        let mut tree = CutTree::new(1000.0, height);
        let column = tree.add_child(tree.root(), CutAxis::X, 1000.0, 1);
        let strip = tree.add_child(column, CutAxis::Y, 500.0, 1);
        let z = tree.add_child(strip, CutAxis::Z, 400.0, 1);
        tree.add_child(z, CutAxis::W, 300.0, 1);
        (tree, column, strip, z)
    }

    #[test]
    fn test_collect_voids_largest_first() {
        let (tree, column, strip, z) = partial_tree(600.0);
        let voids = collect_voids(&tree);
        let kinds: Vec<_> = voids.iter().map(|v| (v.kind, v.node)).collect();
        assert_eq!(
            kinds,
            vec![
                (VoidKind::Strip, strip),
                (VoidKind::Column, column),
                (VoidKind::Stack, z),
            ]
        );
        assert_eq!((voids[0].width, voids[0].height), (600.0, 500.0));
        assert_eq!((voids[1].width, voids[1].height), (1000.0, 100.0));
        assert_eq!((voids[2].width, voids[2].height), (400.0, 200.0));
    }

    #[test]
    fn test_full_tree_has_no_voids() {
        let mut tree = CutTree::new(500.0, 500.0);
        let column = tree.add_child(tree.root(), CutAxis::X, 500.0, 1);
        let strip = tree.add_child(column, CutAxis::Y, 500.0, 1);
        let z = tree.add_child(strip, CutAxis::Z, 500.0, 1);
        tree.add_child(z, CutAxis::W, 500.0, 1);
        assert!(collect_voids(&tree).is_empty());
    }

    #[test]
    fn test_fill_voids_places_into_strip_and_stack() {
        let engine = PlacementEngine::new(&Config::default(), 1000.0, 500.0);
        let (tree, _column, strip, z) = partial_tree(500.0);
        let mut session = Session {
            engine: &engine,
            tree,
            queue: vec![Piece::new(600.0, 500.0), Piece::new(400.0, 200.0)],
            unplaced: Vec::new(),
        };
        session.fill_voids();

        assert!(session.queue.is_empty());
        assert_eq!(session.tree.children(strip).len(), 2);
        assert_eq!(session.tree.children(z).len(), 2);
        assert!(collect_voids(&session.tree).is_empty());
    }

    #[test]
    fn test_fill_voids_skips_what_does_not_fit() {
        let engine = PlacementEngine::new(&Config::default(), 1000.0, 500.0);
        let (tree, ..) = partial_tree(500.0);
        let mut session = Session {
            engine: &engine,
            tree: tree.clone(),
            queue: vec![Piece::new(700.0, 700.0)],
            unplaced: Vec::new(),
        };
        session.fill_voids();
        assert_eq!(session.queue.len(), 1);
        assert_eq!(session.tree, tree);
    }
}
