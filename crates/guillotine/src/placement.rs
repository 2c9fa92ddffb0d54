//! Greedy placement engine.
//!
//! One run consumes an ordered queue of pieces and grows a single sheet's
//! cut tree. Each iteration takes the head of the queue and:
//!
//! 1. enumerates candidates: every existing column with enough free height,
//!    then a new column, in both orientations of the piece;
//! 2. picks the lowest [`score_fit`] (a perfect fit wins immediately, ties
//!    keep the earlier candidate);
//! 3. commits a new strip holding the piece, then fills the rest of the
//!    strip sideways and repeats the same footprint downward while the
//!    column has room;
//! 4. fills leftover voids with later pieces.
//!
//! A head piece that fits nowhere moves to the unplaced list. Every new cut
//! is checked against the minimum break before it is made.

use u_cutplan_core::Config;

use crate::min_break::{child_values, column_z_positions, MinBreak};
use crate::piece::{FusedAxis, Orientation, Piece};
use crate::scoring::{residual_usable, score_fit, window, PERFECT_FIT};
use crate::tree::{CutAxis, CutTree, NodeId};

/// Result of one placement run.
#[derive(Debug, Clone)]
pub struct PlacementOutcome {
    /// Cut tree of the sheet.
    pub tree: CutTree,
    /// Area covered by placed pieces.
    pub placed_area: f64,
    /// Pieces that did not fit, in the order they were given up.
    pub unplaced: Vec<Piece>,
}

impl PlacementOutcome {
    /// Number of original rectangles placed on the sheet.
    pub fn placed_count(&self) -> usize {
        self.tree.placed_piece_count()
    }
}

/// Single-sheet greedy placement engine.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    pub(crate) usable_width: f64,
    pub(crate) usable_height: f64,
    pub(crate) min_break: MinBreak,
    pub(crate) score_lookahead: usize,
    pub(crate) residual_lookahead: usize,
    pub(crate) void_candidates: usize,
}

impl PlacementEngine {
    /// Creates an engine for a sheet of the given usable size.
    pub fn new(config: &Config, usable_width: f64, usable_height: f64) -> Self {
        Self {
            usable_width,
            usable_height,
            min_break: MinBreak::new(config.min_break),
            score_lookahead: config.score_lookahead,
            residual_lookahead: config.residual_lookahead,
            void_candidates: config.void_candidates.max(1),
        }
    }

    /// Usable sheet width.
    pub fn usable_width(&self) -> f64 {
        self.usable_width
    }

    /// Usable sheet height.
    pub fn usable_height(&self) -> f64 {
        self.usable_height
    }

    /// Minimum-break constraint in force.
    pub fn min_break(&self) -> MinBreak {
        self.min_break
    }

    /// Places `pieces` in queue order on one fresh sheet.
    pub fn run(&self, pieces: Vec<Piece>) -> PlacementOutcome {
        let mut session = Session {
            engine: self,
            tree: CutTree::new(self.usable_width, self.usable_height),
            queue: pieces,
            unplaced: Vec::new(),
        };
        session.place_all();

        let placed_area = session.tree.placed_area();
        PlacementOutcome {
            tree: session.tree,
            placed_area,
            unplaced: session.unplaced,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Existing column, or `None` to open a new one.
    column: Option<NodeId>,
    column_width: f64,
    strip_height: f64,
    orientation: Orientation,
    score: f64,
}

/// Mutable state of one placement run.
pub(crate) struct Session<'e> {
    pub(crate) engine: &'e PlacementEngine,
    pub(crate) tree: CutTree,
    pub(crate) queue: Vec<Piece>,
    pub(crate) unplaced: Vec<Piece>,
}

/// True for composites whose units sit side by side.
pub(crate) fn is_horizontal_run(placed: &Piece) -> bool {
    placed
        .fusion()
        .map_or(false, |f| f.axis == FusedAxis::Width)
}

/// `Z` cut offsets produced by placing `placed` at `offset` in a strip,
/// with its `Z` spanning `extent`.
fn z_offsets(offset: f64, placed: &Piece, extent: f64) -> Vec<f64> {
    match placed.fusion() {
        Some(f) if f.axis == FusedAxis::Width => {
            let mut acc = offset;
            f.units
                .iter()
                .map(|u| {
                    acc += u.along;
                    acc
                })
                .collect()
        }
        _ => vec![offset + extent],
    }
}

/// Adds a `W` of `height` under `z`, narrowed by a `Q` when the piece is
/// narrower than the `Z`.
fn stack_unit(
    tree: &mut CutTree,
    z: NodeId,
    z_width: f64,
    height: f64,
    width: f64,
    label: Option<String>,
) {
    if width < z_width {
        let w = tree.add_child(z, CutAxis::W, height, 1);
        tree.add_leaf(w, CutAxis::Q, width, label);
    } else {
        tree.add_leaf(z, CutAxis::W, height, label);
    }
}

fn keep_better(best: &mut Option<Candidate>, candidate: Candidate) -> bool {
    if best.map_or(true, |b| candidate.score < b.score) {
        *best = Some(candidate);
    }
    candidate.score == PERFECT_FIT
}

impl Session<'_> {
    fn place_all(&mut self) {
        while !self.queue.is_empty() {
            match self.best_candidate() {
                Some(candidate) => {
                    let piece = self.queue.remove(0);
                    self.commit(piece, candidate);
                    if !self.queue.is_empty() {
                        self.fill_voids();
                    }
                }
                None => {
                    let piece = self.queue.remove(0);
                    log::trace!(
                        "{} x {} fits nowhere on this sheet",
                        piece.width(),
                        piece.height()
                    );
                    self.unplaced.push(piece);
                }
            }
        }
    }

    fn best_candidate(&self) -> Option<Candidate> {
        let engine = self.engine;
        let piece = &self.queue[0];
        let upcoming = window(&self.queue, 1, engine.score_lookahead);
        let mut best: Option<Candidate> = None;

        for &column in self.tree.columns() {
            let column_width = self.tree[column].value();
            let free_height = engine.usable_height - self.tree.used_along(column);
            for o in piece.orientations() {
                if o.width > column_width || o.height > free_height {
                    continue;
                }
                let placed = piece.oriented(o);
                if !self.strip_layout_clear(Some(column), None, 0.0, &placed, o.width) {
                    continue;
                }
                let strip_height =
                    match self.strip_height(Some(column), column_width, free_height, &o, 1) {
                        Some(h) => h,
                        None => continue,
                    };
                let candidate = Candidate {
                    column: Some(column),
                    column_width,
                    strip_height,
                    orientation: o,
                    score: score_fit(column_width, free_height, o.width, o.height, upcoming),
                };
                if keep_better(&mut best, candidate) {
                    return best;
                }
            }
        }

        let free_width = engine.usable_width - self.tree.used_along(self.tree.root());
        for o in piece.orientations() {
            if o.width > free_width || o.height > engine.usable_height {
                continue;
            }
            let placed = piece.oriented(o);
            if !self.strip_layout_clear(None, None, 0.0, &placed, o.width) {
                continue;
            }
            let column_width = match self.column_width(free_width, &o) {
                Some(w) => w,
                None => continue,
            };
            let strip_height =
                match self.strip_height(None, column_width, engine.usable_height, &o, 1) {
                    Some(h) => h,
                    None => continue,
                };
            let candidate = Candidate {
                column: None,
                column_width,
                strip_height,
                orientation: o,
                score: score_fit(free_width, engine.usable_height, o.width, o.height, upcoming),
            };
            if keep_better(&mut best, candidate) {
                return best;
            }
        }

        best
    }

    /// Width of a new column for a piece `o.width` wide, extended over the
    /// remaining sheet width when nothing upcoming could use the rest.
    fn column_width(&self, free_width: f64, o: &Orientation) -> Option<f64> {
        let mb = self.engine.min_break;
        let siblings = child_values(&self.tree, self.tree.root());
        if !mb.values_clear(&siblings, &[o.width]) {
            return None;
        }

        let residual = free_width - o.width;
        if residual > 0.0 {
            let mut with_new = siblings.clone();
            with_new.push(o.width);
            let upcoming = window(&self.queue, 1, self.engine.residual_lookahead);
            let usable = residual_usable(residual, self.engine.usable_height, upcoming, |r| {
                mb.values_clear(&with_new, &[r.width])
            });
            if !usable && mb.values_clear(&siblings, &[free_width]) {
                return Some(free_width);
            }
        }
        Some(o.width)
    }

    /// Height of a new strip for a piece `o.height` tall, extended over the
    /// remaining column height when nothing upcoming could use the rest.
    ///
    /// `upcoming_from` is the queue index of the first piece after the one
    /// being placed.
    pub(crate) fn strip_height(
        &self,
        column: Option<NodeId>,
        column_width: f64,
        free_height: f64,
        o: &Orientation,
        upcoming_from: usize,
    ) -> Option<f64> {
        let mb = self.engine.min_break;
        let siblings = column
            .map(|c| child_values(&self.tree, c))
            .unwrap_or_default();
        if !mb.values_clear(&siblings, &[o.height]) {
            return None;
        }

        let residual = free_height - o.height;
        if residual > 0.0 {
            let mut with_new = siblings.clone();
            with_new.push(o.height);
            let upcoming = window(&self.queue, upcoming_from, self.engine.residual_lookahead);
            let usable = residual_usable(column_width, residual, upcoming, |r| {
                mb.values_clear(&with_new, &[r.height])
            });
            if !usable && mb.values_clear(&siblings, &[free_height]) {
                return Some(free_height);
            }
        }
        Some(o.height)
    }

    /// Checks the cuts a strip placement would add: its `Z` offsets against
    /// the other strips of the column, and the heights of stacked units
    /// against each other.
    pub(crate) fn strip_layout_clear(
        &self,
        column: Option<NodeId>,
        strip: Option<NodeId>,
        offset: f64,
        placed: &Piece,
        extent: f64,
    ) -> bool {
        let mb = self.engine.min_break;
        if !mb.is_active() {
            return true;
        }
        if let Some(f) = placed.fusion().filter(|f| f.axis == FusedAxis::Height) {
            let heights: Vec<f64> = f.units.iter().map(|u| u.along).collect();
            if !mb.values_clear(&[], &heights) {
                return false;
            }
        }
        match column {
            Some(column) => mb.positions_clear(
                &column_z_positions(&self.tree, column, strip),
                &z_offsets(offset, placed, extent),
            ),
            None => true,
        }
    }

    /// Checks that `placed` can be stacked under the existing `W`s of `z`.
    pub(crate) fn stack_clear(&self, z: NodeId, placed: &Piece) -> bool {
        let heights: Vec<f64> = match placed.fusion() {
            Some(f) if f.axis == FusedAxis::Width => {
                // Units share one W, so their heights must agree.
                if !placed.has_uniform_units() {
                    return false;
                }
                vec![placed.height()]
            }
            Some(f) => f.units.iter().map(|u| u.along).collect(),
            None => vec![placed.height()],
        };
        self.engine
            .min_break
            .values_clear(&child_values(&self.tree, z), &heights)
    }

    /// First orientation of `piece` that can be stacked into `z`.
    pub(crate) fn stack_orientation(
        &self,
        z: NodeId,
        z_width: f64,
        free_height: f64,
        piece: &Piece,
    ) -> Option<Orientation> {
        piece.orientations().into_iter().find(|o| {
            o.width <= z_width
                && o.height <= free_height
                && self.stack_clear(z, &piece.oriented(*o))
        })
    }

    fn commit(&mut self, piece: Piece, candidate: Candidate) {
        let column = match candidate.column {
            Some(column) => column,
            None => {
                let root = self.tree.root();
                self.tree
                    .add_child(root, CutAxis::X, candidate.column_width, 1)
            }
        };
        let strip = self
            .tree
            .add_child(column, CutAxis::Y, candidate.strip_height, 1);

        let o = candidate.orientation;
        let placed = piece.oriented(o);
        self.place_in_strip(strip, &placed, o.width);
        self.lateral_fill(column, strip, o.height);
        self.continue_vertically(column, o);
    }

    /// Creates the `Z`/`W`/`Q` nodes of `placed` at the end of `strip`.
    ///
    /// Returns the single `Z` holding the piece, or `None` for a composite
    /// laid out as one `Z` per unit.
    pub(crate) fn place_in_strip(
        &mut self,
        strip: NodeId,
        placed: &Piece,
        extent: f64,
    ) -> Option<NodeId> {
        let tree = &mut self.tree;
        match placed.fusion() {
            Some(f) if f.axis == FusedAxis::Width => {
                for unit in &f.units {
                    let z = tree.add_child(strip, CutAxis::Z, unit.along, 1);
                    tree.add_leaf(z, CutAxis::W, unit.across, unit.label.clone());
                }
                None
            }
            Some(f) => {
                let z = tree.add_child(strip, CutAxis::Z, extent, 1);
                for unit in &f.units {
                    stack_unit(tree, z, extent, unit.along, unit.across, unit.label.clone());
                }
                Some(z)
            }
            None => {
                let z = tree.add_child(strip, CutAxis::Z, extent, 1);
                let label = placed.label().map(String::from);
                stack_unit(tree, z, extent, placed.height(), placed.width(), label);
                Some(z)
            }
        }
    }

    /// Creates the `W`/`Q` nodes of `placed` under the existing `W`s of `z`.
    pub(crate) fn stack_in_z(&mut self, z: NodeId, placed: &Piece) {
        let z_width = self.tree[z].value();
        let tree = &mut self.tree;
        match placed.fusion() {
            Some(f) if f.axis == FusedAxis::Width => {
                let w = tree.add_child(z, CutAxis::W, placed.height(), 1);
                for unit in &f.units {
                    tree.add_leaf(w, CutAxis::Q, unit.along, unit.label.clone());
                }
            }
            Some(f) => {
                for unit in &f.units {
                    stack_unit(tree, z, z_width, unit.along, unit.across, unit.label.clone());
                }
            }
            None => {
                let label = placed.label().map(String::from);
                stack_unit(tree, z, z_width, placed.height(), placed.width(), label);
            }
        }
    }

    /// Places `piece` next to the existing `Z`s of `strip`, extending its
    /// `Z` to the column edge when the rest of the strip would be dead.
    pub(crate) fn place_lateral(
        &mut self,
        column: NodeId,
        strip: NodeId,
        piece: Piece,
        o: Orientation,
    ) -> Option<NodeId> {
        let placed = piece.oriented(o);
        let offset = self.tree.used_along(strip);
        let extent = self.lateral_extent(column, strip, offset, &placed);
        self.place_in_strip(strip, &placed, extent)
    }

    fn lateral_extent(&self, column: NodeId, strip: NodeId, offset: f64, placed: &Piece) -> f64 {
        let width = placed.width();
        if is_horizontal_run(placed) {
            return width;
        }
        let column_width = self.tree[column].value();
        let residual = column_width - offset - width;
        if residual <= 0.0 {
            return width;
        }

        let mb = self.engine.min_break;
        let others = column_z_positions(&self.tree, column, Some(strip));
        let cut = offset + width;
        let upcoming = window(&self.queue, 0, self.engine.residual_lookahead);
        let usable = residual_usable(residual, self.tree[strip].value(), upcoming, |r| {
            mb.positions_clear(&others, &[cut + r.width])
        });
        if !usable && mb.positions_clear(&others, &[column_width]) {
            column_width - offset
        } else {
            width
        }
    }

    /// Fills the rest of a fresh strip sideways.
    ///
    /// Pass 1 takes pieces exactly `piece_height` tall. Pass 2 takes any
    /// piece that fits the strip and stacks further pieces under it inside
    /// its own `Z`.
    pub(crate) fn lateral_fill(&mut self, column: NodeId, strip: NodeId, piece_height: f64) {
        let column_width = self.tree[column].value();
        let strip_height = self.tree[strip].value();

        let mut i = 0;
        while i < self.queue.len() {
            let used = self.tree.used_along(strip);
            let free = column_width - used;
            if free <= 0.0 {
                return;
            }
            let mut pick: Option<Orientation> = None;
            for o in self.queue[i].orientations() {
                if o.height != piece_height || o.width > free {
                    continue;
                }
                let placed = self.queue[i].oriented(o);
                if !self.strip_layout_clear(Some(column), Some(strip), used, &placed, o.width) {
                    continue;
                }
                if pick.map_or(true, |p| o.width > p.width) {
                    pick = Some(o);
                }
            }
            match pick {
                Some(o) => {
                    let piece = self.queue.remove(i);
                    self.place_lateral(column, strip, piece, o);
                }
                None => i += 1,
            }
        }

        let mut i = 0;
        while i < self.queue.len() {
            let used = self.tree.used_along(strip);
            let free = column_width - used;
            if free <= 0.0 {
                return;
            }
            let mut pick: Option<(Orientation, f64)> = None;
            for o in self.queue[i].orientations() {
                if o.width > free || o.height > strip_height {
                    continue;
                }
                let placed = self.queue[i].oriented(o);
                if !self.strip_layout_clear(Some(column), Some(strip), used, &placed, o.width) {
                    continue;
                }
                let score = if o.width == free && o.height == strip_height {
                    PERFECT_FIT
                } else {
                    (strip_height - o.height) * 2.0 + (free - o.width)
                };
                if pick.map_or(true, |(_, s)| score < s) {
                    pick = Some((o, score));
                }
            }
            match pick {
                Some((o, _)) => {
                    let piece = self.queue.remove(i);
                    if let Some(z) = self.place_lateral(column, strip, piece, o) {
                        self.stack_fill(z);
                    }
                    // Stacking may have taken pieces from anywhere in the queue.
                    i = 0;
                }
                None => i += 1,
            }
        }
    }

    /// Stacks queue pieces into the free height of `z`.
    fn stack_fill(&mut self, z: NodeId) {
        let strip_height = match self.tree[z].parent() {
            Some(strip) => self.tree[strip].value(),
            None => return,
        };
        let z_width = self.tree[z].value();

        let mut i = 0;
        while i < self.queue.len() {
            let free = strip_height - self.tree.used_along(z);
            if free <= 0.0 {
                return;
            }
            match self.stack_orientation(z, z_width, free, &self.queue[i]) {
                Some(o) => {
                    let placed = self.queue.remove(i).oriented(o);
                    self.stack_in_z(z, &placed);
                }
                None => i += 1,
            }
        }
    }

    /// Repeats the `footprint` strip downward with matching pieces.
    fn continue_vertically(&mut self, column: NodeId, footprint: Orientation) {
        let mb = self.engine.min_break;
        while !self.queue.is_empty() {
            let free = self.engine.usable_height - self.tree.used_along(column);
            if free < footprint.height {
                return;
            }
            let found = self.queue.iter().enumerate().find_map(|(i, p)| {
                p.orientations()
                    .into_iter()
                    .find(|o| o.width == footprint.width && o.height == footprint.height)
                    .map(|o| (i, o))
            });
            let (index, o) = match found {
                Some(found) => found,
                None => return,
            };

            let placed = self.queue[index].oriented(o);
            if !mb.values_clear(&child_values(&self.tree, column), &[footprint.height])
                || !self.strip_layout_clear(Some(column), None, 0.0, &placed, o.width)
            {
                return;
            }

            self.queue.remove(index);
            let strip = self.tree.add_child(column, CutAxis::Y, footprint.height, 1);
            self.place_in_strip(strip, &placed, o.width);
            self.lateral_fill(column, strip, footprint.height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::min_break::find_violations;
    use crate::piece::FusedUnit;
    use approx::assert_relative_eq;

    fn engine(width: f64, height: f64) -> PlacementEngine {
        PlacementEngine::new(&Config::default(), width, height)
    }

    fn assert_disjoint(tree: &CutTree) {
        let rects = tree.leaf_rects();
        for (i, a) in rects.iter().enumerate() {
            assert!(a.x >= 0.0 && a.y >= 0.0);
            assert!(a.x + a.width <= tree.usable_width());
            assert!(a.y + a.height <= tree.usable_height());
            for b in &rects[i + 1..] {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_empty_queue() {
        let out = engine(1000.0, 1000.0).run(Vec::new());
        assert!(out.tree.is_empty());
        assert_eq!(out.placed_area, 0.0);
        assert!(out.unplaced.is_empty());
    }

    #[test]
    fn test_single_piece_extends_to_edges() {
        let out = engine(1000.0, 1000.0).run(vec![Piece::new(600.0, 600.0)]);
        let tree = &out.tree;
        assert_eq!(tree.columns().len(), 1);
        let column = tree.columns()[0];
        // Nothing follows, so the column and strip swallow the dead leftovers.
        assert_eq!(tree[column].value(), 1000.0);
        assert_eq!(tree[tree.children(column)[0]].value(), 1000.0);
        assert_relative_eq!(out.placed_area, 360_000.0);
    }

    #[test]
    fn test_three_squares_on_small_sheet() {
        let pieces = vec![Piece::new(600.0, 600.0); 3];
        let out = engine(1000.0, 1000.0).run(pieces);
        assert_eq!(out.placed_count(), 1);
        assert_eq!(out.unplaced.len(), 2);
        assert_disjoint(&out.tree);
    }

    #[test]
    fn test_identical_pieces_stack_in_columns() {
        let pieces = vec![Piece::new(600.0, 400.0); 10];
        let out = engine(2750.0, 1220.0).run(pieces);
        assert_eq!(out.placed_count(), 10);
        assert!(out.unplaced.is_empty());
        assert_relative_eq!(out.placed_area, 10.0 * 600.0 * 400.0);
        assert_disjoint(&out.tree);
    }

    #[test]
    fn test_lateral_fill_uses_strip_width() {
        let engine = engine(1000.0, 1000.0);
        let mut tree = CutTree::new(1000.0, 1000.0);
        let column = tree.add_child(tree.root(), CutAxis::X, 1000.0, 1);
        let strip = tree.add_child(column, CutAxis::Y, 300.0, 1);
        let z = tree.add_child(strip, CutAxis::Z, 500.0, 1);
        tree.add_child(z, CutAxis::W, 300.0, 1);

        let mut session = Session {
            engine: &engine,
            tree,
            queue: vec![
                Piece::new(300.0, 300.0),
                Piece::new(200.0, 100.0),
                Piece::new(200.0, 200.0),
            ],
            unplaced: Vec::new(),
        };
        session.lateral_fill(column, strip, 300.0);

        // The exact-height piece goes first, then the strip is closed by a
        // shorter piece whose Z swallows the dead remainder.
        assert_eq!(session.tree.children(strip).len(), 3);
        assert_relative_eq!(session.tree.used_along(strip), 1000.0);
        assert_eq!(session.queue, vec![Piece::new(200.0, 200.0)]);
        assert_disjoint(&session.tree);
    }

    #[test]
    fn test_labels_reach_leaves() {
        let pieces = vec![
            Piece::new(400.0, 300.0).with_label("a"),
            Piece::new(400.0, 300.0).with_label("b"),
        ];
        let out = engine(1000.0, 1000.0).run(pieces);
        let mut labels: Vec<_> = out
            .tree
            .leaf_rects()
            .into_iter()
            .filter_map(|r| r.label)
            .collect();
        labels.sort();
        assert_eq!(labels, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_fused_pieces_expand_to_units() {
        let row = Piece::fused(
            FusedAxis::Width,
            vec![
                FusedUnit {
                    along: 300.0,
                    across: 200.0,
                    label: Some("r1".into()),
                },
                FusedUnit {
                    along: 250.0,
                    across: 190.0,
                    label: Some("r2".into()),
                },
            ],
        );
        let stack = Piece::fused(
            FusedAxis::Height,
            vec![
                FusedUnit {
                    along: 150.0,
                    across: 400.0,
                    label: Some("s1".into()),
                },
                FusedUnit {
                    along: 100.0,
                    across: 380.0,
                    label: Some("s2".into()),
                },
            ],
        );
        let net = row.net_area() + stack.net_area();
        let out = engine(1000.0, 1000.0).run(vec![row, stack]);
        assert_eq!(out.placed_count(), 4);
        assert_relative_eq!(out.placed_area, net);
        assert_disjoint(&out.tree);
    }

    #[test]
    fn test_min_break_respected() {
        let config = Config::default().with_min_break(50.0);
        let pieces = vec![
            Piece::new(1030.0, 1200.0),
            Piece::new(1000.0, 1200.0),
            Piece::new(420.0, 300.0),
            Piece::new(400.0, 300.0),
            Piece::new(380.0, 290.0),
        ];
        let out = PlacementEngine::new(&config, 3000.0, 1200.0).run(pieces);
        assert!(find_violations(&out.tree, MinBreak::new(50.0)).is_empty());
        let widths = child_values(&out.tree, out.tree.root());
        assert!(!(widths.contains(&1000.0) && widths.contains(&1030.0)));
        assert_disjoint(&out.tree);
        assert_eq!(out.placed_count() + out.unplaced.len(), 5);
    }
}
