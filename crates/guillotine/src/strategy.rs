//! Deterministic strategy search.
//!
//! Runs the placement engine once per combination of global orientation and
//! grouping parameters, always under the canonical ordering, and keeps the
//! variant with the greatest placed area. The first variant to reach an area
//! wins ties, so repeated runs return identical trees.

use std::fmt;

use u_cutplan_core::Config;

use crate::grouping::{search_space, GroupingParams, GroupingStrategy};
use crate::piece::{sort_canonical, unfuse_all, Piece};
use crate::placement::PlacementEngine;
use crate::tree::CutTree;

/// One point of the search space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SearchVariant {
    /// Whether every piece was turned by 90 degrees before grouping.
    pub rotated: bool,
    /// Grouping applied before placement.
    pub grouping: GroupingParams,
}

impl fmt::Display for SearchVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let orientation = if self.rotated { "rotated" } else { "original" };
        write!(f, "{}/{:?}", orientation, self.grouping.strategy)?;
        if self.grouping.strategy.uses_tolerance() {
            write!(f, " tol={}", self.grouping.tolerance)?;
        }
        if let Some(size) = self.grouping.max_group_size {
            write!(f, " max={}", size)?;
        }
        Ok(())
    }
}

/// Best single-sheet result of a search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Cut tree of the winning variant.
    pub tree: CutTree,
    /// Pieces the winning variant left over, split back into originals.
    pub unplaced: Vec<Piece>,
    /// Placed area of the winning variant.
    pub placed_area: f64,
    /// The winning variant.
    pub variant: SearchVariant,
    /// Number of variants run.
    pub variants_tried: usize,
}

impl SearchOutcome {
    /// Number of original rectangles placed.
    pub fn placed_count(&self) -> usize {
        self.tree.placed_piece_count()
    }

    /// Placed area over usable area.
    pub fn utilization(&self) -> f64 {
        self.tree.utilization()
    }
}

/// Strategy search over one sheet size.
#[derive(Debug, Clone)]
pub struct StrategySearch {
    config: Config,
    engine: PlacementEngine,
}

impl StrategySearch {
    /// Creates a search for a sheet of the given usable size.
    pub fn new(config: &Config, usable_width: f64, usable_height: f64) -> Self {
        Self {
            config: config.clone(),
            engine: PlacementEngine::new(config, usable_width, usable_height),
        }
    }

    /// The variants tried for `pieces`, in search order.
    ///
    /// Labeled pieces and disabled grouping only compare the two global
    /// orientations.
    pub fn variants(&self, pieces: &[Piece]) -> Vec<SearchVariant> {
        let groupings = if !self.config.grouping || pieces.iter().any(Piece::has_label) {
            vec![GroupingParams::none()]
        } else {
            search_space(&self.config)
        };

        [false, true]
            .into_iter()
            .flat_map(|rotated| {
                groupings
                    .iter()
                    .map(move |&grouping| SearchVariant { rotated, grouping })
            })
            .collect()
    }

    /// Runs one variant.
    pub fn run_variant(&self, pieces: &[Piece], variant: SearchVariant) -> (CutTree, f64, Vec<Piece>) {
        let oriented: Vec<Piece> = if variant.rotated {
            pieces.iter().map(Piece::rotated).collect()
        } else {
            pieces.to_vec()
        };
        let mut queue = if variant.grouping.strategy == GroupingStrategy::None {
            oriented
        } else {
            variant.grouping.apply(
                &oriented,
                self.engine.usable_width(),
                self.engine.usable_height(),
            )
        };
        sort_canonical(&mut queue);

        let outcome = self.engine.run(queue);
        (outcome.tree, outcome.placed_area, unfuse_all(outcome.unplaced))
    }

    /// Runs every variant and returns the best one.
    pub fn run(&self, pieces: &[Piece]) -> SearchOutcome {
        let mut best = SearchOutcome {
            tree: CutTree::new(self.engine.usable_width(), self.engine.usable_height()),
            unplaced: Vec::new(),
            placed_area: 0.0,
            variant: SearchVariant::default(),
            variants_tried: 0,
        };
        if pieces.is_empty() {
            return best;
        }

        let variants = self.variants(pieces);
        let mut found = false;
        for &variant in &variants {
            let (tree, placed_area, unplaced) = self.run_variant(pieces, variant);
            log::debug!(
                "variant {}: area {:.0}, {} unplaced",
                variant,
                placed_area,
                unplaced.len()
            );
            if !found || placed_area > best.placed_area {
                found = true;
                best.tree = tree;
                best.placed_area = placed_area;
                best.unplaced = unplaced;
                best.variant = variant;
            }
        }
        best.variants_tried = variants.len();

        log::info!(
            "strategy search: best {} of {} variants, utilization {:.1}%",
            best.variant,
            best.variants_tried,
            best.tree.utilization() * 100.0
        );
        best
    }
}
