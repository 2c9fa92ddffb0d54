//! Planner facade.
//!
//! [`CutPlanner`] validates the job, expands the inventory, runs the
//! configured search and writes inventory labels into the finished trees.

use std::ops::ControlFlow;
use std::time::Instant;

use u_cutplan_core::{Config, ProgressInfo, Result, SolveSummary, Strategy};

use crate::allocator::{allocate_sheets, allocate_with, AllocationStatus, SheetLayout};
use crate::ga_cutting::{CuttingGaConfig, GeneticSearch};
use crate::labels::LabelPool;
use crate::layout::{group_identical_layouts, LayoutGroup};
use crate::piece::{expand_items, Piece, PieceItem, Sheet};
use crate::strategy::StrategySearch;
use crate::tree::CutTree;

/// Plan for a single sheet.
#[derive(Debug, Clone)]
pub struct SheetPlan {
    /// Cut tree.
    pub tree: CutTree,
    /// Pieces that did not fit.
    pub unplaced: Vec<Piece>,
    /// What produced the tree.
    pub method: String,
    /// Pieces requested.
    pub requested: usize,
    /// Computation time in milliseconds.
    pub time_ms: u64,
}

impl SheetPlan {
    /// Original rectangles placed.
    pub fn placed_count(&self) -> usize {
        self.tree.placed_piece_count()
    }

    /// Placed area over usable area.
    pub fn utilization(&self) -> f64 {
        self.tree.utilization()
    }

    /// Summary statistics.
    pub fn summary(&self) -> SolveSummary {
        SolveSummary {
            total_requested: self.requested,
            total_placed: self.placed_count(),
            sheets_used: usize::from(!self.tree.is_empty()),
            utilization: self.utilization(),
            time_ms: self.time_ms,
            strategy: self.method.clone(),
        }
    }
}

/// Plan over as many sheets as needed.
#[derive(Debug, Clone)]
pub struct CutPlan {
    /// Sheets in cutting order.
    pub sheets: Vec<SheetLayout>,
    /// Pieces left over.
    pub unplaced: Vec<Piece>,
    /// How the allocation ended.
    pub status: AllocationStatus,
    /// Strategy used per sheet.
    pub strategy: Strategy,
    /// Pieces requested.
    pub requested: usize,
    /// Computation time in milliseconds.
    pub time_ms: u64,
}

impl CutPlan {
    /// Original rectangles placed over all sheets.
    pub fn placed_count(&self) -> usize {
        self.sheets.iter().map(SheetLayout::placed_count).sum()
    }

    /// Placed area over the usable area of the sheets used.
    pub fn utilization(&self) -> f64 {
        let usable: f64 = self.sheets.iter().map(|s| s.tree.usable_area()).sum();
        if usable > 0.0 {
            self.sheets.iter().map(|s| s.placed_area).sum::<f64>() / usable
        } else {
            0.0
        }
    }

    /// Summary statistics.
    pub fn summary(&self) -> SolveSummary {
        SolveSummary {
            total_requested: self.requested,
            total_placed: self.placed_count(),
            sheets_used: self.sheets.len(),
            utilization: self.utilization(),
            time_ms: self.time_ms,
            strategy: format!("{:?}", self.strategy),
        }
    }

    /// Sheets grouped by identical layout.
    pub fn layout_groups(&self) -> Vec<LayoutGroup> {
        group_identical_layouts(self.sheets.iter().map(|s| &s.tree))
    }
}

/// Guillotine cut planner.
#[derive(Debug, Clone, Default)]
pub struct CutPlanner {
    config: Config,
    ga: CuttingGaConfig,
}

impl CutPlanner {
    /// Creates a planner.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ga: CuttingGaConfig::default(),
        }
    }

    /// Sets the GA configuration.
    pub fn with_ga_config(mut self, ga: CuttingGaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Planner configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// GA configuration.
    pub fn ga_config(&self) -> &CuttingGaConfig {
        &self.ga
    }

    fn prepare(&self, items: &[PieceItem], sheet: &Sheet) -> Result<Vec<Piece>> {
        self.config.validate()?;
        sheet.validate()?;
        expand_items(items)
    }

    /// Best single sheet by strategy search.
    pub fn plan_sheet(&self, items: &[PieceItem], sheet: &Sheet) -> Result<SheetPlan> {
        let start = Instant::now();
        let pieces = self.prepare(items, sheet)?;
        let search = StrategySearch::new(&self.config, sheet.usable_width(), sheet.usable_height());
        let outcome = search.run(&pieces);

        let mut tree = outcome.tree;
        LabelPool::from_items(items).annotate(&mut tree);
        Ok(SheetPlan {
            tree,
            unplaced: outcome.unplaced,
            method: outcome.variant.to_string(),
            requested: pieces.len(),
            time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Best first sheet by genetic search.
    pub fn plan_genetic(&self, items: &[PieceItem], sheet: &Sheet, seed: u64) -> Result<SheetPlan> {
        self.plan_genetic_with(items, sheet, seed, |_| {}, |_| ControlFlow::Continue(()))
    }

    /// Genetic search with a progress callback and a cooperative yield hook.
    pub fn plan_genetic_with<P, Y>(
        &self,
        items: &[PieceItem],
        sheet: &Sheet,
        seed: u64,
        progress: P,
        yield_point: Y,
    ) -> Result<SheetPlan>
    where
        P: Fn(ProgressInfo),
        Y: FnMut(u32) -> ControlFlow<()>,
    {
        let start = Instant::now();
        let pieces = self.prepare(items, sheet)?;
        let search = GeneticSearch::new(
            &self.config,
            self.ga.clone(),
            sheet.usable_width(),
            sheet.usable_height(),
        );
        let outcome = search.run_with(&pieces, seed, progress, yield_point);

        let mut tree = outcome.tree;
        LabelPool::from_items(items).annotate(&mut tree);
        Ok(SheetPlan {
            tree,
            unplaced: outcome.unplaced,
            method: "genetic".into(),
            requested: pieces.len(),
            time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Plans every piece over as many sheets as needed with the configured
    /// strategy. `seed` drives the genetic strategy; sheet `i` uses
    /// `seed + i`.
    pub fn plan_sheets(&self, items: &[PieceItem], sheet: &Sheet, seed: u64) -> Result<CutPlan> {
        let start = Instant::now();
        let pieces = self.prepare(items, sheet)?;
        let requested = pieces.len();
        let (width, height) = (sheet.usable_width(), sheet.usable_height());

        let mut allocation = match self.config.strategy {
            Strategy::StrategySearch => allocate_sheets(pieces, &self.config, width, height),
            Strategy::Genetic => {
                let search = GeneticSearch::new(&self.config, self.ga.clone(), width, height);
                allocate_with(pieces, self.config.max_sheets, |remaining, index| {
                    let outcome = search.run(remaining, seed.wrapping_add(index as u64));
                    let layout = SheetLayout {
                        placed_area: outcome.tree.placed_area(),
                        tree: outcome.tree,
                        method: "genetic".into(),
                    };
                    (layout, outcome.unplaced)
                })
            }
        };

        let mut pool = LabelPool::from_items(items);
        for layout in &mut allocation.sheets {
            pool.annotate(&mut layout.tree);
        }

        Ok(CutPlan {
            sheets: allocation.sheets,
            unplaced: allocation.unplaced,
            status: allocation.status,
            strategy: self.config.strategy,
            requested,
            time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
