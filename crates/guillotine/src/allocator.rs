//! Multi-sheet allocation.
//!
//! Runs the strategy search sheet after sheet, feeding each sheet the pieces
//! the previous one left over, until everything is placed, a sheet places
//! nothing, or the sheet cap is reached. [`allocate_with`] takes any
//! single-sheet planner; [`allocate_sheets`] uses the strategy search.

use u_cutplan_core::Config;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::piece::Piece;
use crate::strategy::StrategySearch;
use crate::tree::CutTree;

/// How an allocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AllocationStatus {
    /// Every piece was placed.
    Complete,
    /// A fresh sheet placed nothing: the remaining pieces never fit.
    Stalled,
    /// The sheet cap was reached with pieces left.
    SheetLimitReached,
}

/// One cut sheet of an allocation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SheetLayout {
    /// Cut tree.
    pub tree: CutTree,
    /// Placed area.
    pub placed_area: f64,
    /// What produced the sheet (search variant or `genetic`).
    pub method: String,
}

impl SheetLayout {
    /// Original rectangles placed.
    pub fn placed_count(&self) -> usize {
        self.tree.placed_piece_count()
    }

    /// Placed area over usable area.
    pub fn utilization(&self) -> f64 {
        self.tree.utilization()
    }
}

/// Sheets produced by an allocation.
#[derive(Debug, Clone)]
pub struct Allocation {
    /// Sheets in cutting order.
    pub sheets: Vec<SheetLayout>,
    /// Pieces left when the allocation ended.
    pub unplaced: Vec<Piece>,
    /// How it ended.
    pub status: AllocationStatus,
}

impl Allocation {
    /// Original rectangles placed over all sheets.
    pub fn placed_count(&self) -> usize {
        self.sheets.iter().map(SheetLayout::placed_count).sum()
    }

    /// Placed area over all sheets.
    pub fn placed_area(&self) -> f64 {
        self.sheets.iter().map(|s| s.placed_area).sum()
    }

    /// Placed area over the usable area of the sheets used.
    pub fn utilization(&self) -> f64 {
        let usable: f64 = self.sheets.iter().map(|s| s.tree.usable_area()).sum();
        if usable > 0.0 {
            self.placed_area() / usable
        } else {
            0.0
        }
    }
}

/// Allocates `pieces` with the strategy search, up to `config.max_sheets`
/// sheets.
pub fn allocate_sheets(
    pieces: Vec<Piece>,
    config: &Config,
    usable_width: f64,
    usable_height: f64,
) -> Allocation {
    let search = StrategySearch::new(config, usable_width, usable_height);
    allocate_with(pieces, config.max_sheets, |remaining, _| {
        let outcome = search.run(remaining);
        let layout = SheetLayout {
            placed_area: outcome.placed_area,
            method: outcome.variant.to_string(),
            tree: outcome.tree,
        };
        (layout, outcome.unplaced)
    })
}

/// Allocates `pieces` sheet after sheet with `cut_sheet`, which receives the
/// remaining pieces and the sheet index and returns the sheet with the
/// pieces it left over.
pub fn allocate_with<F>(pieces: Vec<Piece>, max_sheets: usize, mut cut_sheet: F) -> Allocation
where
    F: FnMut(&[Piece], usize) -> (SheetLayout, Vec<Piece>),
{
    let mut sheets: Vec<SheetLayout> = Vec::new();
    let mut remaining = pieces;

    let status = loop {
        if remaining.is_empty() {
            break AllocationStatus::Complete;
        }
        if sheets.len() >= max_sheets {
            log::warn!(
                "sheet limit of {} reached with {} pieces left",
                max_sheets,
                remaining.len()
            );
            break AllocationStatus::SheetLimitReached;
        }

        let (layout, left) = cut_sheet(&remaining, sheets.len());
        if layout.placed_count() == 0 {
            log::warn!(
                "{} pieces fit on no sheet of {} x {}",
                remaining.len(),
                layout.tree.usable_width(),
                layout.tree.usable_height()
            );
            break AllocationStatus::Stalled;
        }
        log::debug!(
            "sheet {}: {} placed, {} left",
            sheets.len() + 1,
            layout.placed_count(),
            left.len()
        );
        remaining = left;
        sheets.push(layout);
    };

    log::info!(
        "allocation {:?}: {} sheets, {} pieces left",
        status,
        sheets.len(),
        remaining.len()
    );
    Allocation {
        sheets,
        unplaced: remaining,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_allocation() {
        let pieces = vec![Piece::new(600.0, 600.0); 3];
        let alloc = allocate_sheets(pieces, &Config::default(), 1000.0, 1000.0);
        assert_eq!(alloc.status, AllocationStatus::Complete);
        assert_eq!(alloc.sheets.len(), 3);
        assert_eq!(alloc.placed_count(), 3);
        assert!(alloc.unplaced.is_empty());
    }

    #[test]
    fn test_oversized_piece_stalls() {
        let pieces = vec![Piece::new(400.0, 400.0), Piece::new(1200.0, 300.0)];
        let alloc = allocate_sheets(pieces, &Config::default(), 1000.0, 1000.0);
        assert_eq!(alloc.status, AllocationStatus::Stalled);
        assert_eq!(alloc.sheets.len(), 1);
        assert_eq!(alloc.unplaced.len(), 1);
        assert_eq!(alloc.unplaced[0].width(), 1200.0);
    }

    #[test]
    fn test_sheet_limit_is_reported() {
        let pieces = vec![Piece::new(600.0, 600.0); 5];
        let config = Config::default().with_max_sheets(2);
        let alloc = allocate_sheets(pieces, &config, 1000.0, 1000.0);
        assert_eq!(alloc.status, AllocationStatus::SheetLimitReached);
        assert_eq!(alloc.sheets.len(), 2);
        assert_eq!(alloc.unplaced.len(), 3);
        assert_eq!(alloc.placed_count() + alloc.unplaced.len(), 5);
    }

    #[test]
    fn test_custom_sheet_planner() {
        let pieces = vec![Piece::new(100.0, 100.0); 5];
        let alloc = allocate_with(pieces, 10, |remaining, index| {
            let mut tree = CutTree::new(100.0, 100.0);
            let x = tree.add_child(tree.root(), crate::tree::CutAxis::X, 100.0, 1);
            let y = tree.add_child(x, crate::tree::CutAxis::Y, 100.0, 1);
            tree.add_child(y, crate::tree::CutAxis::Z, 100.0, 1);
            let layout = SheetLayout {
                placed_area: tree.placed_area(),
                tree,
                method: format!("one-per-sheet #{}", index),
            };
            (layout, remaining[1..].to_vec())
        });
        assert_eq!(alloc.status, AllocationStatus::Complete);
        assert_eq!(alloc.sheets.len(), 5);
        assert_eq!(alloc.sheets[4].method, "one-per-sheet #4");
        assert_eq!(alloc.utilization(), 1.0);
    }

    #[test]
    fn test_empty_inventory() {
        let alloc = allocate_sheets(Vec::new(), &Config::default(), 1000.0, 1000.0);
        assert_eq!(alloc.status, AllocationStatus::Complete);
        assert!(alloc.sheets.is_empty());
        assert_eq!(alloc.utilization(), 0.0);
    }
}
