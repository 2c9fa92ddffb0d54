//! # U-Cutplan Guillotine
//!
//! Two-dimensional guillotine cutting-stock planner.
//!
//! A sheet is cut by nested, edge-to-edge cuts recorded in a five-level
//! tree: columns (`X`), strips (`Y`), sub-cuts (`Z`), stacked sub-cuts (`W`)
//! and narrowing cuts (`Q`). The planner fills that tree greedily, keeps
//! parallel cuts at least a minimum break apart, and searches over
//! orientations and piece groupings for the fullest sheet.
//!
//! ## Features
//!
//! - Arena cut tree with insert/delete, area and leaf-rectangle traversal
//! - Grouping preprocessor (exact, fuzzy, fill-row, fill-col, smart)
//! - Greedy placement with lateral fill, vertical continuation and void filling
//! - Minimum-break constraint and extend-to-edge residual handling
//! - Deterministic strategy search and a seeded genetic search
//! - Multi-sheet allocation, label annotation, identical-layout grouping
//!
//! ## Quick Start
//!
//! ```rust
//! use u_cutplan_guillotine::{Config, CutPlanner, PieceItem, Sheet};
//!
//! let items = vec![
//!     PieceItem::new(10, 600.0, 400.0),
//!     PieceItem::new(2, 300.0, 250.0).with_label("shelf"),
//! ];
//! let sheet = Sheet::new(2750.0, 1220.0);
//!
//! let planner = CutPlanner::new(Config::new().with_min_break(50.0));
//! let plan = planner.plan_sheet(&items, &sheet).unwrap();
//!
//! println!(
//!     "placed {} of 12, utilization {:.1}%",
//!     plan.placed_count(),
//!     plan.utilization() * 100.0
//! );
//! ```
//!
//! ## Building Trees By Hand
//!
//! ```rust
//! use u_cutplan_guillotine::{CutAxis, CutTree};
//!
//! let mut tree = CutTree::new(1000.0, 500.0);
//! let column = tree.insert(tree.root(), CutAxis::X, 400.0, 1).unwrap();
//! let strip = tree.insert(column, CutAxis::Y, 250.0, 2).unwrap();
//! tree.insert(strip, CutAxis::Z, 400.0, 1).unwrap();
//!
//! assert_eq!(tree.placed_area(), 200_000.0);
//! assert_eq!(tree.leaf_rects().len(), 2);
//! ```

pub mod allocator;
pub mod ga_cutting;
pub mod grouping;
pub mod labels;
pub mod layout;
pub mod min_break;
pub mod piece;
pub mod placement;
pub mod planner;
pub mod scoring;
pub mod strategy;
pub mod tree;
pub mod void_fill;

// Re-exports
pub use allocator::{allocate_sheets, allocate_with, Allocation, AllocationStatus, SheetLayout};
pub use ga_cutting::{CuttingChromosome, CuttingGaConfig, GeneticOutcome, GeneticSearch};
pub use grouping::{GroupingParams, GroupingStrategy};
pub use labels::{annotate_labels, LabelPool};
pub use layout::{group_identical_layouts, LayoutGroup};
pub use min_break::{find_violations, BreakViolation, MinBreak};
pub use piece::{expand_items, FusedAxis, FusedUnit, Orientation, Piece, PieceItem, Sheet};
pub use placement::{PlacementEngine, PlacementOutcome};
pub use planner::{CutPlan, CutPlanner, SheetPlan};
pub use strategy::{SearchOutcome, SearchVariant, StrategySearch};
pub use tree::{CutAxis, CutNode, CutTree, NodeId, PlacedRect};
pub use void_fill::{collect_voids, Void, VoidKind};
pub use u_cutplan_core::{Config, Error, ProgressInfo, Result, SolveSummary, Strategy};
