//! Piece grouping preprocessor.
//!
//! Grouping fuses pieces that share (or nearly share) one dimension into a
//! composite that is placed as a single unit. Every strategy is a pure
//! function over a piece list; the composites keep their original units so
//! the placement engine can cut them back apart.
//!
//! Before grouping each piece is normalized to landscape (`long × short`).
//! Pieces that end up in no group are returned unchanged.

use u_cutplan_core::Config;

use crate::piece::{FusedAxis, FusedUnit, Piece};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Grouping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GroupingStrategy {
    /// No grouping.
    #[default]
    None,
    /// Equal short sides, fused side by side.
    ExactHeight,
    /// Short sides within a tolerance, fused side by side.
    FuzzyHeight,
    /// Equal long sides, stacked.
    ExactWidth,
    /// Long sides within a tolerance, stacked.
    FuzzyWidth,
    /// Rows filling the usable width, equal short sides.
    FillRow,
    /// Rows filling the usable width, short sides within a tolerance.
    FillRowFuzzy,
    /// Columns filling the usable height, long sides within a tolerance.
    FillCol,
    /// Fill-row, then fill-col over whatever stayed single.
    Smart,
}

impl GroupingStrategy {
    /// Strategies the searches draw from.
    ///
    /// Fill-row and fill-col are left out: with the composite bounded by the
    /// usable dimension they produce the same pieces as unbounded
    /// exact/fuzzy height and width grouping.
    pub const SEARCHED: [GroupingStrategy; 6] = [
        GroupingStrategy::None,
        GroupingStrategy::ExactHeight,
        GroupingStrategy::FuzzyHeight,
        GroupingStrategy::ExactWidth,
        GroupingStrategy::FuzzyWidth,
        GroupingStrategy::Smart,
    ];

    /// Whether the tolerance parameter changes the result.
    pub fn uses_tolerance(self) -> bool {
        matches!(
            self,
            GroupingStrategy::FuzzyHeight
                | GroupingStrategy::FuzzyWidth
                | GroupingStrategy::FillRowFuzzy
                | GroupingStrategy::FillCol
                | GroupingStrategy::Smart
        )
    }

    /// Whether the maximum group size parameter changes the result.
    pub fn uses_group_size(self) -> bool {
        matches!(
            self,
            GroupingStrategy::ExactHeight
                | GroupingStrategy::FuzzyHeight
                | GroupingStrategy::ExactWidth
                | GroupingStrategy::FuzzyWidth
        )
    }
}

/// A grouping strategy with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupingParams {
    /// Strategy.
    pub strategy: GroupingStrategy,
    /// Accepted difference from the group's base dimension.
    pub tolerance: f64,
    /// Maximum pieces per composite (`None` = bounded by the sheet only).
    pub max_group_size: Option<usize>,
}

impl GroupingParams {
    /// Parameters that leave the list untouched.
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates parameters for `strategy` with zero tolerance and no size cap.
    pub fn new(strategy: GroupingStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Sets the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum group size.
    pub fn with_max_group_size(mut self, size: Option<usize>) -> Self {
        self.max_group_size = size;
        self
    }

    /// Applies the strategy to `pieces` for a sheet of the given usable size.
    pub fn apply(&self, pieces: &[Piece], usable_width: f64, usable_height: f64) -> Vec<Piece> {
        let tol = self.tolerance;
        let size = self.max_group_size;
        match self.strategy {
            GroupingStrategy::None => pieces.to_vec(),
            GroupingStrategy::ExactHeight => group_by_height(pieces, 0.0, usable_width, size),
            GroupingStrategy::FuzzyHeight => group_by_height(pieces, tol, usable_width, size),
            GroupingStrategy::ExactWidth => group_by_width(pieces, 0.0, usable_height, size),
            GroupingStrategy::FuzzyWidth => group_by_width(pieces, tol, usable_height, size),
            GroupingStrategy::FillRow => fill_row(pieces, usable_width, 0.0),
            GroupingStrategy::FillRowFuzzy => fill_row(pieces, usable_width, tol),
            GroupingStrategy::FillCol => fill_col(pieces, usable_height, tol),
            GroupingStrategy::Smart => smart(pieces, usable_width, usable_height, tol),
        }
    }
}

/// The grouping variants tried by the strategy search, in search order.
///
/// Fuzzy strategies are crossed with every positive configured tolerance
/// and bucket strategies with every configured maximum group size. A zero
/// tolerance would repeat the exact strategy, so it is skipped.
pub fn search_space(config: &Config) -> Vec<GroupingParams> {
    let mut space = Vec::new();
    for strategy in GroupingStrategy::SEARCHED {
        let tolerances: Vec<f64> = if strategy.uses_tolerance() {
            config
                .fuzzy_tolerances
                .iter()
                .copied()
                .filter(|&t| t > 0.0)
                .collect()
        } else {
            vec![0.0]
        };
        let sizes: Vec<Option<usize>> = if strategy.uses_group_size() {
            config.max_group_sizes.clone()
        } else {
            vec![None]
        };
        for &tolerance in &tolerances {
            for &max_group_size in &sizes {
                space.push(GroupingParams {
                    strategy,
                    tolerance,
                    max_group_size,
                });
            }
        }
    }
    space
}

/// Fuses pieces whose short sides are within `tolerance`, side by side,
/// keeping each composite no wider than `max_width`.
pub fn group_by_height(
    pieces: &[Piece],
    tolerance: f64,
    max_width: f64,
    max_group_size: Option<usize>,
) -> Vec<Piece> {
    fuse(pieces, FusedAxis::Width, tolerance, max_width, max_group_size)
}

/// Fuses pieces whose long sides are within `tolerance`, stacked, keeping
/// each composite no taller than `max_height`.
pub fn group_by_width(
    pieces: &[Piece],
    tolerance: f64,
    max_height: f64,
    max_group_size: Option<usize>,
) -> Vec<Piece> {
    fuse(pieces, FusedAxis::Height, tolerance, max_height, max_group_size)
}

/// Accumulates compatible pieces into rows no wider than `target_width`.
pub fn fill_row(pieces: &[Piece], target_width: f64, tolerance: f64) -> Vec<Piece> {
    fuse(pieces, FusedAxis::Width, tolerance, target_width, None)
}

/// Accumulates compatible pieces into columns no taller than `target_height`.
pub fn fill_col(pieces: &[Piece], target_height: f64, tolerance: f64) -> Vec<Piece> {
    fuse(pieces, FusedAxis::Height, tolerance, target_height, None)
}

/// Fill-row first, then fill-col over the pieces left single.
pub fn smart(pieces: &[Piece], usable_width: f64, usable_height: f64, tolerance: f64) -> Vec<Piece> {
    let rows = fill_row(pieces, usable_width, tolerance);
    let (fused, singles): (Vec<Piece>, Vec<Piece>) = rows.into_iter().partition(Piece::is_fused);
    let mut out = fused;
    out.extend(fill_col(&singles, usable_height, tolerance));
    out
}

struct Item {
    source: usize,
    key: f64,
    along: f64,
}

fn fuse(
    pieces: &[Piece],
    axis: FusedAxis,
    tolerance: f64,
    bound: f64,
    max_group_size: Option<usize>,
) -> Vec<Piece> {
    let limit = max_group_size.unwrap_or(usize::MAX);
    let mut out = Vec::with_capacity(pieces.len());

    // Composites pass through; only plain pieces are grouped.
    let mut items: Vec<Item> = Vec::new();
    for (source, piece) in pieces.iter().enumerate() {
        if piece.is_fused() {
            out.push(piece.clone());
            continue;
        }
        let long = piece.longest_side();
        let short = piece.width().min(piece.height());
        let (key, along) = match axis {
            FusedAxis::Width => (short, long),
            FusedAxis::Height => (long, short),
        };
        items.push(Item { source, key, along });
    }
    items.sort_by(|a, b| a.key.total_cmp(&b.key));

    let mut used = vec![false; items.len()];
    for i in 0..items.len() {
        if used[i] {
            continue;
        }
        let base = items[i].key;
        let mut compatible: Vec<usize> = Vec::new();
        for j in i..items.len() {
            if used[j] {
                continue;
            }
            if items[j].key - base > tolerance {
                break;
            }
            compatible.push(j);
        }

        if compatible.len() < 2 {
            used[i] = true;
            out.push(pieces[items[i].source].clone());
            continue;
        }

        compatible.sort_by(|&a, &b| items[b].along.total_cmp(&items[a].along));
        while compatible.len() >= 2 {
            let mut group = Vec::new();
            let mut total = 0.0;
            for &idx in &compatible {
                if group.len() >= limit {
                    break;
                }
                if total + items[idx].along <= bound {
                    group.push(idx);
                    total += items[idx].along;
                }
            }
            if group.len() < 2 {
                break;
            }

            compatible.retain(|idx| !group.contains(idx));
            let units = group
                .iter()
                .map(|&idx| {
                    used[idx] = true;
                    FusedUnit {
                        along: items[idx].along,
                        across: items[idx].key,
                        label: pieces[items[idx].source].label().map(String::from),
                    }
                })
                .collect();
            out.push(Piece::fused(axis, units));
        }

        for idx in compatible {
            used[idx] = true;
            out.push(pieces[items[idx].source].clone());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_units(pieces: &[Piece]) -> usize {
        pieces.iter().map(Piece::count).sum()
    }

    #[test]
    fn test_none_is_identity() {
        let pieces = vec![Piece::new(100.0, 50.0), Piece::new(30.0, 80.0)];
        let out = GroupingParams::none().apply(&pieces, 1000.0, 1000.0);
        assert_eq!(out, pieces);
    }

    #[test]
    fn test_exact_height_groups_equal_heights() {
        let pieces = vec![
            Piece::new(600.0, 400.0),
            Piece::new(400.0, 500.0),
            Piece::new(500.0, 400.0),
        ];
        let out = group_by_height(&pieces, 0.0, 2000.0, None);
        assert_eq!(total_units(&out), 3);

        let composite = out.iter().find(|p| p.is_fused()).unwrap();
        assert_eq!((composite.width(), composite.height()), (1100.0, 400.0));
        let fusion = composite.fusion().unwrap();
        assert_eq!(fusion.axis, FusedAxis::Width);
        // Widest unit first.
        assert_eq!(fusion.units[0].along, 600.0);
    }

    #[test]
    fn test_fuzzy_height_uses_tallest_unit() {
        let pieces = vec![Piece::new(600.0, 400.0), Piece::new(500.0, 420.0)];
        assert_eq!(group_by_height(&pieces, 10.0, 2000.0, None).len(), 2);

        let out = group_by_height(&pieces, 30.0, 2000.0, None);
        assert_eq!(out.len(), 1);
        assert_eq!((out[0].width(), out[0].height()), (1100.0, 420.0));
    }

    #[test]
    fn test_width_grouping_stacks() {
        let pieces = vec![Piece::new(300.0, 700.0), Piece::new(700.0, 200.0)];
        let out = group_by_width(&pieces, 0.0, 1000.0, None);
        assert_eq!(out.len(), 1);
        assert_eq!((out[0].width(), out[0].height()), (700.0, 500.0));
        assert_eq!(out[0].fusion().unwrap().axis, FusedAxis::Height);
    }

    #[test]
    fn test_max_group_size() {
        let pieces = vec![Piece::new(100.0, 50.0); 5];
        let out = group_by_height(&pieces, 0.0, 10_000.0, Some(2));
        let counts: Vec<usize> = out.iter().map(Piece::count).collect();
        assert_eq!(counts, vec![2, 2, 1]);
    }

    #[test]
    fn test_homogeneous_list_forms_one_composite() {
        let pieces = vec![Piece::new(200.0, 100.0); 5];
        let out = fill_row(&pieces, 1000.0, 0.0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].count(), 5);
        assert_eq!(out[0].width(), 1000.0);
    }

    #[test]
    fn test_homogeneous_list_packs_full_rows() {
        let pieces = vec![Piece::new(300.0, 100.0); 7];
        let out = fill_row(&pieces, 1000.0, 0.0);
        let counts: Vec<usize> = out.iter().map(Piece::count).collect();
        assert_eq!(counts, vec![3, 3, 1]);
    }

    #[test]
    fn test_singles_keep_orientation_and_labels() {
        let pieces = vec![
            Piece::new(100.0, 900.0).with_label("tall"),
            Piece::new(500.0, 50.0).with_label("a"),
            Piece::new(400.0, 50.0).with_label("b"),
        ];
        let out = fill_row(&pieces, 1000.0, 0.0);
        assert!(out.contains(&Piece::new(100.0, 900.0).with_label("tall")));
        let composite = out.iter().find(|p| p.is_fused()).unwrap();
        let labels: Vec<_> = composite
            .fusion()
            .unwrap()
            .units
            .iter()
            .map(|u| u.label.as_deref())
            .collect();
        assert_eq!(labels, vec![Some("a"), Some("b")]);
    }

    #[test]
    fn test_smart_groups_leftovers_by_column() {
        let pieces = vec![
            Piece::new(400.0, 100.0),
            Piece::new(400.0, 100.0),
            Piece::new(900.0, 300.0),
            Piece::new(900.0, 200.0),
        ];
        let out = smart(&pieces, 1000.0, 1000.0, 0.0);
        assert_eq!(total_units(&out), 4);
        assert_eq!(out.iter().filter(|p| p.is_fused()).count(), 2);
        assert!(out
            .iter()
            .any(|p| p.fusion().map(|f| f.axis) == Some(FusedAxis::Height)));
    }

    #[test]
    fn test_search_space_size() {
        let space = search_space(&Config::default());
        // none, 3 exact-height, 6 fuzzy-height, 3 exact-width, 6 fuzzy-width, 2 smart
        assert_eq!(space.len(), 21);
        assert_eq!(space[0], GroupingParams::none());
    }

    #[test]
    fn test_search_space_variants_are_distinct() {
        let pieces = vec![
            Piece::new(600.0, 400.0),
            Piece::new(620.0, 410.0),
            Piece::new(300.0, 410.0),
            Piece::new(900.0, 120.0),
            Piece::new(880.0, 125.0),
            Piece::new(250.0, 250.0),
        ];
        let config = Config::default().with_fuzzy_tolerances(vec![0.0, 10.0, 30.0]);
        let space = search_space(&config);

        for params in &space {
            assert!(GroupingStrategy::SEARCHED.contains(&params.strategy));
        }
        assert!(space
            .iter()
            .filter(|p| p.strategy.uses_tolerance())
            .all(|p| p.tolerance > 0.0));
        for (i, a) in space.iter().enumerate() {
            assert!(!space[i + 1..].contains(a), "{:?} listed twice", a);
        }

        // The strategies left out coincide with unbounded bucket grouping.
        let (w, h) = (2000.0, 1000.0);
        for tol in [0.0, 30.0] {
            assert_eq!(
                GroupingParams::new(GroupingStrategy::FillRowFuzzy)
                    .with_tolerance(tol)
                    .apply(&pieces, w, h),
                GroupingParams::new(GroupingStrategy::FuzzyHeight)
                    .with_tolerance(tol)
                    .apply(&pieces, w, h)
            );
            assert_eq!(
                GroupingParams::new(GroupingStrategy::FillCol)
                    .with_tolerance(tol)
                    .apply(&pieces, w, h),
                GroupingParams::new(GroupingStrategy::FuzzyWidth)
                    .with_tolerance(tol)
                    .apply(&pieces, w, h)
            );
        }
        assert_eq!(
            GroupingParams::new(GroupingStrategy::FillRow).apply(&pieces, w, h),
            GroupingParams::new(GroupingStrategy::ExactHeight).apply(&pieces, w, h)
        );
    }
}
