//! Candidate scoring and residual dominance.

use crate::piece::{Orientation, Piece};

/// Score of a placement that fills the free space exactly on both axes.
pub const PERFECT_FIT: f64 = f64::NEG_INFINITY;

/// Base score of placements that fill the free space exactly on one axis.
/// Any such candidate ranks ahead of every inexact one.
pub const AXIS_FIT: f64 = -1.0e6;

const IMBALANCE_WEIGHT: f64 = 50.0;
const DEAD_WASTE_WEIGHT: f64 = 2.0;

/// Scores placing a `piece_w × piece_h` rectangle into the top-left corner
/// of a `space_w × space_h` free rectangle. Lower is better.
///
/// The base is the wasted area of the two leftovers: the right remainder
/// (`waste_w × space_h`) and the remainder under the piece
/// (`piece_w × waste_h`). On top of that:
///
/// - unbalanced leftovers are penalized by the ratio of the larger to the
///   smaller one,
/// - a leftover that no piece in `upcoming` fits is counted twice more,
/// - a candidate that is exact on one axis scores [`AXIS_FIT`] plus the
///   leftover length on the other axis; exact on both scores
///   [`PERFECT_FIT`].
pub fn score_fit(space_w: f64, space_h: f64, piece_w: f64, piece_h: f64, upcoming: &[Piece]) -> f64 {
    let waste_w = space_w - piece_w;
    let waste_h = space_h - piece_h;

    match (waste_w == 0.0, waste_h == 0.0) {
        (true, true) => return PERFECT_FIT,
        (true, false) => return AXIS_FIT + waste_h,
        (false, true) => return AXIS_FIT + waste_w,
        (false, false) => {}
    }

    let right = waste_w * space_h;
    let below = piece_w * waste_h;
    let mut score = right + below;

    let (larger, smaller) = (right.max(below), right.min(below));
    if smaller > 0.0 {
        score += larger / smaller * IMBALANCE_WEIGHT;
    }

    let mut right_usable = false;
    let mut below_usable = false;
    for o in upcoming.iter().flat_map(Piece::orientations) {
        right_usable |= o.width <= waste_w && o.height <= space_h;
        below_usable |= o.width <= piece_w && o.height <= waste_h;
        if right_usable && below_usable {
            break;
        }
    }
    if !right_usable {
        score += right * DEAD_WASTE_WEIGHT;
    }
    if !below_usable {
        score += below * DEAD_WASTE_WEIGHT;
    }

    score
}

/// Returns true if some piece of `upcoming` fits a `residual_w ×
/// residual_h` leftover in an orientation that `accept` allows.
///
/// When this is false the leftover is dead space and the engine consumes it
/// by extending the cut that created it.
pub fn residual_usable<F>(residual_w: f64, residual_h: f64, upcoming: &[Piece], accept: F) -> bool
where
    F: Fn(&Orientation) -> bool,
{
    if residual_w <= 0.0 || residual_h <= 0.0 {
        return false;
    }
    upcoming
        .iter()
        .flat_map(Piece::orientations)
        .any(|o| o.width <= residual_w && o.height <= residual_h && accept(&o))
}

/// A bounded lookahead window of at most `size` queue pieces from `start`.
pub fn window(queue: &[Piece], start: usize, size: usize) -> &[Piece] {
    let start = start.min(queue.len());
    let end = start.saturating_add(size).min(queue.len());
    &queue[start..end]
}
