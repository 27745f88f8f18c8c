//! Static position evaluation.
//!
//! Scores a board from one color's point of view:
//!
//! ```text
//! position * POS_WEIGHT + mobility * MOBILITY_WEIGHT + corners * STABLE_WEIGHT
//! ```
//!
//! Only the four literal corners count as stable stones.

use crate::board::{Board, Color};
use crate::constants::{CORNERS, MOBILITY_WEIGHT, POSITION_WEIGHTS, POS_WEIGHT, STABLE_WEIGHT};
use crate::rules::count_placeable;

/// Weighted-table sum of `color`'s stones minus the opponent's.
pub fn position_score(board: &Board, color: Color) -> i32 {
    let opp = color.opponent();
    board.cells().fold(0, |acc, (x, y, c)| {
        if c == color {
            acc + POSITION_WEIGHTS[y][x]
        } else if c == opp {
            acc - POSITION_WEIGHTS[y][x]
        } else {
            acc
        }
    })
}

/// Legal move count of `color` minus the opponent's.
pub fn mobility_score(board: &Board, color: Color) -> i32 {
    count_placeable(board, color) as i32 - count_placeable(board, color.opponent()) as i32
}

/// Corners held by `color`.
pub fn count_corners(board: &Board, color: Color) -> i32 {
    CORNERS
        .iter()
        .filter(|&&(x, y)| board.read(x, y) == color)
        .count() as i32
}

/// Raw disc difference. Not part of [`evaluate`]; the simulator reports it
/// as the winning margin.
pub fn stone_differential(board: &Board, color: Color) -> i32 {
    let opp = color.opponent();
    board.cells().fold(0, |acc, (_, _, c)| {
        if c == color {
            acc + 1
        } else if c == opp {
            acc - 1
        } else {
            acc
        }
    })
}

/// Full static evaluation from `perspective`'s point of view.
pub fn evaluate(board: &Board, perspective: Color) -> i32 {
    let stable = count_corners(board, perspective) - count_corners(board, perspective.opponent());
    position_score(board, perspective) * POS_WEIGHT
        + mobility_score(board, perspective) * MOBILITY_WEIGHT
        + stable * STABLE_WEIGHT
}
