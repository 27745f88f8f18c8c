//! Move legality and stone flipping.
//!
//! Placement is a two-phase commit: [`flip_directions`] casts the eight rays
//! from a cell and records which of them trap opponent stones, then
//! [`apply_flip`] walks exactly those rays converting stones. The first
//! phase never mutates the board.

use std::fmt;

use crate::board::{Board, Color, in_bounds};
use crate::constants::{DXDY, MAT_HEIGHT, MAT_WIDTH};

/// One of the eight flip rays. The discriminant is the bit index in a
/// [`FlipMask`] and the index into [`DXDY`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    UpLeft = 4,
    DownLeft = 5,
    UpRight = 6,
    DownRight = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::DownLeft,
        Direction::UpRight,
        Direction::DownRight,
    ];

    #[inline]
    pub fn delta(self) -> (isize, isize) {
        DXDY[self as usize]
    }
}

/// Bit set of capturable directions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FlipMask(u8);

impl FlipMask {
    pub const EMPTY: FlipMask = FlipMask(0);

    pub fn from_bits(bits: u8) -> Self {
        FlipMask(bits)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn contains(self, dir: Direction) -> bool {
        self.0 & (1 << dir as u8) != 0
    }

    #[inline]
    pub fn insert(&mut self, dir: Direction) {
        self.0 |= 1 << dir as u8;
    }
}

/// Why a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// Coordinates outside the matrix
    OffBoard,
    /// Cell is not empty
    Occupied,
    /// No ray traps an opponent stone
    NoCapture,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::OffBoard => write!(f, "illegal placement: off the board"),
            PlacementError::Occupied => write!(f, "illegal placement: cell not empty"),
            PlacementError::NoCapture => write!(f, "illegal placement: nothing to flip"),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Length of the opponent run along `dir` if it is closed by a `color`
/// stone, or `None` if the ray runs off the board, hits an empty cell, or
/// traps nothing.
fn capture_run(board: &Board, x: usize, y: usize, color: Color, dir: Direction) -> Option<usize> {
    let (dx, dy) = dir.delta();
    let (mut cx, mut cy) = (x as isize, y as isize);
    let mut run = 0;
    loop {
        cx += dx;
        cy += dy;
        if !in_bounds(cx, cy) {
            return None;
        }
        let c = board.read(cx as usize, cy as usize);
        if c == Color::Empty {
            return None;
        }
        if c == color {
            return (run > 0).then_some(run);
        }
        run += 1;
    }
}

/// Which of the eight rays from `(x, y)` would flip stones for `color`.
///
/// A ray counts only if at least one opponent stone is followed by a
/// `color` stone before an empty cell or the board edge. The target cell
/// itself is not inspected.
pub fn flip_directions(board: &Board, x: usize, y: usize, color: Color) -> FlipMask {
    let mut mask = FlipMask::EMPTY;
    for dir in Direction::ALL {
        if capture_run(board, x, y, color, dir).is_some() {
            mask.insert(dir);
        }
    }
    mask
}

/// True iff the cell is empty and at least one ray captures.
pub fn is_placeable(board: &Board, x: usize, y: usize, color: Color) -> bool {
    board.read(x, y) == Color::Empty && !flip_directions(board, x, y, color).is_empty()
}

/// Checked placement test, for callers that want the reason.
pub fn check_placement(board: &Board, x: usize, y: usize, color: Color) -> Result<FlipMask, PlacementError> {
    if x >= MAT_WIDTH || y >= MAT_HEIGHT {
        return Err(PlacementError::OffBoard);
    }
    if board.read(x, y) != Color::Empty {
        return Err(PlacementError::Occupied);
    }
    let mask = flip_directions(board, x, y, color);
    if mask.is_empty() {
        return Err(PlacementError::NoCapture);
    }
    Ok(mask)
}

/// Flip opponent stones along every ray set in `mask`, stopping at the
/// first `color` stone (left untouched). Returns the number flipped.
///
/// The mask must come from [`flip_directions`] on the same board; the walk
/// does no bounds checks of its own.
pub fn apply_flip(mask: FlipMask, board: &mut Board, x: usize, y: usize, color: Color) -> usize {
    let mut flipped = 0;
    for dir in Direction::ALL {
        if !mask.contains(dir) {
            continue;
        }
        let (dx, dy) = dir.delta();
        let (mut cx, mut cy) = (x as isize, y as isize);
        loop {
            cx += dx;
            cy += dy;
            let (ux, uy) = (cx as usize, cy as usize);
            if board.read(ux, uy) == color {
                break;
            }
            board.write(ux, uy, color);
            flipped += 1;
        }
    }
    flipped
}

/// Place a stone and flip, without legality checks beyond the mask.
/// Returns the number of stones flipped.
pub fn play(board: &mut Board, x: usize, y: usize, color: Color) -> usize {
    let mask = flip_directions(board, x, y, color);
    board.write(x, y, color);
    apply_flip(mask, board, x, y, color)
}

/// Number of cells where `color` may legally play.
pub fn count_placeable(board: &Board, color: Color) -> usize {
    board
        .cells()
        .filter(|&(x, y, c)| c == Color::Empty && is_placeable(board, x, y, color))
        .count()
}

/// Number of `color` stones on the board.
pub fn count_stones(board: &Board, color: Color) -> usize {
    board.cells().filter(|&(_, _, c)| c == color).count()
}

/// The game ends when neither side can move.
#[inline]
pub fn is_game_over(placeable_a: usize, placeable_b: usize) -> bool {
    placeable_a == 0 && placeable_b == 0
}
