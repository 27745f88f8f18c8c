//! The on-screen selection point.
//!
//! The cursor walks the board as one long ring: stepping past the end of a
//! row lands on the adjacent row (or column, for vertical steps), and
//! running off the last row or column wraps to the first.

use crate::board::Color;
use crate::constants::{MAT_HEIGHT, MAT_WIDTH};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Left,
    Right,
    Up,
    Down,
}

/// How a rotary click maps onto cursor steps.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AxisMode {
    /// Left/Right along rows
    #[default]
    RowMajor,
    /// Down/Up along columns
    ColumnMajor,
}

impl AxisMode {
    /// Step for a counter-clockwise click.
    pub fn back(self) -> Step {
        match self {
            AxisMode::RowMajor => Step::Left,
            AxisMode::ColumnMajor => Step::Down,
        }
    }

    /// Step for a clockwise click.
    pub fn forward(self) -> Step {
        match self {
            AxisMode::RowMajor => Step::Right,
            AxisMode::ColumnMajor => Step::Up,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
    /// Target of an animated AI move
    pub dest_x: usize,
    pub dest_y: usize,
    /// Color of the side to move, or `Empty` when hidden
    pub color: Color,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    /// Start position: (5,3), red to move.
    pub fn new() -> Self {
        Self {
            x: 5,
            y: 3,
            dest_x: 5,
            dest_y: 3,
            color: Color::Red,
        }
    }

    pub fn step(&mut self, step: Step) {
        let (w, h) = (MAT_WIDTH, MAT_HEIGHT);
        match step {
            Step::Left => {
                if self.x == 0 {
                    self.x = w - 1;
                    self.y = if self.y == h - 1 { 0 } else { self.y + 1 };
                } else {
                    self.x -= 1;
                }
            }
            Step::Right => {
                if self.x == w - 1 {
                    self.x = 0;
                    self.y = if self.y == 0 { h - 1 } else { self.y - 1 };
                } else {
                    self.x += 1;
                }
            }
            Step::Up => {
                if self.y == h - 1 {
                    self.y = 0;
                    self.x = if self.x == w - 1 { 0 } else { self.x + 1 };
                } else {
                    self.y += 1;
                }
            }
            Step::Down => {
                if self.y == 0 {
                    self.y = h - 1;
                    self.x = if self.x == 0 { w - 1 } else { self.x - 1 };
                } else {
                    self.y -= 1;
                }
            }
        }
    }

    pub fn set_dest(&mut self, x: usize, y: usize) {
        self.dest_x = x;
        self.dest_y = y;
    }

    /// Stay put: destination is the current cell.
    pub fn hold(&mut self) {
        self.set_dest(self.x, self.y);
    }

    #[inline]
    pub fn at_dest(&self) -> bool {
        self.x == self.dest_x && self.y == self.dest_y
    }

    /// Take one step toward the destination, x axis first.
    ///
    /// Returns the coordinate along the moved axis before the step, or
    /// `None` if already there.
    pub fn step_toward_dest(&mut self) -> Option<usize> {
        let (step, from) = if self.x < self.dest_x {
            (Step::Right, self.x)
        } else if self.x > self.dest_x {
            (Step::Left, self.x)
        } else if self.y < self.dest_y {
            (Step::Up, self.y)
        } else if self.y > self.dest_y {
            (Step::Down, self.y)
        } else {
            return None;
        };
        self.step(step);
        Some(from)
    }
}
