//! The 8×8 board model.
//!
//! Pure data: cell colors plus read/write/clear primitives. All scans are
//! row-major (y outer, x inner). The unchecked accessors index directly and
//! panic on out-of-range coordinates; callers validate upstream.

use std::fmt;
use std::str::FromStr;

use crate::constants::{MAT_HEIGHT, MAT_WIDTH};

/// Color of a cell. `Empty` doubles as the hidden cursor color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    #[default]
    Empty,
    /// First player.
    Red,
    /// Second player.
    Green,
}

impl Color {
    /// The other stone color. `Empty` has no opponent and maps to itself.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Red => Color::Green,
            Color::Green => Color::Red,
            Color::Empty => Color::Empty,
        }
    }

    #[inline]
    pub fn is_stone(self) -> bool {
        self != Color::Empty
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Green => "GREEN",
            Color::Empty => "NONE",
        }
    }

    pub(crate) fn to_char(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Empty => '.',
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Color::Empty => 0,
            Color::Red => 1,
            Color::Green => 2,
        }
    }

    pub(crate) fn from_u8(v: u8) -> Color {
        match v {
            1 => Color::Red,
            2 => Color::Green,
            _ => Color::Empty,
        }
    }
}

/// An 8×8 grid of cells, indexed `[y][x]`.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct Board {
    cells: [[Color; MAT_WIDTH]; MAT_HEIGHT],
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// The opening position: two stones of each color crossed in the center.
    pub fn initial() -> Self {
        let mut b = Self::new();
        b.write(3, 3, Color::Red);
        b.write(4, 4, Color::Red);
        b.write(3, 4, Color::Green);
        b.write(4, 3, Color::Green);
        b
    }

    #[inline]
    pub fn read(&self, x: usize, y: usize) -> Color {
        self.cells[y][x]
    }

    #[inline]
    pub fn write(&mut self, x: usize, y: usize, color: Color) {
        self.cells[y][x] = color;
    }

    #[inline]
    pub fn clear(&mut self, x: usize, y: usize) {
        self.cells[y][x] = Color::Empty;
    }

    pub fn clear_all(&mut self) {
        self.cells = [[Color::Empty; MAT_WIDTH]; MAT_HEIGHT];
    }

    /// Checked read. Returns `None` off the board.
    pub fn get(&self, x: isize, y: isize) -> Option<Color> {
        if !in_bounds(x, y) {
            return None;
        }
        Some(self.cells[y as usize][x as usize])
    }

    /// All cells as `(x, y, color)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Color)> + '_ {
        (0..MAT_HEIGHT).flat_map(move |y| (0..MAT_WIDTH).map(move |x| (x, y, self.cells[y][x])))
    }

    /// Number of empty cells.
    pub fn empties(&self) -> usize {
        self.cells().filter(|&(_, _, c)| c == Color::Empty).count()
    }
}

/// True if `(x, y)` lies on the board.
#[inline]
pub fn in_bounds(x: isize, y: isize) -> bool {
    x >= 0 && y >= 0 && (x as usize) < MAT_WIDTH && (y as usize) < MAT_HEIGHT
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for (x, c) in row.iter().enumerate() {
                if x > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", c.to_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Error from parsing the textual board format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardParseError {
    /// Wrong number of rows.
    Rows(usize),
    /// Row `y` does not hold exactly eight cells.
    Columns { y: usize, found: usize },
    /// Unknown cell character.
    Cell { x: usize, y: usize, ch: char },
}

impl fmt::Display for BoardParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardParseError::Rows(n) => write!(f, "expected {MAT_HEIGHT} rows, found {n}"),
            BoardParseError::Columns { y, found } => {
                write!(f, "row {y}: expected {MAT_WIDTH} cells, found {found}")
            }
            BoardParseError::Cell { x, y, ch } => write!(f, "unknown cell '{ch}' at ({x},{y})"),
        }
    }
}

impl std::error::Error for BoardParseError {}

/// Parses eight rows of `R`, `G` or `.` (whitespace between cells is ignored).
/// The first row is `y = 0`, the same order `Display` prints.
impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if rows.len() != MAT_HEIGHT {
            return Err(BoardParseError::Rows(rows.len()));
        }
        let mut board = Board::new();
        for (y, row) in rows.iter().enumerate() {
            let cells: Vec<char> = row.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != MAT_WIDTH {
                return Err(BoardParseError::Columns {
                    y,
                    found: cells.len(),
                });
            }
            for (x, &ch) in cells.iter().enumerate() {
                let color = match ch {
                    'R' | 'r' => Color::Red,
                    'G' | 'g' => Color::Green,
                    '.' => Color::Empty,
                    _ => return Err(BoardParseError::Cell { x, y, ch }),
                };
                board.write(x, y, color);
            }
        }
        Ok(board)
    }
}
