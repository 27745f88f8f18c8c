//! Constants for board geometry, AI parameters, timing and tones.
//!
//! Everything the hardware fixes at compile time lives here.
//! Runtime-tunable values (search depth, pacing) start from these defaults
//! and can be overridden through [`crate::game::GameConfig`].

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of columns on the LED matrix.
pub const MAT_WIDTH: usize = 8;

/// Number of rows on the LED matrix.
pub const MAT_HEIGHT: usize = 8;

/// Total number of cells.
pub const CELLS: usize = MAT_WIDTH * MAT_HEIGHT;

/// Ray offsets `(dx, dy)` for the eight flip directions.
/// Bit `i` of a flip mask refers to `DXDY[i]`.
/// Order: Up, Down, Left, Right, UpLeft, DownLeft, UpRight, DownRight
/// (y grows upwards on the matrix).
pub const DXDY: [(isize, isize); 8] = [
    (0, 1),
    (0, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (-1, -1),
    (1, 1),
    (1, -1),
];

/// The four corner cells, treated as permanently stable.
pub const CORNERS: [(usize, usize); 4] = [
    (0, 0),
    (MAT_WIDTH - 1, 0),
    (0, MAT_HEIGHT - 1),
    (MAT_WIDTH - 1, MAT_HEIGHT - 1),
];

// =============================================================================
// AI Parameters
// =============================================================================

/// Default look-ahead in plies.
pub const AI_DEPTH: usize = 3;

/// Size of the search frame arena. Requested depths are clamped to this.
pub const MAX_SEARCH_DEPTH: usize = 8;

/// Upper bound on legal moves in one position.
pub const MAX_MOVES: usize = CELLS;

/// Stand-in for infinity in alpha-beta bounds.
pub const INF: i32 = 100_000;

/// Weight of the positional table term.
pub const POS_WEIGHT: i32 = 10;

/// Weight of the mobility differential.
pub const MOBILITY_WEIGHT: i32 = 2;

/// Weight of the corner (stable stone) differential.
pub const STABLE_WEIGHT: i32 = 50;

/// Positional value of each cell, indexed `[y][x]`.
/// Corners are prized, the cells touching them are dangerous.
pub const POSITION_WEIGHTS: [[i32; MAT_WIDTH]; MAT_HEIGHT] = [
    [120, -40, 20, 10, 10, 20, -40, 120],
    [-40, -50, -5, -5, -5, -5, -50, -40],
    [20, -5, 15, 10, 10, 15, -5, 20],
    [10, -5, 10, 5, 5, 10, -5, 10],
    [10, -5, 10, 5, 5, 10, -5, 10],
    [20, -5, 15, 10, 10, 15, -5, 20],
    [-40, -50, -5, -5, -5, -5, -50, -40],
    [120, -40, 20, 10, 10, 20, -40, 120],
];

// =============================================================================
// Timing (milliseconds)
// =============================================================================

/// Minimum spacing between two accepted button edges.
pub const MONITOR_CHATTERING_PERIOD_MS: u32 = 300;

/// Cursor blink period. Compared against the 2 ms refresh tick, so one
/// phase lasts `CURSOR_BLINK_PERIOD_MS / 2` refreshes.
pub const CURSOR_BLINK_PERIOD_MS: u32 = 150;

/// Delay between two animated AI cursor steps.
pub const AI_MOVE_PERIOD_MS: u32 = 300;

/// Delay between two stones while lining up the result.
pub const LINE_UP_RESULT_PERIOD_MS: u32 = 200;

/// How long the winner stays on screen before the confirm prompt.
pub const SHOW_RESULT_WAIT_MS: u32 = 3000;

/// Reset button polling period.
pub const RESET_POLL_PERIOD_MS: u32 = 1000;

/// The reset fires once the button has been seen held on more polls than this.
pub const RESET_HOLD_POLLS: u32 = 2;

// =============================================================================
// Input
// =============================================================================

/// Quadrature counts per detent of the rotary encoder.
pub const PULSE_DIFF_PER_CLICK: i16 = 4;

// =============================================================================
// Tones (Hz)
// =============================================================================

pub const DO0: u32 = 131;
pub const DO1: u32 = 262;
pub const RE1: u32 = 294;
pub const MI1: u32 = 330;
pub const FA1: u32 = 349;
pub const SO1: u32 = 392;
pub const RA1: u32 = 440;
pub const SI1: u32 = 494;
pub const DO2: u32 = 523;
pub const DO3: u32 = 1047;

/// C major scale, one note per column/row index.
pub const C_SCALE: [u32; MAT_HEIGHT] = [DO1, RE1, MI1, FA1, SO1, RA1, SI1, DO2];
