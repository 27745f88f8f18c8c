//! matrix-othello: Othello for an 8x8 two-color LED matrix console.
//!
//! The crate holds the game core of a small embedded console (rules,
//! evaluator, a non-recursive alpha-beta AI and the top-level state
//! machine) behind peripheral traits, plus terminal stand-ins for those
//! peripherals so the whole thing runs on a desktop.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, AI parameters, timing and tones
//! - [`board`] - Cell colors and the 8x8 grid
//! - [`rules`] - Legality, flip masks and the game-over test
//! - [`eval`] - Static evaluation for the AI
//! - [`search`] - Depth-bounded alpha-beta over a fixed frame arena
//! - [`cursor`] - The selection point and its wrap-around stepping
//! - [`hal`] - Peripheral traits and rotary quantization
//! - [`shared`] - State shared with the interrupt handlers
//! - [`game`] - The top-level state machine
//! - [`host`] - Terminal peripherals and the timer thread
//!
//! ## Example
//!
//! ```
//! use matrix_othello::board::{Board, Color};
//! use matrix_othello::rules::{count_placeable, play};
//! use matrix_othello::search::Searcher;
//!
//! let mut board = Board::initial();
//! assert_eq!(count_placeable(&board, Color::Red), 4);
//!
//! // Let the AI pick a reply for red
//! let mut searcher = Searcher::new();
//! let mut rng = fastrand::Rng::with_seed(1);
//! let m = searcher.best_move(&board, Color::Red, 3, &mut rng).unwrap();
//! play(&mut board, m.x, m.y, Color::Red);
//! assert_eq!(board.cells().filter(|&(_, _, c)| c == Color::Red).count(), 4);
//! ```

pub mod board;
pub mod constants;
pub mod cursor;
pub mod eval;
pub mod game;
pub mod hal;
pub mod host;
pub mod rules;
pub mod search;
pub mod shared;
