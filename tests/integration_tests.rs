//! Integration tests for matrix-othello
//!
//! Whole-game properties of the rules, evaluator and search, checked over
//! positions reached by actual play.

use matrix_othello::board::{Board, Color};
use matrix_othello::constants::{CELLS, MAT_HEIGHT, MAT_WIDTH};
use matrix_othello::eval::evaluate;
use matrix_othello::rules::{
    Direction, apply_flip, check_placement, count_placeable, count_stones, flip_directions,
    is_game_over, is_placeable, play, PlacementError,
};
use matrix_othello::search::{MoveList, Searcher};

// =============================================================================
// Helpers
// =============================================================================

fn swap_colors(board: &Board) -> Board {
    let mut out = Board::new();
    for (x, y, c) in board.cells() {
        if c.is_stone() {
            out.write(x, y, c.opponent());
        }
    }
    out
}

/// Play a game out with a seeded random policy, returning every position
/// seen and the side to move in each.
fn random_game(seed: u64) -> Vec<(Board, Color)> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut board = Board::initial();
    let mut color = Color::Red;
    let mut seen = vec![(board, color)];
    loop {
        if is_game_over(
            count_placeable(&board, Color::Red),
            count_placeable(&board, Color::Green),
        ) {
            return seen;
        }
        let mut moves = MoveList::new();
        moves.generate(&board, color);
        if !moves.is_empty() {
            let m = moves.get(rng.usize(..moves.len()));
            play(&mut board, m.x, m.y, color);
        }
        color = color.opponent();
        seen.push((board, color));
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_opening_has_four_moves() {
    let b = Board::initial();
    assert_eq!(count_placeable(&b, Color::Red), 4);
    assert_eq!(count_placeable(&b, Color::Green), 4);
    let mut moves = MoveList::new();
    moves.generate(&b, Color::Red);
    let cells: Vec<(usize, usize)> = moves.as_slice().iter().map(|m| (m.x, m.y)).collect();
    assert_eq!(cells, vec![(4, 2), (5, 3), (2, 4), (3, 5)]);
}

#[test]
fn test_opening_capture_flips_one() {
    // (2,3) sits next to red's own (3,3), so the single-flip opening move
    // on that side is (2,4), trapping (3,4) against (4,4).
    let mut b = Board::initial();
    assert_eq!(
        check_placement(&b, 2, 3, Color::Red),
        Err(PlacementError::NoCapture)
    );
    let mask = flip_directions(&b, 2, 4, Color::Red);
    assert_eq!(mask.bits(), 1 << Direction::Right as u8);
    assert_eq!(play(&mut b, 2, 4, Color::Red), 1);
    assert_eq!(b.read(3, 4), Color::Red);
    assert_eq!(count_stones(&b, Color::Red), 4);
    assert_eq!(count_stones(&b, Color::Green), 1);
}

#[test]
fn test_full_board_is_game_over() {
    for pattern in 0..3u64 {
        let mut rng = fastrand::Rng::with_seed(pattern);
        let mut b = Board::new();
        for y in 0..MAT_HEIGHT {
            for x in 0..MAT_WIDTH {
                b.write(x, y, if rng.bool() { Color::Red } else { Color::Green });
            }
        }
        assert_eq!(b.empties(), 0);
        let (r, g) = (count_placeable(&b, Color::Red), count_placeable(&b, Color::Green));
        assert_eq!((r, g), (0, 0));
        assert!(is_game_over(r, g));
    }
}

#[test]
fn test_single_move_search_returns_static_value() {
    let b: Board = "
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . G R
    "
    .parse()
    .unwrap();
    assert_eq!(count_placeable(&b, Color::Red), 1);

    let mut after = b;
    play(&mut after, 5, 7, Color::Red);

    let mut s = Searcher::new();
    let mut rng = fastrand::Rng::with_seed(3);
    let m = s.best_move(&b, Color::Red, 1, &mut rng).unwrap();
    assert_eq!((m.x, m.y), (5, 7));
    assert_eq!(m.score, evaluate(&after, Color::Red));
}

// =============================================================================
// Properties over played games
// =============================================================================

#[test]
fn test_stone_conservation() {
    for seed in 0..20 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut b = Board::initial();
        let mut color = Color::Red;
        for _ in 0..CELLS {
            let mut moves = MoveList::new();
            moves.generate(&b, color);
            if moves.is_empty() {
                color = color.opponent();
                continue;
            }
            let m = moves.get(rng.usize(..moves.len()));
            let own = count_stones(&b, color);
            let other = count_stones(&b, color.opponent());
            let flipped = play(&mut b, m.x, m.y, color);
            assert!(flipped >= 1);
            assert_eq!(count_stones(&b, color), own + 1 + flipped);
            assert_eq!(count_stones(&b, color.opponent()), other - flipped);
            color = color.opponent();
        }
    }
}

#[test]
fn test_legality_matches_mask_and_is_color_symmetric() {
    for seed in 0..10 {
        for (b, _) in random_game(seed).iter().step_by(7) {
            let swapped = swap_colors(b);
            for (x, y, c) in b.cells() {
                for color in [Color::Red, Color::Green] {
                    let legal = is_placeable(b, x, y, color);
                    let by_mask =
                        c == Color::Empty && !flip_directions(b, x, y, color).is_empty();
                    assert_eq!(legal, by_mask);
                    assert_eq!(legal, is_placeable(&swapped, x, y, color.opponent()));
                    assert_eq!(legal, check_placement(b, x, y, color).is_ok());
                }
            }
        }
    }
}

#[test]
fn test_flips_stay_on_masked_rays() {
    for seed in 0..10 {
        for (b, color) in random_game(seed) {
            let mut moves = MoveList::new();
            moves.generate(&b, color);
            for m in moves.as_slice() {
                let mask = flip_directions(&b, m.x, m.y, color);
                let mut after = b;
                after.write(m.x, m.y, color);
                apply_flip(mask, &mut after, m.x, m.y, color);

                for (x, y, c) in after.cells() {
                    let before = b.read(x, y);
                    if (x, y) == (m.x, m.y) || c == before {
                        continue;
                    }
                    // Only opponent stones change, and only toward `color`.
                    assert_eq!(before, color.opponent());
                    assert_eq!(c, color);
                    let on_ray = Direction::ALL.iter().any(|&d| {
                        let (dx, dy) = d.delta();
                        mask.contains(d)
                            && (1..8).any(|k| {
                                m.x as isize + dx * k == x as isize
                                    && m.y as isize + dy * k == y as isize
                            })
                    });
                    assert!(on_ray, "({x},{y}) flipped off every masked ray");
                }
            }
        }
    }
}

#[test]
fn test_games_terminate() {
    for seed in 0..20 {
        let game = random_game(seed);
        // Each position after the first is one move or one pass, and two
        // passes in a row end the game.
        assert!(game.len() <= 2 * CELLS);
        let (last, _) = game.last().unwrap();
        assert!(is_game_over(
            count_placeable(last, Color::Red),
            count_placeable(last, Color::Green)
        ));
        assert!(count_stones(last, Color::Red) + count_stones(last, Color::Green) <= CELLS);
    }
}

#[test]
fn test_scans_do_not_modify_board() {
    let mut s = Searcher::new();
    for seed in 0..5 {
        for &(b, color) in random_game(seed).iter().step_by(9) {
            let copy = b;
            count_placeable(&b, color);
            evaluate(&b, color);
            flip_directions(&b, 3, 3, color);
            s.search(&b, color, 3);
            assert_eq!(b, copy);
        }
    }
}

#[test]
fn test_ai_plays_a_full_game() {
    let mut s = Searcher::new();
    let mut rng = fastrand::Rng::with_seed(11);
    let mut b = Board::initial();
    let mut color = Color::Red;
    let mut plies = 0;
    while !is_game_over(
        count_placeable(&b, Color::Red),
        count_placeable(&b, Color::Green),
    ) {
        if let Some(m) = s.best_move(&b, color, 3, &mut rng) {
            assert!(is_placeable(&b, m.x, m.y, color));
            play(&mut b, m.x, m.y, color);
        }
        color = color.opponent();
        plies += 1;
        assert!(plies <= 2 * CELLS);
    }
    assert!(count_stones(&b, Color::Red) + count_stones(&b, Color::Green) >= 5);
}

#[test]
fn test_one_side_to_move_is_not_game_over() {
    let b: Board = "
        R G . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
    "
    .parse()
    .unwrap();
    let (r, g) = (count_placeable(&b, Color::Red), count_placeable(&b, Color::Green));
    assert_eq!((r, g), (1, 0));
    assert!(!is_game_over(r, g));
    assert!(!is_game_over(0, 1));
}
