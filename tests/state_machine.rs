//! State machine tests against recording peripherals.

use std::sync::Arc;

use matrix_othello::board::{Board, Color};
use matrix_othello::constants::{C_SCALE, DO0, DO2, DO3};
use matrix_othello::cursor::AxisMode;
use matrix_othello::game::{Fault, Game, GameConfig, Mode, Options, State, Timing};
use matrix_othello::hal::{Devices, Entropy, Input, Sound};
use matrix_othello::host::{LcdBuffer, TerminalMatrix};
use matrix_othello::rules::{count_placeable, count_stones, is_game_over};
use matrix_othello::shared::SharedState;

// =============================================================================
// Fakes
// =============================================================================

#[derive(Default)]
struct Beeper {
    tones: Vec<(u32, u32)>,
}

impl Sound for Beeper {
    fn play(&mut self, frequency: u32, duration_ms: u32) {
        self.tones.push((frequency, duration_ms));
    }
}

#[derive(Default)]
struct Knob {
    counter: u16,
    axis: AxisMode,
    clears: usize,
}

impl Knob {
    fn click_left(&mut self) {
        self.counter = self.counter.wrapping_add(4);
    }

    fn click_right(&mut self) {
        self.counter = self.counter.wrapping_sub(4);
    }
}

impl Input for Knob {
    fn read_rotary(&mut self) -> u16 {
        self.counter
    }

    fn clear_rotary(&mut self) {
        self.counter = 0;
        self.clears += 1;
    }

    fn axis_mode(&mut self) -> AxisMode {
        self.axis
    }
}

struct FixedEntropy(u32);

impl Entropy for FixedEntropy {
    fn sample(&mut self) -> u32 {
        self.0
    }
}

type TestGame = Game<TerminalMatrix, Beeper, LcdBuffer, Knob, FixedEntropy>;

fn new_game(options: Options, seed: u32) -> TestGame {
    let shared = Arc::new(SharedState::new());
    let devices = Devices {
        matrix: TerminalMatrix::new(),
        sound: Beeper::default(),
        text: LcdBuffer::new(),
        input: Knob::default(),
        entropy: FixedEntropy(seed),
    };
    let config = GameConfig {
        ai_depth: 2,
        timing: Timing::instant(),
        verbose: false,
    };
    Game::new(shared, devices, config).with_options(options)
}

/// Step until `done` holds, failing after `limit` steps.
fn run_until(game: &mut TestGame, limit: usize, done: impl Fn(&TestGame) -> bool) {
    for _ in 0..limit {
        if done(game) {
            return;
        }
        game.step();
    }
    panic!("gave up in state {:?}", game.state());
}

/// Let the debounce window pass, then press the confirm button.
fn press_select(game: &TestGame) {
    for _ in 0..60 {
        game.shared().on_tick_5ms(false);
    }
    assert!(game.shared().on_select_edge());
}

fn line(game: &TestGame, n: usize) -> String {
    game.devices().text.line(n)
}

fn last_tone(game: &TestGame) -> Option<(u32, u32)> {
    game.devices().sound.tones.last().copied()
}

/// Friend match, red to move with the cursor waiting for input.
fn friend_match() -> TestGame {
    let mut game = new_game(Options::NORMAL, 1);
    run_until(&mut game, 10, |g| g.state() == State::SelectWait);
    press_select(&game);
    run_until(&mut game, 10, |g| g.state() == State::InputWait);
    game
}

// =============================================================================
// Start-up and mode selection
// =============================================================================

#[test]
fn test_boot_shows_mode_select() {
    let mut game = new_game(Options::NORMAL, 1);
    game.step();
    assert_eq!(game.state(), State::InitGame);
    assert_eq!(game.devices().input.clears, 1);
    game.step();
    assert_eq!(game.state(), State::SelectWait);

    assert_eq!(line(&game, 1), "    othello");
    assert_eq!(line(&game, 2), "VS >FRIEND : AI");
    assert_eq!(*game.board(), Board::initial());
    assert_eq!(*game.devices().matrix.shown(), Board::initial());
    assert_eq!(game.player(Color::Red).placeable_count, 4);
    assert_eq!(game.player(Color::Green).placeable_count, 4);
    assert_eq!(game.flags().mode(), Ok(Mode::HumanVsHuman));
    assert!(game.shared().sound_enabled());
    assert_eq!(game.shared().cursor(), (5, 3, Color::Red));
}

#[test]
fn test_rotary_click_toggles_mode() {
    let mut game = new_game(Options::NORMAL, 1);
    run_until(&mut game, 10, |g| g.state() == State::SelectWait);
    game.step();
    assert_eq!(game.state(), State::SelectVs);

    game.devices_mut().input.click_left();
    game.step();
    assert_eq!(game.state(), State::SelectWait);
    assert_eq!(game.flags().mode(), Ok(Mode::HumanVsAi));
    assert_eq!(line(&game, 2), "VS  FRIEND :>AI");
    assert_eq!(last_tone(&game), Some((DO3, 50)));

    // The click is consumed: idling does not toggle again.
    game.step();
    game.step();
    assert_eq!(game.flags().mode(), Ok(Mode::HumanVsAi));

    game.devices_mut().input.click_right();
    run_until(&mut game, 10, |g| g.flags().human_vs_human);
    assert_eq!(line(&game, 2), "VS >FRIEND : AI");
}

#[test]
fn test_confirm_starts_game() {
    let mut game = new_game(Options::NORMAL, 1);
    run_until(&mut game, 10, |g| g.state() == State::SelectWait);
    press_select(&game);
    game.step();
    assert_eq!(game.state(), State::TurnStart);
    assert_eq!(line(&game, 2), "TURN : RED");
    assert_eq!(last_tone(&game), Some((DO2, 200)));
    game.step();
    game.step();
    assert_eq!(game.state(), State::InputWait);
}

// =============================================================================
// Human turns
// =============================================================================

#[test]
fn test_human_move_is_placed_and_flipped() {
    let mut game = friend_match();
    press_select(&game);
    run_until(&mut game, 20, |g| g.state() == State::TurnStart);

    let b = game.board();
    assert_eq!(b.read(5, 3), Color::Red);
    assert_eq!(b.read(4, 3), Color::Red);
    assert_eq!(count_stones(b, Color::Red), 4);
    assert_eq!(count_stones(b, Color::Green), 1);
    assert_eq!(game.devices().matrix.shown(), game.board());
    assert_eq!(game.cursor().color, Color::Green);
    assert_eq!(line(&game, 2), "TURN : GREEN");
    assert!(game.devices().sound.tones.contains(&(DO2, 100)));
    assert_eq!(game.player(Color::Green).placeable_count, 3);
}

#[test]
fn test_illegal_placement_is_refused() {
    let mut game = friend_match();
    game.devices_mut().input.click_right();
    game.step();
    game.step();
    assert_eq!(game.state(), State::InputWait);
    assert_eq!((game.cursor().x, game.cursor().y), (6, 3));
    assert_eq!(last_tone(&game), Some((C_SCALE[6], 100)));

    press_select(&game);
    run_until(&mut game, 10, |g| g.state() == State::PlaceNg);
    game.step();
    assert_eq!(game.state(), State::InputWait);
    assert_eq!(last_tone(&game), Some((DO0, 100)));
    assert_eq!(*game.board(), Board::initial());
    assert_eq!(game.cursor().color, Color::Red);
}

#[test]
fn test_occupied_cell_is_refused() {
    let mut game = friend_match();
    for _ in 0..2 {
        game.devices_mut().input.click_left();
        game.step();
        game.step();
    }
    assert_eq!((game.cursor().x, game.cursor().y), (3, 3));
    press_select(&game);
    run_until(&mut game, 10, |g| g.state() == State::PlaceNg);
    assert_eq!(*game.board(), Board::initial());
}

#[test]
fn test_column_axis_steps_vertically() {
    let mut game = friend_match();
    game.devices_mut().input.axis = AxisMode::ColumnMajor;
    game.devices_mut().input.click_left();
    game.step();
    game.step();
    assert_eq!((game.cursor().x, game.cursor().y), (5, 2));
    assert_eq!(last_tone(&game), Some((C_SCALE[2], 100)));
    game.devices_mut().input.click_right();
    game.step();
    game.step();
    assert_eq!((game.cursor().x, game.cursor().y), (5, 3));
}

#[test]
fn test_muted_game_is_silent() {
    let mut game = friend_match();
    let before = game.devices().sound.tones.len();
    game.shared().set_sound_enabled(false);
    game.devices_mut().input.click_right();
    game.step();
    game.step();
    press_select(&game);
    run_until(&mut game, 10, |g| g.state() == State::PlaceNg);
    game.step();
    assert_eq!(game.state(), State::InputWait);
    assert_eq!(game.devices().sound.tones.len(), before);
}

// =============================================================================
// AI turns
// =============================================================================

#[test]
fn test_ai_answers_human() {
    let mut game = new_game(Options::NORMAL, 7);
    run_until(&mut game, 10, |g| g.state() == State::SelectWait);
    game.step();
    game.devices_mut().input.click_left();
    game.step();
    assert_eq!(game.flags().mode(), Ok(Mode::HumanVsAi));
    press_select(&game);
    run_until(&mut game, 10, |g| g.state() == State::InputWait);
    assert!(!game.flags().ai_turn);

    press_select(&game);
    run_until(&mut game, 20, |g| g.state() == State::TurnStart);
    assert!(game.flags().ai_turn);
    assert_eq!(game.cursor().color, Color::Green);

    run_until(&mut game, 200, |g| g.state() == State::InputWait);
    assert!(!game.flags().ai_turn);
    assert_eq!(game.cursor().color, Color::Red);
    let b = game.board();
    assert_eq!(count_stones(b, Color::Red) + count_stones(b, Color::Green), 6);
}

#[test]
fn test_exhibition_plays_to_the_end_and_restarts() {
    let mut game = new_game(Options::EXHIBITION, 3);
    run_until(&mut game, 5, |g| g.state() == State::TurnStart);
    assert_eq!(game.flags().mode(), Ok(Mode::AiVsAi));

    run_until(&mut game, 100_000, |g| g.completed_games() == 1);
    assert_eq!(game.state(), State::InitHw);

    let b = *game.board();
    assert!(is_game_over(
        count_placeable(&b, Color::Red),
        count_placeable(&b, Color::Green)
    ));
    let red = game.player(Color::Red).result;
    let green = game.player(Color::Green).result;
    assert_eq!(red, count_stones(&b, Color::Red));
    assert_eq!(green, count_stones(&b, Color::Green));
    assert_eq!(line(&game, 2), "NEW -> PUSH SW7");
    assert_eq!(game.cursor().color, Color::Empty);

    // The display holds the lined-up result, not the final position.
    let shown = game.devices().matrix.shown();
    assert_eq!(count_stones(shown, Color::Red), red);
    assert_eq!(count_stones(shown, Color::Green), green);
    if red > 0 {
        assert_eq!(shown.read(0, 7), Color::Red);
    }

    run_until(&mut game, 5, |g| g.state() == State::TurnStart);
    assert_eq!(*game.board(), Board::initial());
}

#[test]
fn test_same_entropy_same_game() {
    let finish = |seed| {
        let mut game = new_game(Options::EXHIBITION, seed);
        run_until(&mut game, 100_000, |g| g.completed_games() == 1);
        *game.board()
    };
    assert_eq!(finish(21), finish(21));
}

// =============================================================================
// Reset and fault handling
// =============================================================================

#[test]
fn test_reset_during_select_starts_exhibition() {
    let mut game = new_game(Options::NORMAL, 1);
    run_until(&mut game, 10, |g| g.state() == State::SelectWait);
    game.shared().request_reset();
    game.step();
    assert_eq!(game.state(), State::InitGame);
    assert_eq!(game.options(), Options::EXHIBITION);
    assert!(!game.shared().take_reset());
    game.step();
    assert_eq!(game.state(), State::TurnStart);
    assert_eq!(game.flags().mode(), Ok(Mode::AiVsAi));
    assert!(game.flags().ai_turn);
}

#[test]
fn test_reset_mid_game_returns_to_normal() {
    let mut game = friend_match();
    press_select(&game);
    run_until(&mut game, 20, |g| g.state() == State::TurnStart);
    assert_ne!(*game.board(), Board::initial());

    game.shared().request_reset();
    game.step();
    assert_eq!(game.state(), State::InitGame);
    assert_eq!(game.options(), Options::NORMAL);
    game.step();
    assert_eq!(game.state(), State::SelectWait);
    assert_eq!(*game.board(), Board::initial());
    assert_eq!(game.cursor().color, Color::Red);
}

#[test]
fn test_missing_mode_parks_in_fault_sink() {
    let mut game = new_game(Options::SOUND, 1);
    run_until(&mut game, 10, |g| matches!(g.state(), State::Fault(_)));
    assert_eq!(game.state(), State::Fault(Fault::NoMode));
    game.step();
    assert_eq!(game.state(), State::Undefined);
    assert_eq!(line(&game, 1), "Undefine state");
    for _ in 0..5 {
        game.step();
        assert_eq!(game.state(), State::Undefined);
    }

    game.shared().request_reset();
    run_until(&mut game, 5, |g| g.state() == State::SelectWait);
    assert_eq!(game.options(), Options::NORMAL);
}

#[test]
fn test_reset_option_restarts_immediately() {
    let mut game = new_game(Options::NORMAL | Options::RESET, 1);
    game.step();
    game.step();
    assert_eq!(game.state(), State::TurnStart);
    // InitGame raised the reset flag; the next step honours it.
    game.step();
    assert_eq!(game.state(), State::InitGame);
    assert_eq!(game.options(), Options::NORMAL);
}
