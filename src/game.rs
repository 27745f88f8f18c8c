//! The top-level game controller.
//!
//! A finite-state machine advanced one transition per [`Game::step`]. Each
//! call first honours a pending reset (the only cancellation point), then
//! runs the current state's action and moves to the next state. The
//! machine owns the live board; the search only ever sees copies.
//!
//! Phases:
//!
//! - init: `InitHw`, `InitGame`
//! - mode select: `SelectWait`, `SelectVs`
//! - turn start: `TurnStart`, `TurnCheck`
//! - AI: `AiThink`, then `AiMove` (cursor animated one step per tick)
//! - human: `InputWait`, `InputRead`
//! - placement: `PlaceCheck`, `PlaceOk`, `PlaceNg`
//! - flips: `FlipCalc`, `FlipRun`
//! - turn end: `TurnSwitch`, `TurnCount`, `TurnJudge`, `TurnShow`
//! - game end: `EndCalc`, `EndShow`, `EndWait`, `EndReset`
//! - `Fault` reports an inconsistent configuration and parks in `Undefined`

use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

use crate::board::{Board, Color};
use crate::constants::{
    AI_DEPTH, AI_MOVE_PERIOD_MS, C_SCALE, DO0, DO2, DO3, LINE_UP_RESULT_PERIOD_MS, MAT_HEIGHT,
    MAT_WIDTH, SHOW_RESULT_WAIT_MS,
};
use crate::cursor::{AxisMode, Cursor};
use crate::hal::{Devices, Entropy, Input, MatrixDisplay, Rotary, Sound, TextDisplay};
use crate::rules::{
    FlipMask, apply_flip, check_placement, count_placeable, count_stones, flip_directions,
    is_game_over,
};
use crate::search::{Searcher, dump_root_moves};
use crate::shared::SharedState;

// =============================================================================
// Options and flags
// =============================================================================

/// Initialization options as a bit set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Options(u8);

impl Options {
    pub const NONE: Options = Options(0x00);
    pub const RESET: Options = Options(0x01);
    pub const SOUND: Options = Options(0x02);
    pub const MAN_VS_MAN: Options = Options(0x04);
    pub const MAN_VS_AI: Options = Options(0x08);
    pub const AI_VS_AI: Options = Options(0x10);
    pub const AI_TURN: Options = Options(0x20);
    pub const SKIP: Options = Options(0x40);

    /// Power-on default: sound on, mode selection pending on friend play.
    pub const NORMAL: Options = Options(0x02 | 0x04);
    /// Unattended demo: sound on, AI against AI.
    pub const EXHIBITION: Options = Options(0x02 | 0x10 | 0x20);

    #[inline]
    pub fn contains(self, other: Options) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Options {
    type Output = Options;

    fn bitor(self, rhs: Options) -> Options {
        Options(self.0 | rhs.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    HumanVsHuman,
    HumanVsAi,
    AiVsAi,
}

/// Inconsistencies that send the machine to its fault sink.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// No play mode is selected
    NoMode,
    /// More than one play mode is selected
    ConflictingModes,
    /// The AI destination lies outside the board
    DestinationOffBoard,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::NoMode => write!(f, "no play mode selected"),
            Fault::ConflictingModes => write!(f, "several play modes selected"),
            Fault::DestinationOffBoard => write!(f, "cursor destination off the board"),
        }
    }
}

/// Per-game booleans owned by the state machine. The reset and sound flags
/// are written from interrupt context and live in [`SharedState`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GameFlags {
    pub human_vs_human: bool,
    pub human_vs_ai: bool,
    pub ai_vs_ai: bool,
    /// The side to move is played by the AI
    pub ai_turn: bool,
    /// The side to move has no legal move and must pass
    pub skip: bool,
}

impl GameFlags {
    pub fn from_options(o: Options) -> Self {
        Self {
            human_vs_human: o.contains(Options::MAN_VS_MAN),
            human_vs_ai: o.contains(Options::MAN_VS_AI),
            ai_vs_ai: o.contains(Options::AI_VS_AI),
            ai_turn: o.contains(Options::AI_TURN),
            skip: o.contains(Options::SKIP),
        }
    }

    /// The selected mode. Exactly one mode flag must be set.
    pub fn mode(&self) -> Result<Mode, Fault> {
        match (self.human_vs_human, self.human_vs_ai, self.ai_vs_ai) {
            (true, false, false) => Ok(Mode::HumanVsHuman),
            (false, true, false) => Ok(Mode::HumanVsAi),
            (false, false, true) => Ok(Mode::AiVsAi),
            (false, false, false) => Err(Fault::NoMode),
            _ => Err(Fault::ConflictingModes),
        }
    }
}

/// Per-color tallies.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Player {
    /// Legal moves available now
    pub placeable_count: usize,
    /// Final stone count, valid once the game is over
    pub result: usize,
}

/// The color with more stones, or `None` on a draw.
pub fn winner(red: usize, green: usize) -> Option<Color> {
    use std::cmp::Ordering::*;
    match red.cmp(&green) {
        Greater => Some(Color::Red),
        Less => Some(Color::Green),
        Equal => None,
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Pacing of the animated parts, in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    pub ai_move_ms: u32,
    pub line_up_ms: u32,
    pub show_result_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            ai_move_ms: AI_MOVE_PERIOD_MS,
            line_up_ms: LINE_UP_RESULT_PERIOD_MS,
            show_result_ms: SHOW_RESULT_WAIT_MS,
        }
    }
}

impl Timing {
    /// No pacing at all.
    pub fn instant() -> Self {
        Self {
            ai_move_ms: 0,
            line_up_ms: 0,
            show_result_ms: 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Search depth of the AI in plies
    pub ai_depth: usize,
    pub timing: Timing,
    /// Trace decisions to stderr
    pub verbose: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ai_depth: AI_DEPTH,
            timing: Timing::default(),
            verbose: false,
        }
    }
}

// =============================================================================
// State machine
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    InitHw,
    InitGame,
    SelectWait,
    SelectVs,
    TurnStart,
    TurnCheck,
    AiThink,
    InputWait,
    InputRead,
    AiMove,
    PlaceCheck,
    PlaceOk,
    PlaceNg,
    FlipCalc,
    FlipRun(FlipMask),
    TurnSwitch,
    TurnCount,
    TurnJudge,
    TurnShow,
    EndCalc,
    EndShow,
    EndWait,
    EndReset,
    Fault(Fault),
    Undefined,
}

pub struct Game<M, S, T, I, E> {
    shared: Arc<SharedState>,
    dev: Devices<M, S, T, I, E>,
    config: GameConfig,
    state: State,
    option: Options,
    board: Board,
    flags: GameFlags,
    red: Player,
    green: Player,
    cursor: Cursor,
    rotary: Rotary,
    searcher: Searcher,
    rng: fastrand::Rng,
    completed: u32,
}

impl<M, S, T, I, E> Game<M, S, T, I, E>
where
    M: MatrixDisplay,
    S: Sound,
    T: TextDisplay,
    I: Input,
    E: Entropy,
{
    pub fn new(shared: Arc<SharedState>, dev: Devices<M, S, T, I, E>, config: GameConfig) -> Self {
        Self {
            shared,
            dev,
            config,
            state: State::InitHw,
            option: Options::NORMAL,
            board: Board::initial(),
            flags: GameFlags::from_options(Options::NORMAL),
            red: Player::default(),
            green: Player::default(),
            cursor: Cursor::new(),
            rotary: Rotary::new(),
            searcher: Searcher::new(),
            rng: fastrand::Rng::with_seed(0),
            completed: 0,
        }
    }

    /// Options used by the next initialization.
    pub fn with_options(mut self, option: Options) -> Self {
        self.option = option;
        self
    }

    /// Advance one transition.
    pub fn step(&mut self) {
        if self.shared.take_reset() {
            self.option = if matches!(self.state, State::SelectWait | State::SelectVs) {
                Options::EXHIBITION
            } else {
                Options::NORMAL
            };
            self.state = State::InitHw;
        }
        self.state = self.transition(self.state);
        self.shared.publish_cursor(&self.cursor);
    }

    fn transition(&mut self, state: State) -> State {
        match state {
            State::InitHw => {
                self.dev.input.clear_rotary();
                self.rotary = Rotary::new();
                State::InitGame
            }
            State::InitGame => self.init_game(),

            State::SelectWait => {
                if self.shared.take_select() {
                    self.beep(DO2, 200);
                    self.show_turn();
                    State::TurnStart
                } else {
                    State::SelectVs
                }
            }
            State::SelectVs => {
                self.rotary.update(self.dev.input.read_rotary());
                if self.rotary.turned_left() || self.rotary.turned_right() {
                    self.beep(DO3, 50);
                    self.flags.human_vs_human ^= true;
                    self.flags.human_vs_ai ^= true;
                    self.show_mode_choice();
                    self.rotary.consume();
                }
                State::SelectWait
            }

            State::TurnStart => State::TurnCheck,
            State::TurnCheck => match self.flags.mode() {
                Err(fault) => State::Fault(fault),
                Ok(_) if self.flags.ai_turn => State::AiThink,
                Ok(_) => State::InputWait,
            },

            State::AiThink => {
                self.think();
                State::AiMove
            }

            State::InputWait => {
                if self.shared.take_select() {
                    State::PlaceCheck
                } else {
                    State::InputRead
                }
            }
            State::InputRead => {
                self.read_input();
                State::InputWait
            }

            State::AiMove => {
                if self.cursor.dest_x >= MAT_WIDTH || self.cursor.dest_y >= MAT_HEIGHT {
                    return State::Fault(Fault::DestinationOffBoard);
                }
                if let Some(from) = self.cursor.step_toward_dest() {
                    self.beep(C_SCALE[from], 100);
                }
                self.shared.publish_cursor(&self.cursor);
                let next = if self.cursor.at_dest() {
                    State::PlaceCheck
                } else {
                    State::AiMove
                };
                self.shared.wait_10ms(self.config.timing.ai_move_ms / 10);
                next
            }

            State::PlaceCheck => {
                if self.flags.skip {
                    self.trace(format_args!("{} passes", self.cursor.color.name()));
                    return State::TurnSwitch;
                }
                let Cursor { x, y, color, .. } = self.cursor;
                match check_placement(&self.board, x, y, color) {
                    Ok(_) => State::PlaceOk,
                    Err(e) => {
                        self.trace(format_args!("{} at ({x},{y}): {e}", color.name()));
                        State::PlaceNg
                    }
                }
            }
            State::PlaceOk => {
                self.beep(DO2, 100);
                self.board.write(self.cursor.x, self.cursor.y, self.cursor.color);
                self.flush_board();
                State::FlipCalc
            }
            State::PlaceNg => {
                self.beep(DO0, 100);
                if self.flags.ai_turn {
                    State::TurnStart
                } else {
                    State::InputWait
                }
            }

            State::FlipCalc => {
                let Cursor { x, y, color, .. } = self.cursor;
                State::FlipRun(flip_directions(&self.board, x, y, color))
            }
            State::FlipRun(mask) => {
                let Cursor { x, y, color, .. } = self.cursor;
                let flipped = apply_flip(mask, &mut self.board, x, y, color);
                self.trace(format_args!("{} plays ({x},{y}), flips {flipped}", color.name()));
                self.flush_board();
                State::TurnSwitch
            }

            State::TurnSwitch => {
                self.cursor.color = self.cursor.color.opponent();
                State::TurnCount
            }
            State::TurnCount => {
                self.red.placeable_count = count_placeable(&self.board, Color::Red);
                self.green.placeable_count = count_placeable(&self.board, Color::Green);
                State::TurnJudge
            }
            State::TurnJudge => {
                if is_game_over(self.red.placeable_count, self.green.placeable_count) {
                    State::EndCalc
                } else {
                    self.flags.skip = self.player(self.cursor.color).placeable_count == 0;
                    State::TurnShow
                }
            }
            State::TurnShow => {
                if self.flags.skip {
                    self.show_skip();
                } else {
                    self.show_turn();
                }
                if self.flags.human_vs_ai {
                    self.flags.ai_turn ^= true;
                }
                State::TurnStart
            }

            State::EndCalc => {
                self.red.result = count_stones(&self.board, Color::Red);
                self.green.result = count_stones(&self.board, Color::Green);
                State::EndShow
            }
            State::EndShow => {
                self.show_result();
                self.completed += 1;
                if self.option == Options::NORMAL {
                    State::EndWait
                } else {
                    State::InitHw
                }
            }
            State::EndWait => {
                if self.shared.take_select() {
                    State::EndReset
                } else {
                    State::EndWait
                }
            }
            State::EndReset => State::InitHw,

            State::Fault(fault) => {
                eprintln!("state machine fault: {fault}");
                self.dev.text.clear();
                self.dev.text.put_str("Undefine state");
                self.dev.text.flush();
                State::Undefined
            }
            State::Undefined => State::Undefined,
        }
    }

    fn init_game(&mut self) -> State {
        let seed = self.dev.entropy.sample();
        self.rng = fastrand::Rng::with_seed(u64::from(seed));

        self.flags = GameFlags::from_options(self.option);
        self.shared.set_reset(self.option.contains(Options::RESET));
        self.shared.set_sound_enabled(self.option.contains(Options::SOUND));

        self.board = Board::initial();
        self.red = Player {
            placeable_count: count_placeable(&self.board, Color::Red),
            result: 0,
        };
        self.green = Player {
            placeable_count: count_placeable(&self.board, Color::Green),
            result: 0,
        };
        self.cursor = Cursor::new();

        self.show_title("VS >FRIEND : AI");
        self.flush_board();
        self.trace(format_args!("new game: options={:#04x} seed={seed}", self.option.bits()));

        if self.option == Options::NORMAL {
            State::SelectWait
        } else {
            State::TurnStart
        }
    }

    /// Pick the AI's destination. With no legal move the cursor stays put
    /// and the turn is passed at placement.
    fn think(&mut self) {
        let color = self.cursor.color;
        if self.player(color).placeable_count == 0 {
            self.cursor.hold();
            return;
        }
        match self
            .searcher
            .best_move(&self.board, color, self.config.ai_depth, &mut self.rng)
        {
            Some(m) => {
                self.cursor.set_dest(m.x, m.y);
                if self.config.verbose {
                    dump_root_moves(&self.searcher);
                    eprintln!("{} chooses ({},{}) score={}", color.name(), m.x, m.y, m.score);
                }
            }
            None => self.cursor.hold(),
        }
    }

    fn read_input(&mut self) {
        self.rotary.update(self.dev.input.read_rotary());
        let step = if self.rotary.turned_left() {
            self.dev.input.axis_mode().back()
        } else if self.rotary.turned_right() {
            self.dev.input.axis_mode().forward()
        } else {
            return;
        };
        self.cursor.step(step);
        let coord = match self.dev.input.axis_mode() {
            AxisMode::RowMajor => self.cursor.x,
            AxisMode::ColumnMajor => self.cursor.y,
        };
        self.beep(C_SCALE[coord], 100);
        self.rotary.consume();
    }

    /// Tally is done; line the stones up on the display and name the winner.
    /// The board model is left as it ended.
    fn show_result(&mut self) {
        self.dev.text.clear();
        self.dev.text.put_str("Winner is ...");
        self.dev.text.flush();

        self.cursor.color = Color::Empty;
        self.shared.publish_cursor(&self.cursor);

        self.line_up_result();

        let text = match winner(self.red.result, self.green.result) {
            Some(Color::Red) => "RED!",
            Some(_) => "GREEN!",
            None => "RED & GREEN!",
        };
        self.dev.text.set_cursor(2, 2);
        self.dev.text.put_str(text);
        self.dev.text.flush();
        self.trace(format_args!(
            "game over: red={} green={} -> {text}",
            self.red.result, self.green.result
        ));

        self.shared.wait_10ms(self.config.timing.show_result_ms / 10);
        self.show_title("NEW -> PUSH SW7");
    }

    fn line_up_result(&mut self) {
        let (mut red, mut green) = (self.red.result, self.green.result);
        self.dev.matrix.clear();
        self.dev.matrix.flush();

        let mut i = 0;
        while red > 0 || green > 0 {
            let color = if red > 0 {
                red -= 1;
                Color::Red
            } else {
                green -= 1;
                Color::Green
            };
            let x = i % MAT_WIDTH;
            let y = (MAT_HEIGHT - 1) - i / MAT_WIDTH;
            self.dev.matrix.write(x, y, color);
            self.dev.matrix.flush();
            self.beep(C_SCALE[x], 50);
            self.shared.wait_10ms(self.config.timing.line_up_ms / 10);
            i += 1;
        }
    }

    fn flush_board(&mut self) {
        for (x, y, c) in self.board.cells() {
            self.dev.matrix.write(x, y, c);
        }
        self.dev.matrix.flush();
    }

    fn beep(&mut self, frequency: u32, duration_ms: u32) {
        if self.shared.sound_enabled() {
            self.dev.sound.play(frequency, duration_ms);
        }
    }

    fn show_title(&mut self, second_line: &str) {
        let text = &mut self.dev.text;
        text.clear();
        text.set_cursor(5, 1);
        text.put_str("othello");
        text.set_cursor(1, 2);
        text.put_str(second_line);
        text.flush();
    }

    fn show_mode_choice(&mut self) {
        let line = if self.flags.human_vs_human {
            "VS >FRIEND : AI"
        } else {
            "VS  FRIEND :>AI"
        };
        self.show_status(line);
    }

    fn show_turn(&mut self) {
        let line = format!("TURN : {}", self.cursor.color.name());
        self.show_status(&line);
    }

    fn show_skip(&mut self) {
        self.show_status("SKIP PUSH SW7");
    }

    fn show_status(&mut self, line: &str) {
        let text = &mut self.dev.text;
        text.set_cursor(1, 2);
        text.put_str("                ");
        text.set_cursor(1, 2);
        text.put_str(line);
        text.flush();
    }

    fn trace(&self, args: fmt::Arguments<'_>) {
        if self.config.verbose {
            eprintln!("{args}");
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> State {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn flags(&self) -> &GameFlags {
        &self.flags
    }

    pub fn options(&self) -> Options {
        self.option
    }

    pub fn player(&self, color: Color) -> Player {
        match color {
            Color::Red => self.red,
            Color::Green => self.green,
            Color::Empty => Player::default(),
        }
    }

    pub fn completed_games(&self) -> u32 {
        self.completed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    pub fn devices(&self) -> &Devices<M, S, T, I, E> {
        &self.dev
    }

    pub fn devices_mut(&mut self) -> &mut Devices<M, S, T, I, E> {
        &mut self.dev
    }
}
