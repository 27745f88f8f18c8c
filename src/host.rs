//! Terminal stand-ins for the board peripherals.
//!
//! The simulator renders the matrix as text, keeps the character display in
//! a 16x2 buffer, and runs a timer thread that calls the interrupt-side
//! handlers of [`SharedState`] the way the hardware timers would.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::board::{Board, Color};
use crate::constants::{CURSOR_BLINK_PERIOD_MS, DO1, DO2, MAT_HEIGHT, MAT_WIDTH};
use crate::cursor::AxisMode;
use crate::game::Game;
use crate::hal::{Devices, Entropy, Input, MatrixDisplay, Sound, TextDisplay};
use crate::shared::{ResetHold, SharedState};

pub const LCD_COLUMNS: usize = 16;
pub const LCD_ROWS: usize = 2;

/// The state machine wired to the terminal peripherals.
pub type HostGame = Game<TerminalMatrix, HostSound, LcdBuffer, HostInput, HostEntropy>;

// =============================================================================
// Matrix
// =============================================================================

/// Double-buffered matrix. `flush` commits the working buffer to the one
/// the renderer reads and bumps a generation counter.
#[derive(Debug, Default)]
pub struct TerminalMatrix {
    work: Board,
    shown: Board,
    generation: u64,
}

impl TerminalMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed buffer.
    pub fn shown(&self) -> &Board {
        &self.shown
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl MatrixDisplay for TerminalMatrix {
    fn write(&mut self, x: usize, y: usize, color: Color) {
        self.work.write(x, y, color);
    }

    fn read(&self, x: usize, y: usize) -> Color {
        self.work.read(x, y)
    }

    fn clear(&mut self) {
        self.work.clear_all();
    }

    fn flush(&mut self) {
        self.shown = self.work;
        self.generation += 1;
    }
}

// =============================================================================
// Character display
// =============================================================================

#[derive(Debug, Clone)]
pub struct LcdBuffer {
    cells: [[char; LCD_COLUMNS]; LCD_ROWS],
    col: usize,
    row: usize,
    generation: u64,
}

impl Default for LcdBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LcdBuffer {
    pub fn new() -> Self {
        Self {
            cells: [[' '; LCD_COLUMNS]; LCD_ROWS],
            col: 0,
            row: 0,
            generation: 0,
        }
    }

    /// Row `n` (1-based, clamped like [`TextDisplay::set_cursor`]) with
    /// trailing blanks removed.
    pub fn line(&self, n: usize) -> String {
        let row = (n.max(1) - 1).min(LCD_ROWS - 1);
        let s: String = self.cells[row].iter().collect();
        s.trim_end().to_string()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl TextDisplay for LcdBuffer {
    fn clear(&mut self) {
        self.cells = [[' '; LCD_COLUMNS]; LCD_ROWS];
        self.col = 0;
        self.row = 0;
    }

    fn set_cursor(&mut self, x: u8, y: u8) {
        self.col = usize::from(x.max(1)) - 1;
        self.row = (usize::from(y.max(1)) - 1).min(LCD_ROWS - 1);
    }

    fn put_str(&mut self, text: &str) {
        for ch in text.chars() {
            if self.col >= LCD_COLUMNS {
                break;
            }
            self.cells[self.row][self.col] = ch;
            self.col += 1;
        }
    }

    fn flush(&mut self) {
        self.generation += 1;
    }
}

// =============================================================================
// Sound, input, entropy
// =============================================================================

/// Buzzer stand-in: tones are printed to stderr when `echo` is set.
#[derive(Debug, Default)]
pub struct HostSound {
    pub echo: bool,
}

impl Sound for HostSound {
    fn play(&mut self, frequency: u32, duration_ms: u32) {
        if self.echo {
            eprintln!("beep {frequency} Hz {duration_ms} ms");
        }
    }
}

/// Rotary counter and axis switch, fed by the console thread.
#[derive(Debug, Clone)]
pub struct HostInput {
    shared: Arc<SharedState>,
    column_major: Arc<AtomicBool>,
}

impl HostInput {
    pub fn new(shared: Arc<SharedState>) -> Self {
        Self {
            shared,
            column_major: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for flipping the axis switch from another thread.
    pub fn axis_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.column_major)
    }
}

impl Input for HostInput {
    fn read_rotary(&mut self) -> u16 {
        self.shared.pulse_count()
    }

    fn clear_rotary(&mut self) {
        self.shared.clear_pulse_count();
    }

    fn axis_mode(&mut self) -> AxisMode {
        if self.column_major.load(Ordering::Relaxed) {
            AxisMode::ColumnMajor
        } else {
            AxisMode::RowMajor
        }
    }
}

/// Clock-derived samples, or a reproducible stream when seeded.
#[derive(Debug)]
pub struct HostEntropy {
    rng: Option<fastrand::Rng>,
}

impl HostEntropy {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seed.map(fastrand::Rng::with_seed),
        }
    }
}

impl Entropy for HostEntropy {
    fn sample(&mut self) -> u32 {
        match &mut self.rng {
            Some(rng) => rng.u32(..),
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(0),
        }
    }
}

/// Build the peripheral set for a host game.
pub fn devices(
    shared: &Arc<SharedState>,
    echo_sound: bool,
    seed: Option<u64>,
) -> Devices<TerminalMatrix, HostSound, LcdBuffer, HostInput, HostEntropy> {
    Devices {
        matrix: TerminalMatrix::new(),
        sound: HostSound { echo: echo_sound },
        text: LcdBuffer::new(),
        input: HostInput::new(Arc::clone(shared)),
        entropy: HostEntropy::new(seed),
    }
}

// =============================================================================
// Timer
// =============================================================================

/// One reset-button poll on the 5 ms tick. Each held poll chirps and a
/// fired reset adds the long tone, both muted with the rest of the sound.
pub fn poll_reset(
    shared: &SharedState,
    reset_button_down: bool,
    sound: &mut impl Sound,
) -> Option<ResetHold> {
    let event = shared.on_tick_5ms(reset_button_down);
    if event.is_some() && shared.sound_enabled() {
        sound.play(DO1, 50);
        if event == Some(ResetHold::Triggered) {
            sound.play(DO2, 300);
        }
    }
    event
}

/// Background thread driving the 2/5/10 ms handlers from a 1 ms base tick.
/// Stops and joins on drop.
pub struct Timer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    /// `reset_button` is sampled on every 5 ms tick and released once a
    /// reset fires. Reset-hold tones go to `sound`.
    pub fn start<S>(shared: Arc<SharedState>, reset_button: Arc<AtomicBool>, mut sound: S) -> Self
    where
        S: Sound + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut ms: u64 = 0;
                while !stop.load(Ordering::Relaxed) {
                    thread::sleep(Duration::from_millis(1));
                    ms += 1;
                    if ms % 2 == 0 {
                        shared.on_tick_2ms();
                    }
                    if ms % 5 == 0 {
                        let down = reset_button.load(Ordering::Relaxed);
                        if poll_reset(&shared, down, &mut sound) == Some(ResetHold::Triggered) {
                            reset_button.store(false, Ordering::Relaxed);
                        }
                    }
                    if ms % 10 == 0 {
                        shared.on_tick_10ms();
                    }
                }
            })
        };
        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Blink phase of the cursor at a given 2 ms refresh count.
pub fn cursor_lit(ticks_2ms: u32) -> bool {
    (ticks_2ms / (CURSOR_BLINK_PERIOD_MS / 2)) % 2 == 1
}

/// Text picture of the matrix, top row (`y = 7`) first, followed by the
/// character display framed in bars.
///
/// A visible cursor blinks with [`cursor_lit`]: lit, it shows as a
/// lowercase letter over whatever is there; dark, its cell is blank even
/// when a stone sits under it.
pub fn render_screen(
    matrix: &Board,
    cursor: (usize, usize, Color),
    ticks_2ms: u32,
    lcd: &LcdBuffer,
) -> String {
    let (cx, cy, ccolor) = cursor;
    let lit = cursor_lit(ticks_2ms);
    let mut s = String::new();
    for y in (0..MAT_HEIGHT).rev() {
        for x in 0..MAT_WIDTH {
            if x > 0 {
                s.push(' ');
            }
            let ch = if (x, y) != (cx, cy) || !ccolor.is_stone() {
                matrix.read(x, y).to_char()
            } else if lit {
                ccolor.to_char().to_ascii_lowercase()
            } else {
                Color::Empty.to_char()
            };
            s.push(ch);
        }
        s.push('\n');
    }
    for n in 1..=LCD_ROWS {
        s.push_str(&format!("|{:<width$}|\n", lcd.line(n), width = LCD_COLUMNS));
    }
    s
}
