//! Peripheral collaborators consumed by the game core.
//!
//! The core only writes logical pixels, text and tones through these traits;
//! scan-out, serialization and tone generation belong to the implementors.

use crate::board::Color;
use crate::constants::PULSE_DIFF_PER_CLICK;
use crate::cursor::AxisMode;

/// Dot-matrix display with a working buffer and a scanned buffer.
pub trait MatrixDisplay {
    fn write(&mut self, x: usize, y: usize, color: Color);
    fn read(&self, x: usize, y: usize) -> Color;
    fn clear(&mut self);
    /// Commit the working buffer to the buffer the renderer scans.
    fn flush(&mut self);
}

/// Fire-and-forget tone output. A zero frequency silences the buzzer.
pub trait Sound {
    fn play(&mut self, frequency: u32, duration_ms: u32);
}

/// Two-line character display. Coordinates are 1-based like the module's.
pub trait TextDisplay {
    fn clear(&mut self);
    fn set_cursor(&mut self, x: u8, y: u8);
    fn put_str(&mut self, text: &str);
    fn flush(&mut self) {}
}

/// Polled inputs. Button edges arrive through [`crate::shared::SharedState`].
pub trait Input {
    /// Raw quadrature counter of the rotary encoder.
    fn read_rotary(&mut self) -> u16;
    /// Zero the quadrature counter.
    fn clear_rotary(&mut self);
    /// Position of the axis-select switch.
    fn axis_mode(&mut self) -> AxisMode;
}

/// One-shot entropy sample used to seed the tie-break generator.
pub trait Entropy {
    fn sample(&mut self) -> u32;
}

/// The full set of collaborators handed to the state machine.
pub struct Devices<M, S, T, I, E> {
    pub matrix: M,
    pub sound: S,
    pub text: T,
    pub input: I,
    pub entropy: E,
}

/// Rotary encoder bookkeeping: turns the free-running counter into whole
/// clicks, discarding sub-click jitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rotary {
    current: u16,
    prev: u16,
}

impl Rotary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest raw counter value.
    pub fn update(&mut self, raw: u16) {
        self.current = raw;
    }

    /// Counts moved since the last consumed click, rounded toward zero to a
    /// whole number of clicks.
    pub fn delta(&self) -> i16 {
        let raw = self.current.wrapping_sub(self.prev) as i16;
        (raw / PULSE_DIFF_PER_CLICK) * PULSE_DIFF_PER_CLICK
    }

    pub fn turned_left(&self) -> bool {
        self.delta() >= PULSE_DIFF_PER_CLICK
    }

    pub fn turned_right(&self) -> bool {
        self.delta() <= -PULSE_DIFF_PER_CLICK
    }

    /// Mark the pending clicks as handled.
    pub fn consume(&mut self) {
        self.prev = self.prev.wrapping_add(self.delta() as u16);
    }
}
