//! State shared between the main loop and the timer/edge interrupt handlers.
//!
//! Every field is a single machine word accessed with relaxed atomics, which
//! matches what the hardware guarantees for plain word loads and stores.
//! Interrupt-side handlers only ever touch one field at a time; nothing here
//! is updated as a multi-field transaction.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU16, AtomicU32, Ordering};

use crate::board::Color;
use crate::constants::{MONITOR_CHATTERING_PERIOD_MS, RESET_HOLD_POLLS, RESET_POLL_PERIOD_MS};
use crate::cursor::Cursor;

const RELAXED: Ordering = Ordering::Relaxed;

/// What the reset-button monitor saw on a polling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetHold {
    /// Button still held, not long enough yet
    Held,
    /// Held long enough: the reset flag has been raised
    Triggered,
}

#[derive(Debug, Default)]
pub struct SharedState {
    tick_2ms: AtomicU32,
    tick_5ms: AtomicU32,
    tick_10ms: AtomicU32,
    /// 5 ms tick of the last accepted button edge
    last_edge: AtomicU32,
    reset_hold: AtomicU32,
    select_pressed: AtomicBool,
    reset: AtomicBool,
    sound_enabled: AtomicBool,
    pulse_count: AtomicU16,
    cursor_x: AtomicU8,
    cursor_y: AtomicU8,
    cursor_color: AtomicU8,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Interrupt side
    // -------------------------------------------------------------------------

    /// Display refresh timer. The renderer derives the cursor blink phase
    /// from this.
    pub fn on_tick_2ms(&self) {
        self.tick_2ms.fetch_add(1, RELAXED);
    }

    /// Input monitor timer. Polls the reset button once per second; after
    /// more than [`RESET_HOLD_POLLS`] consecutive held polls the reset flag
    /// is raised.
    pub fn on_tick_5ms(&self, reset_button_down: bool) -> Option<ResetHold> {
        let now = self.tick_5ms.fetch_add(1, RELAXED).wrapping_add(1);
        if now % (RESET_POLL_PERIOD_MS / 5) != 0 {
            return None;
        }
        if !reset_button_down {
            self.reset_hold.store(0, RELAXED);
            return None;
        }
        let held = self.reset_hold.fetch_add(1, RELAXED) + 1;
        if held > RESET_HOLD_POLLS {
            self.reset_hold.store(0, RELAXED);
            self.reset.store(true, RELAXED);
            Some(ResetHold::Triggered)
        } else {
            Some(ResetHold::Held)
        }
    }

    /// Pacing timer polled by [`SharedState::wait_10ms`].
    pub fn on_tick_10ms(&self) {
        self.tick_10ms.fetch_add(1, RELAXED);
    }

    /// Falling edge of the confirm button. Returns false if rejected as
    /// chatter.
    pub fn on_select_edge(&self) -> bool {
        if !self.accept_edge() {
            return false;
        }
        self.select_pressed.store(true, RELAXED);
        true
    }

    /// Falling edge of the sound button: toggles the buzzer.
    pub fn on_sound_edge(&self) -> bool {
        if !self.accept_edge() {
            return false;
        }
        self.sound_enabled.fetch_xor(true, RELAXED);
        true
    }

    /// Quadrature pulses from the encoder.
    pub fn on_rotary_pulses(&self, delta: i16) {
        let _ = self
            .pulse_count
            .fetch_update(RELAXED, RELAXED, |c| Some(c.wrapping_add(delta as u16)));
    }

    fn accept_edge(&self) -> bool {
        let now = self.tick_5ms.load(RELAXED);
        if now.wrapping_sub(self.last_edge.load(RELAXED)) < MONITOR_CHATTERING_PERIOD_MS / 5 {
            return false;
        }
        self.last_edge.store(now, RELAXED);
        true
    }

    // -------------------------------------------------------------------------
    // Main-loop side
    // -------------------------------------------------------------------------

    /// Read and clear the confirm-button flag.
    pub fn take_select(&self) -> bool {
        self.select_pressed.swap(false, RELAXED)
    }

    /// Read and clear the reset flag.
    pub fn take_reset(&self) -> bool {
        self.reset.swap(false, RELAXED)
    }

    pub fn request_reset(&self) {
        self.reset.store(true, RELAXED);
    }

    pub fn set_reset(&self, on: bool) {
        self.reset.store(on, RELAXED);
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled.load(RELAXED)
    }

    pub fn set_sound_enabled(&self, on: bool) {
        self.sound_enabled.store(on, RELAXED);
    }

    pub fn pulse_count(&self) -> u16 {
        self.pulse_count.load(RELAXED)
    }

    pub fn clear_pulse_count(&self) {
        self.pulse_count.store(0, RELAXED);
    }

    pub fn ticks_2ms(&self) -> u32 {
        self.tick_2ms.load(RELAXED)
    }

    pub fn ticks_10ms(&self) -> u32 {
        self.tick_10ms.load(RELAXED)
    }

    /// Spin until `period` 10 ms ticks have elapsed. Does not yield.
    pub fn wait_10ms(&self, period: u32) {
        let start = self.ticks_10ms();
        while self.ticks_10ms().wrapping_sub(start) < period {
            std::hint::spin_loop();
        }
    }

    /// Publish the cursor for the renderer, one field at a time.
    pub fn publish_cursor(&self, cursor: &Cursor) {
        self.cursor_x.store(cursor.x as u8, RELAXED);
        self.cursor_y.store(cursor.y as u8, RELAXED);
        self.cursor_color.store(cursor.color.to_u8(), RELAXED);
    }

    /// Cursor as last published: `(x, y, color)`.
    pub fn cursor(&self) -> (usize, usize, Color) {
        (
            self.cursor_x.load(RELAXED) as usize,
            self.cursor_y.load(RELAXED) as usize,
            Color::from_u8(self.cursor_color.load(RELAXED)),
        )
    }
}
