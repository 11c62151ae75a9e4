//! Simulated collaborators for running the controller without hardware.
//!
//! Every device logs through `tracing` and exposes a cloneable handle so a
//! caller (the CLI or a test) can poke or inspect it while the controller
//! owns the device.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use scale_traits::{AudioPlayer, Button, Buzzer, DigitDisplay, Key, Keypad, PowerLine, WeightSensor};

type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

// ── Sensor ───────────────────────────────────────────────────────────────────

/// Load cell that optionally ramps its load on every sample, like a cup
/// being filled.
pub struct SimulatedSensor {
    load_g: Rc<Cell<f32>>,
    offset_g: f32,
    ramp_g: f32,
    ramp_to_g: Option<f32>,
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self {
            load_g: Rc::new(Cell::new(0.0)),
            offset_g: 0.0,
            ramp_g: 0.0,
            ramp_to_g: None,
        }
    }

    /// Add `step_g` per sample, stopping at `until_g` when given.
    pub fn with_ramp(mut self, step_g: f32, until_g: Option<f32>) -> Self {
        self.ramp_g = step_g;
        self.ramp_to_g = until_g;
        self
    }

    /// Shared handle to the physical load in grams.
    pub fn load_handle(&self) -> Rc<Cell<f32>> {
        self.load_g.clone()
    }
}

impl WeightSensor for SimulatedSensor {
    fn sample(&mut self) -> HwResult<f32> {
        let mut w = self.load_g.get() + self.ramp_g;
        if let Some(cap) = self.ramp_to_g {
            w = w.min(cap);
        }
        self.load_g.set(w);
        let g = w - self.offset_g;
        tracing::trace!(grams = g, "sim sensor sample");
        Ok(g)
    }

    fn zero(&mut self) -> HwResult<()> {
        self.offset_g = self.load_g.get();
        tracing::debug!(offset_g = self.offset_g, "sim sensor tared");
        Ok(())
    }
}

// ── Keypad ───────────────────────────────────────────────────────────────────

/// Keypad that replays a script, one symbol per poll. Any character that
/// is not a key (e.g. `.` or a space) is a poll with no key.
#[derive(Debug, Default)]
pub struct ScriptedKeypad {
    script: VecDeque<char>,
}

impl ScriptedKeypad {
    pub fn new(script: &str) -> Self {
        Self {
            script: script.chars().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Keypad for ScriptedKeypad {
    fn poll_key(&mut self) -> HwResult<Option<Key>> {
        let key = self.script.pop_front().and_then(Key::from_char);
        if let Some(k) = key {
            tracing::debug!(key = %k, "sim key");
        }
        Ok(key)
    }
}

// ── Display ──────────────────────────────────────────────────────────────────

/// What a display currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shown {
    Blank,
    Value(i32),
    Fault,
}

/// Logs changes of the shown value.
pub struct LogDisplay {
    shown: Rc<Cell<Shown>>,
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl LogDisplay {
    pub fn new() -> Self {
        Self {
            shown: Rc::new(Cell::new(Shown::Blank)),
        }
    }

    pub fn handle(&self) -> Rc<Cell<Shown>> {
        self.shown.clone()
    }

    fn set(&mut self, next: Shown) {
        if self.shown.replace(next) != next {
            tracing::info!(display = ?next, "sim display");
        }
    }
}

impl DigitDisplay for LogDisplay {
    fn show(&mut self, value: i32, _digits: u8) -> HwResult<()> {
        self.set(Shown::Value(value));
        Ok(())
    }

    fn show_fault(&mut self) -> HwResult<()> {
        self.set(Shown::Fault);
        Ok(())
    }
}

// ── Audio ────────────────────────────────────────────────────────────────────

/// Records played tracks; busy for `busy_polls` polls after each play.
pub struct LogAudio {
    played: Rc<RefCell<Vec<u16>>>,
    busy_polls: u32,
    left: u32,
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl LogAudio {
    pub fn new() -> Self {
        Self {
            played: Rc::new(RefCell::new(Vec::new())),
            busy_polls: 0,
            left: 0,
        }
    }

    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    pub fn played_handle(&self) -> Rc<RefCell<Vec<u16>>> {
        self.played.clone()
    }
}

impl AudioPlayer for LogAudio {
    fn init(&mut self) -> HwResult<()> {
        Ok(())
    }

    fn play(&mut self, track: u16) -> HwResult<()> {
        tracing::debug!(track, "sim audio play");
        self.played.borrow_mut().push(track);
        self.left = self.busy_polls;
        Ok(())
    }

    fn is_busy(&mut self) -> HwResult<bool> {
        if self.left == 0 {
            return Ok(false);
        }
        self.left -= 1;
        Ok(true)
    }
}

// ── Buzzer ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct LogBuzzer {
    tones: Rc<RefCell<Vec<(u32, u32)>>>,
}

impl LogBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tones_handle(&self) -> Rc<RefCell<Vec<(u32, u32)>>> {
        self.tones.clone()
    }
}

impl Buzzer for LogBuzzer {
    fn tone(&mut self, frequency_hz: u32, duration_ms: u32) -> HwResult<()> {
        tracing::trace!(frequency_hz, duration_ms, "sim tone");
        self.tones.borrow_mut().push((frequency_hz, duration_ms));
        Ok(())
    }

    fn silence(&mut self) -> HwResult<()> {
        Ok(())
    }
}

// ── Power line and buttons ───────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SimPowerLine {
    asserted: Rc<Cell<bool>>,
}

impl SimPowerLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asserted_handle(&self) -> Rc<Cell<bool>> {
        self.asserted.clone()
    }
}

impl PowerLine for SimPowerLine {
    fn assert_shutdown(&mut self) -> HwResult<()> {
        tracing::info!("sim power cutoff asserted");
        self.asserted.set(true);
        Ok(())
    }
}

/// Button whose level is set through a shared handle.
#[derive(Debug, Default)]
pub struct SimButton {
    pressed: Rc<Cell<bool>>,
}

impl SimButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Rc<Cell<bool>> {
        self.pressed.clone()
    }
}

impl Button for SimButton {
    fn is_pressed(&mut self) -> HwResult<bool> {
        Ok(self.pressed.get())
    }
}
