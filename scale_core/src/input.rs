//! Target entry from the keypad.
//!
//! A small state machine: `Idle` until the first digit opens an entry,
//! `Entering` while digits accumulate. `#` commits, `*` deletes the last
//! digit and cancels once the buffer is empty. With no entry open, `#`
//! reports the target and `*` clears it.

use scale_traits::Key;

use crate::quantize::max_for_digits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Idle,
    Entering { buffer: u32 },
}

/// What a key press did. The controller turns these into announcements and
/// target changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Buffer changed (digit added or removed).
    Entering { buffer: u32 },
    /// A digit would exceed the digit limit; buffer unchanged.
    Overflow { buffer: u32 },
    /// Backspace emptied the buffer; the target is untouched.
    Cancelled,
    /// `#` closed the entry with this value.
    Committed { target: u32 },
    /// `#` with no entry open.
    ReportTarget,
    /// `*` with no entry open.
    ClearTarget,
}

#[derive(Debug, Clone)]
pub struct TargetInput {
    state: InputState,
    max_value: u32,
    max_digits: u8,
}

impl TargetInput {
    pub fn new(max_digits: u8) -> Self {
        let max_digits = max_digits.clamp(1, 6);
        Self {
            state: InputState::Idle,
            max_value: max_for_digits(max_digits).unsigned_abs(),
            max_digits,
        }
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    /// Digit buffer of the open entry.
    pub fn buffer(&self) -> Option<u32> {
        match self.state {
            InputState::Entering { buffer } => Some(buffer),
            InputState::Idle => None,
        }
    }

    pub fn max_digits(&self) -> u8 {
        self.max_digits
    }

    pub fn press(&mut self, key: Key) -> InputEvent {
        match (self.state, key) {
            (InputState::Idle, Key::Digit(d)) => {
                let buffer = u32::from(d.value());
                self.state = InputState::Entering { buffer };
                InputEvent::Entering { buffer }
            }
            (InputState::Idle, Key::Hash) => InputEvent::ReportTarget,
            (InputState::Idle, Key::Star) => InputEvent::ClearTarget,
            (InputState::Entering { buffer }, Key::Digit(d)) => {
                let next = buffer * 10 + u32::from(d.value());
                if next > self.max_value {
                    return InputEvent::Overflow { buffer };
                }
                self.state = InputState::Entering { buffer: next };
                InputEvent::Entering { buffer: next }
            }
            (InputState::Entering { buffer }, Key::Star) => {
                if buffer >= 10 {
                    let buffer = buffer / 10;
                    self.state = InputState::Entering { buffer };
                    InputEvent::Entering { buffer }
                } else {
                    self.state = InputState::Idle;
                    InputEvent::Cancelled
                }
            }
            (InputState::Entering { buffer }, Key::Hash) => {
                self.state = InputState::Idle;
                InputEvent::Committed { target: buffer }
            }
        }
    }
}
