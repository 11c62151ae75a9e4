//! Collaborator interfaces for the talking scale.
//!
//! The controller in `scale_core` only ever talks to hardware through these
//! traits. Each returns a boxed error so drivers are free to use their own
//! error types; the core maps them to its typed errors at the boundary.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::fmt;

/// A decimal digit, `0..=9`. Only [`Digit::new`] builds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digit(u8);

impl Digit {
    pub fn new(d: u8) -> Option<Self> {
        (d <= 9).then_some(Self(d))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// One symbol from the 4x3 keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Digit(Digit),
    /// `*`: backspace, or clear the target when no entry is open.
    Star,
    /// `#`: confirm, or report the target when no entry is open.
    Hash,
}

impl Key {
    /// Digit key for `d`; `None` above 9.
    pub fn digit(d: u8) -> Option<Self> {
        Digit::new(d).map(Self::Digit)
    }

    /// Parse a keypad symbol; anything outside `0-9 * #` is not a key.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(Self::Star),
            '#' => Some(Self::Hash),
            _ => c
                .to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .and_then(Self::digit),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Digit(d) => char::from(b'0' + d.value()),
            Self::Star => '*',
            Self::Hash => '#',
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Load cell with its amplifier.
pub trait WeightSensor {
    /// Averaged reading in grams.
    fn sample(&mut self) -> Result<f32, Box<dyn std::error::Error + Send + Sync>>;
    /// Take the current load as the new zero.
    fn zero(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub trait Keypad {
    /// Non-blocking; `None` when no key was pressed since the last poll.
    fn poll_key(&mut self) -> Result<Option<Key>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Numeric display with a fixed number of digits.
pub trait DigitDisplay {
    fn show(
        &mut self,
        value: i32,
        digits: u8,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Fault indicator shown instead of a stale value.
    fn show_fault(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Track-based audio module (e.g. an MP3 player with an SD card).
///
/// Playing a new track while busy stops the current one.
pub trait AudioPlayer {
    fn init(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn play(&mut self, track: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn is_busy(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: AudioPlayer + ?Sized> AudioPlayer for Box<T> {
    fn init(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).init()
    }
    fn play(&mut self, track: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).play(track)
    }
    fn is_busy(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).is_busy()
    }
}

pub trait Buzzer {
    /// Start a tone; the caller is responsible for waiting `duration_ms`.
    fn tone(
        &mut self,
        frequency_hz: u32,
        duration_ms: u32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn silence(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Line that physically disconnects power. Irreversible from software.
pub trait PowerLine {
    fn assert_shutdown(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Momentary push button, polled.
pub trait Button {
    fn is_pressed(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::{Digit, Key};

    #[test]
    fn parses_the_twelve_symbols() {
        for (i, c) in "0123456789".chars().enumerate() {
            assert_eq!(Key::from_char(c), Key::digit(i as u8));
        }
        assert_eq!(Key::from_char('*'), Some(Key::Star));
        assert_eq!(Key::from_char('#'), Some(Key::Hash));
        assert_eq!(Key::from_char('A'), None);
        assert_eq!(Key::digit(7).map(Key::as_char), Some('7'));
    }

    #[test]
    fn digits_stop_at_nine() {
        assert!(Key::digit(9).is_some());
        assert_eq!(Key::digit(10), None);
        assert_eq!(Digit::new(255), None);
        assert_eq!(Digit::new(4).map(Digit::value), Some(4));
    }
}
