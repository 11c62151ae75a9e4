//! Null collaborators used when an optional device is not fitted.

use scale_traits::{AudioPlayer, Button, Buzzer, DigitDisplay};

type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Display that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DigitDisplay for NullDisplay {
    fn show(&mut self, _value: i32, _digits: u8) -> HwResult<()> {
        Ok(())
    }
    fn show_fault(&mut self) -> HwResult<()> {
        Ok(())
    }
}

/// Audio module that is never busy, so every token "finishes" at once.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioPlayer for NullAudio {
    fn init(&mut self) -> HwResult<()> {
        Ok(())
    }
    fn play(&mut self, _track: u16) -> HwResult<()> {
        Ok(())
    }
    fn is_busy(&mut self) -> HwResult<bool> {
        Ok(false)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullBuzzer;

impl Buzzer for NullBuzzer {
    fn tone(&mut self, _frequency_hz: u32, _duration_ms: u32) -> HwResult<()> {
        Ok(())
    }
    fn silence(&mut self) -> HwResult<()> {
        Ok(())
    }
}

/// Button that is never pressed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullButton;

impl Button for NullButton {
    fn is_pressed(&mut self) -> HwResult<bool> {
        Ok(false)
    }
}
