//! Stand-ins for devices that could not be opened.

use scale_traits::AudioPlayer;

use crate::error::HwError;

type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Audio module that failed to open. Every call fails with the original
/// reason, so the voice mutes itself at `init()` and the rest of the device
/// carries on.
#[derive(Debug, Clone)]
pub struct UnavailableAudio {
    reason: String,
}

impl UnavailableAudio {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn err(&self) -> Box<dyn std::error::Error + Send + Sync> {
        Box::new(HwError::Uart(self.reason.clone()))
    }
}

impl AudioPlayer for UnavailableAudio {
    fn init(&mut self) -> HwResult<()> {
        Err(self.err())
    }

    fn play(&mut self, _track: u16) -> HwResult<()> {
        Err(self.err())
    }

    fn is_busy(&mut self) -> HwResult<bool> {
        Err(self.err())
    }
}
