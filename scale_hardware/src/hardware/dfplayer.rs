use std::time::{Duration, Instant};

use rppal::gpio::{Gpio, InputPin};
use rppal::uart::{Parity, Uart};
use scale_traits::AudioPlayer;

use crate::error::{HwError, Result};
use crate::protocol::dfplayer;

type HwResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// The BUSY line needs a moment to drop after a play command.
const BUSY_GRACE: Duration = Duration::from_millis(150);
/// Without a BUSY line, assume each clip lasts this long.
const ASSUMED_CLIP: Duration = Duration::from_millis(800);

/// DFPlayer Mini over UART, with its BUSY pin (low while playing) when wired.
pub struct DfPlayer {
    uart: Uart,
    busy: Option<InputPin>,
    volume: u8,
    played_at: Option<Instant>,
}

impl DfPlayer {
    pub fn try_new(
        gpio: &Gpio,
        path: &str,
        baud: u32,
        volume: u8,
        busy_pin: Option<u8>,
    ) -> Result<Self> {
        let uart = Uart::with_path(path, baud, Parity::None, 8, 1)?;
        let busy = busy_pin
            .map(|p| gpio.get(p).map(|pin| pin.into_input_pullup()))
            .transpose()?;
        Ok(Self {
            uart,
            busy,
            volume,
            played_at: None,
        })
    }

    fn send(&mut self, frame: [u8; 10]) -> Result<()> {
        let n = self.uart.write(&frame)?;
        if n != frame.len() {
            return Err(HwError::Uart(format!("short write: {n} of {}", frame.len())));
        }
        Ok(())
    }
}

impl AudioPlayer for DfPlayer {
    fn init(&mut self) -> HwResult<()> {
        self.send(dfplayer::frame(dfplayer::CMD_RESET, 0))?;
        // module boots in about a second after reset
        std::thread::sleep(Duration::from_millis(1000));
        self.send(dfplayer::frame(dfplayer::CMD_SOURCE, dfplayer::SOURCE_SD))?;
        std::thread::sleep(Duration::from_millis(200));
        self.send(dfplayer::volume(self.volume))?;
        self.send(dfplayer::frame(dfplayer::CMD_EQ, 0))?;
        tracing::info!(volume = self.volume, "dfplayer ready");
        Ok(())
    }

    fn play(&mut self, track: u16) -> HwResult<()> {
        self.send(dfplayer::play(track))?;
        self.played_at = Some(Instant::now());
        Ok(())
    }

    fn is_busy(&mut self) -> HwResult<bool> {
        let since = self.played_at.map(|t| t.elapsed());
        match &self.busy {
            Some(pin) => Ok(pin.is_low() || since.is_some_and(|d| d < BUSY_GRACE)),
            None => Ok(since.is_some_and(|d| d < ASSUMED_CLIP)),
        }
    }
}
