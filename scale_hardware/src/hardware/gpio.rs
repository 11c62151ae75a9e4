//! Single-pin devices: buttons, buzzer, power cutoff.

use rppal::gpio::{Gpio, InputPin, OutputPin};
use scale_traits::{Button, Buzzer, PowerLine};

use crate::error::{HwError, Result};

type HwResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Momentary button to ground with the internal pull-up.
pub struct GpioButton {
    pin: InputPin,
}

impl GpioButton {
    pub fn try_new(gpio: &Gpio, pin: u8) -> Result<Self> {
        Ok(Self {
            pin: gpio.get(pin)?.into_input_pullup(),
        })
    }
}

impl Button for GpioButton {
    fn is_pressed(&mut self) -> HwResult<bool> {
        Ok(self.pin.is_low())
    }
}

/// Passive buzzer on software PWM.
pub struct GpioBuzzer {
    pin: OutputPin,
}

impl GpioBuzzer {
    pub fn try_new(gpio: &Gpio, pin: u8) -> Result<Self> {
        Ok(Self {
            pin: gpio.get(pin)?.into_output_low(),
        })
    }
}

impl Buzzer for GpioBuzzer {
    fn tone(&mut self, frequency_hz: u32, _duration_ms: u32) -> HwResult<()> {
        self.pin
            .set_pwm_frequency(f64::from(frequency_hz), 0.5)
            .map_err(HwError::from)?;
        Ok(())
    }

    fn silence(&mut self) -> HwResult<()> {
        self.pin.clear_pwm().map_err(HwError::from)?;
        self.pin.set_low();
        Ok(())
    }
}

/// Drives the latching power switch; high releases the latch.
pub struct GpioPowerLine {
    pin: OutputPin,
}

impl GpioPowerLine {
    pub fn try_new(gpio: &Gpio, pin: u8) -> Result<Self> {
        let mut pin = gpio.get(pin)?.into_output_low();
        // keep the latch when the process exits without asserting
        pin.set_reset_on_drop(false);
        Ok(Self { pin })
    }
}

impl PowerLine for GpioPowerLine {
    fn assert_shutdown(&mut self) -> HwResult<()> {
        tracing::info!("power cutoff asserted");
        self.pin.set_high();
        Ok(())
    }
}
