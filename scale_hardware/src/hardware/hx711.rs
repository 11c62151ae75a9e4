use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin};
use scale_traits::WeightSensor;
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::{mean, sign_extend_24, wait_for_data_ready};

pub struct Hx711 {
    dt: InputPin,
    sck: OutputPin,
    gain_pulses: u8, // 1, 2, 3 extra pulses select gain/channel
}

impl Hx711 {
    pub fn new(dt: InputPin, mut sck: OutputPin, gain_pulses: u8) -> Self {
        sck.set_low(); // clock idle low
        Self {
            dt,
            sck,
            gain_pulses,
        }
    }

    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<i32> {
        let dt = &self.dt;
        let waited = wait_for_data_ready(|| dt.is_high(), timeout, Duration::from_micros(200))?;
        trace!(waited_us = waited.as_micros() as u64, "hx711 data ready");

        let mut raw: u32 = 0;
        for _ in 0..24 {
            self.sck.set_high();
            spin_delay_100ns();
            raw = (raw << 1) | u32::from(self.dt.is_high());
            self.sck.set_low();
            spin_delay_100ns();
        }

        // Pulse gain to set next measurement
        for _ in 0..self.gain_pulses {
            self.sck.set_high();
            spin_delay_100ns();
            self.sck.set_low();
            spin_delay_100ns();
        }

        let value = sign_extend_24(raw);
        trace!(raw = value, "hx711 raw read");
        Ok(value)
    }
}

#[inline(always)]
fn spin_delay_100ns() {
    std::hint::spin_loop();
}

/// Load cell in grams: averages `samples` raw reads, subtracts the tare
/// offset and divides by the scale factor (counts per gram).
pub struct Hx711Sensor {
    hx711: Hx711,
    scale_factor: f32,
    samples: u8,
    offset: f64,
    timeout: Duration,
}

impl Hx711Sensor {
    pub fn try_new(
        dt_pin: u8,
        sck_pin: u8,
        scale_factor: f32,
        samples: u8,
        read_timeout_ms: u64,
    ) -> Result<Self> {
        let gpio = Gpio::new()?;
        let dt = gpio.get(dt_pin)?.into_input();
        let sck = gpio.get(sck_pin)?.into_output();
        Ok(Self {
            hx711: Hx711::new(dt, sck, 1),
            scale_factor,
            samples: samples.max(1),
            offset: 0.0,
            timeout: Duration::from_millis(read_timeout_ms),
        })
    }

    fn read_one(&mut self) -> Result<i32> {
        let mut attempts = 0;
        let max_attempts = 3;
        loop {
            match self.hx711.read_with_timeout(self.timeout) {
                Ok(raw) => return Ok(raw),
                Err(HwError::DataReadyTimeout) if attempts < max_attempts => {
                    attempts += 1;
                    tracing::warn!(retries = attempts, "hx711 timeout, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn read_average(&mut self) -> Result<f64> {
        let mut reads = Vec::with_capacity(usize::from(self.samples));
        for _ in 0..self.samples {
            reads.push(self.read_one()?);
        }
        mean(&reads).ok_or(HwError::Timeout)
    }
}

impl WeightSensor for Hx711Sensor {
    fn sample(&mut self) -> std::result::Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        let avg = self.read_average()?;
        let grams = (avg - self.offset) / f64::from(self.scale_factor);
        tracing::debug!(grams, "hx711 sample");
        Ok(grams as f32)
    }

    fn zero(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.offset = self.read_average()?;
        tracing::debug!(offset = self.offset, "hx711 tared");
        Ok(())
    }
}
