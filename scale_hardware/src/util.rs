use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Block until the HX711 pulls DOUT low, which it does once a conversion
/// is ready to be clocked out. Returns how long the line stayed high.
///
/// `dout_is_high` samples the pin; it is polled every `poll` until
/// `timeout` runs out, at which point the sensor is reported as not
/// ready with [`HwError::DataReadyTimeout`]. A disconnected or unpowered
/// HX711 leaves DOUT high, so this is where a missing load cell shows up.
pub fn wait_for_data_ready(
    mut dout_is_high: impl FnMut() -> bool,
    timeout: Duration,
    poll: Duration,
) -> Result<Duration> {
    let start = Instant::now();
    while dout_is_high() {
        if start.elapsed() >= timeout {
            return Err(HwError::DataReadyTimeout);
        }
        std::thread::sleep(poll);
    }
    Ok(start.elapsed())
}

/// Mean of the readings, or `None` when there are none.
pub fn mean(readings: &[i32]) -> Option<f64> {
    if readings.is_empty() {
        return None;
    }
    let sum: i64 = readings.iter().map(|&r| i64::from(r)).sum();
    Some(sum as f64 / readings.len() as f64)
}

/// Sign-extend a 24-bit two's complement sample.
#[inline]
pub fn sign_extend_24(raw: u32) -> i32 {
    ((raw << 8) as i32) >> 8
}
