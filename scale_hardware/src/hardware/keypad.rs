use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin};
use scale_traits::{Key, Keypad};

use crate::error::Result;
use crate::protocol::key_at;

/// 4x3 matrix keypad: rows driven low one at a time, columns read with
/// pull-ups. Reports a key once per press.
pub struct MatrixKeypad {
    rows: Vec<OutputPin>,
    cols: Vec<InputPin>,
    held: Option<Key>,
}

impl MatrixKeypad {
    pub fn try_new(gpio: &Gpio, rows: &[u8; 4], cols: &[u8; 3]) -> Result<Self> {
        let rows = rows
            .iter()
            .map(|p| -> Result<OutputPin> { Ok(gpio.get(*p)?.into_output_high()) })
            .collect::<Result<Vec<_>>>()?;
        let cols = cols
            .iter()
            .map(|p| -> Result<InputPin> { Ok(gpio.get(*p)?.into_input_pullup()) })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rows,
            cols,
            held: None,
        })
    }

    fn scan(&mut self) -> Option<Key> {
        let mut found = None;
        for (r, row) in self.rows.iter_mut().enumerate() {
            row.set_low();
            std::thread::sleep(Duration::from_micros(10));
            if found.is_none() {
                found = self
                    .cols
                    .iter()
                    .position(|c| c.is_low())
                    .and_then(|c| key_at(r, c));
            }
            row.set_high();
        }
        found
    }
}

impl Keypad for MatrixKeypad {
    fn poll_key(&mut self) -> std::result::Result<Option<Key>, Box<dyn std::error::Error + Send + Sync>> {
        let now = self.scan();
        let pressed = match (now, self.held) {
            (Some(k), Some(h)) if k == h => None,
            (k, _) => k,
        };
        self.held = now;
        Ok(pressed)
    }
}
