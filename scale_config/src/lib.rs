#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the talking scale.
//!
//! `Config` and its sections are deserialized from TOML and checked with
//! `Config::validate()`. Only `[pins]` is mandatory; every other section has
//! defaults matching the shipped firmware.
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Pins {
    pub hx711_dt: u8,
    pub hx711_sck: u8,
    pub tare_button: u8,
    pub readout_button: u8,
    pub buzzer: u8,
    pub power_cutoff: u8,
    /// Row lines of the 4x3 keypad, top to bottom.
    pub keypad_rows: [u8; 4],
    /// Column lines of the 4x3 keypad, left to right.
    pub keypad_cols: [u8; 3],
    pub display_clk: u8,
    pub display_dio: u8,
    /// BUSY output of the audio module; without it busy state is estimated.
    pub audio_busy: Option<u8>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Sensor {
    /// Raw counts per gram.
    pub scale_factor: f32,
    /// Raw readings averaged into one sample.
    pub samples: u8,
    /// Max wait for the amplifier's data-ready per raw reading.
    pub read_timeout_ms: u64,
}

impl Default for Sensor {
    fn default() -> Self {
        Self {
            scale_factor: 526.0,
            samples: 10,
            read_timeout_ms: 150,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Timing {
    /// Pause between loop ticks.
    pub tick_ms: u64,
    /// A reading must stay unchanged this long before it is announced.
    pub stable_ms: u64,
    /// Power off after this long without user activity.
    pub idle_timeout_s: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick_ms: 500,
            stable_ms: 1000,
            idle_timeout_s: 120,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Audio {
    pub uart: String,
    pub baud: u32,
    /// Player volume, 0..=30.
    pub volume: u8,
    /// Upper bound on waiting for one token to finish.
    pub max_wait_ms: u64,
    /// Busy-flag poll interval while waiting.
    pub poll_ms: u64,
    /// Mute the voice after this many timeouts in a row.
    pub max_consecutive_timeouts: u8,
}

impl Default for Audio {
    fn default() -> Self {
        Self {
            uart: "/dev/serial0".to_string(),
            baud: 9600,
            volume: 30,
            max_wait_ms: 5000,
            poll_ms: 20,
            max_consecutive_timeouts: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Guidance {
    /// Targets below this use the small-target thresholds.
    pub small_target_g: i32,
    pub small_overshoot_g: i32,
    pub overshoot_g: i32,
    pub hit_below_g: i32,
    /// Approach band as a percentage of the target...
    pub approach_pct: u8,
    /// ...capped at this many grams.
    pub approach_cap_g: i32,
}

impl Default for Guidance {
    fn default() -> Self {
        Self {
            small_target_g: 10,
            small_overshoot_g: 1,
            overshoot_g: 3,
            hit_below_g: 1,
            approach_pct: 15,
            approach_cap_g: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Input {
    pub max_digits: u8,
}

impl Default for Input {
    fn default() -> Self {
        Self { max_digits: 3 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Display {
    pub digits: u8,
}

impl Default for Display {
    fn default() -> Self {
        Self { digits: 4 }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub sensor: Sensor,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub audio: Audio,
    #[serde(default)]
    pub guidance: Guidance,
    #[serde(default)]
    pub input: Input,
    #[serde(default)]
    pub display: Display,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins: every line is wired to exactly one function
        let mut used: Vec<(u8, &str)> = vec![
            (self.pins.hx711_dt, "hx711_dt"),
            (self.pins.hx711_sck, "hx711_sck"),
            (self.pins.tare_button, "tare_button"),
            (self.pins.readout_button, "readout_button"),
            (self.pins.buzzer, "buzzer"),
            (self.pins.power_cutoff, "power_cutoff"),
            (self.pins.display_clk, "display_clk"),
            (self.pins.display_dio, "display_dio"),
        ];
        used.extend(self.pins.keypad_rows.iter().map(|p| (*p, "keypad_rows")));
        used.extend(self.pins.keypad_cols.iter().map(|p| (*p, "keypad_cols")));
        if let Some(p) = self.pins.audio_busy {
            used.push((p, "audio_busy"));
        }
        for (i, (pin, name)) in used.iter().enumerate() {
            if let Some((_, other)) = used[..i].iter().find(|(p, _)| p == pin) {
                eyre::bail!("pins.{name} reuses pin {pin} already assigned to pins.{other}");
            }
        }

        // Sensor
        if !self.sensor.scale_factor.is_finite() || self.sensor.scale_factor == 0.0 {
            eyre::bail!("sensor.scale_factor must be finite and non-zero");
        }
        if self.sensor.samples == 0 {
            eyre::bail!("sensor.samples must be >= 1");
        }
        if self.sensor.read_timeout_ms == 0 {
            eyre::bail!("sensor.read_timeout_ms must be >= 1");
        }

        // Timing
        if self.timing.tick_ms > 10_000 {
            eyre::bail!("timing.tick_ms is unreasonably large (>10s)");
        }
        if self.timing.stable_ms == 0 {
            eyre::bail!("timing.stable_ms must be >= 1");
        }
        if self.timing.idle_timeout_s == 0 {
            eyre::bail!("timing.idle_timeout_s must be >= 1");
        }
        if self.timing.idle_timeout_s > 24 * 60 * 60 {
            eyre::bail!("timing.idle_timeout_s is unreasonably large (>24h)");
        }

        // Audio
        if self.audio.volume > 30 {
            eyre::bail!("audio.volume must be in [0, 30]");
        }
        if self.audio.baud == 0 {
            eyre::bail!("audio.baud must be > 0");
        }
        if self.audio.max_wait_ms == 0 {
            eyre::bail!("audio.max_wait_ms must be >= 1");
        }
        if self.audio.poll_ms == 0 || self.audio.poll_ms > self.audio.max_wait_ms {
            eyre::bail!("audio.poll_ms must be in [1, audio.max_wait_ms]");
        }
        if self.audio.max_consecutive_timeouts == 0 {
            eyre::bail!("audio.max_consecutive_timeouts must be >= 1");
        }

        // Guidance
        let g = &self.guidance;
        if g.small_target_g < 0 {
            eyre::bail!("guidance.small_target_g must be >= 0");
        }
        if g.small_overshoot_g < 0 || g.overshoot_g < 0 || g.hit_below_g < 0 {
            eyre::bail!("guidance margins must be >= 0");
        }
        if g.approach_pct > 100 {
            eyre::bail!("guidance.approach_pct must be in [0, 100]");
        }
        if g.approach_cap_g < 0 {
            eyre::bail!("guidance.approach_cap_g must be >= 0");
        }

        // Input / display
        if !(1..=6).contains(&self.input.max_digits) {
            eyre::bail!("input.max_digits must be in [1, 6]");
        }
        if !(1..=6).contains(&self.display.digits) {
            eyre::bail!("display.digits must be in [1, 6]");
        }

        // Logging
        if let Some(r) = &self.logging.rotation
            && !matches!(r.as_str(), "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PINS_ONLY: &str = r#"
[pins]
hx711_dt = 10
hx711_sck = 12
tare_button = 3
readout_button = 2
buzzer = 7
power_cutoff = 13
keypad_rows = [17, 18, 19, 20]
keypad_cols = [21, 22, 23]
display_clk = 8
display_dio = 9
"#;

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg = load_toml(PINS_ONLY).expect("parse");
        assert_eq!(cfg.timing.stable_ms, 1000);
        assert_eq!(cfg.timing.idle_timeout_s, 120);
        assert_eq!(cfg.input.max_digits, 3);
        assert_eq!(cfg.display.digits, 4);
        assert_eq!(cfg.guidance.approach_cap_g, 50);
        assert!(cfg.pins.audio_busy.is_none());
        cfg.validate().expect("defaults are valid");
    }

    #[test]
    fn missing_pins_is_a_parse_error() {
        assert!(load_toml("[timing]\ntick_ms = 10\n").is_err());
    }
}
