//! Runtime configuration for the controller.
//!
//! These are the structs `Controller` consumes. They are separate from the
//! TOML-deserialized config in `scale_config`; see `conversions` for the
//! bridge.

/// Loop timing, debounce window and idle timeout.
#[derive(Debug, Clone)]
pub struct TimingCfg {
    /// Pause between ticks in `runner::run`.
    pub tick_ms: u64,
    /// A reading must stay unchanged this long to count as stable.
    pub stable_ms: u64,
    /// Power off after this long without activity. Fires on strictly greater.
    pub idle_timeout_ms: u64,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            tick_ms: 500,
            stable_ms: 1000,
            idle_timeout_ms: 120_000,
        }
    }
}

/// Bounded playback of audio tokens.
#[derive(Debug, Clone)]
pub struct AudioCfg {
    /// Give up waiting for a token after this long.
    pub max_wait_ms: u64,
    /// Busy poll interval.
    pub poll_ms: u64,
    /// Mute after this many timeouts in a row.
    pub max_consecutive_timeouts: u8,
}

impl Default for AudioCfg {
    fn default() -> Self {
        Self {
            max_wait_ms: 5000,
            poll_ms: 20,
            max_consecutive_timeouts: 3,
        }
    }
}

/// Zone thresholds in grams. Defaults are the final firmware values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidanceCfg {
    /// Below this target there is no approach zone.
    pub small_target_g: i32,
    /// Small targets: overshot when `target - reading < -small_overshoot_g`.
    pub small_overshoot_g: i32,
    /// Overshot when `target - reading < -overshoot_g`.
    pub overshoot_g: i32,
    /// Hit while `target - reading < hit_below_g`.
    pub hit_below_g: i32,
    /// Approach band is `approach_pct` percent of the target...
    pub approach_pct: u8,
    /// ...but never wider than this.
    pub approach_cap_g: i32,
}

impl Default for GuidanceCfg {
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

#[derive(Debug, Clone)]
pub struct InputCfg {
    /// Digits accepted in one entry; one more is rejected as overflow.
    pub max_digits: u8,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self { max_digits: 3 }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayCfg {
    pub digits: u8,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self { digits: 4 }
    }
}
