//! Buzzer and voice guidance toward the target.
//!
//! [`classify`] is a pure function of target and reading; it is evaluated
//! from scratch on every tick, with no memory between ticks beyond the
//! band edges themselves.

use std::fmt;

use crate::config::GuidanceCfg;
use crate::speech::{Utterance, phrase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Silent,
    Approaching,
    Hit,
    Overshot,
}

impl Zone {
    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Silent => "silent",
            Zone::Approaching => "approaching",
            Zone::Hit => "hit",
            Zone::Overshot => "overshot",
        }
    }

    /// Every zone but `Silent` counts as device activity.
    pub fn is_active(self) -> bool {
        !matches!(self, Zone::Silent)
    }

    /// Buzzer pattern played each tick the reading is in this zone.
    pub fn pattern(self) -> &'static [ToneStep] {
        match self {
            Zone::Silent => &[],
            Zone::Approaching => &APPROACHING,
            Zone::Hit => &HIT,
            Zone::Overshot => &OVERSHOT,
        }
    }

    /// Spoken cue when the reading enters this zone.
    pub fn announcement(self) -> Option<Utterance> {
        match self {
            Zone::Hit => Some(phrase::target_reached()),
            Zone::Overshot => Some(phrase::overshot()),
            Zone::Silent | Zone::Approaching => None,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a buzzer pattern; 0 Hz is a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneStep {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

const fn tone(frequency_hz: u32, duration_ms: u32) -> ToneStep {
    ToneStep {
        frequency_hz,
        duration_ms,
    }
}

const fn rest(duration_ms: u32) -> ToneStep {
    tone(0, duration_ms)
}

// D#4 blip
const APPROACHING: [ToneStep; 2] = [tone(311, 200), rest(100)];
// A4 flatline
const HIT: [ToneStep; 2] = [tone(440, 1000), rest(500)];
// A4/F4 warble
const OVERSHOT: [ToneStep; 5] = [
    tone(440, 50),
    tone(350, 50),
    tone(440, 50),
    tone(350, 50),
    rest(500),
];

/// Classify `reading` against `target` (both grams).
///
/// With `difference = target - reading`:
/// - small targets (`< small_target_g`): overshot below `-small_overshoot_g`,
///   hit up to `hit_below_g`, silent otherwise;
/// - other targets: overshot below `-overshoot_g`, hit up to `hit_below_g`,
///   approaching while `difference` is inside
///   `min(approach_pct% of target, approach_cap_g)`, silent beyond.
pub fn classify(cfg: &GuidanceCfg, target: i32, reading: i32) -> Zone {
    let diff = i64::from(target) - i64::from(reading);
    let hit_below = i64::from(cfg.hit_below_g);

    if target < cfg.small_target_g {
        return if diff < -i64::from(cfg.small_overshoot_g) {
            Zone::Overshot
        } else if diff < hit_below {
            Zone::Hit
        } else {
            Zone::Silent
        };
    }

    if diff < -i64::from(cfg.overshoot_g) {
        Zone::Overshot
    } else if diff < hit_below {
        Zone::Hit
    } else if in_approach_band(cfg, target, diff) {
        Zone::Approaching
    } else {
        Zone::Silent
    }
}

/// `diff < min(pct/100 * target, cap)` without leaving integers.
#[inline]
fn in_approach_band(cfg: &GuidanceCfg, target: i32, diff: i64) -> bool {
    diff * 100 < i64::from(cfg.approach_pct) * i64::from(target)
        && diff < i64::from(cfg.approach_cap_g)
}
