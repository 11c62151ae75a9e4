//! `From` implementations bridging `scale_config` types to `scale_core` types.

use crate::config::{AudioCfg, DisplayCfg, GuidanceCfg, InputCfg, TimingCfg};

// ── TimingCfg ────────────────────────────────────────────────────────────────

impl From<&scale_config::Timing> for TimingCfg {
    fn from(c: &scale_config::Timing) -> Self {
        Self {
            tick_ms: c.tick_ms,
            stable_ms: c.stable_ms,
            idle_timeout_ms: c.idle_timeout_s.saturating_mul(1000),
        }
    }
}

// ── AudioCfg ─────────────────────────────────────────────────────────────────

impl From<&scale_config::Audio> for AudioCfg {
    fn from(c: &scale_config::Audio) -> Self {
        Self {
            max_wait_ms: c.max_wait_ms,
            poll_ms: c.poll_ms,
            max_consecutive_timeouts: c.max_consecutive_timeouts,
        }
    }
}

// ── GuidanceCfg ──────────────────────────────────────────────────────────────

impl From<&scale_config::Guidance> for GuidanceCfg {
    fn from(c: &scale_config::Guidance) -> Self {
        Self {
            small_target_g: c.small_target_g,
            small_overshoot_g: c.small_overshoot_g,
            overshoot_g: c.overshoot_g,
            hit_below_g: c.hit_below_g,
            approach_pct: c.approach_pct,
            approach_cap_g: c.approach_cap_g,
        }
    }
}

// ── InputCfg / DisplayCfg ────────────────────────────────────────────────────

impl From<&scale_config::Input> for InputCfg {
    fn from(c: &scale_config::Input) -> Self {
        Self {
            max_digits: c.max_digits,
        }
    }
}

impl From<&scale_config::Display> for DisplayCfg {
    fn from(c: &scale_config::Display) -> Self {
        Self { digits: c.digits }
    }
}
