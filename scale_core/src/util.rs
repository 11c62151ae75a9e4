//! Common time helpers for scale_core.

use std::time::Duration;

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

#[inline]
pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Whole seconds, rounded down, for log fields.
#[inline]
pub fn secs_floor(ms: u64) -> u64 {
    ms / MILLIS_PER_SEC
}
