//! Idle tracking for auto power-off.

/// Remembers the last activity and fires once when the device has been
/// idle for longer than the timeout.
#[derive(Debug, Clone)]
pub struct ActivityMonitor {
    timeout_ms: u64,
    last_active_ms: u64,
    fired: bool,
}

impl ActivityMonitor {
    pub fn new(timeout_ms: u64, now_ms: u64) -> Self {
        Self {
            timeout_ms,
            last_active_ms: now_ms,
            fired: false,
        }
    }

    /// Button, key or guidance activity.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_active_ms = now_ms;
    }

    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_active_ms)
    }

    /// True exactly once, on the first check past the timeout.
    pub fn check_expired(&mut self, now_ms: u64) -> bool {
        if self.fired || self.idle_ms(now_ms) <= self.timeout_ms {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}
