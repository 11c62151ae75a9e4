//! Settling of the live reading.
//!
//! The sensor already averages internally, but the integer reading still
//! wanders while a load is being placed. A value counts as stable once it
//! has been unchanged for the stabilization window; each distinct stable
//! value is reported once.

/// Tracks the current reading and the last value that was spoken.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: u64,
    value: Option<i32>,
    last_change_ms: u64,
    last_announced: Option<i32>,
}

impl Debouncer {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            value: None,
            last_change_ms: 0,
            last_announced: None,
        }
    }

    /// Feed a sample. Returns true when the reading changed.
    pub fn update(&mut self, grams: i32, now_ms: u64) -> bool {
        if self.value == Some(grams) {
            return false;
        }
        self.value = Some(grams);
        self.last_change_ms = now_ms;
        true
    }

    pub fn reading(&self) -> Option<i32> {
        self.value
    }

    /// True when the reading has held for the window and differs from the
    /// last announced value.
    pub fn is_stable_unannounced(&self, now_ms: u64) -> bool {
        match self.value {
            Some(v) => {
                now_ms.saturating_sub(self.last_change_ms) >= self.window_ms
                    && self.last_announced != Some(v)
            }
            None => false,
        }
    }

    /// Consume the stable event, if any, marking the value as announced.
    pub fn take_stable(&mut self, now_ms: u64) -> Option<i32> {
        if !self.is_stable_unannounced(now_ms) {
            return None;
        }
        self.last_announced = self.value;
        self.value
    }

    /// Record that `grams` was spoken by other means (e.g. tare says "zero").
    pub fn mark_announced(&mut self, grams: i32) {
        self.last_announced = Some(grams);
    }

    pub fn last_announced(&self) -> Option<i32> {
        self.last_announced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_window() {
        let mut d = Debouncer::new(1000);
        assert!(d.update(250, 0));
        assert_eq!(d.take_stable(999), None);
        assert_eq!(d.take_stable(1000), Some(250));
        assert_eq!(d.take_stable(5000), None);
        assert!(!d.update(250, 6000));
        assert_eq!(d.take_stable(9000), None);
    }

    #[test]
    fn change_restarts_window() {
        let mut d = Debouncer::new(1000);
        d.update(10, 0);
        d.update(11, 900);
        assert_eq!(d.take_stable(1500), None);
        assert_eq!(d.take_stable(1900), Some(11));
    }

    #[test]
    fn returning_to_announced_value_is_silent() {
        let mut d = Debouncer::new(1000);
        d.update(10, 0);
        assert_eq!(d.take_stable(1000), Some(10));
        d.update(12, 1100);
        d.update(10, 1200);
        assert_eq!(d.take_stable(5000), None);
    }

    #[test]
    fn marked_value_is_not_repeated() {
        let mut d = Debouncer::new(1000);
        d.mark_announced(0);
        d.update(0, 0);
        assert!(!d.is_stable_unannounced(2000));
        assert_eq!(d.last_announced(), Some(0));
    }
}
