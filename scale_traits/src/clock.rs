use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Time source for the controller.
///
/// Everything time-dependent in the device (the debounce window, tone
/// lengths, the bounded audio wait and the idle timeout) goes through this
/// trait so the loop can be driven deterministically in tests.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Wall clock backed by `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

pub mod test_clock {
    use super::*;

    /// Virtual clock: `now()` is `origin + offset`, and `sleep(d)` moves the
    /// offset forward by `d` instead of blocking.
    ///
    /// Clones share the same offset, so a test can keep one handle and give
    /// another to the controller.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        /// Move virtual time forward.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Shorthand for `advance(Duration::from_millis(ms))`.
        pub fn advance_ms(&self, ms: u64) {
            self.advance(Duration::from_millis(ms));
        }

        /// Virtual milliseconds since the clock was created.
        pub fn elapsed_ms(&self) -> u64 {
            self.offset
                .lock()
                .map(|g| u64::try_from(g.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or(0)
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
            self.origin + off
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn sleep_advances_shared_offset() {
            let clock = TestClock::new();
            let handle = clock.clone();
            let epoch = clock.now();
            handle.sleep(Duration::from_millis(250));
            clock.advance_ms(750);
            assert_eq!(clock.ms_since(epoch), 1000);
            assert_eq!(handle.elapsed_ms(), 1000);
        }
    }
}
