//! Time sources for the timer engine
//!
//! The engine never calls `Instant::now()` directly. Live runs use
//! [`SystemClock`]; tests and replays drive a [`ManualClock`] forward
//! explicitly so tick ordering can be checked without sleeping.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual clock that only moves when told to.
///
/// Clones share the same time, so a test can keep a handle after moving
/// the clock into an engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        // Leave headroom so callers can subtract latency from the origin
        let origin = Instant::now() + Duration::from_secs(60);
        Self {
            origin,
            now: Rc::new(Cell::new(origin)),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute offset from the clock's origin (never backwards)
    pub fn set_elapsed(&self, since_origin: Duration) {
        let target = self.origin + since_origin;
        if target > self.now.get() {
            self.now.set(target);
        }
    }

    /// Time since the clock was created
    pub fn elapsed(&self) -> Duration {
        self.now.get() - self.origin
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.advance_ms(250);
        assert_eq!(clock.elapsed(), Duration::from_millis(250));
        assert_eq!(clock.now(), clock.origin() + Duration::from_millis(250));
    }

    #[test]
    fn test_set_elapsed_never_goes_backwards() {
        let clock = ManualClock::new();
        clock.set_elapsed(Duration::from_millis(1000));
        clock.set_elapsed(Duration::from_millis(400));
        assert_eq!(clock.elapsed(), Duration::from_millis(1000));
    }
}
