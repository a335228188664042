//! Repeating tick schedules
//!
//! A run owns at most one schedule per [`TickKind`]. Cancelling a schedule
//! drops it from the run, so a cancelled or superseded run has nothing left
//! that could fire.

use std::time::{Duration, Instant};

/// Label/icon refresh cadence in tick display mode
pub const LABEL_TICK_INTERVAL: Duration = Duration::from_millis(600);
/// Label/icon refresh cadence in seconds display mode
pub const LABEL_SMOOTH_INTERVAL: Duration = Duration::from_millis(16);
/// Progress bar refresh cadence
pub const BAR_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Which repeating callback a schedule drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    Label,
    Bar,
}

impl TickKind {
    /// Draw lifetime for one tick's output: long enough to bridge to the next tick
    pub fn draw_ttl(&self, interval: Duration) -> Duration {
        match self {
            TickKind::Label => interval + Duration::from_millis(100),
            TickKind::Bar => interval + Duration::from_millis(50),
        }
    }
}

/// Interval for the label tick
pub fn label_interval(use_ticks: bool) -> Duration {
    if use_ticks {
        LABEL_TICK_INTERVAL
    } else {
        LABEL_SMOOTH_INTERVAL
    }
}

/// A fixed-rate repeating schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatingTick {
    kind: TickKind,
    interval: Duration,
    next_due: Instant,
}

impl RepeatingTick {
    /// First firing is one interval after `started`
    pub fn new(kind: TickKind, interval: Duration, started: Instant) -> Self {
        Self {
            kind,
            interval,
            next_due: started + interval,
        }
    }

    pub fn kind(&self) -> TickKind {
        self.kind
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    #[inline]
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due <= now
    }

    /// Advance to the next slot after `now`.
    ///
    /// Fixed rate while keeping up; when late by a full interval or more the
    /// missed slots are coalesced into one instead of firing in a burst.
    pub fn reschedule(&mut self, now: Instant) {
        self.next_due += self.interval;
        if self.next_due <= now {
            self.next_due = now + self.interval;
        }
    }
}
