//! Timer run (runtime state of one countdown)
//!
//! A `TimerRun` is created by `TimerEngine::start` and dropped on `stop`,
//! on supersession, or once both of its schedules have been cancelled.
//!
//! # Lifecycle
//!
//! 1. Trigger fires → run created, start instant shifted back by ping
//! 2. Label and bar schedules tick independently
//! 3. Label schedule cancels itself once the sequence is exhausted
//! 4. Bar schedule performs the terminal transition and cancels itself

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::phase::{PhaseStatus, PhaseTimeline};
use super::schedule::{BAR_TICK_INTERVAL, RepeatingTick, TickKind};
use crate::position::OverlayPosition;
use crate::sequences::Sequence;

#[derive(Debug, Clone)]
pub struct TimerRun {
    /// Monotonic id, unique per engine
    pub id: u64,

    // ─── Sequence ───────────────────────────────────────────────────────────
    sequence: Arc<Sequence>,
    timeline: PhaseTimeline,

    // ─── Timing ─────────────────────────────────────────────────────────────
    /// When `start()` was called
    started_at: Instant,
    /// `started_at` minus the ping offset; elapsed time is measured from here
    start_instant: Instant,
    ping_offset: Duration,

    // ─── Display ────────────────────────────────────────────────────────────
    /// Resolved once at start; later position changes do not move this run
    position: OverlayPosition,

    // ─── Schedules ──────────────────────────────────────────────────────────
    label_tick: Option<RepeatingTick>,
    bar_tick: Option<RepeatingTick>,
}

impl TimerRun {
    pub fn new(
        id: u64,
        sequence: Arc<Sequence>,
        started_at: Instant,
        ping_offset: Duration,
        position: OverlayPosition,
        label_interval: Duration,
    ) -> Self {
        let timeline = PhaseTimeline::new(&sequence);
        let start_instant = started_at.checked_sub(ping_offset).unwrap_or(started_at);

        Self {
            id,
            sequence,
            timeline,
            started_at,
            start_instant,
            ping_offset,
            position,
            label_tick: Some(RepeatingTick::new(TickKind::Label, label_interval, started_at)),
            bar_tick: Some(RepeatingTick::new(TickKind::Bar, BAR_TICK_INTERVAL, started_at)),
        }
    }

    pub fn sequence(&self) -> &Arc<Sequence> {
        &self.sequence
    }

    pub fn position(&self) -> &OverlayPosition {
        &self.position
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn start_instant(&self) -> Instant {
        self.start_instant
    }

    pub fn ping_offset(&self) -> Duration {
        self.ping_offset
    }

    /// Time since the (ping adjusted) start
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start_instant)
    }

    pub fn resolve(&self, now: Instant) -> PhaseStatus {
        self.timeline.resolve(self.elapsed(now))
    }

    pub fn schedule(&self, kind: TickKind) -> Option<&RepeatingTick> {
        match kind {
            TickKind::Label => self.label_tick.as_ref(),
            TickKind::Bar => self.bar_tick.as_ref(),
        }
    }

    fn schedule_mut(&mut self, kind: TickKind) -> &mut Option<RepeatingTick> {
        match kind {
            TickKind::Label => &mut self.label_tick,
            TickKind::Bar => &mut self.bar_tick,
        }
    }

    /// Earliest due schedule at `now`; label wins ties
    pub fn due_tick(&self, now: Instant) -> Option<TickKind> {
        [self.label_tick, self.bar_tick]
            .into_iter()
            .flatten()
            .filter(|t| t.is_due(now))
            .min_by_key(|t| t.next_due())
            .map(|t| t.kind())
    }

    /// Earliest pending deadline over both schedules
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.label_tick, self.bar_tick]
            .into_iter()
            .flatten()
            .map(|t| t.next_due())
            .min()
    }

    pub fn reschedule(&mut self, kind: TickKind, now: Instant) {
        if let Some(tick) = self.schedule_mut(kind) {
            tick.reschedule(now);
        }
    }

    /// Cancel one schedule. Returns true if it was live.
    pub fn cancel(&mut self, kind: TickKind) -> bool {
        self.schedule_mut(kind).take().is_some()
    }

    pub fn cancel_all(&mut self) {
        self.label_tick = None;
        self.bar_tick = None;
    }

    pub fn has_live_schedules(&self) -> bool {
        self.label_tick.is_some() || self.bar_tick.is_some()
    }
}
