//! Countdown timer engine
//!
//! Owns at most one [`TimerRun`] and drives its two schedules against an
//! injected [`Clock`]. The engine does no waiting of its own: the driver asks
//! for [`TimerEngine::next_deadline`], sleeps until then and calls
//! [`TimerEngine::advance`].
//!
//! ```text
//!   Idle ──start──▶ Running ──bar tick sees exhaustion──▶ Completed
//!    ▲                 │                                      │
//!    └──────stop───────┴──────────────stop────────────────────┘
//! ```
//!
//! `start` while Running or Completed supersedes the old run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clonewatch_types::{HostScreen, Settings};

use super::clock::{Clock, SystemClock};
use super::phase::{PhaseStatus, ProgressColor, label_text};
use super::run::TimerRun;
use super::schedule::{BAR_TICK_INTERVAL, TickKind, label_interval};
use crate::icons::IconProvider;
use crate::position::OverlayPosition;
use crate::presenter::{Layer, OverlayPresenter, OverlaySurface};
use crate::sequences::Sequence;

/// Called once per run that reaches the terminal transition
pub type CompletionCallback = Box<dyn FnMut()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Idle,
    Running,
    Completed,
}

/// What one `advance()` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub label_ticks: u32,
    pub bar_ticks: u32,
    /// The run reached its terminal transition during this call
    pub completed: bool,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.label_ticks == 0 && self.bar_ticks == 0
    }
}

/// Latency to subtract from a run's start instant
pub fn ping_offset(settings: &Settings, host: &HostScreen) -> Duration {
    if settings.compensate_for_ping && host.ping_ms > 0 {
        Duration::from_millis(u64::from(host.ping_ms))
    } else {
        Duration::ZERO
    }
}

pub struct TimerEngine<S, I, C = SystemClock> {
    presenter: OverlayPresenter<S>,
    icons: I,
    clock: C,

    /// Live run; dropped once both schedules are cancelled
    run: Option<TimerRun>,
    state: EngineState,
    next_run_id: u64,
    on_complete: Option<CompletionCallback>,
}

impl<S: OverlaySurface, I: IconProvider> TimerEngine<S, I, SystemClock> {
    pub fn new(surface: S, icons: I) -> Self {
        Self::with_clock(surface, icons, SystemClock)
    }
}

impl<S: OverlaySurface, I: IconProvider, C: Clock> TimerEngine<S, I, C> {
    pub fn with_clock(surface: S, icons: I, clock: C) -> Self {
        Self {
            presenter: OverlayPresenter::new(surface),
            icons,
            clock,
            run: None,
            state: EngineState::Idle,
            next_run_id: 1,
            on_complete: None,
        }
    }

    /// Install the completion callback, replacing any previous one
    pub fn on_complete(&mut self, callback: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// True from `start()` until exhaustion or `stop()`
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn run(&self) -> Option<&TimerRun> {
        self.run.as_ref()
    }

    pub fn surface(&self) -> &S {
        self.presenter.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.presenter.surface_mut()
    }

    /// Phase status of the live run right now
    pub fn current_phase(&self) -> Option<PhaseStatus> {
        self.run.as_ref().map(|run| run.resolve(self.clock.now()))
    }

    /// Earliest instant at which `advance()` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.run.as_ref().and_then(TimerRun::next_deadline)
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// Start a countdown for `sequence`, superseding any existing run.
    ///
    /// Draws the first label immediately. Returns the new run id.
    pub fn start(&mut self, sequence: Arc<Sequence>, settings: &Settings, host: &HostScreen) -> u64 {
        if let Some(previous) = self.run.take() {
            tracing::debug!(run_id = previous.id, "Superseding timer run");
        }
        // A completed run may already be dropped while "NOW!" is still shown
        if self.state != EngineState::Idle {
            self.presenter.clear_run_layers();
        }

        let now = self.clock.now();
        let ping = ping_offset(settings, host);
        let position = OverlayPosition::resolve(settings, host);
        let interval = label_interval(settings.use_ticks);

        let id = self.next_run_id;
        self.next_run_id += 1;

        tracing::info!(
            run_id = id,
            sequence = %sequence.name(),
            phases = sequence.len(),
            ping_ms = ping.as_millis() as u64,
            "Timer started"
        );

        self.run = Some(TimerRun::new(id, sequence, now, ping, position, interval));
        self.state = EngineState::Running;

        self.label_tick(now, settings);
        id
    }

    /// Cancel the run and clear its layers. No effect when Idle.
    ///
    /// Returns true if anything was stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == EngineState::Idle && self.run.is_none() {
            return false;
        }

        if let Some(run) = self.run.take() {
            tracing::info!(run_id = run.id, "Timer stopped");
        }
        self.presenter.clear_run_layers();
        self.state = EngineState::Idle;
        true
    }

    /// Run every schedule that is due, in deadline order
    pub fn advance(&mut self, settings: &Settings) -> TickReport {
        let now = self.clock.now();
        let mut report = TickReport::default();

        while let Some(run) = self.run.as_mut() {
            let Some(kind) = run.due_tick(now) else {
                break;
            };
            // Reschedule first so the tick itself may cancel the slot
            run.reschedule(kind, now);

            match kind {
                TickKind::Label => {
                    report.label_ticks += 1;
                    self.label_tick(now, settings);
                }
                TickKind::Bar => {
                    report.bar_ticks += 1;
                    report.completed |= self.bar_tick(now, settings);
                }
            }
        }

        if self.run.as_ref().is_some_and(|run| !run.has_live_schedules()) {
            self.run = None;
        }

        report
    }

    // ─── Preview ────────────────────────────────────────────────────────────

    /// Static snapshot of the first phase at full progress on the debug layer.
    /// Does not start or touch any run.
    pub fn preview(&mut self, sequence: &Sequence, settings: &Settings, host: &HostScreen) {
        let position = OverlayPosition::resolve(settings, host);
        let first = sequence.first();
        let icons = self.icons.resolve(&first.icon_ids);
        let text = label_text(first.duration, settings.use_ticks);

        self.presenter.draw_preview(
            &icons,
            &text,
            ProgressColor::Safe.rgba(),
            &position,
            settings,
        );
    }

    pub fn clear_preview(&mut self) {
        self.presenter.clear(Layer::Debug);
    }

    // ─── Ticks ──────────────────────────────────────────────────────────────

    fn label_tick(&mut self, now: Instant, settings: &Settings) {
        let Some(run) = self.run.as_mut() else {
            return;
        };

        let snapshot = match run.resolve(now) {
            PhaseStatus::Active(snapshot) => snapshot,
            PhaseStatus::Exhausted => {
                run.cancel(TickKind::Label);
                tracing::debug!(run_id = run.id, "Label schedule finished");
                return;
            }
        };

        let interval = run
            .schedule(TickKind::Label)
            .map_or_else(|| label_interval(settings.use_ticks), |t| t.interval());
        let ttl = TickKind::Label.draw_ttl(interval);

        let phase = &run.sequence().phases()[snapshot.index];
        let icons = self.icons.resolve(&phase.icon_ids);
        let text = label_text(snapshot.remaining, settings.use_ticks);
        let position = run.position();

        self.presenter.clear(Layer::Label);
        self.presenter
            .draw_icons(Layer::Label, &icons, position, settings, ttl);
        self.presenter.draw_label(
            Layer::Label,
            &text,
            snapshot.color().rgba(),
            position,
            settings,
            ttl,
        );
    }

    /// Returns true if this tick performed the terminal transition
    fn bar_tick(&mut self, now: Instant, settings: &Settings) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };

        self.presenter.clear(Layer::Bar);

        match run.resolve(now) {
            PhaseStatus::Active(snapshot) => {
                self.presenter.draw_progress_bar(
                    Layer::Bar,
                    snapshot.progress,
                    snapshot.color().rgba(),
                    run.position(),
                    settings,
                    TickKind::Bar.draw_ttl(BAR_TICK_INTERVAL),
                );
                false
            }
            PhaseStatus::Exhausted => {
                run.cancel(TickKind::Bar);

                self.presenter.clear_run_layers();
                let icons = self.icons.resolve(&run.sequence().last().icon_ids);
                self.presenter
                    .draw_final_message(&icons, run.position(), settings);

                self.state = EngineState::Completed;
                tracing::info!(
                    run_id = run.id,
                    sequence = %run.sequence().name(),
                    "Timer completed"
                );

                if let Some(callback) = self.on_complete.as_mut() {
                    callback();
                }
                true
            }
        }
    }
}
