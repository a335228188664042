//! Tests for TimerEngine scheduling and presentation
//!
//! Verifies that:
//! - Phases resolve and render at the right instants
//! - The terminal transition happens exactly once per run
//! - start/stop supersede and cancel cleanly
//! - Ping compensation shifts the start instant

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clonewatch_types::{CombatStyle, HostScreen, Settings, overlay_colors};

use super::{Clock, EngineState, ManualClock, PhaseStatus, ProgressColor, TickReport, TimerEngine};
use crate::icons::{IconData, IconSet};
use crate::presenter::{DrawCall, FINAL_MESSAGE_TEXT, Layer, RecordingSurface};
use crate::sequences::{Phase, Sequence, SequenceCatalog};

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn icons(names: &[&str]) -> IconSet {
    let mut set = IconSet::new();
    for name in names {
        set.insert(IconData::solid(*name, 64, 64, [255, 255, 255, 255]));
    }
    set
}

fn two_phase() -> Arc<Sequence> {
    Arc::new(
        Sequence::new(
            "two",
            vec![Phase::from_millis(["a"], 1800), Phase::from_millis(["b"], 1800)],
        )
        .unwrap(),
    )
}

fn single(icon: &str, ms: u64) -> Arc<Sequence> {
    Arc::new(Sequence::new(icon, vec![Phase::from_millis([icon], ms)]).unwrap())
}

struct Harness {
    engine: TimerEngine<RecordingSurface, IconSet, ManualClock>,
    clock: ManualClock,
    completions: Rc<Cell<u32>>,
    settings: Settings,
    host: HostScreen,
}

impl Harness {
    fn new(settings: Settings) -> Self {
        Self::with_icons(settings, icons(&["a", "b", "z"]))
    }

    fn with_icons(settings: Settings, icon_set: IconSet) -> Self {
        let clock = ManualClock::new();
        let mut engine = TimerEngine::with_clock(RecordingSurface::new(), icon_set, clock.clone());

        let completions = Rc::new(Cell::new(0));
        let counter = completions.clone();
        engine.on_complete(move || counter.set(counter.get() + 1));

        Self {
            engine,
            clock,
            completions,
            settings,
            host: HostScreen::default(),
        }
    }

    fn start(&mut self, sequence: Arc<Sequence>) -> u64 {
        self.engine.start(sequence, &self.settings, &self.host)
    }

    /// Step through every deadline up to `ms` after the clock origin
    fn run_to(&mut self, ms: u64) -> TickReport {
        let target = self.clock.origin() + Duration::from_millis(ms);
        let mut total = TickReport::default();

        while let Some(deadline) = self.engine.next_deadline() {
            if deadline > target {
                break;
            }
            self.clock.set_elapsed(deadline - self.clock.origin());
            let report = self.engine.advance(&self.settings);
            total.label_ticks += report.label_ticks;
            total.bar_ticks += report.bar_ticks;
            total.completed |= report.completed;
        }

        self.clock.set_elapsed(Duration::from_millis(ms));
        total
    }

    fn surface(&mut self) -> &mut RecordingSurface {
        self.engine.surface_mut()
    }

    fn phase(&self) -> PhaseStatus {
        self.engine.current_phase().expect("no live run")
    }
}

fn ticks_mode() -> Settings {
    Settings {
        use_ticks: true,
        ..Settings::default()
    }
}

fn last_image(calls: &[DrawCall], layer: Layer) -> Option<&str> {
    calls.iter().rev().find_map(|c| match c {
        DrawCall::Image { layer: l, name, .. } if *l == layer => Some(name.as_str()),
        _ => None,
    })
}

/// (color, width) of the most recent filled bar segment
fn last_bar_fill(calls: &[DrawCall]) -> Option<([u8; 4], i32)> {
    calls.iter().rev().find_map(|c| match c {
        DrawCall::Line { layer: Layer::Bar, color, from, to, .. }
            if *color != overlay_colors::BAR_BG =>
        {
            Some((*color, to.0 - from.0))
        }
        _ => None,
    })
}

fn active(status: PhaseStatus) -> super::PhaseSnapshot {
    match status {
        PhaseStatus::Active(snapshot) => snapshot,
        PhaseStatus::Exhausted => panic!("expected an active phase"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Start / Render
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_start_draws_first_label_immediately() {
    let mut h = Harness::new(Settings::default());
    let id = h.start(two_phase());

    assert_eq!(id, 1);
    assert_eq!(h.engine.state(), EngineState::Running);
    assert!(h.engine.is_active());

    let calls = h.surface().take_calls();
    assert_eq!(calls[0], DrawCall::Clear(Layer::Label));
    assert_eq!(last_image(&calls, Layer::Label), Some("a"));
    match calls.last() {
        Some(DrawCall::Text { layer, text, color, ttl, .. }) => {
            assert_eq!(*layer, Layer::Label);
            assert_eq!(text, "1.8s");
            assert_eq!(*color, overlay_colors::SAFE);
            // 16ms label interval + 100ms
            assert_eq!(*ttl, Duration::from_millis(116));
        }
        other => panic!("unexpected call {other:?}"),
    }

    // Both schedules pending, label first
    assert_eq!(
        h.engine.next_deadline(),
        Some(h.clock.origin() + Duration::from_millis(16))
    );
}

#[test]
fn test_two_phase_end_to_end() {
    let mut h = Harness::new(ticks_mode());
    h.start(two_phase());

    let snap = active(h.phase());
    assert_eq!(snap.index, 0);
    assert_eq!(snap.remaining, Duration::from_millis(1800));
    assert_eq!(snap.progress, 1.0);
    assert_eq!(snap.color(), ProgressColor::Safe);

    // elapsed = 1000
    let report = h.run_to(1000);
    assert_eq!(report.bar_ticks, 20);
    assert_eq!(report.label_ticks, 1);
    let snap = active(h.phase());
    assert_eq!(snap.index, 0);
    assert_eq!(snap.remaining, Duration::from_millis(800));
    assert!((snap.progress - 0.444).abs() < 0.001);
    assert_eq!(snap.color(), ProgressColor::Warning);

    let calls = h.surface().take_calls();
    assert_eq!(last_bar_fill(&calls), Some((overlay_colors::WARNING, 53)));
    let texts: Vec<&str> = calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    // immediate render, then the 600ms label tick floored to whole ticks
    assert_eq!(texts, vec!["1.8s", "1.2s"]);

    // elapsed = 1800: boundary belongs to phase 1
    h.run_to(1800);
    let snap = active(h.phase());
    assert_eq!(snap.index, 1);
    assert_eq!(snap.remaining, Duration::from_millis(1800));
    assert_eq!(snap.progress, 1.0);

    let calls = h.surface().take_calls();
    assert_eq!(last_image(&calls, Layer::Label), Some("b"));
    assert_eq!(last_bar_fill(&calls), Some((overlay_colors::SAFE, 120)));

    // elapsed = 3600: exhausted
    let report = h.run_to(3600);
    assert!(report.completed);
    assert_eq!(h.engine.state(), EngineState::Completed);
    assert!(!h.engine.is_active());
    assert_eq!(h.completions.get(), 1);

    let calls = h.surface().take_calls();
    assert_eq!(last_image(&calls, Layer::Final), Some("b"));
    assert!(calls.iter().any(|c| matches!(
        c,
        DrawCall::Text { layer: Layer::Final, text, color, .. }
            if text == FINAL_MESSAGE_TEXT && *color == overlay_colors::FINAL_TEXT
    )));

    // Nothing left to run
    assert_eq!(h.engine.next_deadline(), None);
    assert!(h.engine.run().is_none());
    let report = h.run_to(10_000);
    assert!(report.is_empty());
    assert_eq!(h.completions.get(), 1);
    assert!(h.surface().calls().is_empty());
}

#[test]
fn test_terminal_transition_clears_run_layers_first() {
    let mut h = Harness::new(ticks_mode());
    h.start(single("z", 600));
    h.run_to(550);
    h.surface().take_calls();

    h.run_to(600);
    let calls = h.surface().take_calls();
    let first_final = calls
        .iter()
        .position(|c| c.layer() == Layer::Final && c.is_draw())
        .unwrap();
    let cleared: Vec<Layer> = calls[..first_final]
        .iter()
        .filter_map(|c| match c {
            DrawCall::Clear(layer) => Some(*layer),
            _ => None,
        })
        .collect();
    assert!(cleared.ends_with(&[Layer::Label, Layer::Bar, Layer::Final]));
}

#[test]
fn test_label_schedule_cancels_itself_after_exhaustion() {
    // 16ms label ticks straddle the 1000ms end (992, 1008)
    let mut h = Harness::new(Settings::default());
    h.start(single("z", 1000));

    let report = h.run_to(1000);
    assert!(report.completed);
    assert_eq!(h.engine.state(), EngineState::Completed);
    // label schedule still pending
    assert!(h.engine.run().is_some());
    h.surface().take_calls();

    let report = h.run_to(1008);
    assert_eq!(report.label_ticks, 1);
    assert_eq!(report.bar_ticks, 0);
    assert!(h.surface().calls().is_empty());
    assert!(h.engine.run().is_none());
    assert_eq!(h.completions.get(), 1);
}

#[test]
fn test_completion_once_per_run() {
    let mut h = Harness::new(ticks_mode());

    h.start(two_phase());
    h.run_to(5000);
    assert_eq!(h.completions.get(), 1);

    h.start(single("a", 1200));
    h.run_to(7000);
    assert_eq!(h.completions.get(), 2);
    assert_eq!(h.engine.state(), EngineState::Completed);
}

#[test]
fn test_missed_ticks_are_coalesced() {
    let mut h = Harness::new(ticks_mode());
    h.start(two_phase());

    // Driver stalls for a full second
    h.clock.advance_ms(1000);
    let report = h.engine.advance(&h.settings);
    assert_eq!(report.label_ticks, 1);
    assert_eq!(report.bar_ticks, 1);

    assert_eq!(
        h.engine.next_deadline(),
        Some(h.clock.now() + Duration::from_millis(50))
    );
}

#[test]
fn test_missing_icons_are_omitted() {
    let mut h = Harness::with_icons(ticks_mode(), icons(&["a"]));
    h.start(two_phase());
    h.run_to(1800);

    let calls = h.surface().take_calls();
    let tail_start = calls
        .iter()
        .rposition(|c| *c == DrawCall::Clear(Layer::Label))
        .unwrap();
    let tail = &calls[tail_start..];
    assert!(!tail.iter().any(|c| matches!(c, DrawCall::Image { .. })));
    assert!(tail.iter().any(|c| matches!(c, DrawCall::Text { .. })));
}

#[test]
fn test_failing_surface_does_not_stop_countdown() {
    let mut h = Harness::new(ticks_mode());
    h.surface().fail_draws(true);
    h.start(two_phase());

    h.run_to(4000);
    assert_eq!(h.engine.state(), EngineState::Completed);
    assert_eq!(h.completions.get(), 1);
    assert!(h.surface().draws().next().is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// Supersession / Stop
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_restart_supersedes_previous_run() {
    let mut h = Harness::new(ticks_mode());
    h.start(two_phase());
    h.run_to(700);
    h.surface().take_calls();

    let id = h.start(single("z", 5000));
    assert_eq!(id, 2);

    let run = h.engine.run().unwrap();
    assert_eq!(run.start_instant(), h.clock.origin() + Duration::from_millis(700));

    let calls = h.surface().take_calls();
    assert_eq!(
        &calls[..3],
        &[
            DrawCall::Clear(Layer::Label),
            DrawCall::Clear(Layer::Bar),
            DrawCall::Clear(Layer::Final)
        ]
    );

    // The old run would have completed at 3600
    h.run_to(4000);
    assert_eq!(h.completions.get(), 0);
    assert_eq!(h.engine.state(), EngineState::Running);

    let calls = h.surface().take_calls();
    let names: Vec<&str> = calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::Image { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert!(!names.is_empty());
    assert!(names.iter().all(|n| *n == "z"));

    h.run_to(5700);
    assert_eq!(h.completions.get(), 1);
}

#[test]
fn test_restart_after_completion_clears_final_message() {
    let mut h = Harness::new(Settings::default());
    h.start(single("z", 600));
    h.run_to(700);
    assert_eq!(h.engine.state(), EngineState::Completed);
    assert!(h.engine.run().is_none());
    h.surface().take_calls();

    h.start(single("a", 5000));
    let calls = h.surface().take_calls();
    assert_eq!(
        &calls[..3],
        &[
            DrawCall::Clear(Layer::Label),
            DrawCall::Clear(Layer::Bar),
            DrawCall::Clear(Layer::Final)
        ]
    );
    assert_eq!(h.engine.state(), EngineState::Running);
}

#[test]
fn test_start_from_idle_clears_nothing() {
    let mut h = Harness::new(Settings::default());
    h.start(single("a", 5000));
    assert!(h.surface().cleared_layers().iter().all(|l| *l == Layer::Label));
}

#[test]
fn test_stop_when_idle_has_no_effect() {
    let mut h = Harness::new(Settings::default());
    assert!(!h.engine.stop());
    assert!(!h.engine.stop());
    assert!(h.surface().calls().is_empty());
    assert_eq!(h.engine.state(), EngineState::Idle);
    assert_eq!(h.completions.get(), 0);
}

#[test]
fn test_stop_cancels_run() {
    let mut h = Harness::new(Settings::default());
    h.start(two_phase());
    h.run_to(500);
    h.surface().take_calls();

    assert!(h.engine.stop());
    assert_eq!(h.engine.state(), EngineState::Idle);
    assert!(!h.engine.is_active());
    assert_eq!(h.engine.next_deadline(), None);
    assert_eq!(
        h.surface().cleared_layers(),
        vec![Layer::Label, Layer::Bar, Layer::Final]
    );
    h.surface().take_calls();

    let report = h.run_to(5000);
    assert!(report.is_empty());
    assert!(!h.engine.stop());
    assert!(h.surface().calls().is_empty());
    assert_eq!(h.completions.get(), 0);
}

#[test]
fn test_stop_after_completion_returns_to_idle() {
    let mut h = Harness::new(ticks_mode());
    h.start(single("z", 600));
    h.run_to(700);
    assert_eq!(h.engine.state(), EngineState::Completed);
    h.surface().take_calls();

    assert!(h.engine.stop());
    assert_eq!(h.engine.state(), EngineState::Idle);
    assert!(h.surface().cleared_layers().contains(&Layer::Final));
    assert_eq!(h.completions.get(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Ping Compensation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_ping_compensation_shifts_start() {
    let mut h = Harness::new(Settings {
        compensate_for_ping: true,
        ..ticks_mode()
    });
    h.host.ping_ms = 300;
    h.start(two_phase());

    let run = h.engine.run().unwrap();
    assert_eq!(run.start_instant(), h.clock.origin() - Duration::from_millis(300));
    assert_eq!(active(h.phase()).remaining, Duration::from_millis(1500));
    assert_eq!(h.engine.surface().texts_on(Layer::Label), vec!["1.2s"]);

    // Completes 300ms early
    h.run_to(3300);
    assert_eq!(h.completions.get(), 1);
}

#[test]
fn test_ping_ignored_when_disabled_or_zero() {
    let mut h = Harness::new(Settings::default());
    h.host.ping_ms = 300;
    h.start(two_phase());
    assert_eq!(h.engine.run().unwrap().start_instant(), h.clock.origin());

    let mut h = Harness::new(Settings {
        compensate_for_ping: true,
        ..Settings::default()
    });
    h.host.ping_ms = 0;
    h.start(two_phase());
    assert_eq!(h.engine.run().unwrap().start_instant(), h.clock.origin());
}

#[test]
fn test_ping_beyond_sequence_completes_on_first_bar_tick() {
    let mut h = Harness::new(Settings {
        compensate_for_ping: true,
        ..ticks_mode()
    });
    h.host.ping_ms = 5000;
    h.start(two_phase());

    // Immediate label sees exhaustion and draws nothing
    assert!(h.surface().draws().next().is_none());

    let report = h.run_to(50);
    assert!(report.completed);
    assert_eq!(h.completions.get(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Preview
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_preview_draws_first_phase_without_running() {
    let mut h = Harness::new(Settings::default());
    let seq = two_phase();
    h.engine.preview(&seq, &h.settings, &h.host);

    assert_eq!(h.engine.state(), EngineState::Idle);
    assert_eq!(h.engine.next_deadline(), None);

    let calls = h.surface().take_calls();
    assert!(calls.iter().all(|c| c.layer() == Layer::Debug));
    assert_eq!(last_image(&calls, Layer::Debug), Some("a"));
    assert!(calls.iter().any(|c| matches!(
        c,
        DrawCall::Text { text, color, .. } if text == "1.8s" && *color == overlay_colors::SAFE
    )));

    // stop() leaves the preview alone
    h.start(seq);
    h.engine.stop();
    assert!(!h.surface().cleared_layers().contains(&Layer::Debug));

    h.surface().take_calls();
    h.engine.clear_preview();
    assert_eq!(h.surface().calls(), &[DrawCall::Clear(Layer::Debug)]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Color Thresholds
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_builtin_durations_hit_exact_color_boundaries() {
    let catalog = SequenceCatalog::builtin().unwrap();
    let magic = catalog.get(CombatStyle::Magic).unwrap();
    let mut h = Harness::with_icons(Settings::default(), icons(&["magic", "omni", "nami"]));
    h.start(magic);

    // 5400ms opener: half at 2700, a fifth at 4320
    h.run_to(2700);
    assert_eq!(active(h.phase()).color(), ProgressColor::Warning);
    h.run_to(4319);
    assert_eq!(active(h.phase()).color(), ProgressColor::Warning);

    // A label tick lands exactly on 4320 (16ms interval)
    h.surface().take_calls();
    h.run_to(4320);
    assert_eq!(active(h.phase()).color(), ProgressColor::Danger);
    let label_color = h.surface().calls().iter().rev().find_map(|c| match c {
        DrawCall::Text { layer: Layer::Label, color, .. } => Some(*color),
        _ => None,
    });
    assert_eq!(label_color, Some(overlay_colors::DANGER));

    // 1800ms phases: half at 900, a fifth at 1440
    h.run_to(5400 + 900);
    let snap = active(h.phase());
    assert_eq!(snap.index, 1);
    assert_eq!(snap.color(), ProgressColor::Warning);
    h.run_to(5400 + 1440);
    let snap = active(h.phase());
    assert_eq!(snap.remaining, Duration::from_millis(360));
    assert_eq!(snap.color(), ProgressColor::Danger);
}
