//! Phase resolution math
//!
//! Maps elapsed run time to the current phase, remaining time and progress.
//! A phase owns the half-open interval `[start, end)`: at exactly its end
//! threshold the next phase begins.

use std::time::Duration;

use clonewatch_types::{Color, overlay_colors};

use crate::sequences::Sequence;

/// Prefix sums of phase durations for one sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTimeline {
    /// `end_times[i]` is the elapsed time at which phase `i` ends
    end_times: Vec<Duration>,
}

/// The current phase at some elapsed time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSnapshot {
    pub index: usize,
    pub remaining: Duration,
    pub duration: Duration,
    /// `remaining / duration`, in (0, 1]. Bar width only; color thresholds
    /// are decided on the exact durations.
    pub progress: f32,
}

impl PhaseSnapshot {
    pub fn color(&self) -> ProgressColor {
        ProgressColor::for_remaining(self.remaining, self.duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseStatus {
    Active(PhaseSnapshot),
    /// Elapsed time is at or past the last threshold
    Exhausted,
}

impl PhaseTimeline {
    pub fn new(sequence: &Sequence) -> Self {
        let mut total = Duration::ZERO;
        let end_times = sequence
            .phases()
            .iter()
            .map(|phase| {
                total += phase.duration;
                total
            })
            .collect();
        Self { end_times }
    }

    pub fn end_times(&self) -> &[Duration] {
        &self.end_times
    }

    pub fn total(&self) -> Duration {
        self.end_times.last().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.end_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.end_times.is_empty()
    }

    /// Resolve the phase for `elapsed` by linear scan
    pub fn resolve(&self, elapsed: Duration) -> PhaseStatus {
        let mut phase_start = Duration::ZERO;

        for (index, &end) in self.end_times.iter().enumerate() {
            if elapsed < end {
                let duration = end - phase_start;
                let remaining = end - elapsed;
                let progress = (remaining.as_nanos() as f64 / duration.as_nanos() as f64) as f32;
                return PhaseStatus::Active(PhaseSnapshot {
                    index,
                    remaining,
                    duration,
                    progress,
                });
            }
            phase_start = end;
        }

        PhaseStatus::Exhausted
    }
}

/// Three-level urgency color for the remaining fraction of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressColor {
    Safe,
    Warning,
    Danger,
}

impl ProgressColor {
    /// Strictly greater-than thresholds on `remaining / duration`: exactly
    /// half is a warning and exactly a fifth is danger. Integer math, so the
    /// boundaries hold for every duration.
    pub fn for_remaining(remaining: Duration, duration: Duration) -> Self {
        let remaining = remaining.as_nanos();
        let duration = duration.as_nanos();
        if remaining * 2 > duration {
            ProgressColor::Safe
        } else if remaining * 5 > duration {
            ProgressColor::Warning
        } else {
            ProgressColor::Danger
        }
    }

    pub fn rgba(&self) -> Color {
        match self {
            ProgressColor::Safe => overlay_colors::SAFE,
            ProgressColor::Warning => overlay_colors::WARNING,
            ProgressColor::Danger => overlay_colors::DANGER,
        }
    }
}

/// Length of one game tick
pub const GAME_TICK: Duration = Duration::from_millis(600);

/// Format remaining time as seconds with one decimal, without unit.
///
/// In tick mode the value is first rounded down to whole 600ms ticks.
pub fn format_remaining(remaining: Duration, use_ticks: bool) -> String {
    let ms = remaining.as_millis() as u64;
    let tenths = if use_ticks {
        let tick_ms = GAME_TICK.as_millis() as u64;
        (ms / tick_ms) * tick_ms / 100
    } else {
        (ms + 50) / 100
    };
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// Countdown label text, e.g. `"4.2s"`
pub fn label_text(remaining: Duration, use_ticks: bool) -> String {
    format!("{}s", format_remaining(remaining, use_ticks))
}
