//! Countdown timer system
//!
//! This module provides:
//! - **Phase math**: elapsed time → current phase, remaining time, progress
//! - **Schedules**: the two repeating ticks a run is driven by
//! - **Runs**: runtime state of one countdown
//! - **Engine**: Idle/Running/Completed state machine over one run
//!
//! # Ticks
//!
//! Each run has two independently clocked ticks:
//! - Label tick (600ms in tick mode, 16ms otherwise): icons + remaining time
//! - Bar tick (50ms): progress bar, and the terminal "NOW!" transition

mod clock;
mod engine;
mod phase;
mod run;
mod schedule;

#[cfg(test)]
mod engine_tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{CompletionCallback, EngineState, TickReport, TimerEngine, ping_offset};
pub use phase::{
    GAME_TICK, PhaseSnapshot, PhaseStatus, PhaseTimeline, ProgressColor, format_remaining,
    label_text,
};
pub use run::TimerRun;
pub use schedule::{
    BAR_TICK_INTERVAL, LABEL_SMOOTH_INTERVAL, LABEL_TICK_INTERVAL, RepeatingTick, TickKind,
    label_interval,
};
