pub mod chat;
pub mod context;
pub mod icons;
pub mod position;
pub mod presenter;
pub mod sequences;
pub mod timers;
pub mod triggers;

// Re-exports for convenience
pub use chat::{ChatError, ChatTail};
pub use context::{ConfigError, SettingsExt};
pub use icons::{IconData, IconProvider, IconSet};
pub use position::OverlayPosition;
pub use presenter::{Layer, OverlayPresenter, OverlaySurface, SurfaceError};
pub use sequences::{Phase, Sequence, SequenceCatalog, SequenceError};
pub use timers::{Clock, EngineState, ManualClock, SystemClock, TickReport, TimerEngine};
pub use triggers::{TriggerDetector, TriggerScan};

pub use clonewatch_types::{CombatStyle, HostScreen, Settings};
