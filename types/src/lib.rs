//! Shared configuration types for clonewatch
//!
//! This crate contains the serializable settings snapshot that is shared
//! between the timer core, the overlay surface and the application shell.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGBA color as stored in configuration and passed to draw calls
pub type Color = [u8; 4];

// ─────────────────────────────────────────────────────────────────────────────
// Combat Style
// ─────────────────────────────────────────────────────────────────────────────

/// Combat style - selects which timer sequence is played when a trigger fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatStyle {
    #[default]
    Magic,
    Necro,
}

impl CombatStyle {
    pub const ALL: [CombatStyle; 2] = [CombatStyle::Magic, CombatStyle::Necro];

    /// Catalog key for this style
    pub fn key(&self) -> &'static str {
        match self {
            CombatStyle::Magic => "magic",
            CombatStyle::Necro => "necro",
        }
    }
}

impl fmt::Display for CombatStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CombatStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "magic" => Ok(CombatStyle::Magic),
            "necro" => Ok(CombatStyle::Necro),
            other => Err(format!("unknown combat style '{other}' (expected magic or necro)")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Host Screen
// ─────────────────────────────────────────────────────────────────────────────

/// Geometry of the host game window plus the latest latency sample.
///
/// Overlay offsets are absolute positions relative to this origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostScreen {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Measured round-trip latency in milliseconds (0 = no sample)
    #[serde(default)]
    pub ping_ms: u32,
}

impl Default for HostScreen {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
            ping_ms: 0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

pub const MIN_OVERLAY_SCALE: f32 = 0.25;
pub const MAX_OVERLAY_SCALE: f32 = 3.0;

/// User settings snapshot.
///
/// The timer engine reads this at `start()` and receives it again on every
/// tick; it never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display remaining time rounded down to 600ms game ticks
    pub use_ticks: bool,
    pub show_image: bool,
    pub show_progress_bar: bool,
    /// Verbose logging of every accepted chat line
    pub debug_mode: bool,
    pub combat_style: CombatStyle,
    /// Absolute overlay anchor, relative to the host window origin
    pub overlay_offset_x: i32,
    pub overlay_offset_y: i32,
    pub overlay_scale: f32,
    /// Set once the offsets have been seeded from the host window size
    pub position_initialized: bool,
    /// Start timers earlier by the measured latency
    pub compensate_for_ping: bool,
    /// Case-insensitive substrings that start the timer
    pub triggers: Vec<String>,
    /// How often the chat source is polled
    pub chat_poll_ms: u64,
    /// Directory containing `<icon>.png` files
    pub icon_dir: Option<String>,
    /// Host window geometry used when no live anchor is available
    pub host: HostScreen,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_ticks: false,
            show_image: true,
            show_progress_bar: true,
            debug_mode: false,
            combat_style: CombatStyle::Magic,
            overlay_offset_x: 0,
            overlay_offset_y: 0,
            overlay_scale: 1.0,
            position_initialized: false,
            compensate_for_ping: false,
            triggers: default_triggers(),
            chat_poll_ms: 600,
            icon_dir: None,
            host: HostScreen::default(),
        }
    }
}

impl Settings {
    /// Set the overlay scale, clamped to the supported range
    pub fn set_scale(&mut self, scale: f32) {
        self.overlay_scale = if scale.is_finite() {
            scale.clamp(MIN_OVERLAY_SCALE, MAX_OVERLAY_SCALE)
        } else {
            1.0
        };
    }
}

fn default_triggers() -> Vec<String> {
    vec!["SUBJUGATED".to_string(), "MORTAL!".to_string()]
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay Colors
// ─────────────────────────────────────────────────────────────────────────────

pub mod overlay_colors {
    use super::Color;

    pub const WHITE: Color = [255, 255, 255, 255];
    pub const SAFE: Color = [0, 255, 0, 255];
    pub const WARNING: Color = [255, 255, 0, 255];
    pub const DANGER: Color = [255, 0, 0, 255];
    pub const BAR_BG: Color = [50, 50, 50, 255];
    pub const FINAL_TEXT: Color = [255, 0, 0, 255];
}
