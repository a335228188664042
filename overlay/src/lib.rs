//! Clonewatch Overlay Library
//!
//! Software overlay surface for the countdown presenter.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    canvas                           │
//! │   OverlayCanvas: retained layers with expiry,       │
//! │   implements the core OverlaySurface trait          │
//! ├─────────────────────────────────────────────────────┤
//! │                    renderer                         │
//! │            tiny-skia + cosmic-text                  │
//! │              (drawing primitives)                   │
//! ├─────────────────────────────────────────────────────┤
//! │                    icons                            │
//! │        PNG directory loader → IconSet               │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod canvas;
pub mod icons;
pub mod renderer;
pub mod utils;

pub use canvas::{CanvasError, OverlayCanvas};
pub use icons::{ICON_SIZE, IconError, IconLoader, placeholder_set};
pub use renderer::Renderer;

// Re-export tiny_skia Color for external use
pub use tiny_skia::Color;
