//! Error types for overlay surfaces

use thiserror::Error;

/// Errors reported by an overlay surface draw call
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("overlay surface is not ready")]
    NotReady,

    #[error("draw target {x},{y} is outside the surface")]
    OutOfBounds { x: i32, y: i32 },

    #[error("invalid icon buffer for '{name}': expected {expected} bytes, got {actual}")]
    InvalidIcon {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("overlay backend error: {0}")]
    Backend(String),
}
