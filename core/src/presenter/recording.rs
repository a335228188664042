//! A surface that records draw calls instead of rendering them.
//!
//! Used by the engine tests and for dry runs where no render target exists.

use std::sync::Arc;
use std::time::Duration;

use clonewatch_types::Color;

use super::{Layer, OverlaySurface, SurfaceError};
use crate::icons::IconData;

/// One recorded surface operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Image {
        layer: Layer,
        name: String,
        origin: (i32, i32),
        ttl: Duration,
    },
    Text {
        layer: Layer,
        text: String,
        color: Color,
        font_size: u32,
        center: (i32, i32),
        ttl: Duration,
    },
    Line {
        layer: Layer,
        color: Color,
        thickness: u32,
        from: (i32, i32),
        to: (i32, i32),
        ttl: Duration,
    },
    Clear(Layer),
}

impl DrawCall {
    pub fn layer(&self) -> Layer {
        match self {
            DrawCall::Image { layer, .. }
            | DrawCall::Text { layer, .. }
            | DrawCall::Line { layer, .. } => *layer,
            DrawCall::Clear(layer) => *layer,
        }
    }

    pub fn is_draw(&self) -> bool {
        !matches!(self, DrawCall::Clear(_))
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
    fail_draws: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every draw call fail (clears still succeed)
    pub fn fail_draws(&mut self, fail: bool) {
        self.fail_draws = fail;
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Recorded calls, leaving the log empty
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Drawn (non-clear) calls only
    pub fn draws(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|c| c.is_draw())
    }

    /// Text of every label drawn on `layer`, in order
    pub fn texts_on(&self, layer: Layer) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { layer: l, text, .. } if *l == layer => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn cleared_layers(&self) -> Vec<Layer> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Clear(layer) => Some(*layer),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, call: DrawCall) -> Result<(), SurfaceError> {
        if self.fail_draws {
            return Err(SurfaceError::NotReady);
        }
        self.calls.push(call);
        Ok(())
    }
}

impl OverlaySurface for RecordingSurface {
    fn draw_image(
        &mut self,
        layer: Layer,
        origin: (i32, i32),
        icon: &Arc<IconData>,
        ttl: Duration,
    ) -> Result<(), SurfaceError> {
        self.record(DrawCall::Image {
            layer,
            name: icon.name.clone(),
            origin,
            ttl,
        })
    }

    fn draw_text(
        &mut self,
        layer: Layer,
        text: &str,
        color: Color,
        font_size: u32,
        center: (i32, i32),
        ttl: Duration,
    ) -> Result<(), SurfaceError> {
        self.record(DrawCall::Text {
            layer,
            text: text.to_string(),
            color,
            font_size,
            center,
            ttl,
        })
    }

    fn draw_line(
        &mut self,
        layer: Layer,
        color: Color,
        thickness: u32,
        from: (i32, i32),
        to: (i32, i32),
        ttl: Duration,
    ) -> Result<(), SurfaceError> {
        self.record(DrawCall::Line {
            layer,
            color,
            thickness,
            from,
            to,
            ttl,
        })
    }

    fn clear_layer(&mut self, layer: Layer) {
        self.calls.push(DrawCall::Clear(layer));
    }
}
