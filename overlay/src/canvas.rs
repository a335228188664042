//! Retained software overlay surface
//!
//! [`OverlayCanvas`] keeps every draw call as an item on its layer until the
//! layer is cleared or the item's time-to-live runs out. [`composite`] renders
//! the surviving items into one transparent pixmap covering the host screen,
//! bottom to top: debug preview, label, bar, final message.
//!
//! [`composite`]: OverlayCanvas::composite

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clonewatch_core::icons::IconData;
use clonewatch_core::presenter::{Layer, OverlaySurface, SurfaceError};
use clonewatch_core::timers::{Clock, SystemClock};
use clonewatch_types::{Color, HostScreen};
use thiserror::Error;
use tiny_skia::Pixmap;

use crate::renderer::Renderer;
use crate::utils::{color_from_rgba, to_local};

/// Paint order, bottom first
const DRAW_ORDER: [Layer; 4] = [Layer::Debug, Layer::Label, Layer::Bar, Layer::Final];

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("invalid canvas size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("failed to write frame to {path}")]
    Encode {
        path: String,
        #[source]
        source: png::EncodingError,
    },
}

#[derive(Debug, Clone)]
enum Shape {
    Image {
        origin: (i32, i32),
        icon: Arc<IconData>,
    },
    Text {
        text: String,
        color: Color,
        font_size: u32,
        center: (i32, i32),
    },
    Line {
        color: Color,
        thickness: u32,
        from: (i32, i32),
        to: (i32, i32),
    },
}

#[derive(Debug, Clone)]
struct LayerItem {
    shape: Shape,
    expires_at: Instant,
}

pub struct OverlayCanvas<C = SystemClock> {
    renderer: Renderer,
    pixmap: Pixmap,
    /// Screen coordinates of the pixmap's top-left corner
    origin: (i32, i32),
    layers: [Vec<LayerItem>; 4],
    clock: C,
}

impl OverlayCanvas<SystemClock> {
    pub fn new(host: &HostScreen) -> Result<Self, CanvasError> {
        Self::with_clock(host, SystemClock)
    }
}

impl<C: Clock> OverlayCanvas<C> {
    pub fn with_clock(host: &HostScreen, clock: C) -> Result<Self, CanvasError> {
        let pixmap = Pixmap::new(host.width, host.height).ok_or(CanvasError::InvalidSize {
            width: host.width,
            height: host.height,
        })?;

        Ok(Self {
            renderer: Renderer::new(),
            pixmap,
            origin: (host.x, host.y),
            layers: Default::default(),
            clock,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Number of live (unexpired) items on `layer`
    pub fn item_count(&self, layer: Layer) -> usize {
        let now = self.clock.now();
        self.layers[layer_index(layer)]
            .iter()
            .filter(|item| item.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        Layer::ALL.iter().all(|layer| self.item_count(*layer) == 0)
    }

    /// Drop expired items and render the rest
    pub fn composite(&mut self) -> &Pixmap {
        let now = self.clock.now();
        for items in &mut self.layers {
            items.retain(|item| item.expires_at > now);
        }

        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);

        let width = self.pixmap.width();
        let height = self.pixmap.height();
        let buffer = self.pixmap.data_mut();

        for layer in DRAW_ORDER {
            for item in &self.layers[layer_index(layer)] {
                render_shape(&mut self.renderer, buffer, width, height, self.origin, &item.shape);
            }
        }

        &self.pixmap
    }

    /// Composite and write the frame as PNG
    pub fn save_png(&mut self, path: impl AsRef<Path>) -> Result<(), CanvasError> {
        let path = path.as_ref();
        self.composite();
        self.pixmap
            .save_png(path)
            .map_err(|source| CanvasError::Encode {
                path: path.display().to_string(),
                source,
            })
    }

    fn contains(&self, local: (i32, i32)) -> bool {
        local.0 >= 0
            && local.1 >= 0
            && (local.0 as u32) < self.pixmap.width()
            && (local.1 as u32) < self.pixmap.height()
    }

    fn push(&mut self, layer: Layer, shape: Shape, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.layers[layer_index(layer)].push(LayerItem { shape, expires_at });
    }
}

impl<C: Clock> OverlaySurface for OverlayCanvas<C> {
    fn draw_image(
        &mut self,
        layer: Layer,
        origin: (i32, i32),
        icon: &Arc<IconData>,
        ttl: Duration,
    ) -> Result<(), SurfaceError> {
        let expected = (icon.width * icon.height * 4) as usize;
        if icon.rgba.len() != expected {
            return Err(SurfaceError::InvalidIcon {
                name: icon.name.clone(),
                expected,
                actual: icon.rgba.len(),
            });
        }

        let (x, y) = to_local(origin, self.origin);
        let far = (x + icon.width as i32 - 1, y + icon.height as i32 - 1);
        if !self.contains((x, y)) && !self.contains(far) {
            return Err(SurfaceError::OutOfBounds {
                x: origin.0,
                y: origin.1,
            });
        }

        self.push(
            layer,
            Shape::Image {
                origin,
                icon: Arc::clone(icon),
            },
            ttl,
        );
        Ok(())
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
        if !self.contains(to_local(center, self.origin)) {
            return Err(SurfaceError::OutOfBounds {
                x: center.0,
                y: center.1,
            });
        }

        self.push(
            layer,
            Shape::Text {
                text: text.to_string(),
                color,
                font_size,
                center,
            },
            ttl,
        );
        Ok(())
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
        if !self.contains(to_local(from, self.origin)) && !self.contains(to_local(to, self.origin)) {
            return Err(SurfaceError::OutOfBounds {
                x: from.0,
                y: from.1,
            });
        }

        self.push(
            layer,
            Shape::Line {
                color,
                thickness,
                from,
                to,
            },
            ttl,
        );
        Ok(())
    }

    fn clear_layer(&mut self, layer: Layer) {
        self.layers[layer_index(layer)].clear();
    }
}

fn layer_index(layer: Layer) -> usize {
    match layer {
        Layer::Label => 0,
        Layer::Bar => 1,
        Layer::Final => 2,
        Layer::Debug => 3,
    }
}

fn render_shape(
    renderer: &mut Renderer,
    buffer: &mut [u8],
    width: u32,
    height: u32,
    origin: (i32, i32),
    shape: &Shape,
) {
    match shape {
        Shape::Image { origin: at, icon } => {
            let (x, y) = to_local(*at, origin);
            renderer.draw_image(buffer, width, height, &icon.rgba, icon.width, icon.height, x, y);
        }
        Shape::Text {
            text,
            color,
            font_size,
            center,
        } => {
            let (x, y) = to_local(*center, origin);
            renderer.draw_text_centered(
                buffer,
                width,
                height,
                text,
                x as f32,
                y as f32,
                *font_size as f32,
                color_from_rgba(*color),
            );
        }
        Shape::Line {
            color,
            thickness,
            from,
            to,
        } => {
            let from = to_local(*from, origin);
            let to = to_local(*to, origin);
            renderer.draw_line(
                buffer,
                width,
                height,
                (from.0 as f32, from.1 as f32),
                (to.0 as f32, to.1 as f32),
                *thickness as f32,
                color_from_rgba(*color),
            );
        }
    }
}
