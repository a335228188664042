//! Overlay presentation
//!
//! [`OverlayPresenter`] turns timer values into draw calls on an
//! [`OverlaySurface`]. It holds no timer state: every call gets the resolved
//! [`OverlayPosition`] and the current [`Settings`].
//!
//! Draws go to named [`Layer`]s so clearing the label never disturbs the bar,
//! the final message or the debug preview. Every draw carries a time-to-live;
//! the surface drops it afterwards even if nobody clears the layer.
//!
//! Surface failures are logged and swallowed. A missing render target must
//! never stop a countdown.

mod error;
mod recording;

use std::sync::Arc;
use std::time::Duration;

use clonewatch_types::{Color, Settings, overlay_colors};

use crate::icons::IconData;
use crate::position::{OverlayPosition, round_half_up};

pub use error::SurfaceError;
pub use recording::{DrawCall, RecordingSurface};

/// How long the final "NOW!" message stays up
pub const FINAL_MESSAGE_DURATION: Duration = Duration::from_millis(1500);
/// Debug preview lifetime; effectively until cleared
pub const PREVIEW_DURATION: Duration = Duration::from_secs(24 * 60 * 60);
pub const FINAL_MESSAGE_TEXT: &str = "NOW!";

/// Independent overlay layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Countdown text and phase icons
    Label,
    /// Progress bar
    Bar,
    /// Terminal message after the last phase
    Final,
    /// Static position preview
    Debug,
}

impl Layer {
    /// Layers owned by a timer run
    pub const RUN_LAYERS: [Layer; 3] = [Layer::Label, Layer::Bar, Layer::Final];
    pub const ALL: [Layer; 4] = [Layer::Label, Layer::Bar, Layer::Final, Layer::Debug];

    pub fn name(&self) -> &'static str {
        match self {
            Layer::Label => "clonewatch-text",
            Layer::Bar => "clonewatch-bar",
            Layer::Final => "clonewatch-final",
            Layer::Debug => "clonewatch-debug",
        }
    }
}

/// A drawing backend with named, independently clearable layers.
///
/// Text is drawn horizontally centered on `x` with its baseline near `y`.
/// Lines are drawn with the given thickness centered on the segment.
pub trait OverlaySurface {
    fn draw_image(
        &mut self,
        layer: Layer,
        origin: (i32, i32),
        icon: &Arc<IconData>,
        ttl: Duration,
    ) -> Result<(), SurfaceError>;

    fn draw_text(
        &mut self,
        layer: Layer,
        text: &str,
        color: Color,
        font_size: u32,
        center: (i32, i32),
        ttl: Duration,
    ) -> Result<(), SurfaceError>;

    fn draw_line(
        &mut self,
        layer: Layer,
        color: Color,
        thickness: u32,
        from: (i32, i32),
        to: (i32, i32),
        ttl: Duration,
    ) -> Result<(), SurfaceError>;

    fn clear_layer(&mut self, layer: Layer);
}

/// Stateless draw operations over a surface
#[derive(Debug)]
pub struct OverlayPresenter<S> {
    surface: S,
}

impl<S: OverlaySurface> OverlayPresenter<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Draw a row of icons above center. Suppressed when `show_image` is off.
    pub fn draw_icons(
        &mut self,
        layer: Layer,
        icons: &[Arc<IconData>],
        pos: &OverlayPosition,
        settings: &Settings,
        ttl: Duration,
    ) {
        if !settings.show_image || icons.is_empty() {
            return;
        }

        let sizes: Vec<(u32, u32)> = icons.iter().map(|i| i.size()).collect();
        for (icon, origin) in icons.iter().zip(pos.icon_origins(&sizes)) {
            let result = self.surface.draw_image(layer, origin, icon, ttl);
            report(layer, result);
        }
    }

    /// Draw the countdown text
    pub fn draw_label(
        &mut self,
        layer: Layer,
        text: &str,
        color: Color,
        pos: &OverlayPosition,
        settings: &Settings,
        ttl: Duration,
    ) {
        let center = (pos.center_x, pos.label_y(settings.show_image));
        let result = self
            .surface
            .draw_text(layer, text, color, pos.font_size, center, ttl);
        report(layer, result);
    }

    /// Draw background track plus the filled portion of the bar.
    /// Suppressed when `show_progress_bar` is off.
    pub fn draw_progress_bar(
        &mut self,
        layer: Layer,
        progress: f32,
        color: Color,
        pos: &OverlayPosition,
        settings: &Settings,
        ttl: Duration,
    ) {
        if !settings.show_progress_bar {
            return;
        }

        let thickness = pos.bar_height.max(1) as u32;
        let y = pos.bar_center_y;

        let result = self.surface.draw_line(
            layer,
            overlay_colors::BAR_BG,
            thickness,
            (pos.bar_left, y),
            (pos.bar_right, y),
            ttl,
        );
        report(layer, result);

        let filled = round_half_up(pos.bar_width as f32 * progress.clamp(0.0, 1.0));
        if filled > 0 {
            let result = self.surface.draw_line(
                layer,
                color,
                thickness,
                (pos.bar_left, y),
                (pos.bar_left + filled, y),
                ttl,
            );
            report(layer, result);
        }
    }

    /// Draw the terminal message with the last phase's icons
    pub fn draw_final_message(
        &mut self,
        icons: &[Arc<IconData>],
        pos: &OverlayPosition,
        settings: &Settings,
    ) {
        self.draw_icons(Layer::Final, icons, pos, settings, FINAL_MESSAGE_DURATION);

        let center = (pos.center_x, pos.label_y(settings.show_image));
        let result = self.surface.draw_text(
            Layer::Final,
            FINAL_MESSAGE_TEXT,
            overlay_colors::FINAL_TEXT,
            pos.final_font_size,
            center,
            FINAL_MESSAGE_DURATION,
        );
        report(Layer::Final, result);
    }

    /// Draw a static full-progress snapshot on the debug layer
    pub fn draw_preview(
        &mut self,
        icons: &[Arc<IconData>],
        text: &str,
        color: Color,
        pos: &OverlayPosition,
        settings: &Settings,
    ) {
        self.surface.clear_layer(Layer::Debug);
        self.draw_icons(Layer::Debug, icons, pos, settings, PREVIEW_DURATION);
        self.draw_label(Layer::Debug, text, color, pos, settings, PREVIEW_DURATION);
        self.draw_progress_bar(Layer::Debug, 1.0, color, pos, settings, PREVIEW_DURATION);
    }

    pub fn clear(&mut self, layer: Layer) {
        self.surface.clear_layer(layer);
    }

    /// Clear every layer a timer run draws on (the preview stays)
    pub fn clear_run_layers(&mut self) {
        for layer in Layer::RUN_LAYERS {
            self.surface.clear_layer(layer);
        }
    }
}

fn report(layer: Layer, result: Result<(), SurfaceError>) {
    if let Err(e) = result {
        tracing::debug!(layer = layer.name(), error = %e, "Overlay draw failed");
    }
}
