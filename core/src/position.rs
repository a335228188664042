//! Overlay position resolution
//!
//! Turns the configured offset/scale and the host window anchor into concrete
//! screen coordinates. Pure function of its inputs; no timer state.
//!
//! Icons are fixed-resolution bitmaps, so only the gaps around them follow
//! the scale (and only downwards). Bar and text sizes follow the full scale.

use clonewatch_types::{HostScreen, Settings};

pub const BAR_WIDTH: f32 = 120.0;
pub const BAR_HEIGHT: f32 = 8.0;
pub const BAR_Y_OFFSET: f32 = 50.0;
pub const TEXT_FONT_SIZE: f32 = 40.0;
/// Extra size of the final message text (before scaling)
pub const FINAL_FONT_BONUS: f32 = 10.0;
pub const IMAGE_GAP: f32 = 20.0;
/// Horizontal gap between icons of a multi-icon phase (unscaled)
pub const MULTI_IMAGE_GAP: i32 = 8;

/// Resolved screen geometry for one overlay placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPosition {
    pub center_x: i32,
    pub center_y: i32,
    pub bar_left: i32,
    pub bar_right: i32,
    pub bar_center_y: i32,
    pub bar_width: i32,
    pub bar_height: i32,
    /// Vertical gap between icons and center, and between center and label
    pub image_gap: i32,
    pub font_size: u32,
    pub final_font_size: u32,
}

impl OverlayPosition {
    /// Resolve the overlay geometry for the current settings
    pub fn resolve(settings: &Settings, host: &HostScreen) -> Self {
        let scale = sanitize_scale(settings.overlay_scale);
        let shrink = scale.min(1.0);

        let bar_width = round_half_up(BAR_WIDTH * scale);
        let bar_height = round_half_up(BAR_HEIGHT * scale);
        let bar_y_offset = round_half_up(BAR_Y_OFFSET * shrink);
        let image_gap = round_half_up(IMAGE_GAP * shrink);

        let center_x = host.x + settings.overlay_offset_x;
        let center_y = host.y + settings.overlay_offset_y;

        let bar_left = round_half_up(center_x as f32 - bar_width as f32 / 2.0);
        let bar_y = center_y + bar_y_offset;

        let font_size = round_half_up(TEXT_FONT_SIZE * scale).max(1);
        let final_font_size = round_half_up(font_size as f32 + FINAL_FONT_BONUS * scale).max(1);

        Self {
            center_x,
            center_y,
            bar_left,
            bar_right: bar_left + bar_width,
            bar_center_y: bar_y + round_half_up(bar_height as f32 / 2.0),
            bar_width,
            bar_height,
            image_gap,
            font_size: font_size as u32,
            final_font_size: final_font_size as u32,
        }
    }

    /// Baseline of the label text: below center when icons are shown
    pub fn label_y(&self, show_image: bool) -> i32 {
        if show_image {
            self.center_y + self.image_gap
        } else {
            self.center_y
        }
    }

    /// Top-left corners for a row of icons centered on `center_x`.
    ///
    /// `sizes` are `(width, height)` pairs in draw order.
    pub fn icon_origins(&self, sizes: &[(u32, u32)]) -> Vec<(i32, i32)> {
        if sizes.is_empty() {
            return Vec::new();
        }

        let gaps = (sizes.len() as i32 - 1) * MULTI_IMAGE_GAP;
        let total_width: i32 = sizes.iter().map(|(w, _)| *w as i32).sum::<i32>() + gaps;

        let mut x = round_half_up(self.center_x as f32 - total_width as f32 / 2.0);
        sizes
            .iter()
            .map(|&(w, h)| {
                let origin = (x, self.center_y - h as i32 - self.image_gap);
                x += w as i32 + MULTI_IMAGE_GAP;
                origin
            })
            .collect()
    }
}

/// Default anchor for a fresh install: horizontally centered, one fifth down
pub fn default_anchor(host: &HostScreen) -> (i32, i32) {
    ((host.width / 2) as i32, (host.height / 5) as i32)
}

fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 { scale } else { 1.0 }
}

/// Round to nearest, ties towards positive infinity
pub(crate) fn round_half_up(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}
