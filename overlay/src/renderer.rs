//! Software renderer using tiny-skia and cosmic-text
//!
//! All rendering is done on the CPU into a premultiplied RGBA pixel buffer.
#![allow(clippy::too_many_arguments)]
use std::collections::HashMap;

use cosmic_text::{
    Attrs, Buffer, Color as CosmicColor, Family, FontSystem, LayoutGlyph, Metrics, Shaping,
    SwashCache,
};
use tiny_skia::{Color, LineCap, Paint, PathBuilder, PixmapMut, Stroke, Transform};

/// Maximum entries in the text shaping cache (LRU eviction when exceeded)
const TEXT_CACHE_MAX_ENTRIES: usize = 256;

/// Cached result of text shaping
struct CachedText {
    glyphs: Vec<LayoutGlyph>,
    width: f32,
    height: f32,
    /// LRU tracking: incremented on each access
    last_used: u64,
}

/// Key for text cache: (text content, font size rounded to tenths)
type TextCacheKey = (String, u32);

/// A software renderer for overlay content
pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    /// Countdown labels repeat constantly; shaping once per string is enough
    text_cache: HashMap<TextCacheKey, CachedText>,
    cache_access_counter: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            text_cache: HashMap::with_capacity(64),
            cache_access_counter: 0,
        }
    }

    /// Drop the least recently used quarter of the cache once it is over the limit
    fn evict_lru_if_needed(&mut self) {
        if self.text_cache.len() <= TEXT_CACHE_MAX_ENTRIES {
            return;
        }

        // Shrink to 3/4 so a burst of new labels doesn't evict on every insert
        let target_size = TEXT_CACHE_MAX_ENTRIES * 3 / 4;
        let mut entries: Vec<_> = self
            .text_cache
            .iter()
            .map(|(k, v)| (k.clone(), v.last_used))
            .collect();
        // Oldest first
        entries.sort_by_key(|(_, last_used)| *last_used);

        for (key, _) in entries
            .into_iter()
            .take(self.text_cache.len() - target_size)
        {
            self.text_cache.remove(&key);
        }
    }

    /// Look up by borrowed text so a hit never allocates a key
    fn find_cached(&mut self, text: &str, font_size_key: u32) -> Option<&mut CachedText> {
        // The live overlay shows a handful of distinct labels at a time
        self.text_cache
            .iter_mut()
            .find(|(k, _)| k.0 == text && k.1 == font_size_key)
            .map(|(_, v)| v)
    }

    /// Ensure text is cached, shaping if needed. Returns (width, height).
    fn ensure_cached(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        let font_size_key = (font_size * 10.0).round() as u32;

        self.cache_access_counter += 1;
        let current_access = self.cache_access_counter;

        if let Some(cached) = self.find_cached(text, font_size_key) {
            cached.last_used = current_access;
            return (cached.width, cached.height);
        }

        // Miss: shape once and keep the laid out glyphs
        let metrics = Metrics::new(font_size, font_size * 1.2);
        let mut text_buffer = Buffer::new(&mut self.font_system, metrics);

        let attrs = Attrs::new().family(Family::SansSerif);
        text_buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        text_buffer.shape_until_scroll(&mut self.font_system, false);

        let mut glyphs = Vec::new();
        let mut width = 0.0f32;
        let mut height = 0.0f32;

        for run in text_buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
            glyphs.extend(run.glyphs.iter().cloned());
        }

        self.text_cache.insert(
            (text.to_string(), font_size_key),
            CachedText {
                glyphs,
                width,
                height,
                last_used: current_access,
            },
        );
        self.evict_lru_if_needed();

        (width, height)
    }

    /// Glyphs of an entry created by `ensure_cached`; empty if it was evicted
    fn get_cached_glyphs(&mut self, text: &str, font_size: f32) -> Vec<LayoutGlyph> {
        let font_size_key = (font_size * 10.0).round() as u32;
        self.find_cached(text, font_size_key)
            .map(|c| c.glyphs.clone())
            .unwrap_or_default()
    }

    /// Stroke a straight line with butt caps, centered on the segment
    pub fn draw_line(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) else {
            return;
        };

        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        let Some(path) = pb.finish() else { return };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: thickness,
            line_cap: LineCap::Butt,
            ..Default::default()
        };

        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Blend straight-alpha RGBA image data onto the buffer at (x, y)
    pub fn draw_image(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        rgba: &[u8],
        img_width: u32,
        img_height: u32,
        x: i32,
        y: i32,
    ) {
        if rgba.len() < (img_width * img_height * 4) as usize {
            return;
        }

        let buf_w = width as i32;
        let buf_h = height as i32;

        for iy in 0..img_height as i32 {
            let py = y + iy;
            if py < 0 || py >= buf_h {
                continue;
            }

            for ix in 0..img_width as i32 {
                let px = x + ix;
                if px < 0 || px >= buf_w {
                    continue;
                }

                let src = ((iy as u32 * img_width + ix as u32) * 4) as usize;
                let dst = ((py as u32 * width + px as u32) * 4) as usize;
                if dst + 3 >= buffer.len() {
                    continue;
                }

                blend_pixel(
                    &mut buffer[dst..dst + 4],
                    [rgba[src], rgba[src + 1], rgba[src + 2]],
                    rgba[src + 3] as u32,
                );
            }
        }
    }

    /// Draw text with its baseline at `y`, starting at `x`
    pub fn draw_text(
        &mut self,
        buffer: &mut [u8],
        buf_width: u32,
        buf_height: u32,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, buf_width, buf_height) else {
            return;
        };

        self.ensure_cached(text, font_size);
        let glyphs = self.get_cached_glyphs(text, font_size);

        let text_color = CosmicColor::rgba(
            (color.red() * 255.0) as u8,
            (color.green() * 255.0) as u8,
            (color.blue() * 255.0) as u8,
            (color.alpha() * 255.0) as u8,
        );

        for glyph in &glyphs {
            let physical_glyph = glyph.physical((x, y), 1.0);

            if let Some(image) = self
                .swash_cache
                .get_image(&mut self.font_system, physical_glyph.cache_key)
            {
                let glyph_x = physical_glyph.x + image.placement.left;
                let glyph_y = physical_glyph.y - image.placement.top;

                draw_glyph_to_pixmap(
                    &mut pixmap,
                    &image.data,
                    image.placement.width,
                    image.placement.height,
                    glyph_x,
                    glyph_y,
                    text_color,
                );
            }
        }
    }

    /// Draw text horizontally centered on `center_x`, baseline at `y`
    pub fn draw_text_centered(
        &mut self,
        buffer: &mut [u8],
        buf_width: u32,
        buf_height: u32,
        text: &str,
        center_x: f32,
        y: f32,
        font_size: f32,
        color: Color,
    ) {
        let (text_width, _) = self.measure_text(text, font_size);
        let x = center_x - text_width / 2.0;
        self.draw_text(buffer, buf_width, buf_height, text, x, y, font_size, color);
    }

    /// Measure text dimensions (uses shaping cache)
    pub fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.ensure_cached(text, font_size)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Source-over blend of one straight-alpha color onto a premultiplied pixel
#[inline]
fn blend_pixel(dst: &mut [u8], rgb: [u8; 3], src_a: u32) {
    if src_a == 0 {
        return;
    }
    let inv_a = 255 - src_a;

    dst[0] = ((rgb[0] as u32 * src_a + dst[0] as u32 * inv_a) / 255) as u8;
    dst[1] = ((rgb[1] as u32 * src_a + dst[1] as u32 * inv_a) / 255) as u8;
    dst[2] = ((rgb[2] as u32 * src_a + dst[2] as u32 * inv_a) / 255) as u8;
    dst[3] = (src_a + (dst[3] as u32 * inv_a) / 255) as u8;
}

/// Draw a glyph coverage mask onto a pixmap with alpha blending
fn draw_glyph_to_pixmap(
    pixmap: &mut PixmapMut,
    glyph_data: &[u8],
    glyph_width: u32,
    glyph_height: u32,
    dest_x: i32,
    dest_y: i32,
    color: CosmicColor,
) {
    let pixmap_width = pixmap.width() as i32;
    let pixmap_height = pixmap.height() as i32;
    let data = pixmap.data_mut();

    for gy in 0..glyph_height as i32 {
        let py = dest_y + gy;
        if py < 0 || py >= pixmap_height {
            continue;
        }

        for gx in 0..glyph_width as i32 {
            let px = dest_x + gx;
            if px < 0 || px >= pixmap_width {
                continue;
            }

            let glyph_idx = (gy as u32 * glyph_width + gx as u32) as usize;
            let Some(&coverage) = glyph_data.get(glyph_idx) else {
                continue;
            };

            let pixel_idx = ((py as u32 * pixmap_width as u32 + px as u32) * 4) as usize;
            if pixel_idx + 3 >= data.len() {
                continue;
            }

            let src_a = (coverage as u32 * color.a() as u32) / 255;
            blend_pixel(
                &mut data[pixel_idx..pixel_idx + 4],
                [color.r(), color.g(), color.b()],
                src_a,
            );
        }
    }
}
