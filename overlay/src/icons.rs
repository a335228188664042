//! Icon loading for phase icons
//!
//! Reads `<name>.png` files from a directory and fits each one into a square
//! RGBA buffer (64x64 by default) so every phase icon lays out identically.

use std::path::{Path, PathBuf};

use clonewatch_core::icons::{IconData, IconSet};
use thiserror::Error;

/// Edge length of a loaded icon in pixels
pub const ICON_SIZE: u32 = 64;

#[derive(Debug, Error)]
pub enum IconError {
    #[error("failed to read icon {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode icon {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: png::DecodingError,
    },

    #[error("unsupported color type {color_type:?} in {path}")]
    Unsupported {
        path: PathBuf,
        color_type: png::ColorType,
    },

    #[error("icon {path} has no pixels")]
    Empty { path: PathBuf },
}

/// Loads named PNG icons from one directory
#[derive(Debug, Clone)]
pub struct IconLoader {
    dir: PathBuf,
    size: u32,
}

impl IconLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            size: ICON_SIZE,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size.max(1);
        self
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.png"))
    }

    /// Load and fit one icon
    pub fn load(&self, name: &str) -> Result<IconData, IconError> {
        let path = self.path_for(name);
        let data = std::fs::read(&path).map_err(|source| IconError::Read {
            path: path.clone(),
            source,
        })?;

        let (rgba, width, height) = decode_png(&data, &path)?;
        if width == 0 || height == 0 {
            return Err(IconError::Empty { path });
        }

        let fitted = fit_to_square(&rgba, width, height, self.size);
        Ok(IconData::new(name, fitted, self.size, self.size))
    }

    /// Load every named icon that can be loaded. Failures are logged and skipped.
    pub fn load_all<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> IconSet {
        let mut set = IconSet::new();
        let mut failed = 0usize;

        for name in names {
            let name = name.as_ref();
            match self.load(name) {
                Ok(icon) => set.insert(icon),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(icon = name, error = %e, "Failed to load icon");
                }
            }
        }

        tracing::debug!(
            dir = %self.dir.display(),
            loaded = set.len(),
            failed,
            "Loaded phase icons"
        );
        set
    }
}

/// Solid stand-in icons, one distinct color per name
pub fn placeholder_set<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> IconSet {
    let mut set = IconSet::new();
    for name in names {
        let name = name.as_ref();
        set.insert(IconData::solid(name, ICON_SIZE, ICON_SIZE, placeholder_color(name)));
    }
    set
}

/// Stable color derived from the icon name (FNV-1a)
fn placeholder_color(name: &str) -> [u8; 4] {
    let hash = name.bytes().fold(0x811c_9dc5u32, |h, b| {
        (h ^ b as u32).wrapping_mul(0x0100_0193)
    });
    let [r, g, b, _] = hash.to_le_bytes();
    [r | 0x40, g | 0x40, b | 0x40, 255]
}

/// Decode PNG data to straight-alpha RGBA
fn decode_png(data: &[u8], path: &Path) -> Result<(Vec<u8>, u32, u32), IconError> {
    let decode_err = |source| IconError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(decode_err)?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(decode_err)?;
    let pixels = &buf[..info.buffer_size()];

    let width = info.width;
    let height = info.height;

    let rgba = match info.color_type {
        png::ColorType::Rgba => pixels.to_vec(),
        png::ColorType::Rgb => {
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for chunk in pixels.chunks_exact(3) {
                rgba.extend_from_slice(chunk);
                rgba.push(255);
            }
            rgba
        }
        png::ColorType::GrayscaleAlpha => {
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for chunk in pixels.chunks_exact(2) {
                rgba.extend_from_slice(&[chunk[0], chunk[0], chunk[0], chunk[1]]);
            }
            rgba
        }
        png::ColorType::Grayscale => {
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for &gray in pixels {
                rgba.extend_from_slice(&[gray, gray, gray, 255]);
            }
            rgba
        }
        color_type => {
            return Err(IconError::Unsupported {
                path: path.to_path_buf(),
                color_type,
            });
        }
    };

    Ok((rgba, width, height))
}

/// Scale to fit inside a `size`x`size` square (nearest neighbour), keeping the
/// aspect ratio and centering on a transparent background.
pub fn fit_to_square(rgba: &[u8], width: u32, height: u32, size: u32) -> Vec<u8> {
    let mut out = vec![0u8; (size * size * 4) as usize];
    if width == 0 || height == 0 {
        return out;
    }

    let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
    let dest_w = ((width as f32 * scale).round() as u32).clamp(1, size);
    let dest_h = ((height as f32 * scale).round() as u32).clamp(1, size);
    let off_x = (size - dest_w) / 2;
    let off_y = (size - dest_h) / 2;

    for dy in 0..dest_h {
        let sy = (dy * height / dest_h).min(height - 1);
        for dx in 0..dest_w {
            let sx = (dx * width / dest_w).min(width - 1);
            let src = ((sy * width + sx) * 4) as usize;
            let dst = (((dy + off_y) * size + dx + off_x) * 4) as usize;
            if let (Some(from), Some(to)) = (rgba.get(src..src + 4), out.get_mut(dst..dst + 4)) {
                to.copy_from_slice(from);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(rgba).unwrap();
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("clonewatch-icons-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_fit_upscales_square() {
        let red = [255u8, 0, 0, 255].repeat(4);
        let out = fit_to_square(&red, 2, 2, 8);
        assert_eq!(out.len(), 8 * 8 * 4);
        assert!(out.chunks_exact(4).all(|p| p == [255, 0, 0, 255]));
    }

    #[test]
    fn test_fit_keeps_aspect_ratio() {
        // 4x2 white strip into 8x8: 8x4 centered vertically
        let white = [255u8; 4].repeat(8);
        let out = fit_to_square(&white, 4, 2, 8);
        let px = |x: u32, y: u32| &out[((y * 8 + x) * 4) as usize..((y * 8 + x) * 4 + 4) as usize];
        assert_eq!(px(0, 0), [0, 0, 0, 0]);
        assert_eq!(px(0, 2), [255, 255, 255, 255]);
        assert_eq!(px(7, 5), [255, 255, 255, 255]);
        assert_eq!(px(7, 6), [0, 0, 0, 0]);
    }

    #[test]
    fn test_load_fits_png() {
        let dir = temp_dir("load");
        write_png(&dir.join("omni.png"), 32, 32, &[0u8, 0, 255, 255].repeat(32 * 32));

        let icon = IconLoader::new(&dir).load("omni").unwrap();
        assert_eq!(icon.name, "omni");
        assert_eq!(icon.size(), (ICON_SIZE, ICON_SIZE));
        assert_eq!(&icon.rgba[..4], &[0, 0, 255, 255]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_with_custom_size() {
        let dir = temp_dir("sized");
        write_png(&dir.join("bloat.png"), 8, 8, &[0u8, 255, 0, 255].repeat(64));

        let icon = IconLoader::new(&dir).with_size(16).load("bloat").unwrap();
        assert_eq!(icon.size(), (16, 16));
        assert_eq!(icon.rgba.len(), 16 * 16 * 4);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_all_skips_failures() {
        let dir = temp_dir("load-all");
        write_png(&dir.join("nami.png"), 4, 4, &[255u8; 4].repeat(16));
        std::fs::write(dir.join("broken.png"), b"not a png").unwrap();

        let set = IconLoader::new(&dir).load_all(["nami", "broken", "missing"]);
        assert_eq!(set.len(), 1);
        assert!(set.contains("nami"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_icon_error() {
        let err = IconLoader::new(temp_dir("missing")).load("nope").unwrap_err();
        assert!(matches!(err, IconError::Read { .. }));
    }

    #[test]
    fn test_placeholders_are_distinct_and_stable() {
        let set = placeholder_set(["magic", "omni"]);
        let magic = set.get("magic").unwrap();
        let omni = set.get("omni").unwrap();
        assert_eq!(magic.size(), (ICON_SIZE, ICON_SIZE));
        assert_ne!(magic.rgba[..4], omni.rgba[..4]);
        assert_eq!(placeholder_color("magic"), placeholder_color("magic"));
    }
}
