//! Before/after imagery for a report
//!
//! Only PNG is supported. Pixels are normalized to 8 bits per channel so the
//! exporter can embed them without further conversion.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::error::ImageLoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::GrayAlpha => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::GrayAlpha | PixelFormat::Rgba)
    }
}

/// A decoded raster plus the bytes it was decoded from
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Row-major, 8 bits per channel, `width * height * channels` bytes
    pub pixels: Vec<u8>,
    /// Encoded file as read from disk, for surfaces that display it directly
    pub encoded: Vec<u8>,
}

impl ImageAsset {
    /// Decode a PNG held in memory
    pub fn decode_png(name: &str, encoded: Vec<u8>) -> Result<Self, ImageLoadError> {
        let failed = |reason: String| ImageLoadError::LoadFailed {
            path: name.to_string(),
            reason,
        };

        let (info, pixels) = {
            let mut decoder = png::Decoder::new(encoded.as_slice());
            decoder.set_transformations(
                png::Transformations::EXPAND | png::Transformations::STRIP_16,
            );
            let mut reader = decoder.read_info().map_err(|e| failed(e.to_string()))?;

            let mut pixels = vec![0; reader.output_buffer_size()];
            let info = reader
                .next_frame(&mut pixels)
                .map_err(|e| failed(e.to_string()))?;
            pixels.truncate(info.buffer_size());
            (info, pixels)
        };

        let format = match info.color_type {
            png::ColorType::Grayscale => PixelFormat::Gray,
            png::ColorType::GrayscaleAlpha => PixelFormat::GrayAlpha,
            png::ColorType::Rgb => PixelFormat::Rgb,
            png::ColorType::Rgba => PixelFormat::Rgba,
            other => {
                return Err(failed(format!("unsupported color type {:?}", other)));
            }
        };

        Ok(Self {
            name: name.to_string(),
            width: info.width,
            height: info.height,
            format,
            pixels,
            encoded,
        })
    }

    /// Whether the pixel buffer matches the declared dimensions
    pub fn is_consistent(&self) -> bool {
        let expected = self.width as usize * self.height as usize * self.format.channels();
        self.width > 0 && self.height > 0 && self.pixels.len() == expected
    }
}

/// A loaded before/after pair
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePair {
    pub before: ImageAsset,
    pub after: ImageAsset,
}

/// Load a single PNG from disk
pub fn load_image(path: &Path) -> Result<ImageAsset, ImageLoadError> {
    let shown = path.display().to_string();
    let encoded = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ImageLoadError::Missing(shown.clone()),
        _ => ImageLoadError::LoadFailed {
            path: shown.clone(),
            reason: e.to_string(),
        },
    })?;

    let asset = ImageAsset::decode_png(&shown, encoded)?;
    tracing::debug!(
        "Loaded {}: {}x{} {:?}",
        shown,
        asset.width,
        asset.height,
        asset.format
    );
    Ok(asset)
}

/// Load both images; either one missing makes the pair `Missing`
pub fn load_pair(before: &Path, after: &Path) -> Result<ImagePair, ImageLoadError> {
    let before = load_image(before)?;
    let after = load_image(after)?;
    Ok(ImagePair { before, after })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_png(
        dir: &TempDir,
        name: &str,
        color: png::ColorType,
        w: u32,
        h: u32,
    ) -> std::path::PathBuf {
        let channels = match color {
            png::ColorType::Grayscale => 1,
            png::ColorType::GrayscaleAlpha => 2,
            png::ColorType::Rgb => 3,
            _ => 4,
        };
        let path = dir.path().join(name);
        let file = fs::File::create(&path).unwrap();
        let mut encoder = png::Encoder::new(io::BufWriter::new(file), w, h);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        let data = vec![128u8; (w * h) as usize * channels];
        writer.write_image_data(&data).unwrap();
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_load_rgb_image() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "a.png", png::ColorType::Rgb, 4, 3);
        let asset = load_image(&path).unwrap();
        assert_eq!((asset.width, asset.height), (4, 3));
        assert_eq!(asset.format, PixelFormat::Rgb);
        assert_eq!(asset.pixels.len(), 4 * 3 * 3);
        assert!(asset.is_consistent());
    }

    #[test]
    fn test_load_rgba_keeps_alpha() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "a.png", png::ColorType::Rgba, 2, 2);
        let asset = load_image(&path).unwrap();
        assert_eq!(asset.format, PixelFormat::Rgba);
        assert!(asset.format.has_alpha());
    }

    #[test]
    fn test_missing_file_is_missing() {
        let dir = TempDir::new().unwrap();
        let result = load_image(&dir.path().join("nope.png"));
        assert!(matches!(result, Err(ImageLoadError::Missing(_))));
    }

    #[test]
    fn test_garbage_is_load_failed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.png");
        fs::write(&path, b"definitely not a png").unwrap();
        let result = load_image(&path);
        assert!(matches!(result, Err(ImageLoadError::LoadFailed { .. })));
    }

    #[test]
    fn test_directory_is_load_failed_not_missing() {
        let dir = TempDir::new().unwrap();
        let result = load_image(dir.path());
        assert!(matches!(result, Err(ImageLoadError::LoadFailed { .. })));
    }

    #[test]
    fn test_pair_with_one_missing_is_missing() {
        let dir = TempDir::new().unwrap();
        let before = write_png(&dir, "x_before.png", png::ColorType::Rgb, 2, 2);
        let result = load_pair(&before, &dir.path().join("x_after.png"));
        assert!(matches!(result, Err(ImageLoadError::Missing(_))));
    }

    #[test]
    fn test_pair_loads_both() {
        let dir = TempDir::new().unwrap();
        let before = write_png(&dir, "x_before.png", png::ColorType::Rgb, 2, 2);
        let after = write_png(&dir, "x_after.png", png::ColorType::Grayscale, 3, 1);
        let pair = load_pair(&before, &after).unwrap();
        assert_eq!(pair.before.format, PixelFormat::Rgb);
        assert_eq!(pair.after.format, PixelFormat::Gray);
        assert!(!pair.after.encoded.is_empty());
    }
}
