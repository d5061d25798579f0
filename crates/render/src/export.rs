//! PNG export of a [`RenderedPoster`].
//!
//! This module is feature-gated behind `png` (default on). The poster DPI is
//! recorded in the `pHYs` chunk, so the file prints at its physical canvas
//! size. Export failures are reported as `PosterError::Encoding` and never
//! touch the in-memory pixels, so a caller can still show a poster whose
//! file write failed.

use std::fs;
use std::path::{Path, PathBuf};

use poster_engine_core::error::PosterError;
use tracing::info;

use crate::RenderedPoster;

const METERS_PER_INCH: f64 = 0.0254;

/// Pixels per meter at `dpi`, as stored in `pHYs`.
pub fn pixels_per_meter(dpi: u32) -> u32 {
    (f64::from(dpi) / METERS_PER_INCH).round() as u32
}

fn encoding(e: impl std::fmt::Display) -> PosterError {
    PosterError::Encoding(e.to_string())
}

impl RenderedPoster {
    /// Encodes the poster as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, PosterError> {
        let mut bytes = Vec::new();
        let mut encoder = png::Encoder::new(&mut bytes, self.width(), self.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let ppm = pixels_per_meter(self.poster().dpi());
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder.write_header().map_err(encoding)?;
        writer.write_image_data(self.pixels()).map_err(encoding)?;
        writer.finish().map_err(encoding)?;
        Ok(bytes)
    }

    /// Writes the poster as a PNG file at `path`.
    pub fn write_png(&self, path: &Path) -> Result<(), PosterError> {
        let bytes = self.encode_png()?;
        fs::write(path, bytes)
            .map_err(|e| PosterError::Encoding(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "poster written");
        Ok(())
    }

    /// Writes the poster into `dir` under its suggested file name.
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf, PosterError> {
        let path = dir.join(self.poster().file_name());
        self.write_png(&path)?;
        Ok(path)
    }
}
