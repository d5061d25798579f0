//! Anti-aliased polygon filling over an opaque background.
//!
//! The raster is a tiny-skia pixmap (re-exported by resvg). Polygons are
//! filled with the nonzero winding rule and composited source-over, in call
//! order. The background is opaque, so every pixel stays opaque and the
//! premultiplied pixmap bytes are already the straight RGBA8 output.

use glam::DVec2;
use poster_engine_core::color::Srgb;
use poster_engine_core::error::PosterError;
use poster_engine_core::poster_spec::MAX_CANVAS_EDGE;
use resvg::tiny_skia::{
    BlendMode, Color, FillRule, Paint, PathBuilder, Pixmap, PixmapMut, Transform,
};

/// An opaque RGBA pixel buffer being painted.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pixmap: Pixmap,
}

impl Raster {
    /// Creates a raster filled with `background`.
    pub fn new(width: u32, height: u32, background: Srgb) -> Result<Self, PosterError> {
        let mut pixmap = Pixmap::new(width, height).ok_or(PosterError::InvalidDimensions {
            max: MAX_CANVAS_EDGE,
        })?;
        pixmap.fill(to_color(background, 1.0));
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// RGBA of pixel `(x, y)` with y counted from the top row.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let px = self.pixmap.pixel(x, y)?.demultiply();
        Some([px.red(), px.green(), px.blue(), px.alpha()])
    }

    /// Fills the closed polygon through `points` (pixel coordinates) with
    /// `color` at opacity `alpha`.
    ///
    /// Fewer than three points, a non-finite point or a non-positive alpha
    /// paint nothing.
    pub fn fill_polygon(&mut self, points: &[DVec2], color: Srgb, alpha: f64) {
        if points.len() < 3 || !(alpha > 0.0) || points.iter().any(|p| !p.is_finite()) {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(points[0].x as f32, points[0].y as f32);
        for p in &points[1..] {
            pb.line_to(p.x as f32, p.y as f32);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(to_color(color, alpha));
        paint.anti_alias = true;
        paint.blend_mode = BlendMode::SourceOver;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    /// Mutable view for drawing a parsed SVG tree on top.
    pub fn as_pixmap_mut(&mut self) -> PixmapMut<'_> {
        self.pixmap.as_mut()
    }

    /// RGBA8 bytes, row-major from the top row.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn into_rgba8(self) -> Vec<u8> {
        self.pixmap.take()
    }
}

fn to_color(c: Srgb, alpha: f64) -> Color {
    let c = c.clamped();
    Color::from_rgba(c.r as f32, c.g as f32, c.b as f32, alpha.clamp(0.0, 1.0) as f32)
        .unwrap_or(Color::TRANSPARENT)
}
