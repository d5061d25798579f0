#![deny(unsafe_code)]
//! CPU rendering of composed posters.
//!
//! This crate sits between `poster-engine-core` (which composes a [`Poster`]
//! scene) and the outer surfaces. [`render`] paints the scene into an RGBA8
//! buffer with tiny-skia and draws the labels with resvg; PNG export lives in
//! [`export`], gated behind the `png` feature (default on).

pub mod raster;
pub mod text;

#[cfg(feature = "png")]
pub mod export;

use poster_engine_core::error::PosterError;
use poster_engine_core::palette_table::PaletteStore;
use poster_engine_core::poster_spec::PosterSpec;
use poster_engine_core::scene::Poster;
use poster_engine_core::Composer;

use crate::raster::Raster;

/// A poster together with its pixels.
///
/// The pixels stay valid whatever happens to a later export.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPoster {
    poster: Poster,
    pixels: Vec<u8>,
}

impl RenderedPoster {
    pub fn poster(&self) -> &Poster {
        &self.poster
    }

    pub fn width(&self) -> u32 {
        self.poster.width()
    }

    pub fn height(&self) -> u32 {
        self.poster.height()
    }

    /// RGBA8 pixels, row-major from the top row.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of pixel `(x, y)`, with y counted from the top row.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = (y as usize * self.width() as usize + x as usize) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn into_parts(self) -> (Poster, Vec<u8>) {
        (self.poster, self.pixels)
    }
}

/// Paints every shape in order, then the labels.
#[tracing::instrument(skip(poster), fields(width = poster.width(), height = poster.height(), shapes = poster.shapes().len()))]
pub fn render(poster: Poster) -> Result<RenderedPoster, PosterError> {
    let mut raster = Raster::new(poster.width(), poster.height(), poster.background())?;
    for shape in poster.shapes() {
        let points: Vec<_> = shape.points.iter().map(|&p| poster.to_pixels(p)).collect();
        raster.fill_polygon(&points, shape.fill.color, shape.fill.alpha);
    }
    text::draw_labels(&poster, &mut raster)?;
    tracing::debug!("poster rasterized");
    Ok(RenderedPoster {
        pixels: raster.into_rgba8(),
        poster,
    })
}

/// Composes and renders a poster in one step.
///
/// `store` supplies the persisted palette and may be `None` for procedural
/// palette modes.
pub fn generate(
    spec: &PosterSpec,
    store: Option<&dyn PaletteStore>,
) -> Result<RenderedPoster, PosterError> {
    let mut composer = Composer::new(spec)?;
    if let Some(store) = store {
        composer = composer.with_palette_store(store);
    }
    render(composer.compose()?)
}
