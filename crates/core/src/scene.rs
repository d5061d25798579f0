//! The composed poster: an ordered list of filled polygons plus text labels.
//!
//! Coordinates are normalized to the unit square with the origin at the
//! bottom-left corner and y pointing up. Shapes are stored in paint order;
//! renderers draw them front to back exactly as listed and never reorder.

use glam::DVec2;
use serde::Serialize;

use crate::color::Srgb;
use crate::layout::LayoutKind;
use crate::palette::Palette;
use crate::poster_spec::ResolvedSpec;

/// What a shape contributes to its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeRole {
    /// Darker offset copy painted beneath the body (depth layout).
    Shadow,
    /// The layer's blob.
    Body,
    /// Accent painted on top of a wave crest.
    Foam,
}

/// A color with its opacity carried alongside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fill {
    pub color: Srgb,
    pub alpha: f64,
}

impl Fill {
    pub fn new(color: Srgb, alpha: f64) -> Self {
        Self { color, alpha }
    }
}

/// One filled, implicitly closed polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    pub layer: usize,
    pub role: ShapeRole,
    pub fill: Fill,
    pub points: Vec<DVec2>,
}

/// Text weight of a label line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    Title,
    Subtitle,
}

/// A line of text anchored at the left end of its baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub anchor: DVec2,
    pub style: LabelStyle,
    pub color: Srgb,
}

/// Title anchor, in normalized coordinates.
pub const TITLE_ANCHOR: DVec2 = DVec2::new(0.05, 0.95);

/// Subtitle anchor, in normalized coordinates.
pub const SUBTITLE_ANCHOR: DVec2 = DVec2::new(0.05, 0.91);

/// Label ink.
pub const LABEL_COLOR: Srgb = Srgb::new(0.1, 0.1, 0.12);

/// A fully composed poster. Immutable once built by the composer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Poster {
    spec: ResolvedSpec,
    width: u32,
    height: u32,
    palette: Palette,
    shapes: Vec<Shape>,
    labels: Vec<Label>,
}

impl Poster {
    pub(crate) fn new(
        spec: ResolvedSpec,
        (width, height): (u32, u32),
        palette: Palette,
        shapes: Vec<Shape>,
        labels: Vec<Label>,
    ) -> Self {
        Self {
            spec,
            width,
            height,
            palette,
            shapes,
            labels,
        }
    }

    /// The resolved request this poster was composed from.
    pub fn spec(&self) -> &ResolvedSpec {
        &self.spec
    }

    pub fn seed(&self) -> u64 {
        self.spec.seed
    }

    pub fn layout(&self) -> LayoutKind {
        self.spec.layout
    }

    /// Output width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dpi(&self) -> u32 {
        self.spec.dpi
    }

    pub fn background(&self) -> Srgb {
        self.spec.background
    }

    /// The palette layers were colored from (unused by the depth layout).
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Every shape in paint order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Number of layers, which equals the number of body shapes.
    pub fn layer_count(&self) -> usize {
        self.spec.n_layers
    }

    /// Body shapes in layer order.
    pub fn bodies(&self) -> impl Iterator<Item = &Shape> {
        self.shapes_with_role(ShapeRole::Body)
    }

    pub fn shapes_with_role(&self, role: ShapeRole) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(move |s| s.role == role)
    }

    /// Suggested export file name, `poster_{label}_{seed}.png`.
    pub fn file_name(&self) -> String {
        self.spec.file_name()
    }

    /// Maps a normalized point to pixel coordinates (y flipped).
    pub fn to_pixels(&self, p: DVec2) -> DVec2 {
        DVec2::new(p.x * f64::from(self.width), (1.0 - p.y) * f64::from(self.height))
    }
}
