//! Poster requests and their validated, fully resolved form.
//!
//! A [`PosterSpec`] is what a caller sends: a seed plus optional overrides.
//! It is serde-(de)serializable so that a request can be saved and replayed
//! exactly. [`PosterSpec::resolve`] merges it over the style preset and the
//! built-in defaults and validates every field, producing a [`ResolvedSpec`]
//! the composer consumes without further checks.

use serde::{Deserialize, Serialize};

use crate::color::Srgb;
use crate::error::PosterError;
use crate::layout::LayoutKind;
use crate::palette::{FixedPalette, HueBand, PaletteMode, DEFAULT_BASE_HUE, DEFAULT_SWATCH_COUNT};
use crate::preset::{PresetRanges, StylePreset};
use crate::prng::Xorshift64;
use crate::shape::{AngleWeight, DEFAULT_POINT_COUNT, MIN_POINT_COUNT};

/// Largest accepted layer count.
pub const MAX_LAYERS: usize = 20;

/// Largest accepted seed.
pub const MAX_SEED: u64 = 9999;

/// Export resolution when none is requested.
pub const DEFAULT_DPI: u32 = 300;

/// Largest accepted canvas edge, in pixels. A full-size square canvas is a
/// 256 MiB RGBA buffer.
pub const MAX_CANVAS_EDGE: u32 = 8192;

/// Closed interval `[min, max]` a value is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(self) -> f64 {
        0.5 * (self.min + self.max)
    }

    /// One uniform draw from the range.
    pub fn sample(self, rng: &mut Xorshift64) -> f64 {
        rng.next_range(self.min, self.max)
    }

    /// Requires finite, ordered bounds inside `[lo, hi]`.
    pub fn validate(self, field: &str, lo: f64, hi: f64) -> Result<(), PosterError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(PosterError::Validation(format!(
                "{field} bounds must be finite, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(PosterError::Validation(format!(
                "{field} is inverted: min {} > max {}",
                self.min, self.max
            )));
        }
        if self.min < lo || self.max > hi {
            return Err(PosterError::Validation(format!(
                "{field} [{}, {}] must lie within [{lo}, {hi}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Wobble amplitude: either one value for every layer or a range drawn per layer.
///
/// In JSON a bare number is a fixed wobble and `{"min": .., "max": ..}` a range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Wobble {
    Fixed(f64),
    Range(ValueRange),
}

impl Wobble {
    pub const fn range(min: f64, max: f64) -> Self {
        Wobble::Range(ValueRange::new(min, max))
    }

    /// Per-layer value. A fixed wobble draws nothing.
    pub fn sample(self, rng: &mut Xorshift64) -> f64 {
        match self {
            Wobble::Fixed(w) => w,
            Wobble::Range(r) => r.sample(rng),
        }
    }

    /// Representative value: the fixed wobble or the range midpoint.
    pub fn nominal(self) -> f64 {
        match self {
            Wobble::Fixed(w) => w,
            Wobble::Range(r) => r.midpoint(),
        }
    }

    pub fn validate(self) -> Result<(), PosterError> {
        match self {
            Wobble::Fixed(w) if !w.is_finite() || w < 0.0 => Err(PosterError::Validation(
                format!("wobble must be finite and >= 0, got {w}"),
            )),
            Wobble::Fixed(_) => Ok(()),
            Wobble::Range(r) => r.validate("wobble", 0.0, f64::INFINITY),
        }
    }
}

/// Physical canvas size in inches; pixels are inches times DPI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanvasSize {
    pub width_in: f64,
    pub height_in: f64,
}

impl CanvasSize {
    pub const fn new(width_in: f64, height_in: f64) -> Self {
        Self {
            width_in,
            height_in,
        }
    }

    /// Pixel dimensions at `dpi`, rounded to the nearest pixel.
    ///
    /// Returns `PosterError::InvalidDimensions` if either edge is zero or
    /// exceeds [`MAX_CANVAS_EDGE`].
    pub fn pixels(self, dpi: u32) -> Result<(u32, u32), PosterError> {
        let edge = |inches: f64| -> Result<u32, PosterError> {
            let px = (inches * f64::from(dpi)).round();
            if !px.is_finite() || px < 1.0 || px > f64::from(MAX_CANVAS_EDGE) {
                return Err(PosterError::InvalidDimensions {
                    max: MAX_CANVAS_EDGE,
                });
            }
            Ok(px as u32)
        };
        Ok((edge(self.width_in)?, edge(self.height_in)?))
    }
}

/// A poster request. Only `seed` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PosterSpec {
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_preset: Option<StylePreset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_layers: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wobble: Option<Wobble>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_range: Option<ValueRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_range: Option<ValueRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette_mode: Option<PaletteMode>,
    /// Uses one of the hand-picked palettes instead of `palette_mode`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_palette: Option<FixedPalette>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue_band: Option<HueBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_hue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swatch_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Srgb>,
    /// Drop shadows of the depth layout; on unless disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadows: Option<bool>,
    /// Foam accents of the wave layout; on unless disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foam: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl PosterSpec {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses a JSON request, rejecting unknown fields.
    ///
    /// Field values are only checked later, by [`resolve`](Self::resolve).
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_preset(mut self, preset: StylePreset) -> Self {
        self.style_preset = Some(preset);
        self
    }

    pub fn with_layers(mut self, n_layers: usize) -> Self {
        self.n_layers = Some(n_layers);
        self
    }

    pub fn with_wobble(mut self, wobble: Wobble) -> Self {
        self.wobble = Some(wobble);
        self
    }

    pub fn with_palette_mode(mut self, mode: PaletteMode) -> Self {
        self.palette_mode = Some(mode);
        self
    }

    pub fn with_fixed_palette(mut self, fixed: FixedPalette) -> Self {
        self.fixed_palette = Some(fixed);
        self
    }

    pub fn with_hue_band(mut self, band: HueBand) -> Self {
        self.hue_band = Some(band);
        self
    }

    pub fn with_radius_range(mut self, range: ValueRange) -> Self {
        self.radius_range = Some(range);
        self
    }

    pub fn with_alpha_range(mut self, range: ValueRange) -> Self {
        self.alpha_range = Some(range);
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    pub fn with_point_count(mut self, point_count: usize) -> Self {
        self.point_count = Some(point_count);
        self
    }

    /// Merges explicit fields over the preset (or the custom defaults) and
    /// validates the result.
    pub fn resolve(&self) -> Result<ResolvedSpec, PosterError> {
        let base = PresetRanges::for_preset(self.style_preset);
        let palette_mode = self.palette_mode.unwrap_or(base.palette_mode);
        let title = self.title.clone().unwrap_or_else(|| {
            let style = self
                .style_preset
                .map_or_else(|| palette_mode.name().to_string(), |p| p.name().to_string());
            format!("Generative Poster • {style}")
        });

        let resolved = ResolvedSpec {
            seed: self.seed,
            style_preset: self.style_preset,
            layout: base.layout,
            n_layers: self.n_layers.unwrap_or(base.n_layers),
            wobble: self.wobble.unwrap_or(base.wobble),
            radius_range: self.radius_range.unwrap_or(base.radius_range),
            alpha_range: self.alpha_range.unwrap_or(base.alpha_range),
            palette_mode,
            fixed_palette: self.fixed_palette,
            hue_band: self.hue_band.unwrap_or(base.hue_band),
            base_hue: self.base_hue.unwrap_or(DEFAULT_BASE_HUE),
            swatch_count: self.swatch_count.unwrap_or(DEFAULT_SWATCH_COUNT),
            point_count: self.point_count.unwrap_or(DEFAULT_POINT_COUNT),
            angle_weight: base.angle_weight,
            canvas: self.canvas.unwrap_or(base.canvas),
            dpi: self.dpi.unwrap_or(DEFAULT_DPI),
            background: self.background.unwrap_or(base.background),
            shadows: self.shadows.unwrap_or(true),
            foam: self.foam.unwrap_or(true),
            title,
            subtitle: self
                .subtitle
                .clone()
                .unwrap_or_else(|| format!("seed {}", self.seed)),
        };
        resolved.validate()?;
        Ok(resolved)
    }
}

/// A validated request with every field concrete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSpec {
    pub seed: u64,
    pub style_preset: Option<StylePreset>,
    pub layout: LayoutKind,
    pub n_layers: usize,
    pub wobble: Wobble,
    pub radius_range: ValueRange,
    pub alpha_range: ValueRange,
    pub palette_mode: PaletteMode,
    pub fixed_palette: Option<FixedPalette>,
    pub hue_band: HueBand,
    pub base_hue: f64,
    pub swatch_count: usize,
    pub point_count: usize,
    pub angle_weight: AngleWeight,
    pub canvas: CanvasSize,
    pub dpi: u32,
    pub background: Srgb,
    pub shadows: bool,
    pub foam: bool,
    pub title: String,
    pub subtitle: String,
}

impl ResolvedSpec {
    fn validate(&self) -> Result<(), PosterError> {
        if self.n_layers < 1 || self.n_layers > MAX_LAYERS {
            return Err(PosterError::Validation(format!(
                "n_layers must be in [1, {MAX_LAYERS}], got {}",
                self.n_layers
            )));
        }
        if self.seed > MAX_SEED {
            return Err(PosterError::Validation(format!(
                "seed must be in [0, {MAX_SEED}], got {}",
                self.seed
            )));
        }
        self.wobble.validate()?;
        self.radius_range
            .validate("radius_range", 0.0, f64::INFINITY)?;
        if self.radius_range.min <= 0.0 {
            return Err(PosterError::Validation(format!(
                "radius_range min must be > 0, got {}",
                self.radius_range.min
            )));
        }
        self.alpha_range.validate("alpha_range", 0.0, 1.0)?;
        if !self.base_hue.is_finite() || !(0.0..=1.0).contains(&self.base_hue) {
            return Err(PosterError::Validation(format!(
                "base_hue must be in [0, 1], got {}",
                self.base_hue
            )));
        }
        if self.swatch_count < 1 {
            return Err(PosterError::Validation(
                "swatch_count must be at least 1".into(),
            ));
        }
        if self.point_count < MIN_POINT_COUNT {
            return Err(PosterError::InvalidShape(format!(
                "point_count must be >= {MIN_POINT_COUNT}, got {}",
                self.point_count
            )));
        }
        if !(self.canvas.width_in.is_finite() && self.canvas.width_in > 0.0)
            || !(self.canvas.height_in.is_finite() && self.canvas.height_in > 0.0)
        {
            return Err(PosterError::Validation(format!(
                "canvas must be positive, got {} x {} in",
                self.canvas.width_in, self.canvas.height_in
            )));
        }
        if self.dpi == 0 {
            return Err(PosterError::Validation("dpi must be > 0".into()));
        }
        self.pixel_size()?;
        Srgb::try_new(self.background.r, self.background.g, self.background.b)?;
        Ok(())
    }

    /// Output raster size.
    pub fn pixel_size(&self) -> Result<(u32, u32), PosterError> {
        self.canvas.pixels(self.dpi)
    }

    /// Lowercase preset slug, or the palette mode when no preset is named.
    pub fn label(&self) -> &'static str {
        self.style_preset
            .map_or_else(|| self.palette_mode.name(), StylePreset::slug)
    }

    /// `poster_{label}_{seed}.png`.
    pub fn file_name(&self) -> String {
        format!("poster_{}_{}.png", self.label(), self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_message(spec: PosterSpec) -> String {
        match spec.resolve().unwrap_err() {
            PosterError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    // -- Resolution --

    #[test]
    fn bare_spec_resolves_to_custom_defaults() {
        let r = PosterSpec::new(42).resolve().unwrap();
        assert_eq!(r.layout, LayoutKind::Scatter);
        assert_eq!(r.n_layers, 8);
        assert_eq!(r.wobble, Wobble::range(0.05, 0.25));
        assert_eq!(r.radius_range, ValueRange::new(0.15, 0.45));
        assert_eq!(r.alpha_range, ValueRange::new(0.25, 0.60));
        assert_eq!(r.palette_mode, PaletteMode::Pastel);
        assert_eq!(r.swatch_count, 6);
        assert_eq!(r.point_count, 200);
        assert_eq!(r.dpi, 300);
        assert_eq!(r.base_hue, 0.60);
        assert!(r.shadows && r.foam);
        assert_eq!(r.title, "Generative Poster • pastel");
        assert_eq!(r.subtitle, "seed 42");
    }

    #[test]
    fn preset_fills_ranges_and_explicit_fields_win() {
        let spec = PosterSpec::new(1)
            .with_preset(StylePreset::Vivid)
            .with_layers(3)
            .with_palette_mode(PaletteMode::Mono);
        let r = spec.resolve().unwrap();
        assert_eq!(r.n_layers, 3);
        assert_eq!(r.palette_mode, PaletteMode::Mono);
        assert_eq!(r.wobble, Wobble::range(0.05, 0.20));
        assert_eq!(r.alpha_range, ValueRange::new(0.35, 0.70));
        assert_eq!(r.title, "Generative Poster • Vivid");
    }

    #[test]
    fn ocean_preset_carries_wave_layout() {
        let r = PosterSpec::new(0)
            .with_preset(StylePreset::Ocean)
            .resolve()
            .unwrap();
        assert_eq!(r.layout, LayoutKind::Wave);
        assert_eq!(r.angle_weight, AngleWeight::Crest);
        assert_eq!(r.hue_band, HueBand::BlueGreen);
        assert_eq!(r.pixel_size().unwrap(), (1800, 2400));
    }

    #[test]
    fn file_name_encodes_label_and_seed() {
        let r = PosterSpec::new(17)
            .with_palette_mode(PaletteMode::Vivid)
            .resolve()
            .unwrap();
        assert_eq!(r.file_name(), "poster_vivid_17.png");
        let r = PosterSpec::new(5)
            .with_preset(StylePreset::NoiseTouch)
            .resolve()
            .unwrap();
        assert_eq!(r.file_name(), "poster_noise-touch_5.png");
    }

    // -- Validation --

    #[test]
    fn zero_layers_rejected() {
        let msg = validation_message(PosterSpec::new(0).with_layers(0));
        assert!(msg.contains("n_layers"), "{msg}");
    }

    #[test]
    fn too_many_layers_rejected() {
        let msg = validation_message(PosterSpec::new(0).with_layers(21));
        assert!(msg.contains("n_layers"), "{msg}");
    }

    #[test]
    fn single_layer_accepted() {
        assert_eq!(PosterSpec::new(0).with_layers(1).resolve().unwrap().n_layers, 1);
    }

    #[test]
    fn seed_above_limit_rejected() {
        let msg = validation_message(PosterSpec::new(10_000));
        assert!(msg.contains("seed"), "{msg}");
    }

    #[test]
    fn inverted_radius_range_rejected() {
        let msg = validation_message(
            PosterSpec::new(0).with_radius_range(ValueRange::new(0.4, 0.1)),
        );
        assert!(msg.contains("inverted"), "{msg}");
    }

    #[test]
    fn zero_radius_min_rejected() {
        let msg = validation_message(
            PosterSpec::new(0).with_radius_range(ValueRange::new(0.0, 0.1)),
        );
        assert!(msg.contains("radius_range"), "{msg}");
    }

    #[test]
    fn alpha_range_outside_unit_rejected() {
        let msg = validation_message(
            PosterSpec::new(0).with_alpha_range(ValueRange::new(0.5, 1.5)),
        );
        assert!(msg.contains("alpha_range"), "{msg}");
    }

    #[test]
    fn negative_wobble_rejected() {
        let msg = validation_message(PosterSpec::new(0).with_wobble(Wobble::Fixed(-0.1)));
        assert!(msg.contains("wobble"), "{msg}");
        assert!(PosterSpec::new(0)
            .with_wobble(Wobble::range(0.3, 0.1))
            .resolve()
            .is_err());
    }

    #[test]
    fn tiny_point_count_is_shape_error() {
        let err = PosterSpec::new(0).with_point_count(2).resolve().unwrap_err();
        assert!(matches!(err, PosterError::InvalidShape(_)));
    }

    #[test]
    fn oversized_canvas_rejected() {
        let err = PosterSpec::new(0).with_dpi(5000).resolve().unwrap_err();
        assert!(matches!(err, PosterError::InvalidDimensions { max: 8192 }));
    }

    #[test]
    fn canvas_edge_cap_is_inclusive() {
        assert_eq!(CanvasSize::new(81.92, 1.0).pixels(100).unwrap(), (8192, 100));
        assert!(matches!(
            CanvasSize::new(81.93, 1.0).pixels(100),
            Err(PosterError::InvalidDimensions { max: MAX_CANVAS_EDGE })
        ));
        let square = PosterSpec {
            canvas: Some(CanvasSize::new(30.0, 30.0)),
            ..PosterSpec::new(0)
        };
        assert!(square.resolve().is_err(), "9000 px edge at the default dpi");
    }

    #[test]
    fn zero_dpi_rejected() {
        let msg = validation_message(PosterSpec::new(0).with_dpi(0));
        assert!(msg.contains("dpi"), "{msg}");
    }

    #[test]
    fn out_of_range_background_rejected() {
        let spec = PosterSpec {
            background: Some(Srgb::new(1.5, 0.0, 0.0)),
            ..PosterSpec::new(0)
        };
        assert!(matches!(spec.resolve(), Err(PosterError::InvalidColor(_))));
    }

    // -- JSON --

    #[test]
    fn json_accepts_fixed_and_ranged_wobble() {
        let fixed = PosterSpec::from_json(r#"{"seed": 3, "wobble": 0.2}"#).unwrap();
        assert_eq!(fixed.wobble, Some(Wobble::Fixed(0.2)));
        let ranged =
            PosterSpec::from_json(r#"{"seed": 3, "wobble": {"min": 0.1, "max": 0.3}}"#).unwrap();
        assert_eq!(ranged.wobble, Some(Wobble::range(0.1, 0.3)));
    }

    #[test]
    fn json_reads_preset_mode_and_band() {
        let spec = PosterSpec::from_json(
            r#"{"seed": 9, "style_preset": "noise-touch", "palette_mode": "persisted", "hue_band": "blue-green"}"#,
        )
        .unwrap();
        assert_eq!(spec.style_preset, Some(StylePreset::NoiseTouch));
        assert_eq!(spec.palette_mode, Some(PaletteMode::Persisted));
        assert_eq!(spec.hue_band, Some(HueBand::BlueGreen));
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let err = PosterSpec::from_json(r#"{"seed": 1, "layers": 4}"#).unwrap_err();
        assert!(err.to_string().contains("layers"), "{err}");
    }

    #[test]
    fn json_syntax_error_is_reported_as_syntax() {
        let err = PosterSpec::from_json(r#"{"seed": 1,"#).unwrap_err();
        assert!(err.is_eof() || err.is_syntax(), "{err}");
        let err = PosterSpec::from_json(r#"{"seed": 1 "n_layers": 2}"#).unwrap_err();
        assert!(err.is_syntax(), "{err}");
        let err = PosterSpec::from_json(r#"{"seed": 1, "layers": 4}"#).unwrap_err();
        assert!(err.is_data(), "{err}");
    }

    #[test]
    fn json_reads_fixed_palette() {
        let spec = PosterSpec::from_json(r#"{"seed": 2, "fixed_palette": "noise-touch"}"#).unwrap();
        assert_eq!(spec.fixed_palette, Some(FixedPalette::NoiseTouch));
        assert_eq!(
            spec.resolve().unwrap().fixed_palette,
            Some(FixedPalette::NoiseTouch)
        );
        assert_eq!(PosterSpec::new(2).resolve().unwrap().fixed_palette, None);
    }

    #[test]
    fn json_requires_seed() {
        assert!(PosterSpec::from_json(r#"{"n_layers": 4}"#).is_err());
    }

    #[test]
    fn json_round_trip_preserves_spec() {
        let spec = PosterSpec::new(77)
            .with_preset(StylePreset::Depth)
            .with_wobble(Wobble::range(0.1, 0.2))
            .with_dpi(72);
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(PosterSpec::from_json(&json).unwrap(), spec);
        assert!(!json.contains("radius_range"), "absent fields are omitted: {json}");
    }

    #[test]
    fn canvas_pixels_round_to_nearest() {
        assert_eq!(CanvasSize::new(7.0, 10.0).pixels(300).unwrap(), (2100, 3000));
        assert_eq!(CanvasSize::new(1.004, 1.0).pixels(100).unwrap(), (100, 100));
        assert!(CanvasSize::new(0.001, 1.0).pixels(100).is_err());
    }

    #[test]
    fn fixed_wobble_draws_nothing() {
        let mut rng = Xorshift64::new(8);
        let mut reference = Xorshift64::new(8);
        assert_eq!(Wobble::Fixed(0.12).sample(&mut rng), 0.12);
        assert_eq!(rng.next_u64(), reference.next_u64());
        assert!((Wobble::range(0.1, 0.3).nominal() - 0.2).abs() < 1e-12);
    }
}
